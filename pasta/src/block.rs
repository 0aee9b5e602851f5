// ブロック関連の型と直列化。
use core::sync::atomic::Ordering;
use std_shims::{
  vec,
  vec::Vec,
  io::{self, Read, Write},
};

use crate::{
  io::*,
  primitives::keccak256,
  merkle::merkle_root,
  transaction::{Input, Transaction},
  cache::{Cached, BLOCK_HASHES_CACHED, BLOCK_HASHES_CALCULATED},
};

/// ブロックヘッダ。
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BlockHeader {
  /// 適用されるハードフォークのメジャーバージョン
  pub major_version: u8,
  /// マイナーが支持を表明するハードフォークのマイナーバージョン
  pub minor_version: u8,
  /// UNIX 時刻（秒）
  pub timestamp: u64,
  /// 直前ブロックのハッシュ
  pub previous: [u8; 32],
  /// 採掘に使われるノンス（PoW 試行でインクリメントされる）
  pub nonce: u32,
}

impl BlockHeader {
  /// Write the BlockHeader.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    VarInt::write(&self.major_version, w)?;
    VarInt::write(&self.minor_version, w)?;
    VarInt::write(&self.timestamp, w)?;
    w.write_all(&self.previous)?;
    w.write_all(&self.nonce.to_le_bytes())
  }

  /// Serialize the BlockHeader to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut serialized = vec![];
    self.write(&mut serialized).expect("write failed but <Vec as io::Write> doesn't fail");
    serialized
  }

  /// Read a BlockHeader.
  pub fn read<R: Read>(r: &mut R) -> io::Result<BlockHeader> {
    Ok(BlockHeader {
      major_version: VarInt::read(r)?,
      minor_version: VarInt::read(r)?,
      timestamp: VarInt::read(r)?,
      previous: read_bytes(r)?,
      nonce: read_bytes(r).map(u32::from_le_bytes)?,
    })
  }
}

/// A block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Block {
  /// The block's header.
  pub header: BlockHeader,
  /// The miner's transaction.
  miner_transaction: Transaction,
  /// The hashes of the non-miner transactions within this block.
  pub transactions: Vec<[u8; 32]>,
  hash: Cached<[u8; 32]>,
}

impl Block {
  /// The maximum amount of transactions a block may have, including the miner transaction.
  // Above this, the merkle tree of transaction hashes is incalculable
  pub const MAX_TRANSACTIONS: usize = 0x1000_0000;

  /// Construct a new Block.
  ///
  /// This requires the miner transaction have a single `Gen` input, as that input defines the
  /// block's number. The result is not guaranteed to follow any further consensus rules.
  pub fn new(
    header: BlockHeader,
    miner_transaction: Transaction,
    transactions: Vec<[u8; 32]>,
  ) -> Option<Block> {
    {
      let inputs = &miner_transaction.prefix.inputs;
      if inputs.len() != 1 {
        None?;
      }
      match inputs[0] {
        Input::Gen(_number) => {}
        _ => None?,
      }
    }

    Some(Block { header, miner_transaction, transactions, hash: Cached::new() })
  }

  /// The zero-indexed position of this block within the blockchain.
  pub fn number(&self) -> usize {
    match self.miner_transaction.prefix.inputs.first() {
      Some(Input::Gen(number)) => *number,
      _ => panic!("invalid miner transaction accepted into block"),
    }
  }

  /// The block's miner's transaction.
  pub fn miner_transaction(&self) -> &Transaction {
    &self.miner_transaction
  }

  /// Invalidate the memoized hash of this block, and of its miner transaction.
  pub fn invalidate_hashes(&mut self) {
    self.hash.invalidate();
    self.miner_transaction.invalidate_hashes();
  }

  /// Write the Block.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.header.write(w)?;
    self.miner_transaction.write(w)?;
    VarInt::write(&self.transactions.len(), w)?;
    for tx in &self.transactions {
      w.write_all(tx)?;
    }
    Ok(())
  }

  /// Serialize the Block to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut serialized = vec![];
    self.write(&mut serialized).expect("write failed but <Vec as io::Write> doesn't fail");
    serialized
  }

  /// Serialize the data this block's identity and proof-of-work hashes commit to.
  ///
  /// This is the serialized header, the merkle root over the miner transaction's hash and the
  /// other transactions' hashes, and the amount of transactions within the block.
  pub fn hashing_blob(&self) -> Vec<u8> {
    let mut blob = self.header.serialize();

    let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
    transactions.push(self.miner_transaction.hash());
    transactions.extend_from_slice(&self.transactions);

    blob.extend_from_slice(
      &merkle_root(transactions)
        .expect("the tree will not be empty, the miner tx is always present"),
    );
    VarInt::write(&(1 + self.transactions.len()), &mut blob)
      .expect("write failed but <Vec as io::Write> doesn't fail");
    blob
  }

  fn calculate_hash(&self) -> [u8; 32] {
    let mut hashable = self.hashing_blob();
    // The block hash additionally commits to the length of its preimage. The proof-of-work hash
    // doesn't.
    let mut hashing_blob = Vec::with_capacity(<usize as VarInt>::UPPER_BOUND + hashable.len());
    VarInt::write(
      &u64::try_from(hashable.len()).expect("length of block hash's preimage exceeded u64::MAX"),
      &mut hashing_blob,
    )
    .expect("write failed but <Vec as io::Write> doesn't fail");
    hashing_blob.append(&mut hashable);
    keccak256(hashing_blob)
  }

  /// The identity hash of this block.
  ///
  /// This is memoized. A read of a valid cache bumps the process-wide cached counter, a compute
  /// bumps the calculated counter (see [`crate::hash_stats`]).
  pub fn hash(&self) -> [u8; 32] {
    if let Some(hash) = self.hash.get() {
      BLOCK_HASHES_CACHED.fetch_add(1, Ordering::Relaxed);
      return *hash;
    }
    BLOCK_HASHES_CALCULATED.fetch_add(1, Ordering::Relaxed);
    *self.hash.get_or_init(|| self.calculate_hash())
  }

  /// Read a Block.
  ///
  /// This MAY error if miscellaneous consensus rules are broken, as useful when deserializing.
  /// The result is not guaranteed to follow all consensus rules or any specific set of consensus
  /// rules.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Block> {
    let header = BlockHeader::read(r)?;

    let miner_transaction = Transaction::read(r)?;

    let transactions: usize = VarInt::read(r)?;
    if transactions >= Self::MAX_TRANSACTIONS {
      Err(io::Error::other("amount of transaction exceeds limit"))?;
    }
    let transactions = (0 .. transactions).map(|_| read_bytes(r)).collect::<Result<_, _>>()?;

    Block::new(header, miner_transaction, transactions)
      .ok_or_else(|| io::Error::other("block failed sanity checks"))
  }

  /// Parse a block from a blob.
  ///
  /// The result's caches, and its miner transaction's caches, are invalidated. This validates
  /// the format alone: proof-of-work and chain linkage are consensus concerns left to the
  /// caller.
  pub fn from_blob(blob: &[u8]) -> io::Result<Block> {
    let mut block = Self::read(&mut &*blob)?;
    block.invalidate_hashes();
    Ok(block)
  }
}
