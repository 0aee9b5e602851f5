use crate::{
  io::VarInt,
  primitives::keccak256,
  merkle::merkle_root,
  transaction::{Input, Output, Timelock, Transaction, TransactionPrefix, TransactionProofs},
  block::{Block, BlockHeader},
  pow::{block_pow_hash, fork_version, CnHeavyContext, Network, PowFork, PowHash},
  hash_stats,
};

fn miner_tx(number: usize) -> Transaction {
  Transaction::new(
    TransactionPrefix {
      version: 2,
      unlock_time: Timelock::Block(number + crate::COINBASE_LOCK_WINDOW),
      inputs: vec![Input::Gen(number)],
      outputs: vec![Output { amount: Some(5_000_000_000), key: crate::ed25519::CompressedPoint::G }],
      extra: vec![],
    },
    TransactionProofs::RingCt(None),
  )
}

fn block(number: usize, major_version: u8) -> Block {
  Block::new(
    BlockHeader {
      major_version,
      minor_version: major_version,
      timestamp: 1_600_000_000,
      previous: [3; 32],
      nonce: 0xdead_beef,
    },
    miner_tx(number),
    vec![[5; 32], [7; 32]],
  )
  .unwrap()
}

fn pair(left: [u8; 32], right: [u8; 32]) -> [u8; 32] {
  keccak256([left, right].concat())
}

#[test]
fn merkle() {
  let no_leaves: [[u8; 32]; 0] = [];
  assert_eq!(merkle_root(no_leaves), None);
  assert_eq!(merkle_root([[1; 32]]), Some([1; 32]));
  assert_eq!(merkle_root([[1; 32], [2; 32]]), Some(pair([1; 32], [2; 32])));
  // With three leaves, the right pair is hashed first
  assert_eq!(
    merkle_root([[1; 32], [2; 32], [3; 32]]),
    Some(pair([1; 32], pair([2; 32], [3; 32]))),
  );
  // With five leaves, the rightmost pair hashes first, reducing the tree to four
  assert_eq!(
    merkle_root([[1; 32], [2; 32], [3; 32], [4; 32], [5; 32]]),
    Some(pair(pair([1; 32], [2; 32]), pair([3; 32], pair([4; 32], [5; 32])))),
  );
}

#[test]
fn round_trip() {
  let block = block(42, 1);
  let blob = block.serialize();
  let parsed = Block::from_blob(&blob).unwrap();
  assert_eq!(parsed, block);
  assert_eq!(parsed.hash(), block.hash());
  assert_eq!(block.number(), 42);
}

#[test]
fn non_coinbase_miner_transaction_is_rejected() {
  let mut tx = miner_tx(1);
  tx.prefix.inputs =
    vec![Input::ToKey { amount: Some(1), key_offsets: vec![1], key_image: [9; 32].into() }];
  assert!(Block::new(
    BlockHeader {
      major_version: 1,
      minor_version: 1,
      timestamp: 0,
      previous: [0; 32],
      nonce: 0
    },
    tx,
    vec![],
  )
  .is_none());
}

#[test]
fn hashing_blob_structure() {
  let block = block(7, 2);
  let blob = block.hashing_blob();

  // Header, then the merkle root over the miner transaction and the block's transactions, then
  // the amount of transactions
  let mut expected = block.header.serialize();
  let root = merkle_root(vec![
    block.miner_transaction().hash(),
    block.transactions[0],
    block.transactions[1],
  ])
  .unwrap();
  expected.extend_from_slice(&root);
  VarInt::write(&3usize, &mut expected).unwrap();
  assert_eq!(blob, expected);

  // The block hash commits to the blob's length, the proof-of-work hash takes the blob as-is
  let mut hash_preimage = vec![];
  VarInt::write(&u64::try_from(blob.len()).unwrap(), &mut hash_preimage).unwrap();
  hash_preimage.extend_from_slice(&blob);
  assert_eq!(block.hash(), keccak256(hash_preimage));
}

#[test]
fn block_hash_is_cached() {
  let block = block(3, 1);
  let before = hash_stats();
  let first = block.hash();
  let mid = hash_stats();
  assert!(mid.block_hashes_calculated >= (before.block_hashes_calculated + 1));
  let second = block.hash();
  assert_eq!(first, second);
  assert!(hash_stats().block_hashes_cached >= (mid.block_hashes_cached + 1));

  // Parsing yields invalidated caches
  let reparsed = Block::from_blob(&block.serialize()).unwrap();
  let prior = hash_stats().block_hashes_calculated;
  assert_eq!(reparsed.hash(), first);
  assert!(hash_stats().block_hashes_calculated >= (prior + 1));
}

// A stand-in CN-Heavy context hashing with a tag byte per algorithm
struct MockHeavy;
struct MockBorrowed<'a> {
  // Only present to prove the scratchpad is borrowed
  _ctx: &'a mut MockHeavy,
  tag: u8,
}

impl PowHash for MockHeavy {
  fn hash(&mut self, data: &[u8]) -> [u8; 32] {
    keccak256([&[2u8], data].concat())
  }
}
impl PowHash for MockBorrowed<'_> {
  fn hash(&mut self, data: &[u8]) -> [u8; 32] {
    keccak256([&[self.tag], data].concat())
  }
}
impl CnHeavyContext for MockHeavy {
  type V1<'a> = MockBorrowed<'a>;
  type V3<'a> = MockBorrowed<'a>;
  fn borrow_v1(&mut self) -> MockBorrowed<'_> {
    MockBorrowed { _ctx: self, tag: 1 }
  }
  fn borrow_v3(&mut self) -> MockBorrowed<'_> {
    MockBorrowed { _ctx: self, tag: 3 }
  }
}

#[test]
fn pow_routing() {
  let mut ctx = MockHeavy;

  let expect =
    |block: &Block, tag: u8| keccak256([&[tag], block.hashing_blob().as_slice()].concat());

  // Before any fork, CN v1
  let genesis_era = block(1, 1);
  assert_eq!(block_pow_hash(Network::Mainnet, &genesis_era, &mut ctx), expect(&genesis_era, 1));

  // At the CN-Heavy fork
  let heavy_era = block(2, 3);
  assert_eq!(block_pow_hash(Network::Mainnet, &heavy_era, &mut ctx), expect(&heavy_era, 2));

  // At the CN-GPU fork
  let gpu_era = block(3, 6);
  assert_eq!(block_pow_hash(Network::Mainnet, &gpu_era, &mut ctx), expect(&gpu_era, 3));

  // Stagenet activates CN-GPU earlier than mainnet
  assert!(
    fork_version(Network::Stagenet, PowFork::CnGpu) <
      fork_version(Network::Mainnet, PowFork::CnGpu)
  );
  let staging = block(4, 4);
  assert_eq!(block_pow_hash(Network::Stagenet, &staging, &mut ctx), expect(&staging, 3));
  assert_eq!(block_pow_hash(Network::Mainnet, &staging, &mut ctx), expect(&staging, 2));
}
