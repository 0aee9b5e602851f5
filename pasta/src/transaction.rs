// トランザクションの型と直列化。
// Input/Output/Timelock/TransactionPrefix/Transaction と、ワイヤ形式からの
// パース・展開・識別子ハッシュを提供する。
use core::sync::atomic::Ordering;
#[allow(unused_imports)]
use std_shims::prelude::*;
use std_shims::io::{self, Read, Write};

use zeroize::Zeroize;

use crate::{
  io::*,
  ed25519::*,
  primitives::{UpperBound, LowerBound, keccak256},
  ring_signatures::RingSignature,
  ringct::{RctExpansionError, PrunedRctProofs},
  cache::{Cached, TX_HASHES_CACHED, TX_HASHES_CALCULATED},
  TX_FORK_ID,
};

/// An input spending or generating coins.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Input {
  /// An input for a miner transaction, which is generating new coins.
  ///
  /// Its value is the number of the block the transaction funds.
  Gen(usize),
  /// An input spending an output on-chain.
  ToKey {
    /// The pool this input spends an output of.
    amount: Option<u64>,
    /// The ring members for this input, on the wire as their offset distance from each other.
    key_offsets: Vec<u64>,
    /// The key image (linking tag) for the spent output.
    key_image: CompressedPoint,
  },
}

impl Input {
  /// The lower bound for the size of an input which isn't `Input::Gen(_)`.
  // `<usize as VarInt>::LOWER_BOUND` is used for the lower-bound of a `Vec`'s encoding's length
  const NON_GEN_SIZE_LOWER_BOUND: LowerBound<usize> =
    LowerBound(1 + <u64 as VarInt>::LOWER_BOUND + <usize as VarInt>::LOWER_BOUND + 32);

  /// Write the Input.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    match self {
      Input::Gen(height) => {
        w.write_all(&[255])?;
        VarInt::write(height, w)
      }

      Input::ToKey { amount, key_offsets, key_image } => {
        w.write_all(&[2])?;
        VarInt::write(&amount.unwrap_or(0), w)?;
        write_vec(VarInt::write, key_offsets, w)?;
        key_image.write(w)
      }
    }
  }

  /// Serialize the Input to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = vec![];
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read an Input.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Input> {
    Ok(match read_byte(r)? {
      255 => Input::Gen(VarInt::read(r)?),
      2 => {
        let amount = VarInt::read(r)?;
        // A 0-amount input only exists within RingCT transactions, whose inputs' amounts are
        // committed, so collapsing 0 to None is safe without knowing the version
        let amount = if amount == 0 { None } else { Some(amount) };
        Input::ToKey {
          amount,
          // Each offset takes at least one byte, and this won't be in a miner transaction
          key_offsets: read_vec(
            VarInt::read,
            Some(Transaction::<NotPruned>::NON_MINER_SIZE_UPPER_BOUND.0),
            r,
          )?,
          key_image: CompressedPoint::read(r)?,
        }
      }
      _ => Err(io::Error::other("Tried to deserialize unknown/unused input type"))?,
    })
  }
}

/// Convert the relative ring-member offsets stored on the wire to absolute indexes.
///
/// This is the prefix sum of the offsets. Sums wrap on overflow; whether the indexes exist on
/// the chain is a consensus concern.
pub fn relative_output_offsets_to_absolute(offsets: &[u64]) -> Vec<u64> {
  let mut res = offsets.to_vec();
  for i in 1 .. res.len() {
    res[i] = res[i].wrapping_add(res[i - 1]);
  }
  res
}

/// Convert absolute ring-member indexes to the relative offsets stored on the wire.
///
/// The indexes are sorted before being differenced.
pub fn absolute_output_offsets_to_relative(offsets: &[u64]) -> Vec<u64> {
  let mut res = offsets.to_vec();
  res.sort_unstable();
  for i in (1 .. res.len()).rev() {
    res[i] = res[i].wrapping_sub(res[i - 1]);
  }
  res
}

/// An output to a one-time key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Output {
  /// The pool this output should be sorted into.
  ///
  /// `None` for RingCT outputs, whose amounts are committed, not cleartext.
  pub amount: Option<u64>,
  /// The key which can spend this output.
  pub key: CompressedPoint,
}

impl Output {
  /// The lower bound on the size of an output.
  pub const SIZE_LOWER_BOUND: LowerBound<usize> = LowerBound(<u64 as VarInt>::LOWER_BOUND + 1 + 32);
  /// The upper bound on the size of an output.
  pub const SIZE_UPPER_BOUND: UpperBound<usize> = UpperBound(<u64 as VarInt>::UPPER_BOUND + 1 + 32);

  /// Write the Output.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    VarInt::write(&self.amount.unwrap_or(0), w)?;
    w.write_all(&[2])?;
    w.write_all(&self.key.to_bytes())
  }

  /// Serialize the Output to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = Vec::with_capacity(Self::SIZE_UPPER_BOUND.0);
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read an Output.
  ///
  /// `rct` is whether the output is within the RingCT section of the chain, where cleartext
  /// amounts must be zero.
  pub fn read<R: Read>(rct: bool, r: &mut R) -> io::Result<Output> {
    let amount = VarInt::read(r)?;
    let amount = if rct {
      if amount != 0 {
        Err(io::Error::other("RCT TX output wasn't 0"))?;
      }
      None
    } else {
      Some(amount)
    };

    if read_byte(r)? != 2 {
      Err(io::Error::other("Tried to deserialize unknown/unused output type"))?;
    }

    Ok(Output { amount, key: CompressedPoint::read(r)? })
  }
}

/// An additional timelock for a transaction (the `unlock_time` field).
///
/// All outputs are locked by a default window of blocks. This adds a further constraint, to a
/// block number or to a point in time.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Zeroize)]
pub enum Timelock {
  /// No additional timelock.
  None,
  /// Additionally locked until this block.
  Block(usize),
  /// Additionally locked until this many seconds since the epoch.
  Time(u64),
}

impl Timelock {
  /// Write the Timelock.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    match self {
      Timelock::None => VarInt::write(&0u8, w),
      Timelock::Block(block) => VarInt::write(block, w),
      Timelock::Time(time) => VarInt::write(time, w),
    }
  }

  /// Read a Timelock.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
    const TIMELOCK_BLOCK_THRESHOLD: usize = 500_000_000;

    let raw = <u64 as VarInt>::read(r)?;
    Ok(if raw == 0 {
      Timelock::None
    } else if raw <
      u64::try_from(TIMELOCK_BLOCK_THRESHOLD)
        .expect("TIMELOCK_BLOCK_THRESHOLD didn't fit in a u64")
    {
      Timelock::Block(usize::try_from(raw).expect(
        "timelock overflowed usize despite being less than a const representable with a usize",
      ))
    } else {
      Timelock::Time(raw)
    })
  }
}

/// The transaction prefix.
///
/// This is common to all transaction versions and contains most parts of the transaction needed
/// to handle it. It excludes any signatures or proofs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TransactionPrefix {
  /// The version of this transaction's format.
  ///
  /// Version 1 uses per-input ring signatures. Version 2 introduced RingCT. Version 3 is
  /// identical on the wire, yet domain-separates this chain's transaction identifiers (see
  /// [`TransactionPrefix::hash`]).
  pub version: u16,
  /// The timelock this transaction is additionally constrained by.
  pub unlock_time: Timelock,
  /// The inputs for this transaction.
  pub inputs: Vec<Input>,
  /// The outputs for this transaction.
  pub outputs: Vec<Output>,
  /// The additional data included within the transaction.
  ///
  /// This is an arbitrary data field, yet is used by wallets for containing the data necessary
  /// to scan the transaction.
  pub extra: Vec<u8>,
}

impl TransactionPrefix {
  /// The amount of inputs within a miner transaction.
  pub const MINER_INPUTS: usize = 1;
  /// The amount of inputs allowed within a non-miner transaction.
  // This is defined as the amount of whole (minimally-sized) inputs which would fit in the
  // largest possible transaction.
  pub const NON_MINER_INPUTS_UPPER_BOUND: UpperBound<usize> = UpperBound(
    Transaction::<NotPruned>::NON_MINER_SIZE_UPPER_BOUND.0 / Input::NON_GEN_SIZE_LOWER_BOUND.0,
  );
  /// The upper bound for the amount of inputs allowed within a transaction.
  pub const INPUTS_UPPER_BOUND: UpperBound<usize> = UpperBound(pasta_primitives::const_max!(
    Self::MINER_INPUTS,
    Self::NON_MINER_INPUTS_UPPER_BOUND.0
  ));

  /// The upper bound for the amount of outputs allowed within a non-miner transaction.
  pub const NON_MINER_OUTPUTS_UPPER_BOUND: UpperBound<usize> =
    UpperBound(Transaction::<NotPruned>::NON_MINER_SIZE_UPPER_BOUND.0 / Output::SIZE_LOWER_BOUND.0);

  /// Write the TransactionPrefix, starting with its version.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    VarInt::write(&self.version, w)?;
    self.unlock_time.write(w)?;
    write_vec(Input::write, &self.inputs, w)?;
    write_vec(Output::write, &self.outputs, w)?;
    VarInt::write(&self.extra.len(), w)?;
    w.write_all(&self.extra)
  }

  /// Read a TransactionPrefix.
  ///
  /// This MAY error if miscellaneous consensus rules are broken, as useful when deserializing.
  /// The result is not guaranteed to follow all consensus rules or any specific set of consensus
  /// rules.
  pub fn read<R: Read>(r: &mut R) -> io::Result<TransactionPrefix> {
    let version = VarInt::read(r)?;
    let unlock_time = Timelock::read(r)?;

    let inputs = read_vec(|r| Input::read(r), Some(Self::INPUTS_UPPER_BOUND.0), r)?;
    if inputs.is_empty() {
      Err(io::Error::other("transaction had no inputs"))?;
    }
    let is_miner_tx = matches!(inputs[0], Input::Gen { .. });

    let max_outputs = if is_miner_tx { None } else { Some(Self::NON_MINER_OUTPUTS_UPPER_BOUND.0) };
    let mut prefix = TransactionPrefix {
      version,
      unlock_time,
      inputs,
      outputs: read_vec(|r| Output::read((!is_miner_tx) && (version >= 2), r), max_outputs, r)?,
      extra: vec![],
    };
    // Miner transactions have no limits on their size within the protocol, unfortunately
    let max_extra =
      if is_miner_tx { None } else { Some(Transaction::<NotPruned>::NON_MINER_SIZE_UPPER_BOUND.0) };
    prefix.extra = read_vec(read_byte, max_extra, r)?;
    Ok(prefix)
  }

  /// The hash of this prefix, as committed to by signatures and the transaction's identity.
  ///
  /// For version 3 and later, the preimage is prefixed with [`TX_FORK_ID`], separating this
  /// chain's identifiers from its ancestry's.
  pub fn hash(&self) -> [u8; 32] {
    let mut buf = vec![];
    if self.version >= 3 {
      buf.extend_from_slice(TX_FORK_ID.as_bytes());
    }
    self.write(&mut buf).expect("write failed but <Vec as io::Write> doesn't fail");
    keccak256(buf)
  }
}

#[allow(private_bounds)]
mod sealed {
  use core::fmt::Debug;
  use crate::ringct::*;
  use super::*;

  pub(crate) trait PotentiallyPrunedRingSignatures:
    Clone + PartialEq + Eq + Default + Debug
  {
    fn signatures_to_write(&self) -> &[RingSignature];
    fn read_signatures(inputs: &[Input], r: &mut impl Read) -> io::Result<Self>;
  }

  impl PotentiallyPrunedRingSignatures for Vec<RingSignature> {
    fn signatures_to_write(&self) -> &[RingSignature] {
      self
    }
    fn read_signatures(inputs: &[Input], r: &mut impl Read) -> io::Result<Self> {
      let mut signatures = Vec::with_capacity(inputs.len());
      for input in inputs {
        match input {
          Input::ToKey { key_offsets, .. } => {
            signatures.push(RingSignature::read(key_offsets.len(), r)?)
          }
          _ => Err(io::Error::other("reading signatures for a transaction with non-ToKey inputs"))?,
        }
      }
      Ok(signatures)
    }
  }

  impl PotentiallyPrunedRingSignatures for () {
    fn signatures_to_write(&self) -> &[RingSignature] {
      &[]
    }
    fn read_signatures(_: &[Input], _: &mut impl Read) -> io::Result<Self> {
      Ok(())
    }
  }

  pub(crate) trait PotentiallyPrunedRctProofs: Clone + PartialEq + Eq + Debug {
    fn write(&self, w: &mut impl Write) -> io::Result<()>;
    fn read(
      ring_length: usize,
      inputs: usize,
      outputs: usize,
      r: &mut impl Read,
    ) -> io::Result<Option<Self>>;
    fn rct_type(&self) -> RctType;
    fn base(&self) -> &RctBase;
    fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError>;
  }

  impl PotentiallyPrunedRctProofs for RctProofs {
    fn write(&self, w: &mut impl Write) -> io::Result<()> {
      self.write(w)
    }
    fn read(
      ring_length: usize,
      inputs: usize,
      outputs: usize,
      r: &mut impl Read,
    ) -> io::Result<Option<Self>> {
      RctProofs::read(ring_length, inputs, outputs, r)
    }
    fn rct_type(&self) -> RctType {
      self.rct_type()
    }
    fn base(&self) -> &RctBase {
      &self.base
    }
    fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError> {
      RctProofs::expand(self, vout)
    }
  }

  impl PotentiallyPrunedRctProofs for PrunedRctProofs {
    fn write(&self, w: &mut impl Write) -> io::Result<()> {
      self.write(w)
    }
    fn read(
      _ring_length: usize,
      inputs: usize,
      outputs: usize,
      r: &mut impl Read,
    ) -> io::Result<Option<Self>> {
      Ok(RctBase::read(inputs, outputs, r)?.map(|(rct_type, base)| Self { rct_type, base }))
    }
    fn rct_type(&self) -> RctType {
      self.rct_type
    }
    fn base(&self) -> &RctBase {
      &self.base
    }
    fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError> {
      PrunedRctProofs::expand(self, vout)
    }
  }

  trait Sealed {}

  /// A trait representing either pruned or not pruned proofs.
  pub trait PotentiallyPruned: Sealed {
    /// Potentially-pruned ring signatures.
    type RingSignatures: PotentiallyPrunedRingSignatures;
    /// Potentially-pruned RingCT proofs.
    type RctProofs: PotentiallyPrunedRctProofs;
  }
  /// A marker for an object which isn't pruned.
  #[derive(Clone, PartialEq, Eq, Debug)]
  pub struct NotPruned;
  impl Sealed for NotPruned {}
  impl PotentiallyPruned for NotPruned {
    type RingSignatures = Vec<RingSignature>;
    type RctProofs = RctProofs;
  }
  /// A marker for an object which is pruned.
  #[derive(Clone, PartialEq, Eq, Debug)]
  pub struct Pruned;
  impl Sealed for Pruned {}
  impl PotentiallyPruned for Pruned {
    type RingSignatures = ();
    type RctProofs = PrunedRctProofs;
  }
}
pub use sealed::*;

/// The proof section of a transaction, gated by the prefix's version.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TransactionProofs<P: PotentiallyPruned> {
  /// Per-input ring signatures, as used by version 1 transactions.
  RingSignatures(P::RingSignatures),
  /// RingCT proofs, as used by version 2 and later transactions.
  ///
  /// `None` when the transaction carries the null RingCT type (miner transactions).
  RingCt(Option<P::RctProofs>),
}

/// Errors when parsing a transaction from a blob.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
  /// The blob didn't deserialize.
  #[error("malformed transaction blob: {0}")]
  Parse(#[from] io::Error),
  /// The RingCT data couldn't be expanded to its in-memory form.
  #[error(transparent)]
  Expansion(#[from] RctExpansionError),
}

/// A transaction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction<P: PotentiallyPruned = NotPruned> {
  /// The transaction's prefix.
  pub prefix: TransactionPrefix,
  /// The transaction's signatures or proofs.
  ///
  /// The version within the prefix decides which variant is well-formed; [`Transaction::write`]
  /// errors on a mismatch.
  pub proofs: TransactionProofs<P>,
  hash: Cached<[u8; 32]>,
  blob_size: Cached<usize>,
}

#[allow(private_bounds)]
impl<P: PotentiallyPruned> Transaction<P> {
  /// The maximum size for a non-miner transaction.
  pub const NON_MINER_SIZE_UPPER_BOUND: UpperBound<usize> = UpperBound(1_000_000);

  /// Construct a new Transaction, with invalidated caches.
  pub fn new(prefix: TransactionPrefix, proofs: TransactionProofs<P>) -> Self {
    Transaction { prefix, proofs, hash: Cached::new(), blob_size: Cached::new() }
  }

  /// Get the version of this transaction.
  pub fn version(&self) -> u16 {
    self.prefix.version
  }

  /// Whether this transaction is a miner transaction, generating new coins.
  pub fn is_coinbase(&self) -> bool {
    (self.prefix.inputs.len() == 1) && matches!(self.prefix.inputs[0], Input::Gen(_))
  }

  /// The fee explicitly paid by this transaction, 0 if it doesn't explicitly pay one.
  pub fn fee(&self) -> u64 {
    match &self.proofs {
      TransactionProofs::RingCt(Some(proofs)) => proofs.base().fee,
      _ => 0,
    }
  }

  /// Whether every input spends a prior output, as required of spendable transactions.
  ///
  /// A miner transaction's `Gen` input fails this check. It generates coins, it doesn't spend.
  pub fn inputs_are_to_key(&self) -> bool {
    self.prefix.inputs.iter().all(|input| matches!(input, Input::ToKey { .. }))
  }

  /// Whether every output is to a validly-encoded key.
  pub fn outputs_are_to_valid_keys(&self) -> bool {
    self.prefix.outputs.iter().all(|output| output.key.decompress().is_some())
  }

  /// The sum of the amounts of this transaction's inputs.
  ///
  /// `None` if an input generates coins or the sum overflows.
  pub fn input_amount(&self) -> Option<u64> {
    let mut amount: u64 = 0;
    for input in &self.prefix.inputs {
      match input {
        Input::Gen(_) => None?,
        Input::ToKey { amount: in_amount, .. } => {
          amount = amount.checked_add(in_amount.unwrap_or(0))?;
        }
      }
    }
    Some(amount)
  }

  /// The sum of the amounts of this transaction's outputs, `None` if it overflows.
  pub fn output_amount(&self) -> Option<u64> {
    let mut amount: u64 = 0;
    for output in &self.prefix.outputs {
      amount = amount.checked_add(output.amount.unwrap_or(0))?;
    }
    Some(amount)
  }

  /// Invalidate the memoized identity hash and blob size.
  ///
  /// Mutating the transaction through its public fields doesn't invalidate the caches. Callers
  /// doing so must call this themselves.
  pub fn invalidate_hashes(&mut self) {
    self.hash.invalidate();
    self.blob_size.invalidate();
  }

  /// Write the Transaction.
  ///
  /// Some writable transactions may not be readable if they're malformed, per the protocol's
  /// consensus rules.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.prefix.write(w)?;
    match &self.proofs {
      TransactionProofs::RingSignatures(signatures) => {
        if self.prefix.version != 1 {
          Err(io::Error::other("ring signatures on a non-v1 transaction"))?;
        }
        for ring_sig in signatures.signatures_to_write() {
          ring_sig.write(w)?;
        }
      }
      TransactionProofs::RingCt(proofs) => {
        if self.prefix.version < 2 {
          Err(io::Error::other("RingCT proofs on a pre-v2 transaction"))?;
        }
        match proofs {
          None => w.write_all(&[0])?,
          Some(proofs) => proofs.write(w)?,
        }
      }
    }
    Ok(())
  }

  /// Write the Transaction to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = Vec::with_capacity(2048);
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read a Transaction.
  ///
  /// This MAY error if miscellaneous consensus rules are broken, as useful when deserializing.
  /// The result is not guaranteed to follow all consensus rules or any specific set of consensus
  /// rules.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
    let prefix = TransactionPrefix::read(r)?;

    let proofs = match prefix.version {
      1 => TransactionProofs::RingSignatures(
        if (prefix.inputs.len() == 1) && matches!(prefix.inputs[0], Input::Gen(_)) {
          Default::default()
        } else {
          P::RingSignatures::read_signatures(&prefix.inputs, r)?
        },
      ),
      2 | 3 => TransactionProofs::RingCt(P::RctProofs::read(
        prefix.inputs.first().map_or(0, |input| match input {
          Input::Gen(_) => 0,
          Input::ToKey { key_offsets, .. } => key_offsets.len(),
        }),
        prefix.inputs.len(),
        prefix.outputs.len(),
        r,
      )?),
      _ => Err(io::Error::other("tried to deserialize unknown version"))?,
    };

    Ok(Transaction::new(prefix, proofs))
  }

  /// Parse a transaction from a blob, expanding the RingCT fields pruned off the wire.
  ///
  /// For [`NotPruned`] transactions, expansion rebuilds the one-time keys and the Bulletproof's
  /// commitments. For [`Pruned`] transactions, only the one-time keys. The result's caches are
  /// invalidated.
  pub fn from_blob(blob: &[u8]) -> Result<Self, TransactionError> {
    let mut tx = Self::read(&mut &*blob)?;
    if !tx.is_coinbase() {
      if let TransactionProofs::RingCt(proofs) = &mut tx.proofs {
        match proofs {
          Some(proofs) => proofs.expand(&tx.prefix.outputs)?,
          // A spendable RingCT transaction must commit to its outputs' amounts
          None => {
            if !tx.prefix.outputs.is_empty() {
              Err(RctExpansionError::BadRctShape)?;
            }
          }
        }
      }
    }
    tx.invalidate_hashes();
    Ok(tx)
  }
}

impl Transaction<NotPruned> {
  fn calculate_hash(&self) -> [u8; 32] {
    match &self.proofs {
      // A version 1 transaction's identity is the hash of its entire serialization
      TransactionProofs::RingSignatures(_) => keccak256(self.serialize()),
      /*
        Version 2+ transactions hash the prefix, the RingCT base, and the prunable RingCT data
        apart, then hash the concatenation of those three hashes. This lets pruned nodes
        recompute identities while only retaining the prunable data's hash.
      */
      TransactionProofs::RingCt(proofs) => {
        let mut hashes = Vec::with_capacity(96);

        hashes.extend(self.prefix.hash());

        if let Some(proofs) = proofs {
          let mut buf = Vec::with_capacity(512);
          proofs
            .base
            .write(&mut buf, proofs.rct_type())
            .expect("write failed but <Vec as io::Write> doesn't fail");
          hashes.extend(keccak256(buf));

          hashes.extend(keccak256(proofs.prunable.serialize()));
        } else {
          // Serialization of a null RctBase
          hashes.extend(keccak256([0]));
          // The null hash stands in for the absent prunable data
          hashes.extend([0; 32]);
        }

        keccak256(hashes)
      }
    }
  }

  /// The identity hash of this transaction.
  ///
  /// This is memoized. A read of a valid cache bumps the process-wide cached counter, a compute
  /// bumps the calculated counter (see [`crate::hash_stats`]).
  pub fn hash(&self) -> [u8; 32] {
    if let Some(hash) = self.hash.get() {
      TX_HASHES_CACHED.fetch_add(1, Ordering::Relaxed);
      return *hash;
    }
    TX_HASHES_CALCULATED.fetch_add(1, Ordering::Relaxed);
    *self.hash.get_or_init(|| self.calculate_hash())
  }

  /// The size of this transaction's serialization, memoized.
  pub fn blob_size(&self) -> usize {
    *self.blob_size.get_or_init(|| self.serialize().len())
  }
}

impl From<Transaction<NotPruned>> for Transaction<Pruned> {
  fn from(tx: Transaction<NotPruned>) -> Transaction<Pruned> {
    Transaction::new(
      tx.prefix,
      match tx.proofs {
        TransactionProofs::RingSignatures(_) => TransactionProofs::RingSignatures(()),
        TransactionProofs::RingCt(proofs) => TransactionProofs::RingCt(
          proofs.map(|proofs| PrunedRctProofs { rct_type: proofs.rct_type(), base: proofs.base }),
        ),
      },
    )
  }
}
