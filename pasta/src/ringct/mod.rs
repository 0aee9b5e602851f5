// RingCT ペイロードのデータモデルと直列化。
//
// 証明の検証・生成はこのクレートの範囲外で、ここではワイヤ形式と、ワイヤ上で
// 省略されるフィールドの展開（expansion）のみを扱う。
use std_shims::{
  vec,
  vec::Vec,
  io::{self, Read, Write},
};

use crate::{io::*, ed25519::*, transaction::Output};

/// Bulletproof 範囲証明
pub mod bulletproofs;
/// MLSAG リング署名
pub mod mlsag;
/// Borromean 範囲証明
pub mod borromean;

use bulletproofs::Bulletproof;
use mlsag::Mlsag;
use borromean::BorromeanRange;

/// The type of RingCT proofs a transaction carries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RctType {
  /// No RingCT proofs (miner transactions).
  Null,
  /// One aggregate MLSAG over all inputs, with Borromean range proofs.
  Full,
  /// Per-input MLSAGs, with Borromean range proofs.
  Simple,
  /// Per-input MLSAGs, with a single aggregate Bulletproof range proof.
  Bulletproof,
}

impl RctType {
  /// The byte this type is serialized as.
  pub fn to_byte(self) -> u8 {
    match self {
      RctType::Null => 0,
      RctType::Full => 1,
      RctType::Simple => 2,
      RctType::Bulletproof => 3,
    }
  }

  /// The type this byte denotes, if any.
  pub fn from_byte(byte: u8) -> Option<Self> {
    Some(match byte {
      0 => RctType::Null,
      1 => RctType::Full,
      2 => RctType::Simple,
      3 => RctType::Bulletproof,
      _ => None?,
    })
  }

  /// Whether this type uses a Bulletproof range proof.
  pub fn bulletproof(self) -> bool {
    self == RctType::Bulletproof
  }
}

/// An encrypted amount: the masked opening of an output's commitment.
///
/// Decryption is a wallet concern; the format core carries these opaquely.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncryptedAmount {
  /// The masked commitment mask.
  pub mask: [u8; 32],
  /// The masked amount.
  pub amount: [u8; 32],
}

impl EncryptedAmount {
  /// Write the EncryptedAmount.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    w.write_all(&self.mask)?;
    w.write_all(&self.amount)
  }

  /// Read an EncryptedAmount.
  pub fn read<R: Read>(r: &mut R) -> io::Result<EncryptedAmount> {
    Ok(EncryptedAmount { mask: read_bytes(r)?, amount: read_bytes(r)? })
  }
}

/// The RingCT companion data for a single output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RctOutput {
  /// The one-time key which may spend this output.
  ///
  /// This is not part of the wire format. It's rebuilt from the transaction prefix's outputs by
  /// expansion, and is the all-zero sentinel before that.
  pub key: CompressedPoint,
  /// The Pedersen commitment to this output's amount.
  pub commitment: CompressedPoint,
}

/// Errors when expanding the pruned-on-the-wire portions of RingCT data.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum RctExpansionError {
  /// The amount of RingCT outputs didn't match the amount of transaction outputs.
  #[error("amount of RingCT outputs doesn't match the transaction's outputs")]
  BadRctShape,
  /// The Bulletproof had too few rounds, or proves for fewer outputs than the transaction has.
  #[error("bulletproof shape doesn't fit the transaction")]
  BadBulletproofShape,
  /// An output's commitment wasn't a validly-encoded point.
  #[error("output commitment wasn't a valid point")]
  InvalidCommitment,
}

/// The base of a transaction's RingCT data.
///
/// This is the half which must survive pruning, as it's hashed into the transaction's identity.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RctBase {
  /// The fee explicitly paid by this transaction.
  pub fee: u64,
  /// The re-blinded commitments to the amounts spent (`Simple` only).
  pub pseudo_outs: Vec<CompressedPoint>,
  /// The per-output encrypted amounts.
  pub encrypted_amounts: Vec<EncryptedAmount>,
  /// The per-output one-time keys and commitments.
  pub outputs: Vec<RctOutput>,
}

impl RctBase {
  /// Write the RctBase, including the leading type byte.
  pub fn write<W: Write>(&self, w: &mut W, rct_type: RctType) -> io::Result<()> {
    w.write_all(&[rct_type.to_byte()])?;
    if rct_type == RctType::Null {
      return Ok(());
    }
    VarInt::write(&self.fee, w)?;
    if rct_type == RctType::Simple {
      write_raw_vec(CompressedPoint::write, &self.pseudo_outs, w)?;
    }
    write_raw_vec(EncryptedAmount::write, &self.encrypted_amounts, w)?;
    for output in &self.outputs {
      output.commitment.write(w)?;
    }
    Ok(())
  }

  /// Read an RctBase, `None` if the type byte was null.
  ///
  /// `inputs` and `outputs` are the amounts of inputs and outputs of the transaction this is
  /// being read for, which size its fields.
  pub fn read<R: Read>(
    inputs: usize,
    outputs: usize,
    r: &mut R,
  ) -> io::Result<Option<(RctType, RctBase)>> {
    let rct_type = RctType::from_byte(read_byte(r)?)
      .ok_or_else(|| io::Error::other("unrecognized RingCT type"))?;
    Ok(match rct_type {
      RctType::Null => None,
      _ => {
        let fee = VarInt::read(r)?;
        let pseudo_outs = if rct_type == RctType::Simple {
          read_raw_vec(CompressedPoint::read, inputs, r)?
        } else {
          vec![]
        };
        let encrypted_amounts = read_raw_vec(EncryptedAmount::read, outputs, r)?;
        let outputs = read_raw_vec(CompressedPoint::read, outputs, r)?
          .into_iter()
          .map(|commitment| RctOutput { key: CompressedPoint::NULL, commitment })
          .collect();
        Some((rct_type, RctBase { fee, pseudo_outs, encrypted_amounts, outputs }))
      }
    })
  }

  /// Rebuild the one-time keys from the transaction's outputs.
  pub fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError> {
    if self.outputs.len() != vout.len() {
      Err(RctExpansionError::BadRctShape)?;
    }
    for (rct_output, output) in self.outputs.iter_mut().zip(vout) {
      rct_output.key = output.key;
    }
    Ok(())
  }
}

/// The prunable half of a transaction's RingCT data.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RctPrunable {
  /// One aggregate MLSAG over all inputs (`Full`).
  AggregateMlsagBorromean {
    /// The per-output Borromean range proofs.
    borromean: Vec<BorromeanRange>,
    /// The aggregate ring signature over all inputs.
    mlsag: Mlsag,
  },
  /// Per-input MLSAGs (`Simple`).
  MlsagBorromean {
    /// The per-output Borromean range proofs.
    borromean: Vec<BorromeanRange>,
    /// The per-input ring signatures.
    mlsags: Vec<Mlsag>,
  },
  /// Per-input MLSAGs with a single aggregate Bulletproof (`Bulletproof`).
  MlsagBulletproof {
    /// The aggregate range proof over all outputs.
    bulletproof: Bulletproof,
    /// The per-input ring signatures.
    mlsags: Vec<Mlsag>,
    /// The re-blinded commitments to the amounts spent.
    pseudo_outs: Vec<CompressedPoint>,
  },
}

impl RctPrunable {
  /// The RingCT type of these proofs.
  pub fn rct_type(&self) -> RctType {
    match self {
      RctPrunable::AggregateMlsagBorromean { .. } => RctType::Full,
      RctPrunable::MlsagBorromean { .. } => RctType::Simple,
      RctPrunable::MlsagBulletproof { .. } => RctType::Bulletproof,
    }
  }

  /// Write the RctPrunable.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    match self {
      RctPrunable::AggregateMlsagBorromean { borromean, mlsag } => {
        write_raw_vec(BorromeanRange::write, borromean, w)?;
        mlsag.write(w)
      }
      RctPrunable::MlsagBorromean { borromean, mlsags } => {
        write_raw_vec(BorromeanRange::write, borromean, w)?;
        write_raw_vec(Mlsag::write, mlsags, w)
      }
      RctPrunable::MlsagBulletproof { bulletproof, mlsags, pseudo_outs } => {
        w.write_all(&1u32.to_le_bytes())?;
        bulletproof.write(w)?;
        write_raw_vec(Mlsag::write, mlsags, w)?;
        write_raw_vec(CompressedPoint::write, pseudo_outs, w)
      }
    }
  }

  /// Serialize the RctPrunable to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = vec![];
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read an RctPrunable of the specified type.
  ///
  /// `ring_length` is the amount of members in each input's ring.
  pub fn read<R: Read>(
    rct_type: RctType,
    ring_length: usize,
    inputs: usize,
    outputs: usize,
    r: &mut R,
  ) -> io::Result<RctPrunable> {
    Ok(match rct_type {
      RctType::Null => Err(io::Error::other("reading prunable data for a null-type transaction"))?,
      RctType::Full => RctPrunable::AggregateMlsagBorromean {
        borromean: read_raw_vec(BorromeanRange::read, outputs, r)?,
        mlsag: Mlsag::read(ring_length, inputs + 1, r)?,
      },
      RctType::Simple => RctPrunable::MlsagBorromean {
        borromean: read_raw_vec(BorromeanRange::read, outputs, r)?,
        mlsags: read_raw_vec(|r| Mlsag::read(ring_length, 2, r), inputs, r)?,
      },
      RctType::Bulletproof => {
        if read_u32(r)? != 1 {
          Err(io::Error::other("incorrect amount of bulletproofs"))?;
        }
        RctPrunable::MlsagBulletproof {
          bulletproof: Bulletproof::read(r)?,
          mlsags: read_raw_vec(|r| Mlsag::read(ring_length, 2, r), inputs, r)?,
          pseudo_outs: read_raw_vec(CompressedPoint::read, inputs, r)?,
        }
      }
    })
  }
}

/// The full RingCT data of a transaction.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RctProofs {
  /// The base, hashed into the transaction's identity.
  pub base: RctBase,
  /// The prunable half.
  pub prunable: RctPrunable,
}

impl RctProofs {
  /// The RingCT type of these proofs.
  pub fn rct_type(&self) -> RctType {
    self.prunable.rct_type()
  }

  /// Write the RctProofs.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.base.write(w, self.rct_type())?;
    self.prunable.write(w)
  }

  /// Serialize the RctProofs to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = vec![];
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read a set of RctProofs, `None` if the type byte was null.
  pub fn read<R: Read>(
    ring_length: usize,
    inputs: usize,
    outputs: usize,
    r: &mut R,
  ) -> io::Result<Option<RctProofs>> {
    Ok(match RctBase::read(inputs, outputs, r)? {
      None => None,
      Some((rct_type, base)) => Some(RctProofs {
        base,
        prunable: RctPrunable::read(rct_type, ring_length, inputs, outputs, r)?,
      }),
    })
  }

  /// Rebuild the fields omitted from the wire format.
  ///
  /// This sets each RingCT output's one-time key from the transaction's outputs, and for
  /// Bulletproof proofs, reconstructs the commitments the range proof is over.
  pub fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError> {
    self.base.expand(vout)?;
    if let RctPrunable::MlsagBulletproof { bulletproof, .. } = &mut self.prunable {
      bulletproof.expand(&self.base.outputs)?;
    }
    Ok(())
  }
}

/// RingCT data with the prunable half pruned.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PrunedRctProofs {
  /// The RingCT type of the proofs this transaction carried.
  pub rct_type: RctType,
  /// The base, hashed into the transaction's identity.
  pub base: RctBase,
}

impl PrunedRctProofs {
  /// Write the PrunedRctProofs.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.base.write(w, self.rct_type)
  }

  /// Rebuild the one-time keys from the transaction's outputs.
  pub fn expand(&mut self, vout: &[Output]) -> Result<(), RctExpansionError> {
    self.base.expand(vout)
  }
}
