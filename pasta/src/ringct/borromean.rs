use std_shims::io::{self, Read, Write};

use crate::io::*;

/// The signatures of a Borromean ring signature over 64 bit commitments.
///
/// Historical signature scalars are carried as opaque bytes. Verification is out of scope for
/// the format core.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BorromeanSignatures {
  /// The `s0` scalars.
  pub s0: [[u8; 32]; 64],
  /// The `s1` scalars.
  pub s1: [[u8; 32]; 64],
  /// The challenge.
  pub ee: [u8; 32],
}

impl BorromeanSignatures {
  /// Write the BorromeanSignatures.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    for s0 in &self.s0 {
      w.write_all(s0)?;
    }
    for s1 in &self.s1 {
      w.write_all(s1)?;
    }
    w.write_all(&self.ee)
  }

  /// Read a set of BorromeanSignatures.
  pub fn read<R: Read>(r: &mut R) -> io::Result<BorromeanSignatures> {
    Ok(BorromeanSignatures {
      s0: read_array(read_bytes, r)?,
      s1: read_array(read_bytes, r)?,
      ee: read_bytes(r)?,
    })
  }
}

/// A Borromean range proof for a single output, proving its amount is within `[0, 2^64)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BorromeanRange {
  /// The signatures over the bit commitments.
  pub sigs: BorromeanSignatures,
  /// The commitments to the bits of the amount.
  pub bit_commitments: [[u8; 32]; 64],
}

impl BorromeanRange {
  /// Write the BorromeanRange.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.sigs.write(w)?;
    for commitment in &self.bit_commitments {
      w.write_all(commitment)?;
    }
    Ok(())
  }

  /// Read a BorromeanRange.
  pub fn read<R: Read>(r: &mut R) -> io::Result<BorromeanRange> {
    Ok(BorromeanRange {
      sigs: BorromeanSignatures::read(r)?,
      bit_commitments: read_array(read_bytes, r)?,
    })
  }
}
