use std_shims::{
  vec::Vec,
  io::{self, Read, Write},
};

use crate::{
  io::*,
  ed25519::{Scalar, CompressedPoint, Point},
  ringct::{RctOutput, RctExpansionError},
};

/// An aggregate Bulletproof range proof.
///
/// Only the shape is handled here. Verification is out of scope for the format core.
#[allow(non_snake_case)]
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bulletproof {
  /// The commitments this proof is over, as `(1/8)` times the outputs' commitments.
  ///
  /// Not part of the wire format; rebuilt by expansion.
  pub V: Vec<CompressedPoint>,
  /// The commitment to the bit decomposition of the amounts.
  pub A: CompressedPoint,
  /// The commitment to the blinding polynomial.
  pub S: CompressedPoint,
  /// The first commitment to the polynomial's coefficients.
  pub T1: CompressedPoint,
  /// The second commitment to the polynomial's coefficients.
  pub T2: CompressedPoint,
  /// The blinded opening of the polynomial evaluation.
  pub taux: Scalar,
  /// The blinded opening of the bit commitments.
  pub mu: Scalar,
  /// The left commitments of the inner-product rounds.
  pub L: Vec<CompressedPoint>,
  /// The right commitments of the inner-product rounds.
  pub R: Vec<CompressedPoint>,
  /// The left scalar of the final inner-product round.
  pub a: Scalar,
  /// The right scalar of the final inner-product round.
  pub b: Scalar,
  /// The polynomial evaluation.
  pub t: Scalar,
}

impl Bulletproof {
  // The inner product rounds for a proof over 16 outputs, the most any proof will honestly be
  // over, is 10. 64 permits ample room for error.
  const MAX_ROUNDS: usize = 64;

  /// Write the Bulletproof.
  ///
  /// `V` is not written. It's recalculable from the commitments within the RingCT base.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    self.A.write(w)?;
    self.S.write(w)?;
    self.T1.write(w)?;
    self.T2.write(w)?;
    self.taux.write(w)?;
    self.mu.write(w)?;
    write_vec(CompressedPoint::write, &self.L, w)?;
    write_vec(CompressedPoint::write, &self.R, w)?;
    self.a.write(w)?;
    self.b.write(w)?;
    self.t.write(w)
  }

  /// Read a Bulletproof, with an empty set of commitments.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Bulletproof> {
    let res = Bulletproof {
      V: Vec::new(),
      A: CompressedPoint::read(r)?,
      S: CompressedPoint::read(r)?,
      T1: CompressedPoint::read(r)?,
      T2: CompressedPoint::read(r)?,
      taux: Scalar::read(r)?,
      mu: Scalar::read(r)?,
      L: read_vec(CompressedPoint::read, Some(Self::MAX_ROUNDS), r)?,
      R: read_vec(CompressedPoint::read, Some(Self::MAX_ROUNDS), r)?,
      a: Scalar::read(r)?,
      b: Scalar::read(r)?,
      t: Scalar::read(r)?,
    };
    if res.L.len() != res.R.len() {
      Err(io::Error::other("mismatched amount of inner-product rounds"))?;
    }
    Ok(res)
  }

  /// Rebuild the commitments this proof is over.
  ///
  /// A proof over `n` rounds covers `2^(n - 6)` 64-bit amounts. This errors if the proof has
  /// fewer than 6 rounds, covers fewer amounts than there are outputs, or an output's commitment
  /// doesn't decode.
  pub fn expand(&mut self, outputs: &[RctOutput]) -> Result<(), RctExpansionError> {
    if self.L.len() < 6 {
      Err(RctExpansionError::BadBulletproofShape)?;
    }
    let max_outputs = 1usize
      .checked_shl(
        u32::try_from(self.L.len() - 6).map_err(|_| RctExpansionError::BadBulletproofShape)?,
      )
      .ok_or(RctExpansionError::BadBulletproofShape)?;
    if max_outputs < outputs.len() {
      Err(RctExpansionError::BadBulletproofShape)?;
    }

    self.V = outputs
      .iter()
      .map(|output| {
        output
          .commitment
          .decompress()
          .map(|point| Point::from(point.into() * Scalar::INV_EIGHT.into()).compress())
          .ok_or(RctExpansionError::InvalidCommitment)
      })
      .collect::<Result<_, _>>()?;
    Ok(())
  }
}
