#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

use core::{
  cmp::{Ordering, PartialOrd},
  hash::{Hash, Hasher},
};
#[allow(unused_imports)]
use std_shims::prelude::*;
use std_shims::io::{self, Read, Write};

use subtle::{Choice, ConstantTimeEq, ConditionallySelectable};
use zeroize::Zeroize;

use sha3::{Digest, Keccak256};

use pasta_io::read_bytes;

/// 縮約済み（reduced）のスカラー。
///
/// `l` を法として正準な 32 バイト表現のみを保持する。ワイヤから読み取る際に
/// 正準性を検査するため、保持している値は常にスカラーへ変換可能。
#[derive(Clone, Copy, Eq, Debug, Zeroize)]
pub struct Scalar([u8; 32]);

impl ConstantTimeEq for Scalar {
  fn ct_eq(&self, other: &Self) -> Choice {
    self.0.ct_eq(&other.0)
  }
}
impl PartialEq for Scalar {
  /// This defers to `ConstantTimeEq::ct_eq`.
  fn eq(&self, other: &Self) -> bool {
    bool::from(self.ct_eq(other))
  }
}

impl Scalar {
  /// The additive identity.
  pub const ZERO: Self = Self([0; 32]);
  /// The multiplicative identity.
  #[rustfmt::skip]
  pub const ONE: Self = Self([
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
  ]);
  /// The inverse of `8 mod l`.
  ///
  /// Multiplying by this scalar removes the factor of eight a point was multiplied by to clear
  /// its small-order component.
  #[rustfmt::skip]
  pub const INV_EIGHT: Self = Self([
    121,  47, 220, 226,  41, 229,   6,  97, 208, 218,  28, 125, 179, 157, 211,   7,
      0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   0,   6,
  ]);

  /// Write the `Scalar`.
  ///
  /// This may run in time variable to its value.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    w.write_all(&self.0)
  }

  /// Read a canonically-encoded `Scalar`.
  ///
  /// This errors on a non-canonical encoding and runs in variable time.
  pub fn read<R: Read>(r: &mut R) -> io::Result<Scalar> {
    let bytes = read_bytes(r)?;
    Option::<curve25519_dalek::Scalar>::from(curve25519_dalek::Scalar::from_canonical_bytes(bytes))
      .ok_or_else(|| io::Error::other("unreduced scalar"))?;
    Ok(Self(bytes))
  }

  /// Create a `Scalar` from a `curve25519_dalek::Scalar`.
  ///
  /// This is hidden as it is not part of our API commitment. No guarantees are made for it.
  #[doc(hidden)]
  pub fn from(scalar: curve25519_dalek::Scalar) -> Self {
    Self(scalar.to_bytes())
  }

  /// Create a `curve25519_dalek::Scalar` from a `Scalar`.
  ///
  /// This is hidden as it is not part of our API commitment. No guarantees are made for it.
  #[doc(hidden)]
  pub fn into(self) -> curve25519_dalek::Scalar {
    curve25519_dalek::Scalar::from_canonical_bytes(self.0)
      .expect("`Scalar` instantiated with invalid contents")
  }

  /// Derive a scalar via a hash function (`keccak256(data) mod l`).
  ///
  /// This isn't a wide reduction. In the negligibly-probable case the digest is a multiple of
  /// `l`, this panics, as the protocol defines such derivations as errors.
  pub fn hash(data: impl AsRef<[u8]>) -> Self {
    let scalar =
      curve25519_dalek::Scalar::from_bytes_mod_order(Keccak256::digest(data.as_ref()).into());
    assert!(
      scalar != curve25519_dalek::Scalar::ZERO,
      "keccak256(preimage) \\cong 0 \\mod l! Preimage: {:?}",
      data.as_ref()
    );
    Self::from(scalar)
  }
}

impl From<Scalar> for [u8; 32] {
  fn from(scalar: Scalar) -> [u8; 32] {
    scalar.0
  }
}

/// 圧縮表現の Ed25519 点。
///
/// [`curve25519_dalek::edwards::CompressedEdwardsY`] と異なり、
/// [`CompressedPoint::decompress`] は正準なエンコードであることまで検査する。
///
/// The implementations of [`PartialOrd`], [`Ord`], and [`Hash`] are not guaranteed to execute in
/// constant time.
#[derive(Clone, Copy, Eq, Debug, Zeroize)]
pub struct CompressedPoint([u8; 32]);

impl ConstantTimeEq for CompressedPoint {
  fn ct_eq(&self, other: &Self) -> Choice {
    self.0.ct_eq(&other.0)
  }
}
impl PartialEq for CompressedPoint {
  /// This defers to `ConstantTimeEq::ct_eq`.
  fn eq(&self, other: &Self) -> bool {
    bool::from(self.ct_eq(other))
  }
}

impl PartialOrd for CompressedPoint {
  /// This executes in variable time.
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for CompressedPoint {
  /// This executes in variable time.
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.cmp(&other.0)
  }
}

impl Hash for CompressedPoint {
  /// This executes in variable time.
  fn hash<H: Hasher>(&self, hasher: &mut H) {
    self.0.hash::<H>(hasher)
  }
}

impl CompressedPoint {
  /// The all-zero sentinel, used where the protocol denotes the absence of a point.
  ///
  /// This is not a valid point encoding.
  pub const NULL: Self = Self([0; 32]);
  /// The encoding of the identity point.
  #[rustfmt::skip]
  pub const IDENTITY: Self = Self([
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
  ]);
  /// The `G` generator.
  pub const G: Self = Self(curve25519_dalek::constants::ED25519_BASEPOINT_COMPRESSED.to_bytes());

  /// Read a `CompressedPoint`.
  ///
  /// This doesn't check the point is decompressable.
  pub fn read<R: Read>(r: &mut R) -> io::Result<CompressedPoint> {
    Ok(CompressedPoint(read_bytes(r)?))
  }

  /// Write the `CompressedPoint`.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    w.write_all(&self.0)
  }

  /// The raw bytes of this `CompressedPoint`.
  ///
  /// These are not guaranteed to represent a valid point.
  pub fn to_bytes(&self) -> [u8; 32] {
    self.0
  }

  /// Decompress a canonically-encoded Ed25519 point.
  ///
  /// Ed25519 is of order `8 * l`. This rejects unreduced field elements and the negative-zero
  /// encodings so every point has a single representation. It does not check the point is within
  /// the prime-order subgroup.
  pub fn decompress(&self) -> Option<Point> {
    curve25519_dalek::edwards::CompressedEdwardsY(self.0)
      .decompress()
      // Ban points which are either unreduced or -0
      .filter(|point| point.compress().to_bytes() == self.0)
      .map(Point::from)
  }
}

impl From<[u8; 32]> for CompressedPoint {
  fn from(value: [u8; 32]) -> Self {
    Self(value)
  }
}

/// 展開済みの Ed25519 点。
#[derive(Clone, Copy, Eq, Debug, Zeroize)]
pub struct Point(curve25519_dalek::EdwardsPoint);

impl ConstantTimeEq for Point {
  fn ct_eq(&self, other: &Self) -> Choice {
    self.0.ct_eq(&other.0)
  }
}
impl PartialEq for Point {
  /// This defers to `ConstantTimeEq::ct_eq`.
  fn eq(&self, other: &Self) -> bool {
    bool::from(self.ct_eq(other))
  }
}

impl Point {
  /// Sample a biased point via a hash function (the protocol's `hash_to_ec`).
  ///
  /// This implements Elligator 2 as detailed in "Elligator: Elliptic-curve points
  /// indistinguishable from uniform random strings" (<https://eprint.iacr.org/2013/325>),
  /// Section 5.5 (the application to Curve25519), with the result mapped to Ed25519 and then
  /// multiplied by the cofactor. As Elligator 2 is only applied once, the output is limited to a
  /// biased subset of points, yet the yielded points have uniform relations to each other. This
  /// runs in constant time.
  pub fn biased_hash(bytes: [u8; 32]) -> Self {
    use crypto_bigint::{Encoding, modular::constant_mod::*, U256, impl_modulus, const_residue};

    const MODULUS_STR: &str = "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed";
    impl_modulus!(Two25519, U256, MODULUS_STR);

    type Two25519Residue = Residue<Two25519, { U256::LIMBS }>;

    /*
      Curve25519 is a Montgomery curve with equation `v^2 = u^3 + 486662 u^2 + u`.

      A Curve25519 point `(u, v)` may be mapped to an Ed25519 point `(x, y)` with the map
      `(sqrt(-(A + 2)) u / v, (u - 1) / (u + 1))`.
    */
    const A_U256: U256 = U256::from_u64(486662);
    const A: Two25519Residue = const_residue!(A_U256, Two25519);
    const NEGATIVE_A: Two25519Residue = A.neg();

    /*
      Sample a field element. This isn't a wide reduction, implying a bias, yet the bias is
      negligible due to the shape of the prime: only digests at or above

        0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffda

      land in the doubly-selected region.
    */
    let r = Two25519Residue::new(&U256::from_le_bytes(Keccak256::digest(bytes).into()));

    // Per Section 5.5, take `u = 2`, the smallest quadratic non-residue in the field
    let r_square = r.square();
    let ur_square = r_square + r_square;

    // `1 + u r^2` is non-zero as `(p - 1) / 2` is a non-residue
    let one_plus_ur_square = Two25519Residue::ONE + ur_square;
    let (one_plus_ur_square_inv, _value_was_zero) = one_plus_ur_square.invert();
    let upsilon = NEGATIVE_A * one_plus_ur_square_inv;
    /*
      Section 5.5: "then \epsilon = 1 and x = \upsilon. Otherwise \epsilon = -1,
      x = \upsilon u r^2". Per Section 5.2's "Second case", `-\upsilon - A = \upsilon u r^2`,
      and the negate-and-subtract outperforms the multiplication.
    */
    let other_candidate = -upsilon - A;

    // RFC-8032 provides `sqrt8k5`
    fn is_quadratic_residue_8_mod_5(value: &Two25519Residue) -> Choice {
      // (p + 3) // 8
      const SQRT_EXP: U256 = Two25519::MODULUS.shr_vartime(3).wrapping_add(&U256::ONE);
      // 2^{(p - 1) // 4}
      const Z: Two25519Residue =
        Two25519Residue::ONE.add(&Two25519Residue::ONE).pow(&Two25519::MODULUS.shr_vartime(2));
      let y = value.pow(&SQRT_EXP);
      let other_candidate = y * Z;
      // If `value` is a quadratic residue, one of these will be its square root
      y.square().ct_eq(value) | other_candidate.square().ct_eq(value)
    }

    /*
      `\upsilon` is a valid `u` coordinate if there's a solution for the square root of
      `\upsilon^3 + A \upsilon^2 + \upsilon`.
    */
    let epsilon = is_quadratic_residue_8_mod_5(&(((upsilon + A) * upsilon.square()) + upsilon));
    let u = Two25519Residue::conditional_select(&other_candidate, &upsilon, epsilon);

    /*
      Map from Curve25519 to Ed25519. Elligator 2 specifies choosing the negative square root as
      the `v` coordinate when `\upsilon` was chosen; choosing the odd `y` coordinate is
      functionally equivalent.
    */
    let res = curve25519_dalek::MontgomeryPoint(u.retrieve().to_le_bytes())
      .to_edwards(epsilon.unwrap_u8())
      .expect("neither Elligator 2 candidate was a square");

    // Ensure this point lies within the prime-order subgroup
    Self::from(res.mul_by_cofactor())
  }

  /// Compress this point to a `CompressedPoint`.
  pub fn compress(self) -> CompressedPoint {
    CompressedPoint::from(self.0.compress().to_bytes())
  }

  /// Create a `Point` from a `curve25519_dalek::EdwardsPoint`.
  ///
  /// This is hidden as it is not part of our API commitment. No guarantees are made for it.
  #[doc(hidden)]
  pub fn from(point: curve25519_dalek::EdwardsPoint) -> Self {
    Self(point)
  }

  /// Create a `curve25519_dalek::EdwardsPoint` from a `Point`.
  ///
  /// This is hidden as it is not part of our API commitment. No guarantees are made for it.
  #[doc(hidden)]
  pub fn into(self) -> curve25519_dalek::EdwardsPoint {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use hex_literal::hex;

  use super::*;

  #[test]
  fn decompress_rejects_non_canonical() {
    // On-curve points
    assert!(CompressedPoint::G.decompress().is_some());
    assert!(CompressedPoint::IDENTITY.decompress().is_some());
    // The all-zero sentinel is off-curve
    assert!(CompressedPoint::NULL.decompress().is_none());
    // An unreduced `y` coordinate (p + 1, with the sign bit clear)
    let unreduced = hex!("eeffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff7f");
    assert!(CompressedPoint::from(unreduced).decompress().is_none());
  }

  #[test]
  fn scalar_read_rejects_unreduced() {
    // l itself is not a canonical scalar
    let l = hex!("edd3f55c1a631258d69cf7a2def9de1400000000000000000000000000000010");
    assert!(Scalar::read(&mut l.as_slice()).is_err());
    let mut one = [0; 32];
    one[0] = 1;
    assert_eq!(Scalar::read(&mut one.as_slice()).unwrap(), Scalar::ONE);
  }

  #[test]
  fn inv_eight() {
    let eight = curve25519_dalek::Scalar::from(8u8);
    assert_eq!(Scalar::INV_EIGHT.into() * eight, curve25519_dalek::Scalar::ONE);
  }

  #[test]
  fn biased_hash() {
    let a = Point::biased_hash(CompressedPoint::G.to_bytes());
    let b = Point::biased_hash(CompressedPoint::IDENTITY.to_bytes());
    // Deterministic, input-sensitive
    assert_eq!(a, Point::biased_hash(CompressedPoint::G.to_bytes()));
    assert!(a != b);
    // Within the prime-order subgroup, and not trivially the identity
    for point in [a, b] {
      assert!(point.into().is_torsion_free());
      assert!(point != Point::from(curve25519_dalek::EdwardsPoint::default()));
    }
  }
}
