// デバイス抽象。
// アカウント秘密に触れる楕円曲線演算はすべてこの能力インターフェースを経由し、
// ハードウェアウォレットが鍵操作を横取りできるようにする。コアは呼び出しをまたいで
// デバイスへの参照を保持しない。
#[allow(unused_imports)]
use std_shims::prelude::*;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

#[cfg(feature = "compile-time-generators")]
use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
#[cfg(not(feature = "compile-time-generators"))]
use curve25519_dalek::constants::ED25519_BASEPOINT_POINT as ED25519_BASEPOINT_TABLE;

use pasta_core::{
  io::VarInt,
  ed25519::{CompressedPoint, Point, Scalar},
};

use crate::account::SubaddressIndex;

/// A shared-secret derivation between a transaction key and an account's view key (`8·a·R`).
#[derive(Clone, PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct KeyDerivation(pub(crate) CompressedPoint);

impl KeyDerivation {
  /// The scalar binding this derivation to an output index, `Hs(D || varint(i))`.
  pub fn to_scalar(&self, output_index: usize) -> Zeroizing<Scalar> {
    let mut buf = Zeroizing::new(self.0.to_bytes().to_vec());
    VarInt::write(&output_index, &mut *buf)
      .expect("write failed but <Vec as io::Write> doesn't fail");
    Zeroizing::new(Scalar::hash(&*buf))
  }
}

/// The capability interface elliptic-curve operations on account secrets flow through.
///
/// Hardware wallets implement this to keep secrets on-device and intercept signing-adjacent
/// operations. Recoverable failures (an undecodable point, a device refusal) are `None`. The
/// format core never stores a device across calls; devices are owned by the caller and passed by
/// reference.
pub trait Device {
  /// The shared-secret derivation `8 · view_secret · tx_key`.
  fn generate_key_derivation(
    &self,
    tx_key: &CompressedPoint,
    view_secret: &Scalar,
  ) -> Option<KeyDerivation>;

  /// The one-time secret key for an output, `Hs(D || varint(i)) + base`.
  fn derive_secret_key(
    &self,
    derivation: &KeyDerivation,
    output_index: usize,
    base: &Scalar,
  ) -> Zeroizing<Scalar>;

  /// The one-time public key for an output, `Hs(D || varint(i))·G + base`.
  fn derive_public_key(
    &self,
    derivation: &KeyDerivation,
    output_index: usize,
    base: &CompressedPoint,
  ) -> Option<CompressedPoint>;

  /// The candidate spend key an output key was derived from, `P - Hs(D || varint(i))·G`.
  fn derive_subaddress_public_key(
    &self,
    output_key: &CompressedPoint,
    derivation: &KeyDerivation,
    output_index: usize,
  ) -> Option<CompressedPoint>;

  /// The subaddress scalar `Hs("SubAddr" || view_secret || major || minor)`.
  fn get_subaddress_secret_key(
    &self,
    view_secret: &Scalar,
    index: SubaddressIndex,
  ) -> Zeroizing<Scalar>;

  /// The public key for a secret key, `x·G`.
  fn secret_key_to_public_key(&self, secret: &Scalar) -> CompressedPoint;

  /// The sum of two secret scalars.
  fn sc_secret_add(&self, a: &Scalar, b: &Scalar) -> Zeroizing<Scalar>;

  /// The key image `x·Hp(P)`.
  fn generate_key_image(
    &self,
    public: &CompressedPoint,
    secret: &Scalar,
  ) -> Option<CompressedPoint>;
}

/// The software device, computing every operation in-process with `curve25519-dalek`.
#[derive(Clone, Copy, Default, Debug)]
pub struct SoftwareDevice;

impl Device for SoftwareDevice {
  fn generate_key_derivation(
    &self,
    tx_key: &CompressedPoint,
    view_secret: &Scalar,
  ) -> Option<KeyDerivation> {
    let tx_key = tx_key.decompress()?;
    // Multiplying by the cofactor clears any small-order component
    let ecdh = Zeroizing::new((*view_secret).into() * tx_key.into());
    Some(KeyDerivation(Point::from(ecdh.mul_by_cofactor()).compress()))
  }

  fn derive_secret_key(
    &self,
    derivation: &KeyDerivation,
    output_index: usize,
    base: &Scalar,
  ) -> Zeroizing<Scalar> {
    let offset = derivation.to_scalar(output_index);
    Zeroizing::new(Scalar::from((*offset).into() + (*base).into()))
  }

  fn derive_public_key(
    &self,
    derivation: &KeyDerivation,
    output_index: usize,
    base: &CompressedPoint,
  ) -> Option<CompressedPoint> {
    let base = base.decompress()?;
    let offset = derivation.to_scalar(output_index);
    Some(Point::from(base.into() + (&(*offset).into() * ED25519_BASEPOINT_TABLE)).compress())
  }

  fn derive_subaddress_public_key(
    &self,
    output_key: &CompressedPoint,
    derivation: &KeyDerivation,
    output_index: usize,
  ) -> Option<CompressedPoint> {
    let output_key = output_key.decompress()?;
    let offset = derivation.to_scalar(output_index);
    /*
      The output key may have torsion, which subtracting a prime-order element preserves. Only
      the representation with the spend key's torsion will be recognized by the subaddress book.
    */
    Some(Point::from(output_key.into() - (&(*offset).into() * ED25519_BASEPOINT_TABLE)).compress())
  }

  fn get_subaddress_secret_key(
    &self,
    view_secret: &Scalar,
    index: SubaddressIndex,
  ) -> Zeroizing<Scalar> {
    let mut buf = Zeroizing::new(b"SubAddr\0".to_vec());
    buf.extend_from_slice(&<[u8; 32]>::from(*view_secret));
    buf.extend_from_slice(&index.major.to_le_bytes());
    buf.extend_from_slice(&index.minor.to_le_bytes());
    Zeroizing::new(Scalar::hash(&*buf))
  }

  fn secret_key_to_public_key(&self, secret: &Scalar) -> CompressedPoint {
    Point::from(&(*secret).into() * ED25519_BASEPOINT_TABLE).compress()
  }

  fn sc_secret_add(&self, a: &Scalar, b: &Scalar) -> Zeroizing<Scalar> {
    Zeroizing::new(Scalar::from((*a).into() + (*b).into()))
  }

  fn generate_key_image(
    &self,
    public: &CompressedPoint,
    secret: &Scalar,
  ) -> Option<CompressedPoint> {
    // Hp hashes the compressed encoding; the key needn't decode
    Some(Point::from((*secret).into() * Point::biased_hash(public.to_bytes()).into()).compress())
  }
}
