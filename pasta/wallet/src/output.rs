// 所有出力のワンタイム鍵ペアとキーイメージの復元。
#[allow(unused_imports)]
use std_shims::prelude::*;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use pasta_core::ed25519::{CompressedPoint, Point, Scalar};

use crate::{
  account::{AccountKeys, SubaddressBook, SubaddressIndex},
  device::{Device, KeyDerivation},
  scan::receiving_subaddress,
};

/// Errors when recovering the keys which authorize spending an output.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum KeyImageError {
  /// The output doesn't pay any of the account's addresses.
  #[error("output key doesn't belong to this account")]
  NotOurOutput,
  /// The reconstructed one-time key didn't match the output's key.
  #[error("derived one-time key doesn't match the output key")]
  KeyImageMismatch,
  /// A point failed to decode.
  #[error("point failed to decode")]
  PointDecode,
  /// The device failed an operation.
  #[error("device failed a key operation")]
  DeviceFailed,
}

/// The one-time keypair for an owned output.
///
/// The secret is wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EphemeralKeypair {
  /// The one-time public key, as present on-chain.
  pub public: CompressedPoint,
  /// The one-time secret key.
  ///
  /// Zero for watch-only accounts, which can identify the output yet not spend it.
  pub secret: Zeroizing<Scalar>,
}

impl core::fmt::Debug for EphemeralKeypair {
  /// This implementation does not reveal the secret key.
  fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
    fmt.debug_struct("EphemeralKeypair").field("public", &self.public).finish_non_exhaustive()
  }
}

/// Add two compressed points.
pub fn add_public_keys(
  a: &CompressedPoint,
  b: &CompressedPoint,
) -> Result<CompressedPoint, KeyImageError> {
  let a = a.decompress().ok_or(KeyImageError::PointDecode)?;
  let b = b.decompress().ok_or(KeyImageError::PointDecode)?;
  Ok(Point::from(a.into() + b.into()).compress())
}

/// Recover the one-time keypair and key image for an output paying this account.
///
/// This locates the receiving subaddress itself, then defers to
/// [`recover_output_key_image_precomp`].
pub fn recover_output_key_image(
  account: &AccountKeys,
  subaddresses: &SubaddressBook,
  output_key: &CompressedPoint,
  tx_pub_key: &CompressedPoint,
  additional_tx_pub_keys: &[CompressedPoint],
  output_index: usize,
  device: &impl Device,
) -> Result<(EphemeralKeypair, CompressedPoint), KeyImageError> {
  let derivation = device
    .generate_key_derivation(tx_pub_key, &account.view_secret)
    .ok_or(KeyImageError::DeviceFailed)?;
  let additional_derivations = additional_tx_pub_keys
    .iter()
    .map(|key| {
      device
        .generate_key_derivation(key, &account.view_secret)
        .ok_or(KeyImageError::DeviceFailed)
    })
    .collect::<Result<Vec<_>, _>>()?;

  let receive_info = receiving_subaddress(
    subaddresses,
    output_key,
    &derivation,
    &additional_derivations,
    output_index,
    device,
  )
  .ok_or(KeyImageError::NotOurOutput)?;

  recover_output_key_image_precomp(
    account,
    output_key,
    &receive_info.derivation,
    output_index,
    receive_info.index,
    device,
  )
}

/// Recover the one-time keypair and key image for an output, with the matching derivation and
/// receiving subaddress already known.
pub fn recover_output_key_image_precomp(
  account: &AccountKeys,
  output_key: &CompressedPoint,
  derivation: &KeyDerivation,
  output_index: usize,
  received_index: SubaddressIndex,
  device: &impl Device,
) -> Result<(EphemeralKeypair, CompressedPoint), KeyImageError> {
  let ephemeral = match &account.spend_secret {
    // A watch-only account knows the output key, not its secret
    None => EphemeralKeypair { public: *output_key, secret: Zeroizing::new(Scalar::ZERO) },
    Some(spend_secret) => {
      // Hs(D || varint(i)) + spend_secret
      let scalar_step1 = device.derive_secret_key(derivation, output_index, spend_secret);

      // The main address has no subaddress scalar
      let subaddress_secret = if received_index.is_zero() {
        None
      } else {
        Some(device.get_subaddress_secret_key(&account.view_secret, received_index))
      };
      let secret = match &subaddress_secret {
        None => scalar_step1,
        Some(subaddress_secret) => device.sc_secret_add(&scalar_step1, subaddress_secret),
      };

      let public = if account.multisig_keys.is_empty() {
        // The full spend secret is known, so the one-time key is simply the secret's public key
        device.secret_key_to_public_key(&secret)
      } else {
        /*
          In multisig, the spend secret is only a share. The full spend public key is still
          known, so derive against it, and add the subaddress offset as a point.
        */
        let mut public = device
          .derive_public_key(derivation, output_index, &account.address.spend)
          .ok_or(KeyImageError::DeviceFailed)?;
        if let Some(subaddress_secret) = &subaddress_secret {
          let subaddress_public = device.secret_key_to_public_key(subaddress_secret);
          public = add_public_keys(&public, &subaddress_public)?;
        }
        public
      };

      if public != *output_key {
        Err(KeyImageError::KeyImageMismatch)?;
      }

      EphemeralKeypair { public, secret }
    }
  };

  let key_image = device
    .generate_key_image(&ephemeral.public, &ephemeral.secret)
    .ok_or(KeyImageError::DeviceFailed)?;
  Ok((ephemeral, key_image))
}
