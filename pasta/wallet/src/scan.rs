// トランザクションを走査して「自分宛て」の出力を検出するモジュール。
// 出力鍵からサブアドレス候補の支払い先鍵を導出し、登録済みサブアドレス集合と照合する。
#[allow(unused_imports)]
use std_shims::prelude::*;

use pasta_core::{ed25519::CompressedPoint, transaction::TransactionPrefix};

use crate::{
  account::{AccountKeys, SubaddressBook, SubaddressIndex},
  device::{Device, KeyDerivation},
  extra,
};

/// Errors when looking up an account's outputs within a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ScanError {
  /// The transaction's extra didn't contain a transaction public key.
  #[error("transaction public key absent from the extra field")]
  MissingTxPublicKey,
  /// There were additional public keys, yet not one per output.
  #[error("amount of additional public keys doesn't match the amount of outputs")]
  MalformedAdditionalPubkeys,
  /// The device failed to compute a key derivation.
  #[error("device failed to compute a key derivation")]
  DerivationFailed,
}

/// Which subaddress received an output, and the derivation which matched it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReceiveInfo {
  /// The index of the receiving subaddress.
  pub index: SubaddressIndex,
  /// The derivation under which the output key resolved to a registered spend key.
  pub derivation: KeyDerivation,
}

/// Determine which subaddress, if any, an output key pays.
///
/// This derives the candidate spend key for the output under the transaction's shared
/// derivation and looks it up in the subaddress book, falling back to this output's additional
/// derivation.
pub fn receiving_subaddress(
  subaddresses: &SubaddressBook,
  output_key: &CompressedPoint,
  derivation: &KeyDerivation,
  additional_derivations: &[KeyDerivation],
  output_index: usize,
  device: &impl Device,
) -> Option<ReceiveInfo> {
  // Try the shared transaction key's derivation
  if let Some(candidate) = device.derive_subaddress_public_key(output_key, derivation, output_index)
  {
    if let Some(index) = subaddresses.get(&candidate) {
      return Some(ReceiveInfo { index: *index, derivation: derivation.clone() });
    }
  }

  // Try the additional key for this output, if available
  if !additional_derivations.is_empty() {
    let additional = additional_derivations.get(output_index)?;
    let candidate = device.derive_subaddress_public_key(output_key, additional, output_index)?;
    if let Some(index) = subaddresses.get(&candidate) {
      return Some(ReceiveInfo { index: *index, derivation: additional.clone() });
    }
  }

  None
}

/// The legacy ownership check for an output paying the account's main address.
///
/// This reconstructs the one-time key from the account's spend key and compares, so it cannot
/// recognize subaddresses. [`receiving_subaddress`] supersedes it.
pub fn is_output_to_account(
  account: &AccountKeys,
  output_key: &CompressedPoint,
  tx_pub_key: &CompressedPoint,
  additional_tx_pub_keys: &[CompressedPoint],
  output_index: usize,
  device: &impl Device,
) -> bool {
  let Some(derivation) = device.generate_key_derivation(tx_pub_key, &account.view_secret) else {
    return false;
  };
  if device.derive_public_key(&derivation, output_index, &account.address.spend).as_ref() ==
    Some(output_key)
  {
    return true;
  }

  if !additional_tx_pub_keys.is_empty() {
    let Some(additional) = additional_tx_pub_keys.get(output_index) else { return false };
    let Some(derivation) = device.generate_key_derivation(additional, &account.view_secret)
    else {
      return false;
    };
    return device.derive_public_key(&derivation, output_index, &account.address.spend).as_ref() ==
      Some(output_key);
  }

  false
}

/// The outputs of a transaction found to pay an account.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OwnedOutputs {
  /// The indexes of the owned outputs, ascending.
  pub outputs: Vec<usize>,
  /// The sum of the owned outputs' cleartext amounts.
  pub amount: u64,
}

/// Find the outputs of a transaction which pay this account.
///
/// The transaction's keys are read from its extra, which is parsed leniently.
pub fn lookup_account_outputs(
  account: &AccountKeys,
  subaddresses: &SubaddressBook,
  prefix: &TransactionPrefix,
  device: &impl Device,
) -> Result<OwnedOutputs, ScanError> {
  let tx_pub_key = extra::tx_pub_key(&prefix.extra, 0).ok_or(ScanError::MissingTxPublicKey)?;
  let additional = extra::additional_tx_pub_keys(&prefix.extra);
  lookup_account_outputs_with_keys(account, subaddresses, prefix, &tx_pub_key, &additional, device)
}

/// As [`lookup_account_outputs`], with the transaction's keys already located.
pub fn lookup_account_outputs_with_keys(
  account: &AccountKeys,
  subaddresses: &SubaddressBook,
  prefix: &TransactionPrefix,
  tx_pub_key: &CompressedPoint,
  additional_tx_pub_keys: &[CompressedPoint],
  device: &impl Device,
) -> Result<OwnedOutputs, ScanError> {
  let derivation = device
    .generate_key_derivation(tx_pub_key, &account.view_secret)
    .ok_or(ScanError::DerivationFailed)?;
  let additional_derivations = additional_tx_pub_keys
    .iter()
    .map(|key| {
      device
        .generate_key_derivation(key, &account.view_secret)
        .ok_or(ScanError::DerivationFailed)
    })
    .collect::<Result<Vec<_>, _>>()?;
  lookup_account_outputs_precomputed(
    subaddresses,
    prefix,
    &derivation,
    &additional_derivations,
    device,
  )
}

/// As [`lookup_account_outputs`], with the shared-secret derivations precomputed.
///
/// Batch scanners hoist `generate_key_derivation` out of their per-output loops with this.
pub fn lookup_account_outputs_precomputed(
  subaddresses: &SubaddressBook,
  prefix: &TransactionPrefix,
  derivation: &KeyDerivation,
  additional_derivations: &[KeyDerivation],
  device: &impl Device,
) -> Result<OwnedOutputs, ScanError> {
  if !(additional_derivations.is_empty() ||
    (additional_derivations.len() == prefix.outputs.len()))
  {
    Err(ScanError::MalformedAdditionalPubkeys)?;
  }

  let mut res = OwnedOutputs { outputs: vec![], amount: 0 };
  for (o, output) in prefix.outputs.iter().enumerate() {
    let received =
      receiving_subaddress(subaddresses, &output.key, derivation, additional_derivations, o, device);
    if received.is_some() {
      res.outputs.push(o);
      res.amount = res.amount.wrapping_add(output.amount.unwrap_or(0));
    }
  }
  Ok(res)
}
