#[allow(unused_imports)]
use std_shims::prelude::*;
use std_shims::collections::HashMap;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use pasta_core::ed25519::{CompressedPoint, Scalar};

/// The index of a subaddress derived from a main address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Zeroize)]
pub struct SubaddressIndex {
  /// The account (major) index.
  pub major: u32,
  /// The address-within-account (minor) index.
  pub minor: u32,
}

impl SubaddressIndex {
  /// Create a new SubaddressIndex.
  pub const fn new(major: u32, minor: u32) -> SubaddressIndex {
    SubaddressIndex { major, minor }
  }

  /// Whether this is the index of the main address.
  ///
  /// The main address is the pair `(0, 0)` and has no subaddress offset applied to its keys.
  pub const fn is_zero(&self) -> bool {
    (self.major == 0) && (self.minor == 0)
  }
}

/// The public keys of an account's main address.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Zeroize)]
pub struct AccountAddress {
  /// The public spend key.
  pub spend: CompressedPoint,
  /// The public view key.
  pub view: CompressedPoint,
}

/// The keys of an account.
///
/// Secret material is wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccountKeys {
  /// The account's main address.
  pub address: AccountAddress,
  /// The secret view key.
  pub view_secret: Zeroizing<Scalar>,
  /// The secret spend key.
  ///
  /// `None` for a watch-only account, which can detect its outputs yet not spend them.
  pub spend_secret: Option<Zeroizing<Scalar>>,
  /// The account's multisignature key shares.
  ///
  /// When non-empty, `spend_secret` is only this signer's share of the spend key.
  pub multisig_keys: Vec<Scalar>,
}

impl AccountKeys {
  /// Whether this account is watch-only.
  pub fn watch_only(&self) -> bool {
    self.spend_secret.is_none()
  }

  /// Whether this account's spend secret is a multisignature share.
  pub fn multisig(&self) -> bool {
    !self.multisig_keys.is_empty()
  }
}

/// The map from derived spend keys to the subaddresses they belong to, as consulted when
/// scanning.
///
/// The main address is registered under the index `(0, 0)`.
pub type SubaddressBook = HashMap<CompressedPoint, SubaddressIndex>;
