#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

#[allow(unused_imports)]
use std_shims::prelude::*;

use sha3::{Digest, Keccak256};

/// The Keccak-256 hash function, as used throughout the pasta protocol.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
  Keccak256::digest(data.as_ref()).into()
}

/// An upper bound on the quantity/size of something.
///
/// This is a compile-time tool to document and calculate the bounds enforced
/// when deserializing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UpperBound<T>(pub T);

/// A lower bound on the quantity/size of something.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LowerBound<T>(pub T);

/// The maximum of two values, usable in const contexts.
#[macro_export]
macro_rules! const_max {
  ($a: expr, $b: expr) => {{
    if $a > $b {
      $a
    } else {
      $b
    }
  }};
}
