#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

// `wallet` クレートのエントリポイント。主に次を提供する:
// - アカウント鍵とサブアドレス (`account`)
// - デバイス能力インターフェースとソフトウェア実装 (`device`)
// - `extra` フィールドの読み書き・解析 (`extra`)
// - 出力の走査と鍵像（キーイメージ）の復元 (`scan`, `output`)

pub use pasta_core::*;

mod account;
pub use account::{AccountAddress, AccountKeys, SubaddressBook, SubaddressIndex};

mod device;
pub use device::{Device, KeyDerivation, SoftwareDevice};

/// Structures and functionality for working with transactions' extra fields.
pub mod extra;

mod output;
pub use output::{
  EphemeralKeypair, KeyImageError, add_public_keys, recover_output_key_image,
  recover_output_key_image_precomp,
};

mod scan;
pub use scan::{
  OwnedOutputs, ReceiveInfo, ScanError, is_output_to_account, lookup_account_outputs,
  lookup_account_outputs_precomputed, lookup_account_outputs_with_keys, receiving_subaddress,
};

#[cfg(test)]
mod tests;
