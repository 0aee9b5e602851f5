#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

// ライブラリの公開 API として下位クレートを再公開するトップレベルモジュール。
pub use pasta_io as io;
pub use pasta_ed25519 as ed25519;
pub use pasta_primitives as primitives;

/// 金額の文字列表現と単位設定
pub mod amount;

/// Merkle 木機能
pub mod merkle;

/// 旧形式（v1）リング署名
pub mod ring_signatures;

/// RingCT 関連機能
pub mod ringct;

/// トランザクション関連機能
pub mod transaction;
/// ブロック関連機能
pub mod block;

/// PoW ハッシュのフォーク別ルーティング
pub mod pow;

mod cache;
pub use cache::{HashStats, hash_stats};

#[cfg(test)]
mod tests;

/// The string mixed into the hashes of version 3+ transaction prefixes.
///
/// This domain-separates this chain's transaction identifiers from those of the codebases it
/// shares a wire format with.
pub const TX_FORK_ID: &str = "pasta-currency";

/// The display precision amounts default to, in decimal digits.
///
/// 1 pasta is `10^DISPLAY_DECIMAL_POINT` atomic units (nanopasta).
pub const DISPLAY_DECIMAL_POINT: u32 = 9;

/// デフォルトの出力ロックウィンドウ（ブロック数）。
///
/// リオーガニゼーション（チェーン分岐)の影響を避けるため、直近 n ブロックの出力は
/// 消費できないとする合意的制約の値です。
pub const DEFAULT_LOCK_WINDOW: usize = 10;

/// コインベース出力の最小ロック期間（ブロック数）。
pub const COINBASE_LOCK_WINDOW: usize = 60;

/// ブロックのターゲット時間（秒）。
pub const BLOCK_TIME: usize = 240;
