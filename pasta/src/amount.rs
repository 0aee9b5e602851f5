// 金額の十進表記とアトミック単位（nanopasta）の相互変換。
//
// 表示精度はプロセス全体で共有されるアトミックな設定値で、名前付き単位を持つ
// {0, 3, 6, 9} 桁のみを受け付ける。
use core::sync::atomic::{AtomicU32, Ordering};
#[allow(unused_imports)]
use std_shims::prelude::*;
use std_shims::string::{String, ToString};

use crate::DISPLAY_DECIMAL_POINT;

static DEFAULT_DECIMAL_POINT: AtomicU32 = AtomicU32::new(DISPLAY_DECIMAL_POINT);

/// Errors when parsing a decimal amount.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum AmountParseError {
  /// The string wasn't a decimal number.
  #[error("malformed amount")]
  Malformed,
  /// The fractional part was more precise than the decimal point allows.
  #[error("fractional part exceeds the decimal point")]
  TooPrecise,
  /// The amount doesn't fit in the 64-bit atomic-unit space.
  #[error("amount overflows the atomic-unit space")]
  Overflow,
}

/// An invalid decimal-point specification.
///
/// Only the precisions with named units — 0, 3, 6, and 9 — are valid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
#[error("invalid decimal point specification: {0}")]
pub struct DecimalPointError(
  /// The rejected decimal point.
  pub u32,
);

/// Set the process-wide default decimal point.
pub fn set_default_decimal_point(decimal_point: u32) -> Result<(), DecimalPointError> {
  match decimal_point {
    0 | 3 | 6 | 9 => {
      DEFAULT_DECIMAL_POINT.store(decimal_point, Ordering::Relaxed);
      Ok(())
    }
    _ => Err(DecimalPointError(decimal_point)),
  }
}

/// The process-wide default decimal point.
pub fn default_decimal_point() -> u32 {
  DEFAULT_DECIMAL_POINT.load(Ordering::Relaxed)
}

/// The name of the unit a decimal point denotes, defaulting to the process-wide decimal point
/// when `None`.
pub fn unit(decimal_point: Option<u32>) -> Result<&'static str, DecimalPointError> {
  let decimal_point = decimal_point.unwrap_or_else(default_decimal_point);
  match decimal_point {
    9 => Ok("pasta"),
    6 => Ok("millipasta"),
    3 => Ok("micropasta"),
    0 => Ok("nanopasta"),
    _ => Err(DecimalPointError(decimal_point)),
  }
}

/// Parse a decimal string into an amount of atomic units, at the process-wide decimal point.
///
/// Surrounding whitespace is ignored. Fractional digits beyond the decimal point are only
/// accepted if zero.
pub fn parse_amount(amount: &str) -> Result<u64, AmountParseError> {
  let decimal_point =
    usize::try_from(default_decimal_point()).expect("decimal point didn't fit in a usize");
  let amount = amount.trim();

  let (whole, fraction) = match amount.find('.') {
    Some(point) => {
      let mut fraction = &amount[(point + 1) ..];
      // Trailing zeros don't count against the precision
      while (fraction.len() > decimal_point) && fraction.ends_with('0') {
        fraction = &fraction[.. (fraction.len() - 1)];
      }
      if fraction.len() > decimal_point {
        Err(AmountParseError::TooPrecise)?;
      }
      (&amount[.. point], fraction)
    }
    None => (amount, ""),
  };

  if whole.is_empty() && fraction.is_empty() {
    Err(AmountParseError::Malformed)?;
  }

  let mut res: u64 = 0;
  let digits = whole.bytes().chain(fraction.bytes()).chain(
    // Right-pad to the configured precision
    core::iter::repeat(b'0').take(decimal_point - fraction.len()),
  );
  for digit in digits {
    if !digit.is_ascii_digit() {
      Err(AmountParseError::Malformed)?;
    }
    res = res
      .checked_mul(10)
      .and_then(|res| res.checked_add(u64::from(digit - b'0')))
      .ok_or(AmountParseError::Overflow)?;
  }
  Ok(res)
}

/// Stringify an amount of atomic units as a decimal, defaulting to the process-wide decimal
/// point when `None`.
pub fn print_amount(amount: u64, decimal_point: Option<u32>) -> String {
  let decimal_point = usize::try_from(decimal_point.unwrap_or_else(default_decimal_point))
    .expect("decimal point didn't fit in a usize");
  let mut res = amount.to_string();
  while res.len() < (decimal_point + 1) {
    res.insert(0, '0');
  }
  if decimal_point > 0 {
    res.insert(res.len() - decimal_point, '.');
  }
  res
}

const DECOMPOSED_AMOUNTS_LEN: usize = (9 * 19) + 1;
#[rustfmt::skip]
const DECOMPOSED_AMOUNTS: [u64; DECOMPOSED_AMOUNTS_LEN] = {
  let mut table = [0; DECOMPOSED_AMOUNTS_LEN];
  let mut magnitude: u64 = 1;
  let mut i = 0;
  while i < (9 * 19) {
    table[i] = (((i % 9) as u64) + 1) * magnitude;
    i += 1;
    if (i % 9) == 0 {
      magnitude *= 10;
    }
  }
  // The one denomination of the twentieth magnitude representable in 64 bits
  table[9 * 19] = 10_000_000_000_000_000_000;
  table
};

/// Whether this amount is a single denomination `d * 10^k`, with `d` a non-zero digit.
///
/// Historical outputs were required to be decomposed into denominations so outputs of equal
/// amounts would be plentiful enough to mix with.
pub fn is_valid_decomposed_amount(amount: u64) -> bool {
  DECOMPOSED_AMOUNTS.binary_search(&amount).is_ok()
}
