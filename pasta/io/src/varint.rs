//! pasta プロトコルの VarInt（可変長整数）コーデック。
//!
//! 値を 7 ビットずつリトルエンディアンで並べ、最上位ビットを継続フラグとして
//! 使う形式。小さい値ほど短くエンコードされる。読み取りは正準表現のみを受理する
//! （冗長な先行ゼロバイトや型に収まらない値は拒否する）。

#[allow(unused_imports)]
use std_shims::prelude::*;
use std_shims::io::{self, Read, Write};

use crate::{read_byte, write_byte};

const VARINT_CONTINUATION_FLAG: u8 = 0b1000_0000;
const VARINT_VALUE_MASK: u8 = !VARINT_CONTINUATION_FLAG;

mod sealed {
  /// A seal to prevent implementing `VarInt` on foreign types.
  pub trait Sealed {
    /// Lossless, guaranteed conversion into a `u64`.
    ///
    /// The encoder is implemented for `u64` alone, and `usize` doesn't implement `From<u64>`.
    // This is placed here so it's not within our public API commitment.
    fn into_u64(self) -> u64;
  }
}

/// エンコード長の上限をビット幅から求める（コンパイル時評価）。
#[allow(clippy::cast_possible_truncation)]
const fn upper_bound(bits: u32) -> usize {
  assert!(bits <= 256, "defining a number exceeding u256 as a VarInt");
  // 7 ビット単位なので ceil(bits / 7)
  ((bits + (7 - 1)) / 7) as usize
}

/// VarInt として読み書きできる数値のトレイト（sealed）。
pub trait VarInt: TryFrom<u64> + Copy + sealed::Sealed {
  /// エンコード時の最小バイト数。
  const LOWER_BOUND: usize;

  /// エンコード時の最大バイト数。
  const UPPER_BOUND: usize;

  /// この値を VarInt としてエンコードした場合のバイト長。
  fn varint_len(self) -> usize {
    let varint_u64 = self.into_u64();
    usize::try_from(u64::BITS - varint_u64.leading_zeros()).expect("64 > usize::MAX?").div_ceil(7)
  }

  /// 正準な VarInt を読み取る。
  fn read<R: Read>(r: &mut R) -> io::Result<Self> {
    let mut bits = 0;
    let mut res = 0;
    while {
      let b = read_byte(r)?;
      // 先頭以外でのゼロバイトは冗長表現なので拒否する
      if (bits != 0) && (b == 0) {
        Err(io::Error::other("non-canonical varint"))?;
      }

      // 実装先の型のビット幅を使ってオーバーフローを検出する
      #[allow(non_snake_case)]
      let U_BITS = core::mem::size_of::<Self>() * 8;
      if ((bits + 7) >= U_BITS) && (b >= (1 << (U_BITS - bits))) {
        Err(io::Error::other("varint overflow"))?;
      }

      res += u64::from(b & VARINT_VALUE_MASK) << bits;
      bits += 7;
      (b & VARINT_CONTINUATION_FLAG) == VARINT_CONTINUATION_FLAG
    } {}
    res.try_into().map_err(|_| io::Error::other("VarInt does not fit into integer type"))
  }

  /// VarInt をエンコードして書き込む。
  ///
  /// `self` ではなく参照を受けるのは、呼び出し側に `VarInt::write` の明示を
  /// 促すため。
  fn write<W: Write>(varint: &Self, w: &mut W) -> io::Result<()> {
    let mut varint: u64 = varint.into_u64();

    // 少なくとも 1 バイトは必ず出力する（擬似 do-while）
    while {
      let mut b = u8::try_from(varint & u64::from(VARINT_VALUE_MASK))
        .expect("& 0b0111_1111 left more than 8 bits set");
      varint >>= 7;

      if varint != 0 {
        b |= VARINT_CONTINUATION_FLAG;
      }

      write_byte(&b, w)?;

      varint != 0
    } {}

    Ok(())
  }
}

macro_rules! varint {
  ($int: ty) => {
    impl sealed::Sealed for $int {
      fn into_u64(self) -> u64 {
        self.into()
      }
    }
    impl VarInt for $int {
      const LOWER_BOUND: usize = 1;
      const UPPER_BOUND: usize = upper_bound(Self::BITS);
    }
  };
}

varint!(u8);
varint!(u16);
varint!(u32);
varint!(u64);

impl sealed::Sealed for usize {
  fn into_u64(self) -> u64 {
    // Ensure the following conversion is infallible
    const _NO_128_BIT_PLATFORMS: [(); (u64::BITS - usize::BITS) as usize] =
      [(); (u64::BITS - usize::BITS) as usize];

    self.try_into().expect("compiling on platform with <64-bit usize yet value didn't fit in u64")
  }
}
impl VarInt for usize {
  const LOWER_BOUND: usize = 1;
  const UPPER_BOUND: usize = upper_bound(Self::BITS);
}
