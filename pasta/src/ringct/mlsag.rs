use std_shims::{
  vec::Vec,
  io::{self, Read, Write},
};

use crate::{io::*, ed25519::Scalar};

/// An MLSAG ring signature.
///
/// Only the shape is handled here. Verification is out of scope for the format core.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Mlsag {
  /// The scalar matrix, one row per ring member.
  pub ss: Vec<Vec<Scalar>>,
  /// The initial challenge.
  pub cc: Scalar,
}

impl Mlsag {
  /// Write the Mlsag.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    for ss in &self.ss {
      write_raw_vec(Scalar::write, ss, w)?;
    }
    self.cc.write(w)
  }

  /// Read an Mlsag with `members` ring members, each row `width` scalars wide.
  pub fn read<R: Read>(members: usize, width: usize, r: &mut R) -> io::Result<Mlsag> {
    Ok(Mlsag {
      ss: read_raw_vec(|r| read_raw_vec(Scalar::read, width, r), members, r)?,
      cc: Scalar::read(r)?,
    })
  }
}
