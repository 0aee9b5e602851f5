// トランザクションの `extra` フィールドの読み書き・解析。
// `extra` はタグ付きレコードの列で、ウォレットが走査に必要とする鍵や nonce を運ぶ。
use std_shims::{
  vec,
  vec::Vec,
  io::{self, Read, BufRead, Write},
};

use zeroize::Zeroize;

use pasta_core::{io::*, ed25519::CompressedPoint};

/// The tag byte of a padding field.
pub const TAG_PADDING: u8 = 0x00;
/// The tag byte of a transaction public key.
pub const TAG_PUBKEY: u8 = 0x01;
/// The tag byte of a nonce field.
pub const TAG_NONCE: u8 = 0x02;
/// The tag byte of a merge-mining field.
pub const TAG_MERGE_MINING: u8 = 0x03;
/// The tag byte of the additional per-output transaction public keys.
pub const TAG_ADDITIONAL_PUBKEYS: u8 = 0x04;
/// The tag byte of a uniform payment ID.
pub const TAG_UNIFORM_PAYMENT_ID: u8 = 0x05;

pub(crate) const MAX_PADDING_COUNT: usize = 255;
const MAX_NONCE_SIZE: usize = 255;

const PAYMENT_ID_MARKER: u8 = 0;
const ENCRYPTED_PAYMENT_ID_MARKER: u8 = 1;

/// The tail byte of the hash callers encrypting an 8-byte payment ID derive their pad from.
///
/// The encryption procedure itself is outside this library.
pub const ENCRYPTED_PAYMENT_ID_TAIL: u8 = 0x8d;

/// Errors when manipulating an extra field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ExtraError {
  /// The nonce exceeded the maximum size of a nonce field.
  #[error("nonce exceeds 255 bytes")]
  NonceTooLarge,
  /// The uniform payment ID wasn't encrypted.
  #[error("refusing to embed an unencrypted uniform payment ID")]
  UnencryptedPaymentId,
}

/// A payment ID, as embedded within a nonce field.
///
/// This is a legacy method of identifying why coins were sent to the receiver.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Zeroize)]
pub enum PaymentId {
  /// A 32-byte cleartext payment ID. Deprecated, as it's publicly visible on-chain.
  Unencrypted([u8; 32]),
  /// An 8-byte encrypted payment ID.
  Encrypted([u8; 8]),
}

impl PaymentId {
  /// Write the PaymentId.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    match self {
      PaymentId::Unencrypted(id) => {
        w.write_all(&[PAYMENT_ID_MARKER])?;
        w.write_all(id)?;
      }
      PaymentId::Encrypted(id) => {
        w.write_all(&[ENCRYPTED_PAYMENT_ID_MARKER])?;
        w.write_all(id)?;
      }
    }
    Ok(())
  }

  /// Serialize the PaymentId to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = Vec::with_capacity(1 + 8);
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read a PaymentId.
  pub fn read<R: Read>(r: &mut R) -> io::Result<PaymentId> {
    Ok(match read_byte(r)? {
      0 => PaymentId::Unencrypted(read_bytes(r)?),
      1 => PaymentId::Encrypted(read_bytes(r)?),
      _ => Err(io::Error::other("unknown payment ID type"))?,
    })
  }
}

/// Set a nonce blob to carry a cleartext payment ID.
pub fn set_payment_id_nonce(nonce: &mut Vec<u8>, id: [u8; 32]) {
  nonce.clear();
  PaymentId::Unencrypted(id)
    .write(nonce)
    .expect("write failed but <Vec as io::Write> doesn't fail");
}

/// Set a nonce blob to carry an encrypted payment ID.
pub fn set_encrypted_payment_id_nonce(nonce: &mut Vec<u8>, id: [u8; 8]) {
  nonce.clear();
  PaymentId::Encrypted(id).write(nonce).expect("write failed but <Vec as io::Write> doesn't fail");
}

/// A uniform payment ID record.
///
/// The `zero` field doubles as an encryption sentinel: it's zero before encryption and carries
/// entropy after. Only the encrypted form may be embedded in an extra. The encryption procedure
/// itself is outside this library.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Zeroize)]
pub struct UniformPaymentId {
  /// The encryption sentinel, zero iff the record is cleartext.
  pub zero: u64,
  /// The (encrypted) payment ID.
  pub payment_id: [u8; 32],
}

impl UniformPaymentId {
  /// Write the UniformPaymentId.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    w.write_all(&self.zero.to_le_bytes())?;
    w.write_all(&self.payment_id)
  }

  /// Read a UniformPaymentId.
  pub fn read<R: Read>(r: &mut R) -> io::Result<UniformPaymentId> {
    Ok(UniformPaymentId { zero: read_u64(r)?, payment_id: read_bytes(r)? })
  }
}

/// A field within a transaction's extra.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize)]
pub enum ExtraField {
  /// Padding.
  ///
  /// This is a block of zeroes, and only well-formed as the final field.
  Padding(usize),
  /// The transaction key.
  ///
  /// This is a commitment to the randomness used for deriving outputs.
  PublicKey(CompressedPoint),
  /// The nonce field.
  ///
  /// This is used for data, such as payment IDs.
  ///
  /// When read, this is bounded by a maximum size. As the field is directly exposed, it's
  /// possible to create an `ExtraField::Nonce` which can be written but not read. Please be
  /// careful accordingly.
  Nonce(Vec<u8>),
  /// The field for merge-mining, specifying the foreign block a miner transaction also mined.
  MergeMining(u64, [u8; 32]),
  /// The additional transaction keys.
  ///
  /// These are the per-output commitments to the randomness used for deriving outputs.
  PublicKeys(Vec<CompressedPoint>),
  /// A uniform payment ID.
  UniformPaymentId(UniformPaymentId),
}

impl ExtraField {
  /// The tag byte identifying this field on the wire.
  pub fn tag(&self) -> u8 {
    match self {
      ExtraField::Padding(_) => TAG_PADDING,
      ExtraField::PublicKey(_) => TAG_PUBKEY,
      ExtraField::Nonce(_) => TAG_NONCE,
      ExtraField::MergeMining(..) => TAG_MERGE_MINING,
      ExtraField::PublicKeys(_) => TAG_ADDITIONAL_PUBKEYS,
      ExtraField::UniformPaymentId(_) => TAG_UNIFORM_PAYMENT_ID,
    }
  }

  /// Write the ExtraField.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    w.write_all(&[self.tag()])?;
    match self {
      ExtraField::Padding(size) => {
        for _ in 1 .. *size {
          write_byte(&0u8, w)?;
        }
      }
      ExtraField::PublicKey(key) => key.write(w)?,
      ExtraField::Nonce(data) => write_vec(write_byte, data, w)?,
      ExtraField::MergeMining(depth, merkle_root) => {
        VarInt::write(depth, w)?;
        w.write_all(merkle_root)?;
      }
      ExtraField::PublicKeys(keys) => write_vec(CompressedPoint::write, keys, w)?,
      ExtraField::UniformPaymentId(id) => id.write(w)?,
    }
    Ok(())
  }

  /// Serialize the ExtraField to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut res = Vec::with_capacity(1 + 8);
    self.write(&mut res).expect("write failed but <Vec as io::Write> doesn't fail");
    res
  }

  /// Read an ExtraField.
  pub fn read<R: BufRead>(r: &mut R) -> io::Result<ExtraField> {
    Ok(match read_byte(r)? {
      TAG_PADDING => ExtraField::Padding({
        // Read until either non-zero, max padding count, or end of buffer
        let mut size: usize = 1;
        loop {
          let buf = r.fill_buf()?;
          let mut n_consume = 0;
          for v in buf {
            if *v != 0u8 {
              Err(io::Error::other("non-zero value after padding"))?
            }
            n_consume += 1;
            size += 1;
            if size > MAX_PADDING_COUNT {
              Err(io::Error::other("padding exceeded max count"))?
            }
          }
          if n_consume == 0 {
            break;
          }
          r.consume(n_consume);
        }
        size
      }),
      TAG_PUBKEY => ExtraField::PublicKey(CompressedPoint::read(r)?),
      TAG_NONCE => ExtraField::Nonce(read_vec(read_byte, Some(MAX_NONCE_SIZE), r)?),
      TAG_MERGE_MINING => ExtraField::MergeMining(VarInt::read(r)?, read_bytes(r)?),
      TAG_ADDITIONAL_PUBKEYS => {
        ExtraField::PublicKeys(read_vec(CompressedPoint::read, None, r)?)
      }
      TAG_UNIFORM_PAYMENT_ID => ExtraField::UniformPaymentId(UniformPaymentId::read(r)?),
      _ => Err(io::Error::other("unknown extra field"))?,
    })
  }
}

/// The result of decoding a transaction's extra field.
///
/// The fields form an ordered sequence, not a map: order and duplicates are observable on the
/// wire, and preserved here.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize)]
pub struct Extra(pub(crate) Vec<ExtraField>);

impl Extra {
  /// The decoded fields, in their on-wire order.
  pub fn fields(&self) -> &[ExtraField] {
    &self.0
  }

  /// Append a field.
  pub fn push(&mut self, field: ExtraField) {
    self.0.push(field);
  }

  /// The `index`-th transaction public key.
  pub fn tx_pub_key(&self, index: usize) -> Option<CompressedPoint> {
    self
      .0
      .iter()
      .filter_map(|field| match field {
        ExtraField::PublicKey(key) => Some(*key),
        _ => None,
      })
      .nth(index)
  }

  /// The first set of additional per-output public keys.
  pub fn additional_pub_keys(&self) -> Option<Vec<CompressedPoint>> {
    self.0.iter().find_map(|field| match field {
      ExtraField::PublicKeys(keys) => Some(keys.clone()),
      _ => None,
    })
  }

  /// The payment ID within the first nonce field, if the nonce is exactly a payment ID.
  pub fn payment_id(&self) -> Option<PaymentId> {
    for field in &self.0 {
      if let ExtraField::Nonce(data) = field {
        let mut reader = data.as_slice();
        let res = PaymentId::read(&mut reader).ok();
        if !reader.is_empty() {
          None?;
        }
        return res;
      }
    }
    None
  }

  /// The first uniform payment ID.
  pub fn uniform_payment_id(&self) -> Option<UniformPaymentId> {
    self.0.iter().find_map(|field| match field {
      ExtraField::UniformPaymentId(id) => Some(*id),
      _ => None,
    })
  }

  /// Write the Extra.
  ///
  /// This is not of deterministic length nor length-prefixed. It should only be written to a
  /// buffer which will be delimited.
  pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
    for field in &self.0 {
      field.write(w)?;
    }
    Ok(())
  }

  /// Serialize the Extra to a `Vec<u8>`.
  pub fn serialize(&self) -> Vec<u8> {
    let mut buf = vec![];
    self.write(&mut buf).expect("write failed but <Vec as io::Write> doesn't fail");
    buf
  }

  /// Read an `Extra`, leniently.
  ///
  /// A malformed field aborts the parse, yet the fields before it are still returned. This is
  /// the policy applied to historical chain data, which includes extras no strict parser
  /// accepts.
  #[allow(clippy::unnecessary_wraps)]
  pub fn read<R: BufRead>(r: &mut R) -> io::Result<Extra> {
    let mut res = Extra(vec![]);
    // Extra reads until EOF
    // We take a BufRead so we can detect when the buffer is empty
    while !r.fill_buf()?.is_empty() {
      let Ok(field) = ExtraField::read(r) else { break };
      res.0.push(field);
    }
    Ok(res)
  }

  /// Read an `Extra`, rejecting any malformed field.
  pub fn read_strict<R: BufRead>(r: &mut R) -> io::Result<Extra> {
    let mut res = Extra(vec![]);
    while !r.fill_buf()?.is_empty() {
      res.0.push(ExtraField::read(r)?);
    }
    Ok(res)
  }
}

/// Append a transaction public key to a raw extra blob.
pub fn add_tx_pub_key(extra: &mut Vec<u8>, key: &CompressedPoint) {
  extra.push(TAG_PUBKEY);
  extra.extend(key.to_bytes());
}

/// Append the additional per-output transaction public keys to a raw extra blob.
pub fn add_additional_tx_pub_keys(extra: &mut Vec<u8>, keys: &[CompressedPoint]) {
  ExtraField::PublicKeys(keys.to_vec())
    .write(extra)
    .expect("write failed but <Vec as io::Write> doesn't fail");
}

/// Append a nonce blob to a raw extra blob.
pub fn add_nonce(extra: &mut Vec<u8>, nonce: &[u8]) -> Result<(), ExtraError> {
  if nonce.len() > MAX_NONCE_SIZE {
    Err(ExtraError::NonceTooLarge)?;
  }
  extra.push(TAG_NONCE);
  extra.push(u8::try_from(nonce.len()).expect("nonce of 255 bytes or less exceeded a u8"));
  extra.extend(nonce);
  Ok(())
}

/// Append a uniform payment ID to a raw extra blob.
///
/// The record's `zero` field doubles as an encryption sentinel. Refusing `zero == 0` protects
/// callers from accidentally publishing a cleartext payment ID.
pub fn add_uniform_payment_id(
  extra: &mut Vec<u8>,
  id: &UniformPaymentId,
) -> Result<(), ExtraError> {
  if id.zero == 0 {
    Err(ExtraError::UnencryptedPaymentId)?;
  }
  ExtraField::UniformPaymentId(*id)
    .write(extra)
    .expect("write failed but <Vec as io::Write> doesn't fail");
  Ok(())
}

/// Remove every field with this tag from a raw extra blob, re-serializing the rest.
///
/// The blob is parsed leniently; an unparseable suffix is dropped.
pub fn remove_field(extra: &mut Vec<u8>, tag: u8) {
  let Extra(fields) = Extra::read(&mut extra.as_slice())
    .expect("`Extra::read` only fails if the IO fails and `&[u8]` won't");
  extra.clear();
  for field in fields {
    if field.tag() != tag {
      field.write(extra).expect("write failed but <Vec as io::Write> doesn't fail");
    }
  }
}

/// The `index`-th transaction public key within a raw extra blob, parsed leniently.
pub fn tx_pub_key(extra: &[u8], index: usize) -> Option<CompressedPoint> {
  Extra::read(&mut &*extra)
    .expect("`Extra::read` only fails if the IO fails and `&[u8]` won't")
    .tx_pub_key(index)
}

/// The additional per-output transaction public keys within a raw extra blob, parsed leniently.
///
/// Empty when the field is absent.
pub fn additional_tx_pub_keys(extra: &[u8]) -> Vec<CompressedPoint> {
  Extra::read(&mut &*extra)
    .expect("`Extra::read` only fails if the IO fails and `&[u8]` won't")
    .additional_pub_keys()
    .unwrap_or_default()
}
