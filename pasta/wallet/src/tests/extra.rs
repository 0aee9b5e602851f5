use pasta_core::ed25519::CompressedPoint;

use crate::extra::*;

fn key(n: u8) -> CompressedPoint {
  CompressedPoint::from([n; 32])
}

#[test]
fn build_and_query() {
  let mut extra = vec![];
  add_tx_pub_key(&mut extra, &key(1));
  add_additional_tx_pub_keys(&mut extra, &[key(2), key(3)]);
  add_nonce(&mut extra, &[0x01, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

  assert_eq!(tx_pub_key(&extra, 0), Some(key(1)));
  assert_eq!(tx_pub_key(&extra, 1), None);
  assert_eq!(additional_tx_pub_keys(&extra), [key(2), key(3)]);

  let parsed = Extra::read(&mut extra.as_slice()).unwrap();
  assert_eq!(parsed.fields().len(), 3);
  assert_eq!(parsed.payment_id(), Some(PaymentId::Encrypted([1, 2, 3, 4, 5, 6, 7, 8])));

  // Removing the transaction key leaves the other fields intact
  remove_field(&mut extra, TAG_PUBKEY);
  assert_eq!(tx_pub_key(&extra, 0), None);
  assert_eq!(additional_tx_pub_keys(&extra), [key(2), key(3)]);
  let parsed = Extra::read(&mut extra.as_slice()).unwrap();
  assert_eq!(parsed.payment_id(), Some(PaymentId::Encrypted([1, 2, 3, 4, 5, 6, 7, 8])));
}

#[test]
fn round_trip() {
  let mut extra = Extra(vec![]);
  extra.push(ExtraField::PublicKey(key(4)));
  extra.push(ExtraField::MergeMining(7, [8; 32]));
  extra.push(ExtraField::PublicKeys(vec![key(5), key(6)]));
  extra.push(ExtraField::UniformPaymentId(UniformPaymentId { zero: 9, payment_id: [10; 32] }));
  extra.push(ExtraField::Nonce(vec![0x7f, 1, 2]));
  // Padding is only well-formed as the final field
  extra.push(ExtraField::Padding(5));

  let blob = extra.serialize();
  assert_eq!(Extra::read_strict(&mut blob.as_slice()).unwrap(), extra);
  assert_eq!(Extra::read(&mut blob.as_slice()).unwrap(), extra);
  assert_eq!(extra.uniform_payment_id(), Some(UniformPaymentId { zero: 9, payment_id: [10; 32] }));
}

#[test]
fn lenient_and_strict() {
  let mut extra = vec![];
  add_tx_pub_key(&mut extra, &key(4));
  // A truncated nonce: declares ten bytes, carries none
  extra.push(TAG_NONCE);
  extra.push(10);

  // The lenient parse keeps the prefix, so the key remains queryable
  assert_eq!(tx_pub_key(&extra, 0), Some(key(4)));
  let lenient = Extra::read(&mut extra.as_slice()).unwrap();
  assert_eq!(lenient.fields(), [ExtraField::PublicKey(key(4))]);

  assert!(Extra::read_strict(&mut extra.as_slice()).is_err());
}

#[test]
fn nonce_bounds() {
  let mut extra = vec![];
  assert_eq!(add_nonce(&mut extra, &[0; 256]), Err(ExtraError::NonceTooLarge));
  assert!(extra.is_empty());
  add_nonce(&mut extra, &[0; 255]).unwrap();
  assert_eq!(Extra::read(&mut extra.as_slice()).unwrap().fields().len(), 1);
}

#[test]
fn uniform_payment_id_failsafe() {
  let mut extra = vec![];
  // Refuse to embed the cleartext form
  assert_eq!(
    add_uniform_payment_id(&mut extra, &UniformPaymentId { zero: 0, payment_id: [1; 32] }),
    Err(ExtraError::UnencryptedPaymentId),
  );
  assert!(extra.is_empty());

  add_uniform_payment_id(&mut extra, &UniformPaymentId { zero: 0xdead, payment_id: [1; 32] })
    .unwrap();
  assert_eq!(
    Extra::read(&mut extra.as_slice()).unwrap().uniform_payment_id(),
    Some(UniformPaymentId { zero: 0xdead, payment_id: [1; 32] }),
  );
}

#[test]
fn payment_id_nonces() {
  let mut nonce = vec![0xff];
  set_payment_id_nonce(&mut nonce, [8; 32]);
  assert_eq!(nonce.len(), 33);

  let mut extra = vec![];
  add_nonce(&mut extra, &nonce).unwrap();
  assert_eq!(
    Extra::read(&mut extra.as_slice()).unwrap().payment_id(),
    Some(PaymentId::Unencrypted([8; 32])),
  );

  set_encrypted_payment_id_nonce(&mut nonce, [3; 8]);
  assert_eq!(nonce.len(), 9);
  let mut extra = vec![];
  add_nonce(&mut extra, &nonce).unwrap();
  assert_eq!(
    Extra::read(&mut extra.as_slice()).unwrap().payment_id(),
    Some(PaymentId::Encrypted([3; 8])),
  );

  // A nonce with trailing data after the payment ID isn't a payment ID
  nonce.push(0);
  let mut extra = vec![];
  add_nonce(&mut extra, &nonce).unwrap();
  assert_eq!(Extra::read(&mut extra.as_slice()).unwrap().payment_id(), None);
}
