use zeroize::Zeroizing;

use pasta_core::{
  ed25519::{CompressedPoint, Point, Scalar},
  transaction::{Output, Timelock, TransactionPrefix},
};

use crate::{
  account::{AccountAddress, AccountKeys, SubaddressBook, SubaddressIndex},
  device::{Device, SoftwareDevice},
  output::{KeyImageError, add_public_keys, recover_output_key_image,
    recover_output_key_image_precomp},
  scan::{ScanError, is_output_to_account, lookup_account_outputs,
    lookup_account_outputs_with_keys, receiving_subaddress},
  extra,
};

const DEVICE: SoftwareDevice = SoftwareDevice;

fn account() -> AccountKeys {
  let view_secret = Scalar::hash(b"view secret");
  let spend_secret = Scalar::hash(b"spend secret");
  AccountKeys {
    address: AccountAddress {
      spend: DEVICE.secret_key_to_public_key(&spend_secret),
      view: DEVICE.secret_key_to_public_key(&view_secret),
    },
    view_secret: Zeroizing::new(view_secret),
    spend_secret: Some(Zeroizing::new(spend_secret)),
    multisig_keys: vec![],
  }
}

fn subaddress_spend_key(account: &AccountKeys, index: SubaddressIndex) -> CompressedPoint {
  let subaddress_secret = DEVICE.get_subaddress_secret_key(&account.view_secret, index);
  let spend_secret = account.spend_secret.as_ref().unwrap();
  DEVICE.secret_key_to_public_key(&DEVICE.sc_secret_add(spend_secret, &subaddress_secret))
}

fn book(account: &AccountKeys, indexes: &[SubaddressIndex]) -> SubaddressBook {
  let mut book = SubaddressBook::new();
  book.insert(account.address.spend, SubaddressIndex::new(0, 0));
  for index in indexes {
    book.insert(subaddress_spend_key(account, *index), *index);
  }
  book
}

fn tx_keypair(seed: &[u8]) -> (Scalar, CompressedPoint) {
  let secret = Scalar::hash(seed);
  (secret, DEVICE.secret_key_to_public_key(&secret))
}

fn prefix_paying(outputs: Vec<Output>, tx_pub_key: &CompressedPoint) -> TransactionPrefix {
  let mut extra = vec![];
  extra::add_tx_pub_key(&mut extra, tx_pub_key);
  TransactionPrefix { version: 2, unlock_time: Timelock::None, inputs: vec![], outputs, extra }
}

#[test]
fn subaddress_scan() {
  let account = account();
  let index = SubaddressIndex::new(1, 3);
  let subaddresses = book(&account, &[index]);
  let subaddress_spend = subaddress_spend_key(&account, index);

  let (_, tx_pub_key) = tx_keypair(b"tx secret");
  let derivation = DEVICE.generate_key_derivation(&tx_pub_key, &account.view_secret).unwrap();

  // The one-time key the sender would construct for the subaddress at output index 0
  let output_key = DEVICE.derive_public_key(&derivation, 0, &subaddress_spend).unwrap();
  let mut prefix = prefix_paying(vec![Output { amount: Some(5), key: output_key }], &tx_pub_key);

  let owned = lookup_account_outputs(&account, &subaddresses, &prefix, &DEVICE).unwrap();
  assert_eq!(owned.outputs, [0]);
  assert_eq!(owned.amount, 5);

  let info =
    receiving_subaddress(&subaddresses, &output_key, &derivation, &[], 0, &DEVICE).unwrap();
  assert_eq!(info.index, index);
  assert_eq!(info.derivation, derivation);

  // An unrelated decoy output doesn't change the result
  prefix.outputs.push(Output { amount: Some(7), key: CompressedPoint::G });
  let owned = lookup_account_outputs(&account, &subaddresses, &prefix, &DEVICE).unwrap();
  assert_eq!(owned.outputs, [0]);
  assert_eq!(owned.amount, 5);

  // The legacy main-address check can't see subaddresses
  assert!(!is_output_to_account(&account, &output_key, &tx_pub_key, &[], 0, &DEVICE));
}

#[test]
fn main_address_scan_and_additional_keys() {
  let account = account();
  let subaddresses = book(&account, &[]);

  let (_, tx_pub_key) = tx_keypair(b"shared key");
  let (_, additional_0) = tx_keypair(b"additional 0");
  let (_, additional_1) = tx_keypair(b"additional 1");

  let shared_derivation =
    DEVICE.generate_key_derivation(&tx_pub_key, &account.view_secret).unwrap();
  let additional_derivation_1 =
    DEVICE.generate_key_derivation(&additional_1, &account.view_secret).unwrap();

  // Output 0 pays a stranger, output 1 pays us, derivable only under its additional key
  let output_key =
    DEVICE.derive_public_key(&additional_derivation_1, 1, &account.address.spend).unwrap();
  let outputs = vec![
    Output { amount: Some(3), key: CompressedPoint::G },
    Output { amount: Some(5), key: output_key },
  ];
  let prefix = prefix_paying(outputs, &tx_pub_key);

  let owned = lookup_account_outputs_with_keys(
    &account,
    &subaddresses,
    &prefix,
    &tx_pub_key,
    &[additional_0, additional_1],
    &DEVICE,
  )
  .unwrap();
  assert_eq!(owned.outputs, [1]);
  assert_eq!(owned.amount, 5);

  // The shared derivation alone doesn't find it
  let owned = lookup_account_outputs_with_keys(
    &account,
    &subaddresses,
    &prefix,
    &tx_pub_key,
    &[],
    &DEVICE,
  )
  .unwrap();
  assert_eq!(owned.outputs, [0; 0]);

  // Additional keys must be one per output
  assert_eq!(
    lookup_account_outputs_with_keys(
      &account,
      &subaddresses,
      &prefix,
      &tx_pub_key,
      &[additional_0],
      &DEVICE,
    ),
    Err(ScanError::MalformedAdditionalPubkeys),
  );

  // The legacy check agrees, using the additional keys
  assert!(is_output_to_account(
    &account,
    &output_key,
    &tx_pub_key,
    &[additional_0, additional_1],
    1,
    &DEVICE,
  ));
  assert!(!is_output_to_account(&account, &output_key, &tx_pub_key, &[], 1, &DEVICE));
}

#[test]
fn missing_tx_public_key() {
  let account = account();
  let subaddresses = book(&account, &[]);
  let prefix = TransactionPrefix {
    version: 2,
    unlock_time: Timelock::None,
    inputs: vec![],
    outputs: vec![],
    extra: vec![],
  };
  assert_eq!(
    lookup_account_outputs(&account, &subaddresses, &prefix, &DEVICE),
    Err(ScanError::MissingTxPublicKey),
  );
}

#[test]
fn key_image_determinism() {
  let account = account();
  let subaddresses = book(&account, &[]);

  let (_, tx_pub_key) = tx_keypair(b"ki tx secret");
  let derivation = DEVICE.generate_key_derivation(&tx_pub_key, &account.view_secret).unwrap();
  let output_key = DEVICE.derive_public_key(&derivation, 2, &account.address.spend).unwrap();

  let (ephemeral_a, key_image_a) = recover_output_key_image(
    &account,
    &subaddresses,
    &output_key,
    &tx_pub_key,
    &[],
    2,
    &DEVICE,
  )
  .unwrap();
  let (ephemeral_b, key_image_b) = recover_output_key_image(
    &account,
    &subaddresses,
    &output_key,
    &tx_pub_key,
    &[],
    2,
    &DEVICE,
  )
  .unwrap();

  assert_eq!(ephemeral_a.public, ephemeral_b.public);
  assert_eq!(*ephemeral_a.secret, *ephemeral_b.secret);
  assert_eq!(key_image_a, key_image_b);

  // The reconstruction matches the output, and the secret opens the public key
  assert_eq!(ephemeral_a.public, output_key);
  assert_eq!(DEVICE.secret_key_to_public_key(&ephemeral_a.secret), output_key);

  // The key image is x·Hp(P)
  let expected = Point::from(
    (*ephemeral_a.secret).into() * Point::biased_hash(output_key.to_bytes()).into(),
  )
  .compress();
  assert_eq!(key_image_a, expected);

  // An output paying someone else isn't recoverable
  assert_eq!(
    recover_output_key_image(
      &account,
      &subaddresses,
      &CompressedPoint::G,
      &tx_pub_key,
      &[],
      2,
      &DEVICE,
    )
    .unwrap_err(),
    KeyImageError::NotOurOutput,
  );

  // A wrong receiving index yields a key which doesn't match the output
  assert_eq!(
    recover_output_key_image_precomp(
      &account,
      &output_key,
      &derivation,
      2,
      SubaddressIndex::new(9, 9),
      &DEVICE,
    )
    .unwrap_err(),
    KeyImageError::KeyImageMismatch,
  );
}

#[test]
fn subaddress_key_image() {
  let account = account();
  let index = SubaddressIndex::new(2, 1);
  let subaddresses = book(&account, &[index]);

  let (_, tx_pub_key) = tx_keypair(b"subaddr ki tx");
  let derivation = DEVICE.generate_key_derivation(&tx_pub_key, &account.view_secret).unwrap();
  let output_key =
    DEVICE.derive_public_key(&derivation, 0, &subaddress_spend_key(&account, index)).unwrap();

  let (ephemeral, _) = recover_output_key_image(
    &account,
    &subaddresses,
    &output_key,
    &tx_pub_key,
    &[],
    0,
    &DEVICE,
  )
  .unwrap();
  // The subaddress scalar is folded into the one-time secret
  assert_eq!(ephemeral.public, output_key);
  assert_eq!(DEVICE.secret_key_to_public_key(&ephemeral.secret), output_key);
}

#[test]
fn watch_only() {
  let mut account = account();
  let subaddresses = book(&account, &[]);
  account.spend_secret = None;

  let (_, tx_pub_key) = tx_keypair(b"watch tx");
  let derivation = DEVICE.generate_key_derivation(&tx_pub_key, &account.view_secret).unwrap();
  let output_key = DEVICE.derive_public_key(&derivation, 0, &account.address.spend).unwrap();

  let (ephemeral, key_image) = recover_output_key_image(
    &account,
    &subaddresses,
    &output_key,
    &tx_pub_key,
    &[],
    0,
    &DEVICE,
  )
  .unwrap();
  // Watch-only accounts learn the output key, not its secret
  assert_eq!(ephemeral.public, output_key);
  assert_eq!(*ephemeral.secret, Scalar::ZERO);
  // 0·Hp(P) is the identity
  assert_eq!(key_image, CompressedPoint::IDENTITY);
}

#[test]
fn multisig_key_recovery() {
  let full = account();
  let index = SubaddressIndex::new(1, 1);
  let subaddresses = book(&full, &[index]);

  // Split the spend secret into two shares
  let share = Scalar::hash(b"multisig share");
  let mut multisig = full.clone();
  multisig.spend_secret = Some(Zeroizing::new(share));
  multisig.multisig_keys = vec![share];

  let (_, tx_pub_key) = tx_keypair(b"multisig tx");
  let derivation = DEVICE.generate_key_derivation(&tx_pub_key, &full.view_secret).unwrap();

  // Pay the subaddress, to exercise the point-addition branch
  let output_key =
    DEVICE.derive_public_key(&derivation, 0, &subaddress_spend_key(&full, index)).unwrap();

  let (ephemeral, _) = recover_output_key_image(
    &multisig,
    &subaddresses,
    &output_key,
    &tx_pub_key,
    &[],
    0,
    &DEVICE,
  )
  .unwrap();
  // The one-time key is reconstructed from the full spend public key...
  assert_eq!(ephemeral.public, output_key);
  // ... while the secret is only this signer's part of it
  assert!(DEVICE.secret_key_to_public_key(&ephemeral.secret) != output_key);
}

#[test]
fn point_addition() {
  let g2 = add_public_keys(&CompressedPoint::G, &CompressedPoint::G).unwrap();
  let g = CompressedPoint::G.decompress().unwrap();
  assert_eq!(g2, Point::from(g.into() + g.into()).compress());

  // The all-zero sentinel isn't a point
  assert_eq!(
    add_public_keys(&CompressedPoint::G, &CompressedPoint::NULL),
    Err(KeyImageError::PointDecode),
  );
}
