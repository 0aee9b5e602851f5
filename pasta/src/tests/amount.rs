use crate::amount::*;

#[test]
fn parse() {
  // 9 decimal places at the default decimal point
  assert_eq!(parse_amount("1.000000001"), Ok(1_000_000_001));
  assert_eq!(parse_amount("1.0"), Ok(1_000_000_000));
  assert_eq!(parse_amount("1"), Ok(1_000_000_000));
  assert_eq!(parse_amount("  12.34  "), Ok(12_340_000_000));
  assert_eq!(parse_amount(".5"), Ok(500_000_000));
  assert_eq!(parse_amount("0"), Ok(0));
  // Trailing zeros past the decimal point are accepted
  assert_eq!(parse_amount("1.0000000010"), Ok(1_000_000_001));

  // A tenth of an atomic unit isn't representable
  assert_eq!(parse_amount("1.0000000001"), Err(AmountParseError::TooPrecise));
  assert_eq!(parse_amount(""), Err(AmountParseError::Malformed));
  assert_eq!(parse_amount("."), Err(AmountParseError::Malformed));
  assert_eq!(parse_amount("1x"), Err(AmountParseError::Malformed));
  assert_eq!(parse_amount("-1"), Err(AmountParseError::Malformed));
  assert_eq!(parse_amount("1.2.3"), Err(AmountParseError::Malformed));
  // u64::MAX is 18446744073709551615 atomic units
  assert_eq!(parse_amount("18446744073.709551615"), Ok(u64::MAX));
  assert_eq!(parse_amount("18446744073.709551616"), Err(AmountParseError::Overflow));
}

#[test]
fn print() {
  assert_eq!(print_amount(42, Some(9)), "0.000000042");
  assert_eq!(print_amount(1_000_000_001, Some(9)), "1.000000001");
  assert_eq!(print_amount(0, Some(9)), "0.000000000");
  assert_eq!(print_amount(12, Some(0)), "12");
  assert_eq!(print_amount(12, Some(3)), "0.012");
  assert_eq!(print_amount(u64::MAX, Some(9)), "18446744073.709551615");
}

#[test]
fn print_parse_round_trip() {
  for amount in [0, 1, 9, 10, 999_999_999, 1_000_000_000, 123_456_789_012, u64::MAX] {
    assert_eq!(parse_amount(&print_amount(amount, None)), Ok(amount));
  }
}

#[test]
fn units() {
  assert_eq!(unit(Some(9)), Ok("pasta"));
  assert_eq!(unit(Some(6)), Ok("millipasta"));
  assert_eq!(unit(Some(3)), Ok("micropasta"));
  assert_eq!(unit(Some(0)), Ok("nanopasta"));
  // The argument is honored, not merely the process-wide default
  assert_eq!(unit(Some(4)), Err(DecimalPointError(4)));
  assert_eq!(unit(None), Ok("pasta"));
}

#[test]
fn decimal_point_config() {
  assert_eq!(default_decimal_point(), crate::DISPLAY_DECIMAL_POINT);
  assert_eq!(set_default_decimal_point(4), Err(DecimalPointError(4)));
  assert_eq!(set_default_decimal_point(1000), Err(DecimalPointError(1000)));
  // Still at the default after the rejected specifications
  assert_eq!(default_decimal_point(), crate::DISPLAY_DECIMAL_POINT);
  assert_eq!(set_default_decimal_point(9), Ok(()));
}

#[test]
fn decomposed_amounts() {
  assert!(is_valid_decomposed_amount(1));
  assert!(is_valid_decomposed_amount(5));
  assert!(is_valid_decomposed_amount(9000));
  assert!(is_valid_decomposed_amount(400_000_000_000));
  assert!(is_valid_decomposed_amount(9_000_000_000_000_000_000));
  assert!(is_valid_decomposed_amount(10_000_000_000_000_000_000));

  assert!(!is_valid_decomposed_amount(0));
  assert!(!is_valid_decomposed_amount(11));
  assert!(!is_valid_decomposed_amount(9001));
  // The sum of two distinct denominations of differing magnitude isn't decomposed
  assert!(!is_valid_decomposed_amount(9000 + 5));
  assert!(!is_valid_decomposed_amount(u64::MAX));
}
