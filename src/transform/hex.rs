use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// Digits of `2^256`. Wider decimal values are not chain quantities.
const MAX_INTEGER_DIGITS: i64 = 78;

fn strip_hex_prefix(value: &str) -> Option<&str> {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
}

/// Big-endian hex quantity to integer. Missing, empty, `0x` and garbage all
/// read as zero.
pub fn hex_to_int(value: Option<&str>) -> u64 {
    let value = match value {
        Some(value) => value.trim(),
        None => return 0,
    };

    let digits = strip_hex_prefix(value).unwrap_or(value);

    if digits.is_empty() {
        return 0;
    }

    u64::from_str_radix(digits, 16).unwrap_or(0)
}

/// A 32-byte topic word carries a 20-byte address in its low 40 hex
/// characters. Case is kept as given.
pub fn hex_to_address(word: Option<&str>) -> Option<String> {
    let word = word?.trim();
    let digits = strip_hex_prefix(word).unwrap_or(word);

    let start = digits.len().saturating_sub(40);
    let address = digits.get(start..)?;

    Some(format!("0x{}", address))
}

/// Integer from a hex (`0x` prefix, any case) or decimal string. Decimal
/// strings with a fraction or exponent keep their integer part. Anything
/// unparseable is zero.
pub fn parse_integer(value: Option<&str>) -> BigInt {
    let value = match value {
        Some(value) => value.trim(),
        None => return BigInt::default(),
    };

    if value.is_empty() {
        return BigInt::default();
    }

    if let Some(digits) = strip_hex_prefix(value) {
        if digits.is_empty() {
            return BigInt::default();
        }
        return BigInt::parse_bytes(digits.as_bytes(), 16).unwrap_or_default();
    }

    if let Some(integer) = BigInt::parse_bytes(value.as_bytes(), 10) {
        return integer;
    }

    match BigDecimal::from_str(value) {
        Ok(decimal) => decimal_integer_part(&decimal),
        Err(_) => BigInt::default(),
    }
}

/// Integer part of a decimal, or zero when it would need more than
/// `MAX_INTEGER_DIGITS` digits. The width is known before rescaling.
fn decimal_integer_part(decimal: &BigDecimal) -> BigInt {
    let (mantissa, scale) = decimal.as_bigint_and_exponent();

    let digits = mantissa.magnitude().to_str_radix(10).len() as i64;

    match digits.checked_sub(scale) {
        Some(integer_digits) if (1..=MAX_INTEGER_DIGITS).contains(&integer_digits) => {
            decimal.with_scale(0).as_bigint_and_exponent().0
        }
        _ => BigInt::default(),
    }
}

/// Values past `u64` do not fit the warehouse columns and read as zero.
pub fn integer_to_u64(value: &BigInt) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Zero / non-zero status flag. Missing, empty and garbage values read as
/// zero, like every other integer field.
pub fn parse_flag(value: Option<&str>) -> bool {
    parse_integer(value) != BigInt::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_to_int_treats_empty_as_zero() {
        assert_eq!(hex_to_int(Some("0x1f4")), 500);
        assert_eq!(hex_to_int(Some("0x0")), 0);
        assert_eq!(hex_to_int(Some("0x")), 0);
        assert_eq!(hex_to_int(Some("")), 0);
        assert_eq!(hex_to_int(None), 0);
        assert_eq!(hex_to_int(Some("0xzz")), 0);
    }

    #[test]
    fn hex_to_address_keeps_low_twenty_bytes() {
        let padded = "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045";
        assert_eq!(
            hex_to_address(Some(padded)).as_deref(),
            Some("0xd8da6bf26964af9d7eed9e03e53415d37aa96045")
        );

        let checksummed = "0x000000000000000000000000D8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        assert_eq!(
            hex_to_address(Some(checksummed)).as_deref(),
            Some("0xD8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        );

        assert_eq!(hex_to_address(None), None);
    }

    #[test]
    fn parse_integer_accepts_hex_and_decimal() {
        assert_eq!(parse_integer(Some("0x3B9ACA00")), BigInt::from(1_000_000_000u64));
        assert_eq!(parse_integer(Some("0X10")), BigInt::from(16));
        assert_eq!(parse_integer(Some("21000")), BigInt::from(21_000));
        assert_eq!(parse_integer(Some("1.5e3")), BigInt::from(1_500));
        assert_eq!(parse_integer(Some("42.9")), BigInt::from(42));
        assert_eq!(
            parse_integer(Some("5000000000000000000000")),
            BigInt::parse_bytes(b"5000000000000000000000", 10).unwrap()
        );
        assert_eq!(parse_integer(Some("0x")), BigInt::default());
        assert_eq!(parse_integer(Some("n/a")), BigInt::default());
        assert_eq!(parse_integer(None), BigInt::default());
    }

    #[test]
    fn parse_integer_bounds_decimal_exponents() {
        assert_eq!(parse_integer(Some("1e999999999")), BigInt::default());
        assert_eq!(parse_integer(Some("-1e999999999")), BigInt::default());
        assert_eq!(parse_integer(Some("1e-999999999")), BigInt::default());
        assert_eq!(parse_integer(Some("0.5")), BigInt::default());
        assert_eq!(parse_integer(Some("-2.5")), BigInt::from(-2));
        assert_eq!(parse_integer(Some("1e77")), BigInt::from(10).pow(77));
        assert_eq!(parse_integer(Some("1e78")), BigInt::default());
    }

    #[test]
    fn flags_decode_from_zero_or_non_zero() {
        assert!(!parse_flag(Some("0")));
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("0x1")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(Some("n/a")));
        assert!(!parse_flag(None));
    }
}
