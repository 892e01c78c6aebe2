//! Amount scaling and fixed-width integer encodings.
//!
//! Two chain-id encodings coexist on purpose: instruction payloads carry the
//! chain id as 8 bytes little-endian ([`number_to_64bit_le`]), PDA seeds carry
//! it as 32 bytes big-endian ([`to_u256_be`]). Each call site uses the one its
//! remote consumer expects.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

use crate::error::BridgeError;

/// A user-supplied token quantity, before scaling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Amount {
    /// A whole number of tokens.
    Integer(u64),
    /// A decimal string such as `"0.1"` or `"1500"`.
    Decimal(String),
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::Integer(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Amount::Decimal(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Amount::Decimal(value)
    }
}

impl From<f64> for Amount {
    /// Goes through the shortest round-trip decimal form, so `0.1` scales as
    /// the string `"0.1"` and not as its binary approximation.
    fn from(value: f64) -> Self {
        Amount::Decimal(value.to_string())
    }
}

impl Amount {
    fn as_decimal(&self) -> String {
        match self {
            Amount::Integer(v) => v.to_string(),
            Amount::Decimal(s) => s.trim().to_string(),
        }
    }
}

/// Scales `amount` by `10^decimals` and truncates to an integer.
///
/// Digits beyond `decimals` fractional places are dropped, so amounts below
/// one base unit become zero.
pub fn to_full_amount(amount: impl Into<Amount>, decimals: u8) -> Result<BigUint, BridgeError> {
    let text = amount.into().as_decimal();
    let (int_part, frac_part) = split_decimal(&text)?;

    let scale = BigUint::from(10u32).pow(u32::from(decimals));
    let whole = parse_digits(int_part, &text)? * &scale;

    let mut frac: String = frac_part.chars().take(decimals as usize).collect();
    while frac.len() < decimals as usize {
        frac.push('0');
    }

    Ok(whole + parse_digits(&frac, &text)?)
}

/// Parses an amount already expressed in base units.
pub fn to_big_int(amount: impl Into<Amount>) -> Result<BigInt, BridgeError> {
    let text = amount.into().as_decimal();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::InvalidAmount(format!(
            "not an integer: {text:?}"
        )));
    }

    let magnitude = parse_digits(digits, &text)?;
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, magnitude))
}

/// Narrows a scaled amount to the `u64` the token program works in.
pub fn full_amount_to_u64(full: &BigUint) -> Result<u64, BridgeError> {
    full.to_u64()
        .ok_or_else(|| BridgeError::Range(format!("{full} does not fit in 64 bits")))
}

/// Formats a base-unit amount back into a decimal string.
pub fn format_amount(full: &BigUint, decimals: u8) -> String {
    let digits = full.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');

    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// 8-byte little-endian encoding: low 32-bit half first, each half LE.
pub fn number_to_64bit_le(value: u64) -> [u8; 8] {
    let low = (value & 0xffff_ffff) as u32;
    let high = (value >> 32) as u32;

    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&low.to_le_bytes());
    out[4..].copy_from_slice(&high.to_le_bytes());
    out
}

/// 32-byte big-endian encoding of `value`.
pub fn to_u256_be(value: &BigInt) -> Result<[u8; 32], BridgeError> {
    let (sign, magnitude) = value.to_bytes_be();
    if sign == Sign::Minus {
        return Err(BridgeError::Range(format!("{value} is negative")));
    }
    if magnitude.len() > 32 {
        return Err(BridgeError::Range(format!("{value} exceeds 2^256-1")));
    }

    let mut out = [0u8; 32];
    if !value.is_zero() {
        out[32 - magnitude.len()..].copy_from_slice(&magnitude);
    }
    Ok(out)
}

/// 4-byte encoding with selectable endianness.
pub fn to_bytes_int32(value: u32, little_endian: bool) -> [u8; 4] {
    if little_endian {
        value.to_le_bytes()
    } else {
        value.to_be_bytes()
    }
}

/// Strict hex check: optional `0x` prefix followed by at least one hex digit.
///
/// Returns `Ok(true)` for valid input and `InvalidHex` otherwise.
pub fn is_valid_hex(value: &str) -> Result<bool, BridgeError> {
    let digits = strip_0x(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BridgeError::InvalidHex(value.to_string()));
    }
    Ok(true)
}

/// Decodes a validated hex string.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, BridgeError> {
    is_valid_hex(value)?;
    hex::decode(strip_0x(value)).map_err(|e| BridgeError::InvalidHex(format!("{value}: {e}")))
}

/// Decodes a 20-byte EVM address, validating the hex before slicing.
pub fn evm_address_bytes(value: &str) -> Result<[u8; 20], BridgeError> {
    let bytes = hex_to_bytes(value)?;
    <[u8; 20]>::try_from(bytes.as_slice()).map_err(|_| {
        BridgeError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
    })
}

fn strip_0x(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

fn split_decimal(text: &str) -> Result<(&str, &str), BridgeError> {
    if text.starts_with('-') {
        return Err(BridgeError::InvalidAmount(format!("negative amount: {text}")));
    }
    let text = text.strip_prefix('+').unwrap_or(text);

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(BridgeError::InvalidAmount(format!("not a decimal: {text:?}")));
    }

    Ok((int_part, frac_part))
}

fn parse_digits(digits: &str, original: &str) -> Result<BigUint, BridgeError> {
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| BridgeError::InvalidAmount(format!("not a decimal: {original:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_at_nine_decimals() {
        assert_eq!(to_full_amount("0.1", 9).unwrap(), BigUint::from(100_000_000u64));
        assert_eq!(to_full_amount(0.1f64, 9).unwrap(), BigUint::from(100_000_000u64));
    }

    #[test]
    fn integers_and_large_decimals() {
        assert_eq!(to_full_amount(5u64, 6).unwrap(), BigUint::from(5_000_000u64));
        assert_eq!(
            to_full_amount("1000000.5", 18).unwrap().to_string(),
            "1000000500000000000000000"
        );
        assert_eq!(to_full_amount(".25", 2).unwrap(), BigUint::from(25u32));
    }

    #[test]
    fn sub_unit_amounts_truncate_to_zero() {
        assert!(to_full_amount("0.0000000001", 9).unwrap().is_zero());
        assert_eq!(to_full_amount("1.999", 2).unwrap(), BigUint::from(199u32));
    }

    #[test]
    fn negative_or_malformed_amounts_rejected() {
        for bad in ["-1", "abc", "", ".", "1.2.3", "1e5", "NaN"] {
            assert!(
                matches!(to_full_amount(bad, 9), Err(BridgeError::InvalidAmount(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(to_full_amount(f64::NAN, 9).is_err());
    }

    #[test]
    fn format_inverts_scaling() {
        for (amount, decimals) in [("0.1", 9u8), ("123.456", 6), ("7", 0), ("42", 18)] {
            let full = to_full_amount(amount, decimals).unwrap();
            assert_eq!(format_amount(&full, decimals), amount);
        }
        assert_eq!(format_amount(&BigUint::from(5u32), 9), "0.000000005");
    }

    #[test]
    fn big_int_parses_signed_integers() {
        assert_eq!(to_big_int("12345").unwrap(), BigInt::from(12345));
        assert_eq!(to_big_int("-7").unwrap(), BigInt::from(-7));
        assert_eq!(to_big_int(9u64).unwrap(), BigInt::from(9));
        assert!(to_big_int("1.5").is_err());
        assert!(to_big_int("").is_err());
    }

    #[test]
    fn u64_narrowing() {
        assert_eq!(full_amount_to_u64(&BigUint::from(u64::MAX)).unwrap(), u64::MAX);
        let too_big = BigUint::from(u64::MAX) + 1u32;
        assert!(matches!(full_amount_to_u64(&too_big), Err(BridgeError::Range(_))));
    }

    #[test]
    fn sixty_four_bit_le_matches_native() {
        for value in [0u64, 1, 111, 245022926, u32::MAX as u64 + 7, u64::MAX] {
            let bytes = number_to_64bit_le(value);
            assert_eq!(bytes, value.to_le_bytes());
            assert_eq!(u64::from_le_bytes(bytes), value);
        }
    }

    #[test]
    fn u256_be_bounds() {
        let bytes = to_u256_be(&BigInt::from(111)).unwrap();
        assert_eq!(bytes[31], 111);
        assert!(bytes[..31].iter().all(|&b| b == 0));

        assert_eq!(to_u256_be(&BigInt::from(0)).unwrap(), [0u8; 32]);

        let max = (BigInt::from(1) << 256) - 1;
        assert_eq!(to_u256_be(&max).unwrap(), [0xff; 32]);

        assert!(matches!(to_u256_be(&(max + 1)), Err(BridgeError::Range(_))));
        assert!(matches!(to_u256_be(&BigInt::from(-1)), Err(BridgeError::Range(_))));
    }

    #[test]
    fn int32_endianness() {
        assert_eq!(to_bytes_int32(1, true), [1, 0, 0, 0]);
        assert_eq!(to_bytes_int32(1, false), [0, 0, 0, 1]);
    }

    #[test]
    fn hex_validation() {
        assert!(is_valid_hex("0xabc123").unwrap());
        assert!(is_valid_hex("ABCdef").unwrap());
        assert!(matches!(is_valid_hex("0xZZZ"), Err(BridgeError::InvalidHex(_))));
        assert!(is_valid_hex("0x").is_err());
        assert!(is_valid_hex("").is_err());
        assert!(is_valid_hex("0x12 34").is_err());
        assert!(matches!(is_valid_hex("0XABC"), Err(BridgeError::InvalidHex(_))));
    }

    #[test]
    fn evm_address_rejects_bad_hex_before_length() {
        assert!(matches!(
            evm_address_bytes("0x12345678zz"),
            Err(BridgeError::InvalidHex(_))
        ));
        assert!(matches!(
            evm_address_bytes("0x1234"),
            Err(BridgeError::InvalidAddress(_))
        ));
        let addr = evm_address_bytes("0x1234567890abcdef1234567890abcdef1234abcd").unwrap();
        assert_eq!(addr[0], 0x12);
        assert_eq!(addr[19], 0xcd);
    }
}
