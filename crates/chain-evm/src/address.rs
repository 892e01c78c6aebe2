//! EVM address parsing, EIP-55 checksums and key-to-address derivation.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::error::EvmError;

/// Parses a 0x-prefixed, 40-hex-digit address into its 20 raw bytes.
///
/// The checksum is not verified here; see [`validate_address`].
pub fn parse_address(address: &str) -> Result<[u8; 20], EvmError> {
    let hex_part = strip_0x(address)?;

    if hex_part.len() != 40 {
        return Err(EvmError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_part.len()
        )));
    }

    let bytes = hex::decode(hex_part)
        .map_err(|e| EvmError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// Validates an address string.
///
/// All-lowercase and all-uppercase addresses carry no checksum and are
/// accepted as-is; mixed case must match EIP-55.
pub fn validate_address(address: &str) -> Result<bool, EvmError> {
    parse_address(address)?;
    let hex_part = &address[2..];

    let is_all_lower = hex_part.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = hex_part.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(checksum_address(address)? == address)
}

/// Applies EIP-55 mixed-case checksum encoding to an address.
pub fn checksum_address(address: &str) -> Result<String, EvmError> {
    let bytes = parse_address(address)?;
    Ok(to_checksum(&bytes))
}

/// Formats 20 raw bytes as an EIP-55 checksummed address.
pub fn to_checksum(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        // Nibble i of the hash decides the case of character i.
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Derives the checksummed address controlled by a secp256k1 private key.
///
/// `keccak256(uncompressed_pubkey[1..])[12..]`.
pub fn address_from_private_key(private_key: &[u8; 32]) -> Result<String, EvmError> {
    let mut key_bytes = *private_key;
    let signing_key = SigningKey::from_bytes((&key_bytes).into())
        .map_err(|e| EvmError::InvalidPrivateKey(e.to_string()));
    key_bytes.zeroize();
    let signing_key = signing_key?;

    let point = PublicKey::from(signing_key.verifying_key()).to_encoded_point(false);
    let hash = Keccak256::digest(&point.as_bytes()[1..]);

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Ok(to_checksum(&addr))
}

fn strip_0x(address: &str) -> Result<&str, EvmError> {
    address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EvmError::InvalidAddress("address must start with 0x".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eip55_checksum_known_addresses() {
        // Test vectors from EIP-55.
        let cases = [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ];

        for expected in &cases {
            let lower = format!("0x{}", expected[2..].to_lowercase());
            assert_eq!(&checksum_address(&lower).unwrap(), expected);
        }
    }

    #[test]
    fn validate_accepts_single_case_and_valid_checksum() {
        assert!(validate_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap());
        assert!(validate_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap());
        assert!(validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap());
    }

    #[test]
    fn validate_bad_checksum_returns_false() {
        let addr = "0x5AAEB6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert!(!validate_address(addr).unwrap());
    }

    #[test]
    fn parse_rejects_short_missing_prefix_and_non_hex() {
        assert!(parse_address("0xdead").is_err());
        assert!(parse_address("dead000000000000000000000000000000000000").is_err());
        assert!(parse_address("0xzz00000000000000000000000000000000000000").is_err());
    }

    #[test]
    fn private_key_one_has_known_address() {
        let mut key = [0u8; 32];
        key[31] = 1;
        assert_eq!(
            address_from_private_key(&key).unwrap(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn zero_private_key_rejected() {
        assert!(address_from_private_key(&[0u8; 32]).is_err());
    }
}
