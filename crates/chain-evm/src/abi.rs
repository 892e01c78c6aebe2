//! Minimal ABI encoding for the static-argument calls the bridge makes.
//!
//! Every bridge call takes only static types (`address`, `bytes32`,
//! `uint64`, `uint256`), so each argument is exactly one 32-byte word and no
//! offset table is needed.

use alloy_primitives::U256;
use sha3::{Digest, Keccak256};

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A 20-byte address, left-padded to 32 bytes.
    Address([u8; 20]),
    /// A `bytes32` value, stored as-is.
    FixedBytes([u8; 32]),
    /// Any `uintN`, big-endian and left-padded.
    Uint(U256),
}

impl From<u64> for AbiParam {
    fn from(value: u64) -> Self {
        AbiParam::Uint(U256::from(value))
    }
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encodes `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * 32);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

fn encode_param(param: &AbiParam) -> [u8; 32] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(addr);
            word
        }
        AbiParam::FixedBytes(bytes) => *bytes,
        AbiParam::Uint(value) => value.to_be_bytes::<32>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_of_erc20_transfer() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn address_is_left_padded() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;

        let word = encode_param(&AbiParam::Address(addr));
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &addr);
    }

    #[test]
    fn fixed_bytes_are_not_padded() {
        let bytes = [0x5a; 32];
        assert_eq!(encode_param(&AbiParam::FixedBytes(bytes)), bytes);
    }

    #[test]
    fn uint64_is_right_aligned() {
        let word = encode_param(&AbiParam::from(100_000_000u64));
        assert_eq!(&word[..24], &[0u8; 24]);
        assert_eq!(&word[24..], &100_000_000u64.to_be_bytes());
    }

    #[test]
    fn call_with_params_has_word_per_param() {
        let data = encode_function_call(
            [1, 2, 3, 4],
            &[AbiParam::FixedBytes([7; 32]), AbiParam::from(1u64)],
        );
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &[1, 2, 3, 4]);
        assert_eq!(data[67], 1);
    }
}
