//! Neon EVM side of the bridge.
//!
//! This crate provides:
//! - Address parsing, EIP-55 checksums and key-to-address derivation
//! - Static-argument ABI encoding and the closed set of bridge contract calls
//! - Legacy (EIP-155) and EIP-1559 transaction signing
//! - Neon network definitions

pub mod abi;
pub mod address;
pub mod chains;
pub mod contracts;
pub mod error;
pub mod transaction;

pub use address::{address_from_private_key, checksum_address, parse_address, validate_address};
pub use contracts::{BridgeCall, ContractAbi};
pub use error::EvmError;
pub use transaction::{
    sign_legacy_transaction, sign_transaction, EthTransaction, LegacyTransaction,
    SignedEthTransaction,
};
