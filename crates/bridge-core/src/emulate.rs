//! The ephemeral emulate signer and the proxy's emulation result.
//!
//! A claim is signed on the EVM side by a throwaway key that anyone holding
//! both public addresses can re-derive:
//! `sha256(ledger_wallet_base58 || evm_address)`, concatenated as UTF-8
//! strings in exactly that order. The EVM address string is hashed as given,
//! so callers must pass it in the same case every time.

use chain_evm::{address_from_private_key, sign_legacy_transaction, LegacyTransaction, SignedEthTransaction};
use chain_sol::Pubkey;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::BridgeError;

/// Derives the emulate signer's private key.
pub fn emulate_signer_private_key(solana_wallet: &Pubkey, neon_wallet: &str) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(solana_wallet.to_string().as_bytes());
    hasher.update(neon_wallet.as_bytes());

    let mut key = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&hasher.finalize());
    key
}

/// A session-bound EVM signer derived from a ledger wallet and an EVM address.
pub struct EmulateSigner {
    private_key: Zeroizing<[u8; 32]>,
    address: String,
}

impl EmulateSigner {
    pub fn new(solana_wallet: &Pubkey, neon_wallet: &str) -> Result<Self, BridgeError> {
        let private_key = emulate_signer_private_key(solana_wallet, neon_wallet);
        let address = address_from_private_key(&private_key)?;
        Ok(Self {
            private_key,
            address,
        })
    }

    /// Checksummed EVM address of the signer.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn sign(&self, tx: &LegacyTransaction) -> Result<SignedEthTransaction, BridgeError> {
        Ok(sign_legacy_transaction(tx, &self.private_key)?)
    }
}

impl std::fmt::Debug for EmulateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulateSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A ledger account the emulated EVM transaction touches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmulatedAccount {
    pub pubkey: Pubkey,
    pub is_writable: bool,
    #[serde(default)]
    pub is_legacy: bool,
}

/// Result of `neon_emulate`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmulateResult {
    pub exit_status: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub steps_executed: u64,
    #[serde(default)]
    pub used_gas: u64,
    #[serde(default)]
    pub solana_accounts: Vec<EmulatedAccount>,
}

impl EmulateResult {
    pub fn succeeded(&self) -> bool {
        self.exit_status == "succeed"
    }
}
