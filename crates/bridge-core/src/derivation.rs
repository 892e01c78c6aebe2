//! Neon EVM program-derived addresses.
//!
//! Every account the Neon program owns on the ledger is a PDA whose seeds
//! begin with the account seed version. Hex inputs are validated before any
//! slicing.

use chain_sol::{find_program_address, Pubkey};
use num_bigint::BigInt;

use crate::codec::{evm_address_bytes, to_bytes_int32, to_u256_be};
use crate::error::BridgeError;

/// Account seed version of the current Neon EVM release.
pub const NEON_SEED_VERSION: u8 = 3;

/// Seed tag of the per-token authorization account.
pub const AUTH_SEED: &[u8] = b"AUTH";

/// Seed of the single deposit authority.
pub const DEPOSIT_SEED: &[u8] = b"Deposit";

/// Default seed prefix of the treasury pool accounts.
pub const TREASURY_POOL_SEED: &str = "treasury_pool";

/// Ledger-side shadow account of an EVM address.
///
/// Seeds: `[version, evm_address]`.
pub fn neon_wallet_program_address(
    evm_address: &str,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), BridgeError> {
    let address = evm_address_bytes(evm_address)?;
    Ok(find_program_address(
        &[&[NEON_SEED_VERSION], &address],
        program_id,
    )?)
}

/// Per-chain balance account of an EVM address.
///
/// Seeds: `[version, evm_address, u256_be(chain_id)]`.
pub fn neon_balance_program_address(
    evm_address: &str,
    program_id: &Pubkey,
    chain_id: u64,
) -> Result<(Pubkey, u8), BridgeError> {
    let address = evm_address_bytes(evm_address)?;
    let chain_seed = to_u256_be(&BigInt::from(chain_id))?;
    Ok(find_program_address(
        &[&[NEON_SEED_VERSION], &address, &chain_seed],
        program_id,
    )?)
}

/// Authorization account through which `evm_wallet` lets the token contract
/// pull delegated SPL tokens.
///
/// Seeds: `[version, "AUTH", token_contract, 12 zero bytes || evm_wallet]`.
pub fn auth_account_address(
    evm_wallet: &str,
    program_id: &Pubkey,
    token_contract: &str,
) -> Result<(Pubkey, u8), BridgeError> {
    let wallet = evm_address_bytes(evm_wallet)?;
    let token = evm_address_bytes(token_contract)?;

    let mut wallet_word = [0u8; 32];
    wallet_word[12..].copy_from_slice(&wallet);

    Ok(find_program_address(
        &[&[NEON_SEED_VERSION], AUTH_SEED, &token, &wallet_word],
        program_id,
    )?)
}

/// Treasury pool account number `pool_index`.
///
/// Seeds: `[pool_seed, int32_le(pool_index)]`.
pub fn collateral_pool_address(
    program_id: &Pubkey,
    pool_seed: &str,
    pool_index: u32,
) -> Result<(Pubkey, u8), BridgeError> {
    Ok(find_program_address(
        &[pool_seed.as_bytes(), &to_bytes_int32(pool_index, true)],
        program_id,
    )?)
}

/// The deposit authority. Seeds: `["Deposit"]`.
pub fn authority_pool_address(program_id: &Pubkey) -> Result<(Pubkey, u8), BridgeError> {
    Ok(find_program_address(&[DEPOSIT_SEED], program_id)?)
}
