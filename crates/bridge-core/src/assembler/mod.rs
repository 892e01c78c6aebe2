//! Transfer assemblers.
//!
//! Each flow returns its instructions in dependency order: any account a
//! later instruction reads is created by an earlier one.

mod mint;
mod native;
mod withdraw;
mod wrap;

pub use mint::{
    claim_transaction_data, create_claim_instruction, create_mint_neon_transaction,
    neon_claim_transaction_from_signer, neon_transfer_mint_instructions, ClaimInstruction,
    MintAccounts,
};
pub use native::{
    solana_neon_transfer_instructions, solana_neon_transfer_legacy_instructions,
    solana_neon_transfer_transaction, ServiceReward,
};
pub use withdraw::{
    create_mint_solana_transaction, neon_approve_solana_data, neon_native_withdraw_data,
    neon_transfer_spl_transaction_data, neon_unwrap_data, neon_wrap_data, NATIVE_DECIMALS,
};
pub use wrap::create_wrap_and_transfer_sol_instructions;

use chain_sol::{derive_associated_token_address, Pubkey};

use crate::config::BridgeConfig;
use crate::derivation::authority_pool_address;
use crate::error::BridgeError;
use crate::tokens::TokenDescriptor;

/// Token account of the deposit authority for `mint`; deposits land here.
pub fn deposit_pool_address(program_id: &Pubkey, mint: &Pubkey) -> Result<Pubkey, BridgeError> {
    let (authority, _) = authority_pool_address(program_id)?;
    Ok(derive_associated_token_address(&authority, mint)?)
}

/// Deposits move the configured gas token only; its mint must match.
pub(crate) fn ensure_gas_token(config: &BridgeConfig, token: &TokenDescriptor) -> Result<(), BridgeError> {
    if token.address_spl != config.token_mint {
        return Err(BridgeError::UnknownToken(format!(
            "{} ({}) is not the gas token {} of chain {}",
            token.symbol, token.address_spl, config.token_mint, config.chain_id
        )));
    }
    Ok(())
}

/// Claims are signed for `config.chain_id`; the token must live there.
pub(crate) fn ensure_token_chain(config: &BridgeConfig, token: &TokenDescriptor) -> Result<(), BridgeError> {
    if token.chain_id != config.chain_id {
        return Err(BridgeError::UnknownToken(format!(
            "{} is registered on chain {}, not {}",
            token.symbol, token.chain_id, config.chain_id
        )));
    }
    Ok(())
}
