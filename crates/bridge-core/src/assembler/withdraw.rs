use chain_evm::BridgeCall;
use chain_sol::{build_create_associated_token_account, derive_associated_token_address, Pubkey};
use num_traits::ToPrimitive;
use tracing::debug;

use crate::codec::{full_amount_to_u64, to_full_amount, Amount};
use crate::error::BridgeError;
use crate::ledger::LedgerRpc;
use crate::result::{BridgeInstruction, EvmCall};
use crate::tokens::TokenDescriptor;

/// Decimals of the native gas token on the EVM side.
pub const NATIVE_DECIMALS: u8 = 18;

/// EVM -> ledger: `transferSolana` to the recipient's associated token
/// account for `token`.
pub fn neon_transfer_spl_transaction_data(
    token: &TokenDescriptor,
    solana_wallet: &Pubkey,
    amount: impl Into<Amount>,
) -> Result<EvmCall, BridgeError> {
    let full_amount = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;
    let destination = derive_associated_token_address(solana_wallet, &token.address_spl)?;

    Ok(EvmCall::new(
        &token.address,
        &BridgeCall::TransferSolana {
            to: destination.to_bytes(),
            amount: full_amount,
        },
        0,
    ))
}

/// EVM -> ledger for the gas token: payable `withdraw(wallet)` on the
/// wrapper contract, the amount riding as transaction value.
pub fn neon_native_withdraw_data(
    wrapper_contract: &str,
    solana_wallet: &Pubkey,
    amount: impl Into<Amount>,
) -> Result<EvmCall, BridgeError> {
    let value = native_wei(amount)?;
    chain_evm::parse_address(wrapper_contract)?;

    Ok(EvmCall::new(
        wrapper_contract,
        &BridgeCall::Withdraw {
            destination: solana_wallet.to_bytes(),
        },
        value,
    ))
}

/// Wraps native value into the WNEON-style ERC20 wrapper via payable
/// `deposit()`.
pub fn neon_wrap_data(wrapper_contract: &str, amount: impl Into<Amount>) -> Result<EvmCall, BridgeError> {
    let value = native_wei(amount)?;
    chain_evm::parse_address(wrapper_contract)?;
    Ok(EvmCall::new(wrapper_contract, &BridgeCall::Deposit, value))
}

/// Unwraps WNEON back to native value via `withdraw(uint256)`.
pub fn neon_unwrap_data(wrapper_contract: &str, amount: impl Into<Amount>) -> Result<EvmCall, BridgeError> {
    let amount = native_wei(amount)?;
    chain_evm::parse_address(wrapper_contract)?;
    Ok(EvmCall::new(wrapper_contract, &BridgeCall::Unwrap { amount }, 0))
}

fn native_wei(amount: impl Into<Amount>) -> Result<u128, BridgeError> {
    to_full_amount(amount, NATIVE_DECIMALS)?
        .to_u128()
        .ok_or_else(|| BridgeError::Range("native amount exceeds 128 bits".into()))
}

/// `approveSolana` letting the ledger account `spender` pull tokens.
pub fn neon_approve_solana_data(
    token: &TokenDescriptor,
    spender: &Pubkey,
    amount: impl Into<Amount>,
) -> Result<EvmCall, BridgeError> {
    let full_amount = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;
    Ok(EvmCall::new(
        &token.address,
        &BridgeCall::ApproveSolana {
            spender: spender.to_bytes(),
            amount: full_amount,
        },
        0,
    ))
}

/// Ledger-side preparation for an incoming SPL transfer: creates the
/// recipient's associated token account when it does not exist.
///
/// Returns an empty list when nothing needs to happen.
pub async fn create_mint_solana_transaction<L: LedgerRpc + ?Sized>(
    ledger: &L,
    solana_wallet: &Pubkey,
    token: &TokenDescriptor,
) -> Result<Vec<BridgeInstruction>, BridgeError> {
    let destination = derive_associated_token_address(solana_wallet, &token.address_spl)?;
    if ledger.account_exists(&destination).await? {
        return Ok(Vec::new());
    }

    debug!(%destination, symbol = %token.symbol, "creating destination token account");
    Ok(vec![build_create_associated_token_account(
        solana_wallet,
        solana_wallet,
        &token.address_spl,
        false,
    )?
    .into()])
}
