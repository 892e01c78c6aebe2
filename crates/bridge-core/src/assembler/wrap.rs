use chain_sol::{
    build_create_associated_token_account, build_sync_native, build_system_transfer,
    derive_associated_token_address, Pubkey, NATIVE_MINT,
};
use tracing::{debug, info};

use crate::assembler::ensure_token_chain;
use crate::assembler::mint::mint_full_amount;
use crate::codec::{full_amount_to_u64, to_full_amount, Amount};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::ledger::LedgerRpc;
use crate::proxy::NeonProxyClient;
use crate::result::BridgeInstruction;
use crate::rpc::JsonRpcTransport;
use crate::tokens::TokenDescriptor;

/// Wraps native lamports into the wallet's native-mint token account and
/// mints the wrapped amount on the EVM side, in one transaction.
///
/// Order: create the token account if absent, move lamports in, sync the
/// token balance, then the mint instructions.
pub async fn create_wrap_and_transfer_sol_instructions<T, L>(
    config: &BridgeConfig,
    proxy: &NeonProxyClient<T>,
    ledger: &L,
    solana_wallet: &Pubkey,
    neon_wallet: &str,
    token: &TokenDescriptor,
    amount: impl Into<Amount>,
) -> Result<Vec<BridgeInstruction>, BridgeError>
where
    T: JsonRpcTransport,
    L: LedgerRpc + ?Sized,
{
    if token.address_spl != NATIVE_MINT {
        return Err(BridgeError::UnknownToken(format!(
            "{} is not the wrapped native token",
            token.symbol
        )));
    }

    ensure_token_chain(config, token)?;

    let lamports = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;
    let wrapped_account = derive_associated_token_address(solana_wallet, &NATIVE_MINT)?;

    let mut instructions: Vec<BridgeInstruction> = Vec::new();
    if !ledger.account_exists(&wrapped_account).await? {
        debug!(%wrapped_account, "creating wrapped native account");
        instructions.push(
            build_create_associated_token_account(solana_wallet, solana_wallet, &NATIVE_MINT, false)?
                .into(),
        );
    }
    instructions.push(build_system_transfer(solana_wallet, &wrapped_account, lamports).into());
    instructions.push(build_sync_native(&wrapped_account).into());

    let mint =
        mint_full_amount(config, proxy, ledger, solana_wallet, neon_wallet, token, lamports).await?;
    instructions.extend(mint);

    info!(lamports, instructions = instructions.len(), "assembled wrap and transfer");
    Ok(instructions)
}
