use chain_sol::{build_spl_approve, derive_associated_token_address, Pubkey};
use tracing::{debug, info};

use crate::assembler::{deposit_pool_address, ensure_gas_token};
use crate::codec::{full_amount_to_u64, to_full_amount, Amount};
use crate::config::BridgeConfig;
use crate::derivation::{neon_balance_program_address, neon_wallet_program_address};
use crate::error::BridgeError;
use crate::instructions::{
    create_account_v3_instruction, deposit_legacy_instruction, deposit_to_balance_instruction,
    transfer_reward_instruction, DepositAccounts,
};
use crate::ledger::LedgerRpc;
use crate::result::{to_ledger_transaction, BridgeInstruction, TransactionResult};
use crate::tokens::TokenDescriptor;

/// A service fee taken alongside a transfer.
#[derive(Debug, Clone)]
pub struct ServiceReward {
    pub wallet: Pubkey,
    pub amount: Amount,
}

/// Ledger -> EVM transfer of the gas token into `neon_wallet`'s balance on
/// `config.chain_id`.
///
/// Approve and deposit always travel together; the reward transfer is
/// appended only when a service reward is given.
pub fn solana_neon_transfer_instructions(
    config: &BridgeConfig,
    solana_wallet: &Pubkey,
    neon_wallet: &str,
    token: &TokenDescriptor,
    amount: impl Into<Amount>,
    reward: Option<&ServiceReward>,
) -> Result<Vec<BridgeInstruction>, BridgeError> {
    ensure_gas_token(config, token)?;
    let program = &config.neon_evm_program;
    let full_amount = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;

    let (balance, _) = neon_balance_program_address(neon_wallet, program, config.chain_id)?;
    let (contract, _) = neon_wallet_program_address(neon_wallet, program)?;
    let source = derive_associated_token_address(solana_wallet, &token.address_spl)?;
    let pool = deposit_pool_address(program, &token.address_spl)?;

    let mut instructions: Vec<BridgeInstruction> = vec![
        build_spl_approve(&source, &balance, solana_wallet, full_amount).into(),
        deposit_to_balance_instruction(
            program,
            &DepositAccounts {
                token_mint: token.address_spl,
                source,
                pool,
                balance,
                contract,
                payer: *solana_wallet,
            },
            neon_wallet,
            config.chain_id,
        )?
        .into(),
    ];

    if let Some(reward) = reward {
        let reward_amount = full_amount_to_u64(&to_full_amount(reward.amount.clone(), token.decimals)?)?;
        let service_account = derive_associated_token_address(&reward.wallet, &token.address_spl)?;
        debug!(service = %reward.wallet, reward_amount, "appending service reward");
        instructions.push(
            transfer_reward_instruction(&source, &service_account, solana_wallet, reward_amount)?.into(),
        );
    }

    info!(
        %solana_wallet,
        neon_wallet,
        full_amount,
        instructions = instructions.len(),
        "assembled native transfer"
    );
    Ok(instructions)
}

/// [`solana_neon_transfer_instructions`] compiled into a ledger transaction
/// paid by `solana_wallet`.
pub fn solana_neon_transfer_transaction(
    config: &BridgeConfig,
    solana_wallet: &Pubkey,
    neon_wallet: &str,
    token: &TokenDescriptor,
    amount: impl Into<Amount>,
    reward: Option<&ServiceReward>,
    recent_blockhash: &[u8; 32],
) -> Result<TransactionResult, BridgeError> {
    let instructions =
        solana_neon_transfer_instructions(config, solana_wallet, neon_wallet, token, amount, reward)?;
    to_ledger_transaction(&instructions, solana_wallet, recent_blockhash)
}

/// Single-chain deposit into `neon_wallet`'s shadow account.
///
/// Creates the shadow account first when the ledger does not know it yet.
pub async fn solana_neon_transfer_legacy_instructions<L: LedgerRpc + ?Sized>(
    config: &BridgeConfig,
    ledger: &L,
    solana_wallet: &Pubkey,
    neon_wallet: &str,
    token: &TokenDescriptor,
    amount: impl Into<Amount>,
) -> Result<Vec<BridgeInstruction>, BridgeError> {
    ensure_gas_token(config, token)?;
    let program = &config.neon_evm_program;
    let full_amount = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;

    let (wallet_pda, _) = neon_wallet_program_address(neon_wallet, program)?;
    let source = derive_associated_token_address(solana_wallet, &token.address_spl)?;
    let pool = deposit_pool_address(program, &token.address_spl)?;

    let mut instructions = Vec::with_capacity(3);
    if !ledger.account_exists(&wallet_pda).await? {
        debug!(%wallet_pda, "creating neon wallet account");
        instructions.push(
            create_account_v3_instruction(program, solana_wallet, &wallet_pda, neon_wallet)?.into(),
        );
    }
    instructions.push(build_spl_approve(&source, &wallet_pda, solana_wallet, full_amount).into());
    instructions.push(
        deposit_legacy_instruction(program, &source, &pool, &wallet_pda, solana_wallet, neon_wallet)?
            .into(),
    );

    info!(instructions = instructions.len(), "assembled legacy deposit");
    Ok(instructions)
}
