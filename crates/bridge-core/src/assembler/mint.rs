use chain_evm::{BridgeCall, LegacyTransaction, SignedEthTransaction};
use chain_sol::{build_spl_approve, derive_associated_token_address, Pubkey};
use tracing::{debug, info};

use crate::assembler::ensure_token_chain;
use crate::codec::{evm_address_bytes, full_amount_to_u64, to_full_amount, Amount};
use crate::config::BridgeConfig;
use crate::derivation::{auth_account_address, neon_balance_program_address, neon_wallet_program_address};
use crate::emulate::{EmulateSigner, EmulatedAccount};
use crate::error::BridgeError;
use crate::instructions::{create_account_balance_instruction, execute_from_instruction};
use crate::ledger::LedgerRpc;
use crate::proxy::NeonProxyClient;
use crate::result::BridgeInstruction;
use crate::rpc::JsonRpcTransport;
use crate::tokens::TokenDescriptor;

/// `claimTo(from, neon_wallet, amount)` call data, pulling from the
/// ledger token account `from_token_account`.
pub fn claim_transaction_data(
    from_token_account: &Pubkey,
    neon_wallet: &str,
    amount: u64,
) -> Result<Vec<u8>, BridgeError> {
    let to = evm_address_bytes(neon_wallet)?;
    Ok(BridgeCall::ClaimTo {
        from: from_token_account.to_bytes(),
        to,
        amount,
    }
    .calldata())
}

/// Signs the claim as a legacy transaction from the emulate signer, with
/// nonce, gas price and gas limit taken from the proxy.
pub async fn neon_claim_transaction_from_signer<T: JsonRpcTransport>(
    proxy: &NeonProxyClient<T>,
    signer: &EmulateSigner,
    token: &TokenDescriptor,
    claim_data: Vec<u8>,
    chain_id: u64,
) -> Result<SignedEthTransaction, BridgeError> {
    let nonce = proxy.transaction_count(signer.address()).await?;
    let gas_price = proxy.gas_price().await?;
    let gas_limit = proxy
        .estimate_gas(signer.address(), &token.address, &claim_data)
        .await?;

    let tx = LegacyTransaction {
        chain_id,
        nonce,
        gas_price,
        gas_limit,
        to: token.address.clone(),
        value: 0,
        data: claim_data,
    };
    let signed = signer.sign(&tx)?;
    debug!(signer = signer.address(), nonce, gas_limit, tx_hash = %signed.tx_hash, "signed claim");
    Ok(signed)
}

/// A signed claim together with the ledger accounts it touches.
#[derive(Debug, Clone)]
pub struct ClaimInstruction {
    pub neon_transaction: SignedEthTransaction,
    pub neon_keys: Vec<EmulatedAccount>,
}

/// Emulates the signed claim on the proxy to learn its account list.
pub async fn create_claim_instruction<T: JsonRpcTransport>(
    proxy: &NeonProxyClient<T>,
    neon_transaction: SignedEthTransaction,
) -> Result<ClaimInstruction, BridgeError> {
    let emulated = proxy.emulate(&neon_transaction.raw_tx).await?;
    if !emulated.succeeded() {
        return Err(BridgeError::Rpc(format!(
            "claim emulation failed: {} {}",
            emulated.exit_status, emulated.result
        )));
    }

    Ok(ClaimInstruction {
        neon_transaction,
        neon_keys: emulated.solana_accounts,
    })
}

/// Parties and amount of a mint, with the treasury pool chosen up front.
#[derive(Debug, Clone, Copy)]
pub struct MintAccounts<'a> {
    pub solana_wallet: Pubkey,
    pub neon_wallet: &'a str,
    /// Address of the emulate signer that signed the claim.
    pub emulate_signer: &'a str,
    pub token: &'a TokenDescriptor,
    pub amount: u64,
    pub pool_index: u32,
}

/// Ledger side of an ERC20-for-SPL mint.
///
/// Order: approve to the signer's AUTH account, create the signer's balance
/// account if absent, create the recipient's balance account if absent,
/// execute the claim.
pub async fn create_mint_neon_transaction<L: LedgerRpc + ?Sized>(
    config: &BridgeConfig,
    ledger: &L,
    accounts: &MintAccounts<'_>,
    claim: &ClaimInstruction,
) -> Result<Vec<BridgeInstruction>, BridgeError> {
    let program = &config.neon_evm_program;
    let payer = &accounts.solana_wallet;
    let token = accounts.token;

    let source = derive_associated_token_address(payer, &token.address_spl)?;
    let (delegate, _) = auth_account_address(accounts.emulate_signer, program, &token.address)?;
    let treasury_pool = config.treasury_pool_address(accounts.pool_index)?;

    let mut instructions: Vec<BridgeInstruction> =
        vec![build_spl_approve(&source, &delegate, payer, accounts.amount).into()];

    let (signer_balance, _) =
        neon_balance_program_address(accounts.emulate_signer, program, config.chain_id)?;
    for wallet in [accounts.emulate_signer, accounts.neon_wallet] {
        let (balance, _) = neon_balance_program_address(wallet, program, config.chain_id)?;
        if ledger.account_exists(&balance).await? {
            continue;
        }
        let (contract, _) = neon_wallet_program_address(wallet, program)?;
        debug!(wallet, %balance, "creating balance account");
        instructions.push(
            create_account_balance_instruction(program, payer, &balance, &contract, wallet, config.chain_id)?
                .into(),
        );
    }

    instructions.push(
        execute_from_instruction(
            program,
            payer,
            &treasury_pool,
            &signer_balance,
            accounts.pool_index,
            &claim.neon_transaction.raw_tx,
            &claim.neon_keys,
        )?
        .into(),
    );

    Ok(instructions)
}

/// Full ledger -> EVM mint of an ERC20-for-SPL token.
pub async fn neon_transfer_mint_instructions<T, L>(
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
    let full_amount = full_amount_to_u64(&to_full_amount(amount, token.decimals)?)?;
    mint_full_amount(config, proxy, ledger, solana_wallet, neon_wallet, token, full_amount).await
}

pub(crate) async fn mint_full_amount<T, L>(
    config: &BridgeConfig,
    proxy: &NeonProxyClient<T>,
    ledger: &L,
    solana_wallet: &Pubkey,
    neon_wallet: &str,
    token: &TokenDescriptor,
    full_amount: u64,
) -> Result<Vec<BridgeInstruction>, BridgeError>
where
    T: JsonRpcTransport,
    L: LedgerRpc + ?Sized,
{
    ensure_token_chain(config, token)?;
    let signer = EmulateSigner::new(solana_wallet, neon_wallet)?;
    let source = derive_associated_token_address(solana_wallet, &token.address_spl)?;

    let data = claim_transaction_data(&source, neon_wallet, full_amount)?;
    let signed = neon_claim_transaction_from_signer(proxy, &signer, token, data, config.chain_id).await?;
    let claim = create_claim_instruction(proxy, signed).await?;

    let accounts = MintAccounts {
        solana_wallet: *solana_wallet,
        neon_wallet,
        emulate_signer: signer.address(),
        token,
        amount: full_amount,
        pool_index: config.random_pool_index(),
    };
    let instructions = create_mint_neon_transaction(config, ledger, &accounts, &claim).await?;

    info!(
        symbol = %token.symbol,
        full_amount,
        instructions = instructions.len(),
        "assembled mint transfer"
    );
    Ok(instructions)
}
