//! Neon EVM program instructions.
//!
//! Each builder takes already-derived addresses and returns one ledger
//! instruction. The Neon program reads accounts by position, so account order
//! is part of the wire format.

use chain_sol::{
    build_spl_transfer, Pubkey, SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};

use crate::codec::{evm_address_bytes, number_to_64bit_le, to_bytes_int32};
use crate::emulate::EmulatedAccount;
use crate::error::BridgeError;

/// Opcodes of the Neon EVM program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EvmInstruction {
    DepositV03 = 0x27,
    CreateAccountV03 = 0x28,
    AccountCreateBalance = 0x30,
    DepositToBalance = 0x31,
    TransactionExecuteFromInstruction = 0x32,
}

impl EvmInstruction {
    pub fn opcode(self) -> u8 {
        self as u8
    }
}

fn payload(op: EvmInstruction, neon_wallet: &str, chain_id: Option<u64>) -> Result<Vec<u8>, BridgeError> {
    let address = evm_address_bytes(neon_wallet)?;
    let mut data = Vec::with_capacity(1 + 20 + 8);
    data.push(op.opcode());
    data.extend_from_slice(&address);
    if let Some(chain_id) = chain_id {
        data.extend_from_slice(&number_to_64bit_le(chain_id));
    }
    Ok(data)
}

/// Creates the shadow account of `neon_wallet`.
///
/// Data: `[0x28] || evm_address`.
/// Accounts: `[solana_wallet (s, w), system, neon_wallet_pda (w)]`.
pub fn create_account_v3_instruction(
    program_id: &Pubkey,
    solana_wallet: &Pubkey,
    neon_wallet_pda: &Pubkey,
    neon_wallet: &str,
) -> Result<SolInstruction, BridgeError> {
    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(*solana_wallet, true),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::writable(*neon_wallet_pda, false),
        ],
        data: payload(EvmInstruction::CreateAccountV03, neon_wallet, None)?,
    })
}

/// Creates the per-chain balance account of `neon_wallet`.
///
/// Data: `[0x30] || evm_address || u64_le(chain_id)`.
/// Accounts: `[payer (s, w), system, balance (w), contract (w)]`.
pub fn create_account_balance_instruction(
    program_id: &Pubkey,
    payer: &Pubkey,
    balance_address: &Pubkey,
    contract_address: &Pubkey,
    neon_wallet: &str,
    chain_id: u64,
) -> Result<SolInstruction, BridgeError> {
    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::writable(*balance_address, false),
            SolAccountMeta::writable(*contract_address, false),
        ],
        data: payload(EvmInstruction::AccountCreateBalance, neon_wallet, Some(chain_id))?,
    })
}

/// Addresses a [`deposit_to_balance_instruction`] reads, in wire order.
#[derive(Debug, Clone, Copy)]
pub struct DepositAccounts {
    pub token_mint: Pubkey,
    pub source: Pubkey,
    pub pool: Pubkey,
    pub balance: Pubkey,
    pub contract: Pubkey,
    pub payer: Pubkey,
}

/// Moves delegated tokens from `source` into the EVM balance of
/// `neon_wallet` on `chain_id`.
///
/// Data: `[0x31] || evm_address || u64_le(chain_id)`.
/// Accounts: `[mint (w), source (w), pool (w), balance (w), contract (w),
/// token program, payer (s, w), system]`.
pub fn deposit_to_balance_instruction(
    program_id: &Pubkey,
    accounts: &DepositAccounts,
    neon_wallet: &str,
    chain_id: u64,
) -> Result<SolInstruction, BridgeError> {
    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(accounts.token_mint, false),
            SolAccountMeta::writable(accounts.source, false),
            SolAccountMeta::writable(accounts.pool, false),
            SolAccountMeta::writable(accounts.balance, false),
            SolAccountMeta::writable(accounts.contract, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
            SolAccountMeta::writable(accounts.payer, true),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: payload(EvmInstruction::DepositToBalance, neon_wallet, Some(chain_id))?,
    })
}

/// Single-chain deposit used before per-chain balances existed.
///
/// Data: `[0x27] || evm_address`.
/// Accounts: `[source (w), pool (w), neon_wallet_pda (w), token program,
/// payer (s, w), system]`.
pub fn deposit_legacy_instruction(
    program_id: &Pubkey,
    source: &Pubkey,
    pool: &Pubkey,
    neon_wallet_pda: &Pubkey,
    payer: &Pubkey,
    neon_wallet: &str,
) -> Result<SolInstruction, BridgeError> {
    Ok(SolInstruction {
        program_id: *program_id,
        accounts: vec![
            SolAccountMeta::writable(*source, false),
            SolAccountMeta::writable(*pool, false),
            SolAccountMeta::writable(*neon_wallet_pda, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
        ],
        data: payload(EvmInstruction::DepositV03, neon_wallet, None)?,
    })
}

/// Service fee transfer between two token accounts, signed by `owner`.
pub fn transfer_reward_instruction(
    from_token_account: &Pubkey,
    to_token_account: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<SolInstruction, BridgeError> {
    Ok(build_spl_transfer(from_token_account, to_token_account, owner, amount)?)
}

/// Executes a signed EVM transaction carried inside the instruction.
///
/// Data: `[0x32] || int32_le(pool_index) || signed_tx`.
/// Accounts: `[payer (s, w), treasury_pool (w), signer_balance (w),
/// system (w), ...emulated accounts]`.
pub fn execute_from_instruction(
    program_id: &Pubkey,
    payer: &Pubkey,
    treasury_pool: &Pubkey,
    signer_balance: &Pubkey,
    pool_index: u32,
    signed_tx: &[u8],
    emulated: &[EmulatedAccount],
) -> Result<SolInstruction, BridgeError> {
    if signed_tx.is_empty() {
        return Err(BridgeError::Encoding("signed transaction is empty".into()));
    }

    let mut data = Vec::with_capacity(1 + 4 + signed_tx.len());
    data.push(EvmInstruction::TransactionExecuteFromInstruction.opcode());
    data.extend_from_slice(&to_bytes_int32(pool_index, true));
    data.extend_from_slice(signed_tx);

    let mut accounts = vec![
        SolAccountMeta::writable(*payer, true),
        SolAccountMeta::writable(*treasury_pool, false),
        SolAccountMeta::writable(*signer_balance, false),
        SolAccountMeta::writable(SYSTEM_PROGRAM_ID, false),
    ];
    accounts.extend(emulated.iter().map(|acc| SolAccountMeta {
        pubkey: acc.pubkey,
        is_signer: false,
        is_writable: acc.is_writable,
    }));

    Ok(SolInstruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVM: &str = "0x1234567890abcdef1234567890abcdef1234abcd";

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    #[test]
    fn opcodes_match_program_table() {
        assert_eq!(EvmInstruction::DepositV03.opcode(), 0x27);
        assert_eq!(EvmInstruction::CreateAccountV03.opcode(), 0x28);
        assert_eq!(EvmInstruction::AccountCreateBalance.opcode(), 0x30);
        assert_eq!(EvmInstruction::DepositToBalance.opcode(), 0x31);
        assert_eq!(EvmInstruction::TransactionExecuteFromInstruction.opcode(), 0x32);
    }

    #[test]
    fn create_account_layout() {
        let ix = create_account_v3_instruction(&key(9), &key(1), &key(2), EVM).unwrap();
        assert_eq!(ix.data.len(), 21);
        assert_eq!(ix.data[0], 0x28);
        assert_eq!(hex::encode(&ix.data[1..]), &EVM[2..]);

        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[1].pubkey, SYSTEM_PROGRAM_ID);
        assert!(ix.accounts[2].is_writable);
        assert_eq!(ix.program_id, key(9));
    }

    #[test]
    fn deposit_to_balance_layout() {
        let accounts = DepositAccounts {
            token_mint: key(1),
            source: key(2),
            pool: key(3),
            balance: key(4),
            contract: key(5),
            payer: key(6),
        };
        let ix = deposit_to_balance_instruction(&key(9), &accounts, EVM, 245022926).unwrap();

        assert_eq!(ix.data.len(), 29);
        assert_eq!(ix.data[0], 0x31);
        assert_eq!(&ix.data[21..], &245022926u64.to_le_bytes());

        let order: Vec<Pubkey> = ix.accounts.iter().map(|a| a.pubkey).collect();
        assert_eq!(
            order,
            vec![key(1), key(2), key(3), key(4), key(5), TOKEN_PROGRAM_ID, key(6), SYSTEM_PROGRAM_ID]
        );
        let signers: Vec<bool> = ix.accounts.iter().map(|a| a.is_signer).collect();
        assert_eq!(signers, vec![false, false, false, false, false, false, true, false]);
        assert!(!ix.accounts[5].is_writable);
    }

    #[test]
    fn account_create_balance_layout() {
        let ix = create_account_balance_instruction(&key(9), &key(1), &key(2), &key(3), EVM, 111)
            .unwrap();
        assert_eq!(ix.data[0], 0x30);
        assert_eq!(&ix.data[21..], &[111, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(ix.accounts.len(), 4);
        assert!(ix.accounts[0].is_signer);
    }

    #[test]
    fn legacy_deposit_has_no_chain_id() {
        let ix = deposit_legacy_instruction(&key(9), &key(1), &key(2), &key(3), &key(4), EVM).unwrap();
        assert_eq!(ix.data.len(), 21);
        assert_eq!(ix.data[0], 0x27);
        assert_eq!(ix.accounts[3].pubkey, TOKEN_PROGRAM_ID);
        assert!(ix.accounts[4].is_signer);
    }

    #[test]
    fn execute_appends_emulated_accounts() {
        let emulated = vec![
            EmulatedAccount {
                pubkey: key(7),
                is_writable: true,
                is_legacy: false,
            },
            EmulatedAccount {
                pubkey: key(8),
                is_writable: false,
                is_legacy: true,
            },
        ];
        let ix = execute_from_instruction(&key(9), &key(1), &key(2), &key(3), 5, &[0xf8, 0x01], &emulated)
            .unwrap();

        assert_eq!(ix.data, vec![0x32, 5, 0, 0, 0, 0xf8, 0x01]);
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[3].is_writable);
        assert_eq!(ix.accounts[4].pubkey, key(7));
        assert!(!ix.accounts[5].is_writable);
    }

    #[test]
    fn execute_rejects_empty_tx() {
        let err = execute_from_instruction(&key(9), &key(1), &key(2), &key(3), 0, &[], &[]).unwrap_err();
        assert!(matches!(err, BridgeError::Encoding(_)));
    }

    #[test]
    fn malformed_wallet_rejected() {
        assert!(create_account_v3_instruction(&key(9), &key(1), &key(2), "0xnothex").is_err());
    }

    #[test]
    fn reward_transfer_uses_token_program() {
        let ix = transfer_reward_instruction(&key(1), &key(2), &key(3), 50).unwrap();
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ix.data[0], 3);
        assert!(transfer_reward_instruction(&key(1), &key(2), &key(3), 0).is_err());
    }
}
