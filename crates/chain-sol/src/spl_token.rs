//! SPL Token and Associated Token Account instructions.
//!
//! Hand-encoded so the bridge does not pull in `spl-token`. Each builder
//! returns a [`SolInstruction`] whose data and account order match the
//! on-chain programs byte for byte.

use crate::address::Pubkey;
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Wrapped SOL mint: `So11111111111111111111111111111111111111112`
pub const NATIVE_MINT: Pubkey = Pubkey::new_from_array([
    0x06, 0x9b, 0x88, 0x57, 0xfe, 0xab, 0x81, 0x84, 0xfb, 0x68, 0x7f, 0x63, 0x46, 0x18, 0xc0,
    0x35, 0xda, 0xc4, 0x39, 0xdc, 0x1a, 0xeb, 0x3b, 0x55, 0x98, 0xa0, 0xf0, 0x00, 0x00, 0x00,
    0x00, 0x01,
]);

// Token program instruction indices.
const TRANSFER_IX: u8 = 3;
const APPROVE_IX: u8 = 4;
const SYNC_NATIVE_IX: u8 = 17;

// Associated token program instruction indices.
const ATA_CREATE_IX: u8 = 0;
const ATA_CREATE_IDEMPOTENT_IX: u8 = 1;

// ---------------------------------------------------------------------------
// Token program
// ---------------------------------------------------------------------------

/// Build an SPL Token `Transfer` instruction.
///
/// Data is `[3] || u64 LE amount`; accounts are
/// `[source (w), destination (w), owner (s)]`.
pub fn build_spl_transfer(
    from_token_account: &Pubkey,
    to_token_account: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "SPL transfer amount must be > 0".into(),
        ));
    }

    Ok(SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from_token_account, false),
            SolAccountMeta::writable(*to_token_account, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data: amount_data(TRANSFER_IX, amount),
    })
}

/// Build an SPL Token `Approve` instruction delegating `amount` base units
/// of `source` to `delegate`.
///
/// Data is `[4] || u64 LE amount`; accounts are
/// `[source (w), delegate, owner (s)]`.
pub fn build_spl_approve(
    source: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*source, false),
            SolAccountMeta::readonly(*delegate, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data: amount_data(APPROVE_IX, amount),
    }
}

/// Build an SPL Token `SyncNative` instruction.
///
/// Brings a wrapped-SOL account's token amount in line with its lamports.
pub fn build_sync_native(native_account: &Pubkey) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*native_account, false)],
        data: vec![SYNC_NATIVE_IX],
    }
}

fn amount_data(index: u8, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(index);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

// ---------------------------------------------------------------------------
// Associated Token Account
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// Seeds are `[wallet, token_program_id, mint]` under the associated token
/// program. The wallet may itself be a PDA (an off-curve owner).
pub fn derive_associated_token_address(
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Build the instruction creating `wallet`'s associated token account for
/// `mint`, funded by `payer`.
///
/// With `idempotent` the instruction succeeds when the account already
/// exists; otherwise a second create for the same account fails on-chain.
pub fn build_create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    idempotent: bool,
) -> Result<SolInstruction, SolError> {
    let associated = derive_associated_token_address(wallet, mint)?;
    let index = if idempotent {
        ATA_CREATE_IDEMPOTENT_IX
    } else {
        ATA_CREATE_IX
    };

    Ok(SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*payer, true),
            SolAccountMeta::writable(associated, false),
            SolAccountMeta::readonly(*wallet, false),
            SolAccountMeta::readonly(*mint, false),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![index],
    })
}
