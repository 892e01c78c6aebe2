//! Solana transaction wire format, compilation and signing.
//!
//! The wire format is a compact binary layout:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! Instruction order inside a transaction is preserved exactly as given: the
//! runtime executes them in sequence and applies all or none.

use ed25519_dalek::Signer;
use zeroize::Zeroize;

use crate::address::Pubkey;
use crate::error::SolError;

// ---------------------------------------------------------------------------
// Solana System Program
// ---------------------------------------------------------------------------

/// The Solana System Program public key: 32 zero bytes.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// System Program `Transfer` instruction index (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in Solana's compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let value = u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("{what} length {len} exceeds u16")))?;
    Ok(encode_compact_u16(value))
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolAccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl SolAccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A Solana instruction (before it is compiled into a transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolInstruction {
    pub program_id: Pubkey,
    pub accounts: Vec<SolAccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled Solana transaction message.
#[derive(Debug, Clone)]
pub struct SolTransaction {
    /// All account keys referenced by this transaction, in canonical order:
    ///   1. writable signers
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Pubkey>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    pub recent_blockhash: [u8; 32],

    /// Compiled instructions (account references replaced with indices).
    pub compiled_instructions: Vec<CompiledInstruction>,
}

impl SolTransaction {
    pub fn fee_payer(&self) -> &Pubkey {
        &self.account_keys[0]
    }
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the transaction's `account_keys` array.
#[derive(Debug, Clone)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Transaction building
// ---------------------------------------------------------------------------

/// Build a System Program `Transfer` instruction moving `lamports` from
/// `from` (signer) to `to`.
pub fn build_system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> SolInstruction {
    // u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    SolInstruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::writable(*from, true),
            SolAccountMeta::writable(*to, false),
        ],
        data,
    }
}

/// Compile a non-empty, ordered list of instructions into a transaction
/// message paid for by `fee_payer`.
///
/// The fee payer is always the first signer and is placed at index 0.
pub fn compile_transaction(
    instructions: &[SolInstruction],
    fee_payer: &Pubkey,
    recent_blockhash: &[u8; 32],
) -> Result<SolTransaction, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "transaction needs at least one instruction".into(),
        ));
    }

    struct AccountEntry {
        pubkey: Pubkey,
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        upsert(ix.program_id, false, false);
    }

    // Stable sort keeps insertion order within each category, so the fee
    // payer stays first among writable signers.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize + 1 {
        return Err(SolError::TransactionBuildError(format!(
            "too many accounts: {}",
            entries.len()
        )));
    }

    let count = |f: fn(&AccountEntry) -> bool| -> Result<u8, SolError> {
        let n = entries.iter().filter(|e| f(e)).count();
        u8::try_from(n).map_err(|_| SolError::TransactionBuildError(format!("header count {n} exceeds 255")))
    };
    let num_signers = count(|e| e.is_signer)?;
    let num_readonly_signed = count(|e| e.is_signer && !e.is_writable)?;
    let num_readonly_unsigned = count(|e| !e.is_signer && !e.is_writable)?;

    let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &Pubkey| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError(format!("{key} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey))
            .collect::<Result<Vec<u8>, _>>()?;

        compiled.push(CompiledInstruction {
            program_id_index: index_of(&ix.program_id)?,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(SolTransaction {
        account_keys,
        num_required_signatures: num_signers,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        compiled_instructions: compiled,
    })
}

/// Serialize the transaction message (the bytes that get signed).
pub fn serialize_message(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let mut buf = Vec::with_capacity(256);

    buf.push(tx.num_required_signatures);
    buf.push(tx.num_readonly_signed);
    buf.push(tx.num_readonly_unsigned);

    buf.extend_from_slice(&compact_len(tx.account_keys.len(), "account keys")?);
    for key in &tx.account_keys {
        buf.extend_from_slice(key.as_ref());
    }

    buf.extend_from_slice(&tx.recent_blockhash);

    buf.extend_from_slice(&compact_len(tx.compiled_instructions.len(), "instructions")?);
    for ix in &tx.compiled_instructions {
        buf.push(ix.program_id_index);

        buf.extend_from_slice(&compact_len(ix.account_indices.len(), "instruction accounts")?);
        buf.extend_from_slice(&ix.account_indices);

        buf.extend_from_slice(&compact_len(ix.data.len(), "instruction data")?);
        buf.extend_from_slice(&ix.data);
    }

    Ok(buf)
}

/// Serialize the transaction with zeroed signature slots, ready to be handed
/// to an external wallet for signing.
pub fn serialize_unsigned(tx: &SolTransaction) -> Result<Vec<u8>, SolError> {
    let message = serialize_message(tx)?;
    let num_sigs = tx.num_required_signatures as usize;

    let mut wire = Vec::with_capacity(3 + num_sigs * 64 + message.len());
    wire.extend_from_slice(&encode_compact_u16(num_sigs as u16));
    wire.resize(wire.len() + num_sigs * 64, 0);
    wire.extend_from_slice(&message);

    Ok(wire)
}

/// Sign and serialize a single-signer transaction into its wire format.
///
/// The private key is the 32-byte Ed25519 seed of the fee payer.
pub fn sign_transaction(tx: &SolTransaction, private_key: &[u8; 32]) -> Result<Vec<u8>, SolError> {
    if tx.num_required_signatures != 1 {
        return Err(SolError::TransactionBuildError(format!(
            "expected exactly one signer, transaction requires {}",
            tx.num_required_signatures
        )));
    }

    let message_bytes = serialize_message(tx)?;

    let mut seed = *private_key;
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&seed);
    seed.zeroize();

    if signing_key.verifying_key().to_bytes() != tx.fee_payer().to_bytes() {
        return Err(SolError::TransactionBuildError(
            "signing key does not match the fee payer".into(),
        ));
    }

    let signature = signing_key.sign(&message_bytes);

    let mut wire = Vec::with_capacity(1 + 64 + message_bytes.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(&signature.to_bytes());
    wire.extend_from_slice(&message_bytes);

    Ok(wire)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(b: u8) -> Pubkey {
        Pubkey::new_from_array([b; 32])
    }

    // -- compact-u16 encoding -----------------------------------------------

    #[test]
    fn compact_u16_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(128), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(16383), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    // -- System transfer ----------------------------------------------------

    #[test]
    fn system_transfer_layout() {
        let ix = build_system_transfer(&key(1), &key(2), 1_000_000);

        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
    }

    // -- Compilation --------------------------------------------------------

    #[test]
    fn empty_instruction_list_rejected() {
        let err = compile_transaction(&[], &key(1), &[0u8; 32]).unwrap_err();
        assert!(err.to_string().contains("at least one instruction"));
    }

    #[test]
    fn fee_payer_first_and_header_counts() {
        let ix = build_system_transfer(&key(1), &key(2), 1000);
        let tx = compile_transaction(&[ix], &key(1), &[0xAA; 32]).unwrap();

        assert_eq!(tx.account_keys.len(), 3);
        assert_eq!(*tx.fee_payer(), key(1));
        assert_eq!(tx.num_required_signatures, 1);
        assert_eq!(tx.num_readonly_signed, 0);
        assert_eq!(tx.num_readonly_unsigned, 1);
        assert_eq!(tx.recent_blockhash, [0xAA; 32]);
    }

    #[test]
    fn instruction_order_is_preserved() {
        let first = build_system_transfer(&key(1), &key(2), 1);
        let second = build_system_transfer(&key(1), &key(3), 2);
        let tx = compile_transaction(&[first, second], &key(1), &[0u8; 32]).unwrap();

        assert_eq!(tx.compiled_instructions.len(), 2);
        assert_eq!(&tx.compiled_instructions[0].data[4..], &1u64.to_le_bytes());
        assert_eq!(&tx.compiled_instructions[1].data[4..], &2u64.to_le_bytes());
    }

    #[test]
    fn duplicate_accounts_merge_permissions() {
        let readonly = SolInstruction {
            program_id: key(9),
            accounts: vec![SolAccountMeta::readonly(key(5), false)],
            data: vec![],
        };
        let writable = SolInstruction {
            program_id: key(9),
            accounts: vec![SolAccountMeta::writable(key(5), false)],
            data: vec![],
        };
        let tx = compile_transaction(&[readonly, writable], &key(1), &[0u8; 32]).unwrap();

        // payer, key(5) writable, program read-only
        assert_eq!(tx.account_keys, vec![key(1), key(5), key(9)]);
        assert_eq!(tx.num_readonly_unsigned, 1);
    }

    #[test]
    fn self_transfer_deduplicates_accounts() {
        let ix = build_system_transfer(&key(0xAA), &key(0xAA), 100);
        let tx = compile_transaction(&[ix], &key(0xAA), &[0u8; 32]).unwrap();
        assert_eq!(tx.account_keys.len(), 2);
    }

    // -- Serialization ------------------------------------------------------

    #[test]
    fn message_contains_blockhash_after_keys() {
        let ix = build_system_transfer(&key(1), &key(2), 500);
        let tx = compile_transaction(&[ix], &key(1), &[0xCC; 32]).unwrap();
        let msg = serialize_message(&tx).unwrap();

        assert_eq!(msg[0], tx.num_required_signatures);
        let offset = 3 + 1 + 32 * tx.account_keys.len();
        assert_eq!(&msg[offset..offset + 32], &[0xCC; 32]);
    }

    #[test]
    fn unsigned_wire_has_empty_signature_slots() {
        let ix = build_system_transfer(&key(1), &key(2), 500);
        let tx = compile_transaction(&[ix], &key(1), &[0u8; 32]).unwrap();
        let wire = serialize_unsigned(&tx).unwrap();
        let msg = serialize_message(&tx).unwrap();

        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], &[0u8; 64]);
        assert_eq!(&wire[65..], msg.as_slice());
    }

    // -- Signing ------------------------------------------------------------

    #[test]
    fn sign_transaction_produces_verifiable_signature() {
        use ed25519_dalek::{Signature, VerifyingKey};

        let private_key = [0x42u8; 32];
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&private_key);
        let payer = Pubkey::new_from_array(signing_key.verifying_key().to_bytes());

        let ix = build_system_transfer(&payer, &key(0xBB), 1_000_000);
        let tx = compile_transaction(&[ix], &payer, &[0xCC; 32]).unwrap();
        let wire = sign_transaction(&tx, &private_key).unwrap();

        assert_eq!(wire[0], 0x01);
        let sig_bytes: [u8; 64] = wire[1..65].try_into().unwrap();
        let signature = Signature::from_bytes(&sig_bytes);
        let vk = VerifyingKey::from_bytes(&payer.to_bytes()).unwrap();
        assert!(vk.verify_strict(&wire[65..], &signature).is_ok());
    }

    #[test]
    fn sign_with_wrong_key_fails() {
        let ix = build_system_transfer(&key(1), &key(2), 10);
        let tx = compile_transaction(&[ix], &key(1), &[0u8; 32]).unwrap();
        let err = sign_transaction(&tx, &[0x42u8; 32]).unwrap_err();
        assert!(err.to_string().contains("fee payer"));
    }

    #[test]
    fn two_hundred_fifty_six_signers_rejected() {
        let payer = Pubkey::new_from_array([0; 32]);
        let accounts = (1..=255u8)
            .map(|i| SolAccountMeta::writable(Pubkey::new_from_array([i; 32]), true))
            .collect();
        let ix = SolInstruction {
            program_id: Pubkey::new_from_array([1; 32]),
            accounts,
            data: vec![],
        };

        let err = compile_transaction(&[ix], &payer, &[0; 32]).unwrap_err();
        assert!(err.to_string().contains("exceeds 255"));
    }
}
