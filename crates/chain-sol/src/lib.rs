//! Solana ledger primitives for the Neon bridge.
//!
//! Address handling, program-derived address search, token-program
//! instructions and the compact transaction wire format, all without pulling
//! in `solana-sdk`. Ed25519 signing uses `ed25519-dalek`; the off-curve check
//! for PDAs uses `curve25519-dalek`.

pub mod address;
pub mod error;
pub mod pda;
pub mod spl_token;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, validate_address, Pubkey};
pub use error::SolError;
pub use pda::{create_program_address, find_program_address};
pub use spl_token::{
    build_create_associated_token_account, build_spl_approve, build_spl_transfer,
    build_sync_native, derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT,
    TOKEN_PROGRAM_ID,
};
pub use transaction::{
    build_system_transfer, compile_transaction, encode_compact_u16, serialize_message,
    serialize_unsigned, sign_transaction, CompiledInstruction, SolAccountMeta, SolInstruction,
    SolTransaction, SYSTEM_PROGRAM_ID,
};
