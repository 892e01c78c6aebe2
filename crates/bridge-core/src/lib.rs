//! Neon EVM bridge protocol.
//!
//! Builds the transactions that move tokens between the Solana ledger and
//! Neon EVM:
//! - amount scaling and fixed-width integer codecs
//! - Neon program-derived addresses
//! - Neon EVM program instructions
//! - transfer assemblers for deposit, mint/claim, wrap and withdraw flows
//! - proxy and ledger JSON-RPC clients with bundled offline snapshots
//!
//! Every assembler takes an explicit [`BridgeConfig`]; nothing is global.
//! The crate logs through `tracing` and never installs a subscriber.

pub mod assembler;
pub mod codec;
pub mod config;
pub mod derivation;
pub mod emulate;
pub mod error;
pub mod instructions;
pub mod ledger;
pub mod proxy;
pub mod result;
pub mod rpc;
pub mod tokens;

pub use codec::{
    format_amount, hex_to_bytes, is_valid_hex, number_to_64bit_le, to_big_int, to_bytes_int32,
    to_full_amount, to_u256_be, Amount,
};
pub use config::{BridgeConfig, Endpoints, GasToken, NeonProgramStatus, Network};
pub use derivation::{
    auth_account_address, authority_pool_address, collateral_pool_address,
    neon_balance_program_address, neon_wallet_program_address,
};
pub use emulate::{emulate_signer_private_key, EmulateSigner};
pub use error::BridgeError;
pub use ledger::{LedgerRpc, SolanaRpcClient};
pub use proxy::NeonProxyClient;
pub use result::{BridgeInstruction, EvmCall, TransactionResult};
pub use rpc::{HttpTransport, JsonRpcTransport};
pub use tokens::{find_token, TokenDescriptor};
