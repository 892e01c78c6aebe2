use thiserror::Error;

/// EVM-side errors.
#[derive(Debug, Error)]
pub enum EvmError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),
}
