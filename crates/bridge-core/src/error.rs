use chain_evm::EvmError;
use chain_sol::SolError;
use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Validation kinds (`InvalidHex`, `InvalidAmount`, `Range`) are raised
/// before any instruction is built. `Rpc` is the only kind worth retrying.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("value out of range: {0}")]
    Range(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<SolError> for BridgeError {
    fn from(err: SolError) -> Self {
        match err {
            SolError::InvalidAddress(msg) => BridgeError::InvalidAddress(msg),
            SolError::InvalidSeeds(msg) => BridgeError::Encoding(format!("seeds: {msg}")),
            SolError::TransactionBuildError(msg) | SolError::SerializationError(msg) => {
                BridgeError::Encoding(msg)
            }
        }
    }
}

impl From<EvmError> for BridgeError {
    fn from(err: EvmError) -> Self {
        match err {
            EvmError::InvalidAddress(msg) => BridgeError::InvalidAddress(msg),
            EvmError::InvalidPrivateKey(msg) | EvmError::SigningError(msg) => {
                BridgeError::Signing(msg)
            }
            EvmError::TransactionBuildError(msg) => BridgeError::Encoding(msg),
            EvmError::UnsupportedChain(id) => BridgeError::Config(format!("unsupported chain {id}")),
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::Rpc(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Rpc(format!("malformed json: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_hex() {
        let err = BridgeError::InvalidHex("0xZZZ".into());
        assert_eq!(err.to_string(), "invalid hex: 0xZZZ");
    }

    #[test]
    fn display_invalid_amount() {
        let err = BridgeError::InvalidAmount("-1".into());
        assert_eq!(err.to_string(), "invalid amount: -1");
    }

    #[test]
    fn display_range() {
        let err = BridgeError::Range("exceeds 2^256-1".into());
        assert_eq!(err.to_string(), "value out of range: exceeds 2^256-1");
    }

    #[test]
    fn display_rpc() {
        let err = BridgeError::Rpc("connection refused".into());
        assert_eq!(err.to_string(), "rpc error: connection refused");
    }

    #[test]
    fn display_encoding() {
        let err = BridgeError::Encoding("expected 20 bytes".into());
        assert_eq!(err.to_string(), "encoding error: expected 20 bytes");
    }

    #[test]
    fn display_unknown_token() {
        let err = BridgeError::UnknownToken("FOO".into());
        assert_eq!(err.to_string(), "unknown token: FOO");
    }

    #[test]
    fn sol_errors_map_to_kinds() {
        let err: BridgeError = SolError::InvalidAddress("bad".into()).into();
        assert!(matches!(err, BridgeError::InvalidAddress(_)));

        let err: BridgeError = SolError::SerializationError("short".into()).into();
        assert!(matches!(err, BridgeError::Encoding(_)));
    }

    #[test]
    fn evm_errors_map_to_kinds() {
        let err: BridgeError = EvmError::InvalidAddress("bad".into()).into();
        assert!(matches!(err, BridgeError::InvalidAddress(_)));

        let err: BridgeError = EvmError::InvalidPrivateKey("zero".into()).into();
        assert!(matches!(err, BridgeError::Signing(_)));

        let err: BridgeError = EvmError::UnsupportedChain(7).into();
        assert!(matches!(err, BridgeError::Config(_)));
    }
}
