//! Ledger JSON-RPC: account existence, blockhash, submission.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chain_sol::Pubkey;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::BridgeError;
use crate::rpc::JsonRpcTransport;

/// The narrow slice of the ledger RPC the assemblers need.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, BridgeError>;

    async fn latest_blockhash(&self) -> Result<[u8; 32], BridgeError>;

    /// Submits a signed wire transaction and returns its signature.
    async fn send_transaction(&self, wire: &[u8]) -> Result<String, BridgeError>;
}

pub struct SolanaRpcClient<T: JsonRpcTransport> {
    transport: T,
}

impl<T: JsonRpcTransport> SolanaRpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Lamport balance of `address`.
    pub async fn balance(&self, address: &Pubkey) -> Result<u64, BridgeError> {
        let result = self
            .transport
            .call("getBalance", json!([address.to_string(), {"commitment": "confirmed"}]))
            .await?;
        context_value(&result)
            .as_u64()
            .ok_or_else(|| BridgeError::Rpc(format!("getBalance: unexpected result {result}")))
    }
}

static NULL: Value = Value::Null;

/// `{ "context": ..., "value": ... }` responses carry their payload in `value`.
fn context_value(result: &Value) -> &Value {
    result.get("value").unwrap_or(&NULL)
}

#[async_trait]
impl<T: JsonRpcTransport> LedgerRpc for SolanaRpcClient<T> {
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, BridgeError> {
        let result = self
            .transport
            .call(
                "getAccountInfo",
                json!([address.to_string(), {"encoding": "base64", "commitment": "confirmed"}]),
            )
            .await?;
        let exists = !context_value(&result).is_null();
        debug!(%address, exists, "account lookup");
        Ok(exists)
    }

    async fn latest_blockhash(&self) -> Result<[u8; 32], BridgeError> {
        let result = self
            .transport
            .call("getLatestBlockhash", json!([{"commitment": "finalized"}]))
            .await?;
        let hash = context_value(&result)
            .get("blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| BridgeError::Rpc("getLatestBlockhash: missing blockhash".into()))?;

        let bytes = bs58::decode(hash)
            .into_vec()
            .map_err(|e| BridgeError::Rpc(format!("getLatestBlockhash: {e}")))?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| BridgeError::Encoding(format!("blockhash is {} bytes", bytes.len())))
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, BridgeError> {
        let encoded = general_purpose::STANDARD.encode(wire);
        let result = self
            .transport
            .call(
                "sendTransaction",
                json!([encoded, {"encoding": "base64", "preflightCommitment": "confirmed"}]),
            )
            .await?;
        let signature = result
            .as_str()
            .ok_or_else(|| BridgeError::Rpc(format!("sendTransaction: unexpected result {result}")))?;
        info!(signature, "transaction submitted");
        Ok(signature.to_string())
    }
}
