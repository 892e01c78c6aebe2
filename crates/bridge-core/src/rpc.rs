//! JSON-RPC transport shared by the proxy and ledger clients.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::BridgeError;

/// Sends one JSON-RPC request and returns its `result` member.
#[async_trait]
pub trait JsonRpcTransport: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, BridgeError>;
}

/// JSON-RPC over HTTP POST.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JsonRpcTransport for HttpTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, url = %self.url, "json-rpc request");

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(method, "request failed: {:?}", e);
                BridgeError::Rpc(format!("{method}: {e}"))
            })?;

        if !response.status().is_success() {
            error!(method, status = %response.status(), "http error");
            return Err(BridgeError::Rpc(format!(
                "{method}: http status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        extract_result(method, body)
    }
}

/// Splits a JSON-RPC response body into its result or its error.
pub fn extract_result(method: &str, mut body: Value) -> Result<Value, BridgeError> {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        error!(method, "rpc error: {}", err);
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(BridgeError::Rpc(format!("{method}: {message}")));
    }

    body.get_mut("result")
        .map(Value::take)
        .ok_or_else(|| BridgeError::Rpc(format!("{method}: response has no result")))
}

/// Parses a `0x`-prefixed hex quantity as returned by `eth_*` methods.
pub fn parse_quantity(value: &Value) -> Result<u128, BridgeError> {
    let text = value
        .as_str()
        .ok_or_else(|| BridgeError::Rpc(format!("expected hex quantity, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| BridgeError::InvalidHex(text.to_string()))?;
    if digits.is_empty() {
        return Err(BridgeError::InvalidHex(text.to_string()));
    }
    u128::from_str_radix(digits, 16).map_err(|_| BridgeError::InvalidHex(text.to_string()))
}
