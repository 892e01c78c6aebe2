//! Client for the Neon proxy's JSON-RPC API.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::{GasToken, Network, NeonProgramStatus};
use crate::emulate::EmulateResult;
use crate::error::BridgeError;
use crate::rpc::{parse_quantity, JsonRpcTransport};

/// Read-only access to the Neon proxy plus EVM-side submission.
pub struct NeonProxyClient<T: JsonRpcTransport> {
    transport: T,
    network: Network,
}

impl<T: JsonRpcTransport> NeonProxyClient<T> {
    pub fn new(transport: T, network: Network) -> Self {
        Self { transport, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call_typed<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, BridgeError> {
        let result = self.transport.call(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| BridgeError::Rpc(format!("{method}: malformed result: {e}")))
    }

    /// `neon_getEvmParams`: the program status snapshot.
    pub async fn evm_params(&self) -> Result<NeonProgramStatus, BridgeError> {
        let status: NeonProgramStatus = self.call_typed("neon_getEvmParams", json!([])).await?;
        info!(
            program = %status.neon_evm_program_id,
            pools = status.neon_treasury_pool_count,
            "fetched evm params"
        );
        Ok(status)
    }

    pub async fn gas_token_list(&self) -> Result<Vec<GasToken>, BridgeError> {
        self.call_typed("neon_getGasTokenList", json!([])).await
    }

    /// `neon_getNativeTokenList`, falling back to the bundled snapshot when
    /// the proxy cannot be reached.
    pub async fn native_token_list(&self) -> Result<Vec<GasToken>, BridgeError> {
        match self
            .call_typed::<Vec<GasToken>>("neon_getNativeTokenList", json!([]))
            .await
        {
            Ok(tokens) => Ok(tokens),
            Err(err) => {
                warn!(network = ?self.network, "native token list unavailable, using snapshot: {}", err);
                self.network.native_tokens_snapshot()
            }
        }
    }

    /// `neon_emulate` over a raw signed transaction.
    pub async fn emulate(&self, raw_tx: &[u8]) -> Result<EmulateResult, BridgeError> {
        let result: EmulateResult = self
            .call_typed("neon_emulate", json!([hex::encode(raw_tx)]))
            .await?;
        debug!(
            exit_status = %result.exit_status,
            accounts = result.solana_accounts.len(),
            "emulated transaction"
        );
        Ok(result)
    }

    pub async fn transaction_count(&self, address: &str) -> Result<u64, BridgeError> {
        let value = self
            .transport
            .call("eth_getTransactionCount", json!([address, "latest"]))
            .await?;
        u64::try_from(parse_quantity(&value)?)
            .map_err(|_| BridgeError::Range("transaction count exceeds u64".into()))
    }

    pub async fn gas_price(&self) -> Result<u128, BridgeError> {
        let value = self.transport.call("eth_gasPrice", json!([])).await?;
        parse_quantity(&value)
    }

    pub async fn estimate_gas(&self, from: &str, to: &str, data: &[u8]) -> Result<u64, BridgeError> {
        let value = self
            .transport
            .call(
                "eth_estimateGas",
                json!([{
                    "from": from,
                    "to": to,
                    "data": format!("0x{}", hex::encode(data)),
                }]),
            )
            .await?;
        u64::try_from(parse_quantity(&value)?)
            .map_err(|_| BridgeError::Range("gas estimate exceeds u64".into()))
    }

    /// `eth_sendRawTransaction`; returns the transaction hash.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<String, BridgeError> {
        let value = self
            .transport
            .call(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(raw_tx))]),
            )
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BridgeError::Rpc(format!("unexpected tx hash: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockTransport;

    fn params_json() -> Value {
        json!({
            "neonAccountSeedVersion": 3,
            "neonMaxEvmStepsInLastIteration": 500,
            "neonMinEvmStepsInIteration": 500,
            "neonGasLimitMultiplierWithoutChainId": 1000,
            "neonHolderMessageSize": 950,
            "neonPaymentToTreasury": 5000,
            "neonStorageEntriesInContractAccount": 64,
            "neonTreasuryPoolCount": 128,
            "neonTreasuryPoolSeed": "treasury_pool",
            "neonEvmProgramId": "eeLSJgWzzxrqKv1UxtRVVH8FX3qCQWUs9QuAjJpETGU"
        })
    }

    #[tokio::test]
    async fn evm_params_parses_camel_case() {
        let proxy = NeonProxyClient::new(
            MockTransport::new().respond("neon_getEvmParams", params_json()),
            Network::Devnet,
        );
        let status = proxy.evm_params().await.unwrap();
        assert_eq!(status.neon_account_seed_version, 3);
        assert_eq!(status.neon_holder_message_size, 950);
        assert_eq!(status.neon_treasury_pool_seed, "treasury_pool");
    }

    #[tokio::test]
    async fn malformed_params_are_rpc_errors() {
        let proxy = NeonProxyClient::new(
            MockTransport::new().respond("neon_getEvmParams", json!({"neonAccountSeedVersion": "x"})),
            Network::Devnet,
        );
        assert!(matches!(proxy.evm_params().await, Err(BridgeError::Rpc(_))));
    }

    #[tokio::test]
    async fn gas_token_list_errors_propagate() {
        let proxy = NeonProxyClient::new(
            MockTransport::new().fail("neon_getGasTokenList", "timeout"),
            Network::Devnet,
        );
        assert!(matches!(proxy.gas_token_list().await, Err(BridgeError::Rpc(_))));
    }

    #[tokio::test]
    async fn native_token_list_falls_back_to_snapshot() {
        let proxy = NeonProxyClient::new(
            MockTransport::new().fail("neon_getNativeTokenList", "connection refused"),
            Network::Mainnet,
        );
        let tokens = proxy.native_token_list().await.unwrap();
        assert_eq!(tokens, Network::Mainnet.native_tokens_snapshot().unwrap());
    }

    #[tokio::test]
    async fn native_token_list_prefers_live_result() {
        let live = json!([{
            "token_name": "NEON",
            "token_mint": "89dre8rZjLNft7HoupGiyxu3MNftR577ZYu8bHe2kK7g",
            "token_chain_id": "0xe9ac0ce"
        }]);
        let proxy = NeonProxyClient::new(
            MockTransport::new().respond("neon_getNativeTokenList", live),
            Network::Devnet,
        );
        let tokens = proxy.native_token_list().await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].chain_id().unwrap(), 245022926);
    }

    #[tokio::test]
    async fn emulate_sends_unprefixed_hex() {
        let transport = MockTransport::new().respond(
            "neon_emulate",
            json!({"exit_status": "succeed", "solana_accounts": []}),
        );
        let proxy = NeonProxyClient::new(transport, Network::Devnet);
        let result = proxy.emulate(&[0xf8, 0x6b]).await.unwrap();
        assert!(result.succeeded());

        let calls = proxy.transport.calls();
        assert_eq!(calls[0].1, json!(["f86b"]));
    }

    #[tokio::test]
    async fn eth_quantities() {
        let proxy = NeonProxyClient::new(
            MockTransport::new()
                .respond("eth_getTransactionCount", json!("0x5"))
                .respond("eth_gasPrice", json!("0x174876e800"))
                .respond("eth_estimateGas", json!("0x1e8480"))
                .respond("eth_sendRawTransaction", json!("0xabc")),
            Network::Devnet,
        );
        assert_eq!(proxy.transaction_count("0x00").await.unwrap(), 5);
        assert_eq!(proxy.gas_price().await.unwrap(), 100_000_000_000);
        assert_eq!(proxy.estimate_gas("0x01", "0x02", &[1, 2]).await.unwrap(), 2_000_000);
        assert_eq!(proxy.send_raw_transaction(&[1]).await.unwrap(), "0xabc");

        let calls = proxy.transport.calls();
        assert_eq!(calls[2].1[0]["data"], json!("0x0102"));
    }
}
