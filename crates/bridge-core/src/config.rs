//! Bridge configuration.
//!
//! A [`BridgeConfig`] is passed explicitly into every assembler call. It is
//! built from a live `neon_getEvmParams` fetch, from JSON, or from the
//! snapshots shipped with the crate.

use chain_evm::chains::{get_chain, NeonChain, NEON_DEVNET, NEON_MAINNET};
use chain_sol::Pubkey;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::derivation::{collateral_pool_address, NEON_SEED_VERSION};
use crate::error::BridgeError;

const EVM_PARAMS_DEVNET: &str = include_str!("../snapshots/evm-params-devnet.json");
const EVM_PARAMS_MAINNET: &str = include_str!("../snapshots/evm-params-mainnet.json");
const NATIVE_TOKENS_DEVNET: &str = include_str!("../snapshots/native-tokens-devnet.json");
const NATIVE_TOKENS_MAINNET: &str = include_str!("../snapshots/native-tokens-mainnet.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Devnet,
    Mainnet,
}

impl Network {
    fn default_endpoints(self) -> Endpoints {
        match self {
            Network::Devnet => Endpoints {
                proxy_url: NEON_DEVNET.proxy_url.into(),
                solana_rpc_url: "https://api.devnet.solana.com".into(),
            },
            Network::Mainnet => Endpoints {
                proxy_url: NEON_MAINNET.proxy_url.into(),
                solana_rpc_url: "https://api.mainnet-beta.solana.com".into(),
            },
        }
    }

    /// Program status shipped with the crate for offline use.
    pub fn program_status_snapshot(self) -> Result<NeonProgramStatus, BridgeError> {
        let raw = match self {
            Network::Devnet => EVM_PARAMS_DEVNET,
            Network::Mainnet => EVM_PARAMS_MAINNET,
        };
        serde_json::from_str(raw).map_err(|e| BridgeError::Config(format!("evm params snapshot: {e}")))
    }

    /// Native token list shipped with the crate for offline use.
    pub fn native_tokens_snapshot(self) -> Result<Vec<GasToken>, BridgeError> {
        let raw = match self {
            Network::Devnet => NATIVE_TOKENS_DEVNET,
            Network::Mainnet => NATIVE_TOKENS_MAINNET,
        };
        serde_json::from_str(raw).map_err(|e| BridgeError::Config(format!("token snapshot: {e}")))
    }
}

/// Result of `neon_getEvmParams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeonProgramStatus {
    pub neon_account_seed_version: u8,
    pub neon_max_evm_steps_in_last_iteration: u64,
    pub neon_min_evm_steps_in_iteration: u64,
    pub neon_gas_limit_multiplier_without_chain_id: u64,
    pub neon_holder_message_size: u64,
    pub neon_payment_to_treasury: u64,
    pub neon_storage_entries_in_contract_account: u64,
    pub neon_treasury_pool_count: u32,
    pub neon_treasury_pool_seed: String,
    pub neon_evm_program_id: Pubkey,
}

/// One entry of `neon_getGasTokenList` / `neon_getNativeTokenList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasToken {
    pub token_name: String,
    pub token_mint: Pubkey,
    /// Hex-encoded chain id, e.g. `"0xe9ac0ce"`.
    pub token_chain_id: String,
}

impl GasToken {
    pub fn chain_id(&self) -> Result<u64, BridgeError> {
        let digits = self
            .token_chain_id
            .strip_prefix("0x")
            .unwrap_or(&self.token_chain_id);
        u64::from_str_radix(digits, 16)
            .map_err(|_| BridgeError::InvalidHex(self.token_chain_id.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub proxy_url: String,
    pub solana_rpc_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub network: Network,
    pub neon_evm_program: Pubkey,
    /// EVM chain id of the gas token the bridge moves.
    pub chain_id: u64,
    /// Ledger mint of that gas token.
    pub token_mint: Pubkey,
    pub treasury_pool_count: u32,
    pub treasury_pool_seed: String,
    pub seed_version: u8,
    pub proxy_url: String,
    pub solana_rpc_url: String,
}

impl BridgeConfig {
    /// Neon devnet with the NEON gas token, from the bundled snapshots.
    pub fn devnet() -> Result<Self, BridgeError> {
        Self::from_snapshot(Network::Devnet)
    }

    /// Neon mainnet with the NEON gas token, from the bundled snapshots.
    pub fn mainnet() -> Result<Self, BridgeError> {
        Self::from_snapshot(Network::Mainnet)
    }

    fn from_snapshot(network: Network) -> Result<Self, BridgeError> {
        let status = network.program_status_snapshot()?;
        let tokens = network.native_tokens_snapshot()?;
        let neon = tokens
            .iter()
            .find(|t| t.token_name == "NEON")
            .ok_or_else(|| BridgeError::Config("NEON missing from token snapshot".into()))?;

        Self::from_program_status(network, &status, neon, network.default_endpoints())
    }

    /// Builds a config from a fetched program status and the gas token to
    /// bridge.
    pub fn from_program_status(
        network: Network,
        status: &NeonProgramStatus,
        gas_token: &GasToken,
        endpoints: Endpoints,
    ) -> Result<Self, BridgeError> {
        let config = Self {
            network,
            neon_evm_program: status.neon_evm_program_id,
            chain_id: gas_token.chain_id()?,
            token_mint: gas_token.token_mint,
            treasury_pool_count: status.neon_treasury_pool_count,
            treasury_pool_seed: status.neon_treasury_pool_seed.clone(),
            seed_version: status.neon_account_seed_version,
            proxy_url: endpoints.proxy_url,
            solana_rpc_url: endpoints.solana_rpc_url,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BridgeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BridgeError> {
        if self.seed_version != NEON_SEED_VERSION {
            return Err(BridgeError::Config(format!(
                "unsupported account seed version {}",
                self.seed_version
            )));
        }
        if self.treasury_pool_count == 0 {
            return Err(BridgeError::Config("treasury pool count is zero".into()));
        }
        if self.treasury_pool_seed.is_empty() {
            return Err(BridgeError::Config("treasury pool seed is empty".into()));
        }
        Ok(())
    }

    /// Static metadata for the configured chain, if it is a known one.
    pub fn chain(&self) -> Option<&'static NeonChain> {
        get_chain(self.chain_id)
    }

    /// Picks a treasury pool uniformly at random to spread fee load.
    pub fn random_pool_index(&self) -> u32 {
        rand::thread_rng().gen_range(0..self.treasury_pool_count)
    }

    pub fn treasury_pool_address(&self, pool_index: u32) -> Result<Pubkey, BridgeError> {
        if pool_index >= self.treasury_pool_count {
            return Err(BridgeError::Range(format!(
                "pool index {pool_index} >= {}",
                self.treasury_pool_count
            )));
        }
        collateral_pool_address(&self.neon_evm_program, &self.treasury_pool_seed, pool_index)
            .map(|(address, _)| address)
    }
}
