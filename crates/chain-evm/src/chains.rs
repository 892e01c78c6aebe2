use serde::Serialize;

/// Definition of a Neon EVM network.
///
/// Each Neon deployment exposes one EVM chain per gas token: NEON itself and
/// SOL. Both share the proxy host; the SOL chain lives under `/sol`.
#[derive(Debug, Clone, Serialize)]
pub struct NeonChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub proxy_url: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

/// Neon devnet, NEON gas token.
pub const NEON_DEVNET: NeonChain = NeonChain {
    chain_id: 245022926,
    name: "Neon EVM Devnet",
    symbol: "NEON",
    decimals: 18,
    proxy_url: "https://devnet.neonevm.org",
    explorer_url: "https://devnet.neonscan.org",
    is_testnet: true,
};

/// Neon devnet, SOL gas token.
pub const SOL_DEVNET: NeonChain = NeonChain {
    chain_id: 245022927,
    name: "Neon EVM Devnet (SOL)",
    symbol: "SOL",
    decimals: 18,
    proxy_url: "https://devnet.neonevm.org/sol",
    explorer_url: "https://devnet.neonscan.org",
    is_testnet: true,
};

/// Neon mainnet, NEON gas token.
pub const NEON_MAINNET: NeonChain = NeonChain {
    chain_id: 245022934,
    name: "Neon EVM Mainnet",
    symbol: "NEON",
    decimals: 18,
    proxy_url: "https://neon-proxy-mainnet.solana.p2p.org",
    explorer_url: "https://neonscan.org",
    is_testnet: false,
};

/// Neon mainnet, SOL gas token.
pub const SOL_MAINNET: NeonChain = NeonChain {
    chain_id: 245022935,
    name: "Neon EVM Mainnet (SOL)",
    symbol: "SOL",
    decimals: 18,
    proxy_url: "https://neon-proxy-mainnet.solana.p2p.org/sol",
    explorer_url: "https://neonscan.org",
    is_testnet: false,
};

const ALL_CHAINS: &[&NeonChain] = &[&NEON_DEVNET, &SOL_DEVNET, &NEON_MAINNET, &SOL_MAINNET];

/// Returns the chain definition for a given chain ID, or `None` if unknown.
pub fn get_chain(chain_id: u64) -> Option<&'static NeonChain> {
    ALL_CHAINS
        .iter()
        .find(|c| c.chain_id == chain_id)
        .copied()
}

pub fn supported_chains() -> Vec<&'static NeonChain> {
    ALL_CHAINS.to_vec()
}
