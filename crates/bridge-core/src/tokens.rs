//! Static token registry.

use chain_sol::Pubkey;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

const TOKEN_LIST: &str = include_str!("../snapshots/token-list.json");

/// A token as seen from both ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    pub chain_id: u64,
    pub symbol: String,
    pub name: String,
    /// ERC20-for-SPL contract on the EVM side.
    pub address: String,
    /// SPL mint on the ledger side.
    pub address_spl: Pubkey,
    pub decimals: u8,
}

/// Every bundled token, across all chains.
pub fn token_list() -> Result<Vec<TokenDescriptor>, BridgeError> {
    serde_json::from_str(TOKEN_LIST).map_err(|e| BridgeError::Config(format!("token list: {e}")))
}

pub fn tokens_for_chain(chain_id: u64) -> Result<Vec<TokenDescriptor>, BridgeError> {
    Ok(token_list()?
        .into_iter()
        .filter(|t| t.chain_id == chain_id)
        .collect())
}

/// Looks up a token by symbol, case-insensitively.
pub fn find_token(chain_id: u64, symbol: &str) -> Result<TokenDescriptor, BridgeError> {
    tokens_for_chain(chain_id)?
        .into_iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| BridgeError::UnknownToken(format!("{symbol} on chain {chain_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_evm::validate_address;

    #[test]
    fn bundled_list_is_well_formed() {
        let tokens = token_list().unwrap();
        assert!(!tokens.is_empty());
        for token in &tokens {
            assert!(validate_address(&token.address).unwrap(), "{}", token.symbol);
        }
    }

    #[test]
    fn find_devnet_wsol() {
        let wsol = find_token(245022926, "wsol").unwrap();
        assert_eq!(wsol.address_spl, chain_sol::NATIVE_MINT);
        assert_eq!(wsol.decimals, 9);
    }

    #[test]
    fn find_mainnet_usdc() {
        let usdc = find_token(245022934, "USDC").unwrap();
        assert_eq!(usdc.decimals, 6);
        assert_eq!(
            usdc.address_spl.to_string(),
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        );
    }

    #[test]
    fn unknown_token() {
        assert!(matches!(find_token(245022926, "DOGE"), Err(BridgeError::UnknownToken(_))));
        assert!(tokens_for_chain(1).unwrap().is_empty());
    }
}
