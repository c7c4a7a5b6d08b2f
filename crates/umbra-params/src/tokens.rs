//! Default token lists

use alloy_primitives::{address, Address};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Sentinel address standing in for the chain's native asset
pub const NATIVE_TOKEN_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Token metadata, as found in token lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Chain the token lives on
    pub chain_id: u64,
    /// Contract address, or [`NATIVE_TOKEN_ADDRESS`]
    pub address: Address,
    /// Display name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// Logo location
    #[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl TokenInfo {
    /// Native ether entry for a chain
    pub fn native(chain_id: u64) -> Self {
        Self {
            chain_id,
            address: NATIVE_TOKEN_ADDRESS,
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
            logo_uri: Some("/tokens/eth.svg".to_string()),
        }
    }

    /// True for the native asset sentinel
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN_ADDRESS
    }
}

static RINKEBY_TOKENS: Lazy<Vec<TokenInfo>> = Lazy::new(|| {
    vec![
        TokenInfo::native(4),
        TokenInfo {
            chain_id: 4,
            address: address!("2e055eEe18284513B993dB7568A592679aB13188"),
            name: "Dai".to_string(),
            symbol: "DAI".to_string(),
            decimals: 18,
            logo_uri: Some(
                "https://assets.coingecko.com/coins/images/9956/thumb/dai-multi-collateral-mcd.png?1574218774"
                    .to_string(),
            ),
        },
        TokenInfo {
            chain_id: 4,
            address: address!("eb8f08a975Ab53E34D8a0330E0D34de942C95926"),
            name: "USD Coin".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
            logo_uri: Some(
                "https://assets.coingecko.com/coins/images/6319/thumb/USD_Coin_icon.png?1547042389"
                    .to_string(),
            ),
        },
    ]
});

/// Default tokens for a chain
///
/// Every chain gets its native asset; testnets also carry a fixed set of
/// test tokens.
pub fn default_tokens(chain_id: u64) -> Vec<TokenInfo> {
    match chain_id {
        4 => RINKEBY_TOKENS.clone(),
        other => vec![TokenInfo::native(other)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_token_first() {
        for chain_id in [1u64, 4, 1337] {
            let tokens = default_tokens(chain_id);
            assert!(tokens[0].is_native());
            assert!(tokens.iter().all(|t| t.chain_id == chain_id));
        }
    }

    #[test]
    fn test_token_list_json() {
        let json = r#"{
            "chainId": 1,
            "address": "0x6B175474E89094C44Da98b954EedeAC495271d0F",
            "name": "Dai Stablecoin",
            "symbol": "DAI",
            "decimals": 18,
            "logoURI": "https://example.org/dai.png"
        }"#;
        let token: TokenInfo = serde_json::from_str(json).unwrap();
        assert_eq!(token.symbol, "DAI");
        assert!(!token.is_native());
        assert_eq!(token.logo_uri.as_deref(), Some("https://example.org/dai.png"));
    }
}
