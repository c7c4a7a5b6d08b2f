//! HTTP relayer client

use crate::{Error, RelayerConfig, Result};
use alloy_primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use umbra_core::{Relayer, TokenInfo};

/// Relayer reached over HTTP
#[derive(Clone)]
pub struct HttpRelayer {
    base_url: String,
    chain_id: u64,
    client: reqwest::Client,
}

/// Token entry as served by a relayer; the chain id may be implied
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayerToken {
    chain_id: Option<u64>,
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    #[serde(default, rename = "logoURI")]
    logo_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokensResponse {
    List(Vec<RelayerToken>),
    Wrapped { tokens: Vec<RelayerToken> },
}

impl HttpRelayer {
    /// Create relayer client for one chain
    pub fn new(base_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chain_id,
            client: reqwest::Client::new(),
        }
    }

    /// Relayer for a chain, if one is configured
    pub fn from_config(config: &RelayerConfig, chain_id: u64) -> Result<Option<Self>> {
        let Some(endpoint) = config.endpoint(chain_id) else {
            return Ok(None);
        };
        let mut relayer = Self::new(endpoint, chain_id);
        if let Some(secs) = config.timeout_secs {
            relayer.client = reqwest::Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        }
        Ok(Some(relayer))
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_tokens(&self) -> Result<Vec<TokenInfo>> {
        let url = format!("{}/tokens", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Http(format!("{} returned {}", url, response.status())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        let tokens = decode_tokens(&body, self.chain_id)?;
        debug!("Relayer {} accepts {} tokens", self.base_url, tokens.len());
        Ok(tokens)
    }
}

#[async_trait]
impl Relayer for HttpRelayer {
    async fn tokens(&self) -> umbra_core::Result<Vec<TokenInfo>> {
        Ok(self.fetch_tokens().await?)
    }
}

/// Decode a relayer token list, keeping entries for one chain
///
/// Accepts a bare array or an object with a `tokens` array. Entries without
/// a chain id belong to the relayer's own chain.
pub fn decode_tokens(body: &[u8], chain_id: u64) -> Result<Vec<TokenInfo>> {
    let response: TokensResponse =
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("token list: {}", e)))?;
    let tokens = match response {
        TokensResponse::List(tokens) | TokensResponse::Wrapped { tokens } => tokens,
    };

    Ok(tokens
        .into_iter()
        .filter(|t| t.chain_id.unwrap_or(chain_id) == chain_id)
        .map(|t| TokenInfo {
            chain_id,
            address: t.address,
            name: t.name,
            symbol: t.symbol,
            decimals: t.decimals,
            logo_uri: t.logo_uri,
        })
        .collect())
}
