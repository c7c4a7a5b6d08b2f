//! Unstoppable Domains resolution API
//!
//! CNS has no on-chain reverse registry, so reverse lookups go through the
//! Unstoppable resolution service. Without an API key the lookup is skipped.

use alloy_primitives::Address;
use serde::Deserialize;
use tracing::debug;
use umbra_core::{Error, ProviderError, Result};

/// Default resolution service endpoint
pub const DEFAULT_ENDPOINT: &str = "https://resolve.unstoppabledomains.com";

/// Unstoppable resolution API client
#[derive(Clone)]
pub struct UnstoppableApi {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct ReverseResponse {
    meta: ReverseMeta,
}

#[derive(Deserialize)]
struct ReverseMeta {
    #[serde(default)]
    domain: Option<String>,
}

impl UnstoppableApi {
    /// Create new client
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// True when requests can be authenticated
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Reverse-resolve an address to its CNS name
    pub async fn reverse(&self, address: Address) -> Result<Option<String>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let url = format!("{}/reverse/{}", self.endpoint, address.to_checksum(None));
        debug!("Resolving {} via Unstoppable", address);

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| Error::Provider(ProviderError::Transport(e.to_string())))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Provider(ProviderError::Transport(format!(
                "HTTP error: {}",
                response.status()
            ))));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| Error::Abi(format!("JSON decode error: {}", e)))?;

        Ok(body.meta.domain.filter(|d| !d.is_empty()))
    }
}

impl Default for UnstoppableApi {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, None)
    }
}
