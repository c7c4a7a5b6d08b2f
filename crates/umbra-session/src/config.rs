//! Session configuration

use serde::{Deserialize, Serialize};
use umbra_names::unstoppable::DEFAULT_ENDPOINT;
use umbra_names::UnstoppableApi;
use umbra_params::SUPPORTED_CHAIN_IDS;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Chains the protocol supports
    pub supported_chain_ids: Vec<u64>,
    /// Capacity of the command queue
    pub command_buffer: usize,
    /// Refresh balances after every identity publication
    pub refresh_balances_on_publish: bool,
    /// Unstoppable resolution API endpoint
    pub cns_api_endpoint: String,
    /// Unstoppable resolution API key; CNS reverse lookup is off without it
    pub cns_api_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            supported_chain_ids: SUPPORTED_CHAIN_IDS.to_vec(),
            command_buffer: 32,
            refresh_balances_on_publish: true,
            cns_api_endpoint: DEFAULT_ENDPOINT.to_string(),
            cns_api_key: None,
        }
    }
}

impl SessionConfig {
    /// True when the chain is on the allow-list
    pub fn is_supported_chain(&self, chain_id: u64) -> bool {
        self.supported_chain_ids.contains(&chain_id)
    }

    /// Resolution API client for CNS reverse lookups, if a key is configured
    pub fn reverse_api(&self) -> Option<UnstoppableApi> {
        self.cns_api_key
            .as_ref()
            .map(|key| UnstoppableApi::new(self.cns_api_endpoint.clone(), Some(key.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let config = SessionConfig::default();
        assert!(config.is_supported_chain(1));
        assert!(config.is_supported_chain(4));
        assert!(!config.is_supported_chain(137));
        assert!(config.reverse_api().is_none());
    }

    #[test]
    fn test_partial_json() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"supported_chain_ids":[4],"cns_api_key":"k"}"#).unwrap();
        assert!(!config.is_supported_chain(1));
        assert_eq!(config.command_buffer, 32);
        assert!(config.reverse_api().is_some_and(|api| api.is_enabled()));
    }
}
