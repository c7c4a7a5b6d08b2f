//! Endpoint configuration

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON-RPC provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Node or wallet RPC endpoint
    pub url: String,
    /// Account to act as; `eth_accounts` is queried when absent
    pub account: Option<Address>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Interval between account/chain polls when watching for changes
    pub poll_interval_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            account: None,
            timeout_secs: 30,
            poll_interval_ms: 4_000,
        }
    }
}

/// Relayer endpoints per chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayerConfig {
    /// Base URL of the relayer serving each chain id
    pub endpoints: BTreeMap<u64, String>,
    /// Request timeout in seconds; the client default applies when unset
    pub timeout_secs: Option<u64>,
}

impl RelayerConfig {
    /// Relayer base URL for a chain
    pub fn endpoint(&self, chain_id: u64) -> Option<&str> {
        self.endpoints.get(&chain_id).map(String::as_str)
    }
}
