//! Harness configuration
//!
//! A JSON file supplies the base settings; command-line flags override it.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use umbra_net::{RelayerConfig, RpcConfig};
use umbra_session::SessionConfig;

/// Everything the harness needs to open a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub rpc: RpcConfig,
    pub relayer: RelayerConfig,
    pub session: SessionConfig,
}

/// Flag values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub account: Option<alloy_primitives::Address>,
    pub relayers: Vec<(u64, String)>,
    pub cns_api_key: Option<String>,
}

impl HarnessConfig {
    /// Read the file if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.rpc_url {
            self.rpc.url = url;
        }
        if overrides.account.is_some() {
            self.rpc.account = overrides.account;
        }
        for (chain_id, url) in overrides.relayers {
            self.relayer.endpoints.insert(chain_id, url);
        }
        if overrides.cns_api_key.is_some() {
            self.session.cns_api_key = overrides.cns_api_key;
        }
    }
}

/// Parse `CHAIN=URL`
pub fn parse_relayer(value: &str) -> Result<(u64, String), String> {
    let (chain, url) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CHAIN=URL, got {}", value))?;
    let chain_id = chain
        .trim()
        .parse()
        .map_err(|_| format!("invalid chain id: {}", chain))?;
    Ok((chain_id, url.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rpc":{{"url":"https://rpc.example.org"}},"relayer":{{"endpoints":{{"4":"https://relayer.example.org"}}}}}}"#
        )
        .unwrap();

        let config = HarnessConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.rpc.url, "https://rpc.example.org");
        assert_eq!(config.relayer.endpoint(4), Some("https://relayer.example.org"));
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HarnessConfig::load(Some(&dir.path().join("nope.json"))).is_err());
        assert_eq!(HarnessConfig::load(None).unwrap(), HarnessConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = HarnessConfig::default();
        config.relayer.endpoints.insert(1, "https://old".to_string());
        config.apply(Overrides {
            rpc_url: Some("http://localhost:9545".to_string()),
            relayers: vec![(1, "https://new".to_string())],
            cns_api_key: Some("key".to_string()),
            ..Overrides::default()
        });

        assert_eq!(config.rpc.url, "http://localhost:9545");
        assert_eq!(config.relayer.endpoint(1), Some("https://new"));
        assert!(config.session.reverse_api().is_some());
        assert!(config.rpc.account.is_none());
    }

    #[test]
    fn test_parse_relayer() {
        assert_eq!(
            parse_relayer("4=https://relayer.example.org").unwrap(),
            (4, "https://relayer.example.org".to_string())
        );
        assert!(parse_relayer("https://relayer.example.org").is_err());
        assert!(parse_relayer("four=https://x").is_err());
    }
}
