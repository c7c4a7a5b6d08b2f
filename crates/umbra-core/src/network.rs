//! Network descriptor reported by the wallet provider

use serde::{Deserialize, Serialize};
use umbra_params::ChainParams;

/// Connected network, derived from the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Chain id
    pub chain_id: u64,
    /// Network name (ethers naming, e.g. `homestead`)
    pub name: String,
}

impl Network {
    /// Create a descriptor
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
        }
    }

    /// Descriptor for a chain id, named after the known chain or `unknown`
    pub fn from_chain_id(chain_id: u64) -> Self {
        let name = umbra_params::chain_params(chain_id)
            .map(|p| p.name)
            .unwrap_or("unknown");
        Self::new(chain_id, name)
    }

    /// Chain parameters, if this chain is known
    pub fn params(&self) -> Option<ChainParams> {
        umbra_params::chain_params(self.chain_id).ok()
    }
}
