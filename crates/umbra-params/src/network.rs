//! Supported chain definitions

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// ENS registry, deployed at the same address on every supported chain
pub const ENS_REGISTRY_ADDRESS: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// Umbra contract, deployed at the same address on every supported chain
const UMBRA_ADDRESS: Address = address!("Fb2dc580Eed955B528407b4d36FfaFe3da685401");

/// Chain ids the wallet session treats as supported
pub const SUPPORTED_CHAIN_IDS: &[u64] = &[1, 4];

/// Network type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    /// Ethereum mainnet
    Mainnet,
    /// Rinkeby testnet
    Rinkeby,
}

/// Per-chain configuration
#[derive(Debug, Clone)]
pub struct ChainParams {
    /// Network type
    pub network_type: NetworkType,
    /// Chain id
    pub chain_id: u64,
    /// Provider-side network name (ethers naming)
    pub name: &'static str,
    /// Network name used by the CNS resolution client
    pub cns_network: &'static str,
    /// Multicall contract used for batched balance reads
    pub multicall: Address,
    /// CNS registry
    pub cns_registry: Address,
    /// Umbra protocol instance
    pub umbra: Address,
}

impl ChainParams {
    /// Get mainnet parameters
    pub const fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            chain_id: 1,
            name: "homestead",
            cns_network: "mainnet",
            multicall: address!("eefBa1e63905eF1D7ACbA5a8513c70307C1cE441"),
            cns_registry: address!("D1E5b0FF1287aA9f9A268759062E4Ab08b9Dacbe"),
            umbra: UMBRA_ADDRESS,
        }
    }

    /// Get rinkeby parameters
    pub const fn rinkeby() -> Self {
        Self {
            network_type: NetworkType::Rinkeby,
            chain_id: 4,
            name: "rinkeby",
            cns_network: "rinkeby",
            multicall: address!("42Ad527de7d4e9d9d011aC45B31D8551f8Fe9821"),
            cns_registry: address!("AAD76bea7CFEc82927239415BB18D2e93518ecBB"),
            umbra: UMBRA_ADDRESS,
        }
    }

    /// Get network by type
    pub const fn from_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Rinkeby => Self::rinkeby(),
        }
    }

    /// Look up parameters by the CNS network name
    ///
    /// `homestead` is accepted as an alias of `mainnet`.
    pub fn from_network_name(name: &str) -> Result<Self> {
        match name {
            "mainnet" | "homestead" => Ok(Self::mainnet()),
            "rinkeby" => Ok(Self::rinkeby()),
            other => Err(Error::InvalidNetwork(other.to_string())),
        }
    }
}

/// Get parameters for a chain id
pub fn chain_params(chain_id: u64) -> Result<ChainParams> {
    match chain_id {
        1 => Ok(ChainParams::mainnet()),
        4 => Ok(ChainParams::rinkeby()),
        other => Err(Error::UnsupportedChain(other)),
    }
}

/// Check the default allow-list
pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAIN_IDS.contains(&chain_id)
}
