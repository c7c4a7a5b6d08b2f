//! Immutable session snapshots
//!
//! The actor publishes a fresh [`SessionSnapshot`] after every state change.
//! Readers only ever see complete snapshots: identity fields (account,
//! network, names, keys) always come from the same configuration pass.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use umbra_core::{
    format_address, to_checksum, Network, ProtocolKeyPairs, Relayer, TokenInfo, WalletProvider,
};
use umbra_names::{NameService, NamingSystem};
use umbra_params::ChainParams;

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No provider
    Disconnected,
    /// Provider attached, first configuration pending
    Connecting,
    /// Reconfiguration in flight; identity fields are the previous ones
    Configuring,
    /// Identity published
    Ready {
        /// Whether the protocol runs on the connected chain
        supported: bool,
    },
}

/// Names resolved for the account, one per naming system
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedNames {
    /// ENS name
    pub ens: Option<String>,
    /// CNS name
    pub cns: Option<String>,
}

impl ResolvedNames {
    /// Name for one system
    pub fn get(&self, system: NamingSystem) -> Option<&str> {
        match system {
            NamingSystem::Ens => self.ens.as_deref(),
            NamingSystem::Cns => self.cns.as_deref(),
        }
    }
}

/// Whether each resolved name has stealth keys published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeysConfigured {
    /// ENS name has keys
    pub ens: bool,
    /// CNS name has keys
    pub cns: bool,
}

impl KeysConfigured {
    /// Flag for one system
    pub fn get(&self, system: NamingSystem) -> bool {
        match system {
            NamingSystem::Ens => self.ens,
            NamingSystem::Cns => self.cns,
        }
    }

    /// Set the flag for one system
    pub fn set(&mut self, system: NamingSystem, configured: bool) {
        match system {
            NamingSystem::Ens => self.ens = configured,
            NamingSystem::Cns => self.cns = configured,
        }
    }
}

/// Protocol deployment on the connected chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolInstance {
    /// Chain id
    pub chain_id: u64,
    /// Umbra contract address
    pub umbra: Address,
}

impl ProtocolInstance {
    /// Deployment for a chain, if the protocol is deployed there
    pub fn for_chain(chain_id: u64) -> Option<Self> {
        umbra_params::chain_params(chain_id)
            .ok()
            .map(|params: ChainParams| Self {
                chain_id,
                umbra: params.umbra,
            })
    }
}

/// Consistent view of the wallet session
#[derive(Clone)]
pub struct SessionSnapshot {
    /// Lifecycle state
    pub status: SessionStatus,
    /// Identity epoch; bumped whenever identity is published or cleared
    pub epoch: u64,
    /// Provider captured at the last completed configuration
    pub provider: Option<Arc<dyn WalletProvider>>,
    /// Connected account
    pub account: Option<Address>,
    /// Connected network
    pub network: Option<Network>,
    /// Names resolved for the account
    pub names: ResolvedNames,
    /// Key configuration per resolved name
    pub keys_configured: KeysConfigured,
    /// Protocol deployment for the chain
    pub protocol: Option<ProtocolInstance>,
    /// Derived protocol key pairs
    pub key_pairs: Option<ProtocolKeyPairs>,
    /// Active token list
    pub tokens: Vec<TokenInfo>,
    /// Balance per token address
    pub balances: BTreeMap<Address, U256>,
    /// Relayer for the chain
    pub relayer: Option<Arc<dyn Relayer>>,
    /// Name service bound to the provider and network
    pub name_service: Option<Arc<dyn NameService>>,
    /// When identity was last published
    pub configured_at: Option<DateTime<Utc>>,
    /// When balances were last replaced
    pub balances_updated_at: Option<DateTime<Utc>>,
    supported_chain_ids: Arc<[u64]>,
}

impl SessionSnapshot {
    /// Empty snapshot
    pub fn empty(supported_chain_ids: Arc<[u64]>) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            epoch: 0,
            provider: None,
            account: None,
            network: None,
            names: ResolvedNames::default(),
            keys_configured: KeysConfigured::default(),
            protocol: None,
            key_pairs: None,
            tokens: Vec::new(),
            balances: BTreeMap::new(),
            relayer: None,
            name_service: None,
            configured_at: None,
            balances_updated_at: None,
            supported_chain_ids,
        }
    }

    /// Fresh snapshot for a new identity, keeping only the allow-list
    pub(crate) fn reset(&self) -> Self {
        Self::empty(self.supported_chain_ids.clone())
    }

    /// True when no network is known or the network is on the allow-list
    pub fn is_supported_network(&self) -> bool {
        match &self.network {
            None => true,
            Some(network) => self.supported_chain_ids.contains(&network.chain_id),
        }
    }

    /// Best human-readable identity for the account
    ///
    /// A name with keys configured beats a bare name, ENS beats CNS, and the
    /// formatted address is the fallback.
    pub fn display_identity(&self) -> Option<String> {
        let with_keys = NamingSystem::ALL
            .into_iter()
            .find(|&s| self.names.get(s).is_some() && self.keys_configured.get(s));
        let any_name = NamingSystem::ALL
            .into_iter()
            .find(|&s| self.names.get(s).is_some());

        with_keys
            .or(any_name)
            .and_then(|s| self.names.get(s))
            .map(str::to_string)
            .or_else(|| self.display_address())
    }

    /// Shortened account address, e.g. `0x5aAe...eAed`
    pub fn display_address(&self) -> Option<String> {
        self.account.as_ref().map(format_address)
    }

    /// Full checksummed account address
    pub fn checksum_address(&self) -> Option<String> {
        self.account.as_ref().map(to_checksum)
    }

    /// True when both protocol key pairs are present
    pub fn has_keys(&self) -> bool {
        self.key_pairs.is_some()
    }

    /// True when a provider is attached and identity has been published
    pub fn is_connected(&self) -> bool {
        self.provider.is_some() && self.account.is_some()
    }

    /// Balance of one token, zero when unknown
    pub fn balance_of(&self, token: &Address) -> U256 {
        self.balances.get(token).copied().unwrap_or_default()
    }
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("status", &self.status)
            .field("epoch", &self.epoch)
            .field("provider", &self.provider.is_some())
            .field("account", &self.account)
            .field("network", &self.network)
            .field("names", &self.names)
            .field("keys_configured", &self.keys_configured)
            .field("protocol", &self.protocol)
            .field("has_keys", &self.has_keys())
            .field("tokens", &self.tokens.len())
            .field("balances", &self.balances)
            .field("relayer", &self.relayer.is_some())
            .finish()
    }
}
