//! Pluggable collaborators of the session
//!
//! Everything the session talks to besides the wallet provider is reached
//! through one of these traits, so tests and embedders can swap pieces out.

use crate::balances::ContractMulticall;
use crate::keys::SignatureKeyGenerator;
use crate::snapshot::ProtocolInstance;
use crate::SessionConfig;
use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use std::sync::Arc;
use umbra_core::{Network, ProtocolKeyPairs, Relayer, Result, WalletProvider};
use umbra_names::{DomainService, NameService, UnstoppableApi};

/// Derives protocol key pairs from a signer
#[async_trait]
pub trait KeyGenerator: Send + Sync {
    /// Prompt the signer and derive spending and viewing key pairs
    async fn generate_private_keys(
        &self,
        protocol: &ProtocolInstance,
        signer: Arc<dyn WalletProvider>,
    ) -> Result<ProtocolKeyPairs>;
}

/// Batched read-only calls
#[async_trait]
pub trait Multicall: Send + Sync {
    /// Multicall contract address
    fn address(&self) -> Address;

    /// Execute `(target, callData)` pairs in one round trip
    ///
    /// Returns the raw return data of each call, in request order.
    async fn aggregate(&self, calls: Vec<(Address, Bytes)>) -> Result<Vec<Bytes>>;
}

/// Builds the name service for a provider and network
pub trait NameServiceFactory: Send + Sync {
    /// Name service bound to this provider and network
    fn name_service(&self, provider: Arc<dyn WalletProvider>, network: &Network)
        -> Arc<dyn NameService>;
}

/// Picks the relayer for a network
pub trait RelayerFactory: Send + Sync {
    /// Relayer serving this network, if any
    fn relayer(&self, network: &Network) -> Option<Arc<dyn Relayer>>;
}

/// Builds the multicall client for a provider and network
pub trait MulticallFactory: Send + Sync {
    /// Multicall client, if the network has a multicall deployment
    fn multicall(
        &self,
        provider: Arc<dyn WalletProvider>,
        network: &Network,
    ) -> Option<Arc<dyn Multicall>>;
}

/// [`DomainService`] over ENS and CNS
#[derive(Clone, Default)]
pub struct DomainServiceFactory {
    reverse_api: Option<UnstoppableApi>,
}

impl DomainServiceFactory {
    /// Create factory; CNS reverse lookups use `reverse_api` when given
    pub fn new(reverse_api: Option<UnstoppableApi>) -> Self {
        Self { reverse_api }
    }
}

impl NameServiceFactory for DomainServiceFactory {
    fn name_service(
        &self,
        provider: Arc<dyn WalletProvider>,
        network: &Network,
    ) -> Arc<dyn NameService> {
        Arc::new(DomainService::new(provider, network, self.reverse_api.clone()))
    }
}

/// No relayer on any network
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelayer;

impl RelayerFactory for NoRelayer {
    fn relayer(&self, _network: &Network) -> Option<Arc<dyn Relayer>> {
        None
    }
}

/// Fixed relayer per chain id
#[derive(Clone, Default)]
pub struct StaticRelayers {
    relayers: Vec<(u64, Arc<dyn Relayer>)>,
}

impl StaticRelayers {
    /// Create empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `chain_id` with `relayer`
    pub fn with(mut self, chain_id: u64, relayer: Arc<dyn Relayer>) -> Self {
        self.relayers.retain(|(id, _)| *id != chain_id);
        self.relayers.push((chain_id, relayer));
        self
    }
}

impl RelayerFactory for StaticRelayers {
    fn relayer(&self, network: &Network) -> Option<Arc<dyn Relayer>> {
        self.relayers
            .iter()
            .find(|(id, _)| *id == network.chain_id)
            .map(|(_, relayer)| relayer.clone())
    }
}

/// Multicall contract at the chain's known address
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractMulticallFactory;

impl MulticallFactory for ContractMulticallFactory {
    fn multicall(
        &self,
        provider: Arc<dyn WalletProvider>,
        network: &Network,
    ) -> Option<Arc<dyn Multicall>> {
        let params = network.params()?;
        Some(Arc::new(ContractMulticall::new(provider, params.multicall)))
    }
}

/// The session's collaborators
#[derive(Clone)]
pub struct SessionBackends {
    /// Name service construction
    pub names: Arc<dyn NameServiceFactory>,
    /// Relayer lookup
    pub relayers: Arc<dyn RelayerFactory>,
    /// Multicall construction
    pub multicall: Arc<dyn MulticallFactory>,
    /// Key derivation
    pub keys: Arc<dyn KeyGenerator>,
}

impl SessionBackends {
    /// Default collaborators for a configuration
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            names: Arc::new(DomainServiceFactory::new(config.reverse_api())),
            ..Self::default()
        }
    }

    /// Replace the name service factory
    pub fn with_names(mut self, names: Arc<dyn NameServiceFactory>) -> Self {
        self.names = names;
        self
    }

    /// Replace the relayer lookup
    pub fn with_relayers(mut self, relayers: Arc<dyn RelayerFactory>) -> Self {
        self.relayers = relayers;
        self
    }

    /// Replace the multicall factory
    pub fn with_multicall(mut self, multicall: Arc<dyn MulticallFactory>) -> Self {
        self.multicall = multicall;
        self
    }

    /// Replace the key generator
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }
}

impl Default for SessionBackends {
    fn default() -> Self {
        Self {
            names: Arc::new(DomainServiceFactory::default()),
            relayers: Arc::new(NoRelayer),
            multicall: Arc::new(ContractMulticallFactory),
            keys: Arc::new(SignatureKeyGenerator),
        }
    }
}
