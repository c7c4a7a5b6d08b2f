//! Common interface over ENS and CNS

use crate::{CnsResolver, EnsResolver, NamingSystem, ResolutionClient, UnstoppableApi};
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use umbra_core::{Error, Network, Result, StealthPublicKeys, TxHash, WalletProvider};

/// Name resolution capability
#[async_trait]
pub trait NameService: Send + Sync {
    /// True when some backend handles this name
    fn is_owned_domain(&self, name: &str) -> bool;

    /// Namehash of a name
    fn namehash(&self, name: &str) -> Result<B256>;

    /// Stealth public keys for a name
    ///
    /// Fails with [`Error::KeysNotSet`] when the name exists without keys and
    /// with [`Error::NameNotRegistered`] when the name itself is unknown.
    async fn get_public_keys(&self, name: &str) -> Result<StealthPublicKeys>;

    /// Publish stealth public keys for a name
    async fn set_public_keys(&self, name: &str, keys: &StealthPublicKeys) -> Result<TxHash>;

    /// Primary name of an address in one naming system
    async fn lookup_name(&self, system: NamingSystem, address: Address) -> Result<Option<String>>;
}

/// Routes each name to the backend its suffix belongs to
#[derive(Clone)]
pub struct DomainService {
    ens: EnsResolver,
    cns: Option<CnsResolver>,
}

enum Backend<'a> {
    Ens(&'a EnsResolver),
    Cns(&'a CnsResolver),
}

impl DomainService {
    /// Build both backends for the provider's network
    ///
    /// CNS is left out on networks without a CNS deployment; its names then
    /// fail with [`Error::UnsupportedName`].
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        network: &Network,
        reverse_api: Option<UnstoppableApi>,
    ) -> Self {
        let cns = match ResolutionClient::new(&network.name, provider.clone()) {
            Ok(client) => {
                let client = match reverse_api {
                    Some(api) => client.with_reverse_api(api),
                    None => client,
                };
                Some(CnsResolver::new(client))
            }
            Err(e) => {
                debug!("CNS disabled on {}: {}", network.name, e);
                None
            }
        };
        Self {
            ens: EnsResolver::new(provider),
            cns,
        }
    }

    /// Assemble from prebuilt backends
    pub fn from_backends(ens: EnsResolver, cns: Option<CnsResolver>) -> Self {
        Self { ens, cns }
    }

    fn route(&self, name: &str) -> Result<Backend<'_>> {
        match NamingSystem::classify(name) {
            Some(NamingSystem::Ens) => Ok(Backend::Ens(&self.ens)),
            Some(NamingSystem::Cns) => self
                .cns
                .as_ref()
                .map(Backend::Cns)
                .ok_or_else(|| Error::UnsupportedName(name.to_string())),
            None => Err(Error::UnsupportedName(name.to_string())),
        }
    }
}

#[async_trait]
impl NameService for DomainService {
    fn is_owned_domain(&self, name: &str) -> bool {
        self.route(name).is_ok()
    }

    fn namehash(&self, name: &str) -> Result<B256> {
        match self.route(name)? {
            Backend::Ens(ens) => ens.namehash(name),
            Backend::Cns(cns) => cns.namehash(name),
        }
    }

    async fn get_public_keys(&self, name: &str) -> Result<StealthPublicKeys> {
        match self.route(name)? {
            Backend::Ens(ens) => ens.get_public_keys(name).await,
            Backend::Cns(cns) => cns.get_public_keys(name).await,
        }
    }

    async fn set_public_keys(&self, name: &str, keys: &StealthPublicKeys) -> Result<TxHash> {
        match self.route(name)? {
            Backend::Ens(ens) => ens.set_public_keys(name, keys).await,
            Backend::Cns(cns) => cns.set_public_keys(name, keys).await,
        }
    }

    async fn lookup_name(&self, system: NamingSystem, address: Address) -> Result<Option<String>> {
        match system {
            NamingSystem::Ens => self.ens.lookup_name(address).await,
            NamingSystem::Cns => match &self.cns {
                Some(cns) => cns.lookup_name(address).await,
                None => Ok(None),
            },
        }
    }
}
