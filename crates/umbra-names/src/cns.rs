//! CNS (Unstoppable Domains) backend
//!
//! Names are ERC-721 tokens whose id is the namehash; stealth keys are plain
//! text records on the token's resolver.

use crate::contracts::{read, ICnsRegistry, ICnsResolver};
use crate::{namehash, normalize, NamingSystem, UnstoppableApi};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use tracing::debug;
use umbra_core::{Error, ProviderError, Result, StealthPublicKeys, TxHash, WalletProvider};
use umbra_params::ChainParams;

/// Record holding the spending public key
pub const SPENDING_KEY_RECORD: &str = "umbra.spending_public_key";
/// Record holding the viewing public key
pub const VIEWING_KEY_RECORD: &str = "umbra.viewing_public_key";

/// Resolution client bound to one network and provider
#[derive(Clone)]
pub struct ResolutionClient {
    network: String,
    registry: Address,
    provider: Arc<dyn WalletProvider>,
    reverse_api: Option<UnstoppableApi>,
}

impl ResolutionClient {
    /// Create a client for a network name
    ///
    /// `homestead` (the provider-side name of mainnet) is mapped to `mainnet`.
    pub fn new(network_name: &str, provider: Arc<dyn WalletProvider>) -> Result<Self> {
        let params = ChainParams::from_network_name(network_name)
            .map_err(|e| Error::Unexpected(format!("CNS unavailable: {}", e)))?;
        Ok(Self {
            network: params.cns_network.to_string(),
            registry: params.cns_registry,
            provider,
            reverse_api: None,
        })
    }

    /// Create a client against a custom registry deployment
    pub fn with_registry(
        network: impl Into<String>,
        registry: Address,
        provider: Arc<dyn WalletProvider>,
    ) -> Self {
        Self {
            network: network.into(),
            registry,
            provider,
            reverse_api: None,
        }
    }

    /// Attach the resolution API used for reverse lookups
    pub fn with_reverse_api(mut self, api: UnstoppableApi) -> Self {
        self.reverse_api = Some(api);
        self
    }

    /// Network name the client resolves against
    pub fn network(&self) -> &str {
        &self.network
    }

    /// CNS registry address
    pub fn registry(&self) -> Address {
        self.registry
    }
}

/// CNS resolver
#[derive(Clone)]
pub struct CnsResolver {
    client: ResolutionClient,
}

impl CnsResolver {
    /// Create resolver over a resolution client
    pub fn new(client: ResolutionClient) -> Self {
        Self { client }
    }

    /// The underlying resolution client
    pub fn client(&self) -> &ResolutionClient {
        &self.client
    }

    /// True for names this backend handles
    pub fn is_owned_domain(&self, name: &str) -> bool {
        NamingSystem::Cns.owns(name)
    }

    /// Namehash of a CNS name
    pub fn namehash(&self, name: &str) -> Result<B256> {
        Ok(namehash(&self.owned(name)?))
    }

    /// Fetch the stealth public keys published for a name
    pub async fn get_public_keys(&self, name: &str) -> Result<StealthPublicKeys> {
        let name = self.owned(name)?;
        let token_id = token_id(&name);

        match self.owner_of(token_id).await {
            Ok(owner) if owner != Address::ZERO => {}
            Ok(_) | Err(Error::Provider(ProviderError::Reverted(_))) => {
                return Err(Error::NameNotRegistered(name));
            }
            Err(e) => return Err(e),
        }

        let resolver = match self.resolver_of(token_id).await {
            Ok(resolver) if resolver != Address::ZERO => resolver,
            Ok(_) | Err(Error::Provider(ProviderError::Reverted(_))) => {
                return Err(Error::KeysNotSet(name));
            }
            Err(e) => return Err(e),
        };

        let call = ICnsResolver::getManyCall {
            keys: vec![SPENDING_KEY_RECORD.to_string(), VIEWING_KEY_RECORD.to_string()],
            tokenId: token_id,
        };
        let values = match read(self.client.provider.as_ref(), resolver, call).await {
            Ok(ret) => ret._0,
            Err(Error::Provider(ProviderError::Reverted(_))) | Err(Error::Abi(_)) => {
                debug!("Resolver {} has no records for {}", resolver, name);
                return Err(Error::KeysNotSet(name));
            }
            Err(e) => return Err(e),
        };

        match values.as_slice() {
            [spending, viewing] if !spending.is_empty() && !viewing.is_empty() => {
                StealthPublicKeys::from_hex(spending, viewing)
            }
            _ => Err(Error::KeysNotSet(name)),
        }
    }

    /// Publish stealth public keys as records on the name's resolver
    pub async fn set_public_keys(&self, name: &str, keys: &StealthPublicKeys) -> Result<TxHash> {
        let name = self.owned(name)?;
        let token_id = token_id(&name);

        match self.owner_of(token_id).await {
            Ok(owner) if owner != Address::ZERO => {}
            Ok(_) | Err(Error::Provider(ProviderError::Reverted(_))) => {
                return Err(Error::NameNotRegistered(name));
            }
            Err(e) => return Err(e),
        }
        let resolver = self.resolver_of(token_id).await?;
        if resolver == Address::ZERO {
            return Err(Error::Unexpected(format!("{} has no resolver set", name)));
        }

        let call = ICnsResolver::setManyCall {
            keys: vec![SPENDING_KEY_RECORD.to_string(), VIEWING_KEY_RECORD.to_string()],
            values: vec![keys.spending_hex(), keys.viewing_hex()],
            tokenId: token_id,
        };

        debug!("Setting stealth key records for {} on resolver {}", name, resolver);
        Ok(self
            .client
            .provider
            .send_transaction(resolver, Bytes::from(call.abi_encode()))
            .await?)
    }

    /// Reverse-resolve an address to its CNS name
    pub async fn lookup_name(&self, address: Address) -> Result<Option<String>> {
        let Some(api) = &self.client.reverse_api else {
            return Ok(None);
        };
        let name = api.reverse(address).await?;
        Ok(name.filter(|n| self.is_owned_domain(n)))
    }

    fn owned(&self, name: &str) -> Result<String> {
        if !self.is_owned_domain(name) {
            return Err(Error::UnsupportedName(name.to_string()));
        }
        normalize(name)
    }

    async fn owner_of(&self, token_id: U256) -> Result<Address> {
        Ok(read(
            self.client.provider.as_ref(),
            self.client.registry,
            ICnsRegistry::ownerOfCall { tokenId: token_id },
        )
        .await?
        ._0)
    }

    async fn resolver_of(&self, token_id: U256) -> Result<Address> {
        Ok(read(
            self.client.provider.as_ref(),
            self.client.registry,
            ICnsRegistry::resolverOfCall { tokenId: token_id },
        )
        .await?
        ._0)
    }
}

/// ERC-721 token id of a normalized name
pub fn token_id(name: &str) -> U256 {
    U256::from_be_bytes(namehash(name).0)
}
