//! ENS backend
//!
//! Stealth keys live on the name's resolver (`stealthKeys` /
//! `setStealthKeys`), stored as compressed-point prefix and x coordinate.

use crate::contracts::{read, IEnsRegistry, IEnsResolver, IStealthKeyResolver};
use crate::{namehash, normalize, NamingSystem};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use std::sync::Arc;
use tracing::debug;
use umbra_core::{Error, ProviderError, Result, StealthPublicKeys, TxHash, WalletProvider};
use umbra_params::ENS_REGISTRY_ADDRESS;

/// ENS resolver, bound to the active provider
#[derive(Clone)]
pub struct EnsResolver {
    provider: Arc<dyn WalletProvider>,
    registry: Address,
}

impl EnsResolver {
    /// Create resolver against the canonical registry
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self::with_registry(provider, ENS_REGISTRY_ADDRESS)
    }

    /// Create resolver against a custom registry deployment
    pub fn with_registry(provider: Arc<dyn WalletProvider>, registry: Address) -> Self {
        Self { provider, registry }
    }

    /// True for names this backend handles
    pub fn is_owned_domain(&self, name: &str) -> bool {
        NamingSystem::Ens.owns(name)
    }

    /// Namehash of an ENS name
    pub fn namehash(&self, name: &str) -> Result<B256> {
        Ok(namehash(&self.owned(name)?))
    }

    /// Fetch the stealth public keys published for a name
    pub async fn get_public_keys(&self, name: &str) -> Result<StealthPublicKeys> {
        let name = self.owned(name)?;
        let node = namehash(&name);

        if self.owner(node).await? == Address::ZERO {
            return Err(Error::NameNotRegistered(name));
        }
        let resolver = self.resolver(node).await?;
        if resolver == Address::ZERO {
            return Err(Error::KeysNotSet(name));
        }

        let keys = match read(
            self.provider.as_ref(),
            resolver,
            IStealthKeyResolver::stealthKeysCall { node },
        )
        .await
        {
            Ok(keys) => keys,
            // Resolvers without stealth-key support revert or return nothing
            Err(Error::Provider(ProviderError::Reverted(_))) | Err(Error::Abi(_)) => {
                debug!("Resolver {} has no stealth keys for {}", resolver, name);
                return Err(Error::KeysNotSet(name));
            }
            Err(e) => return Err(e),
        };

        if keys.spendingPubKey.is_zero() || keys.viewingPubKey.is_zero() {
            return Err(Error::KeysNotSet(name));
        }

        StealthPublicKeys::from_compressed_parts(
            prefix_byte(keys.spendingPubKeyPrefix)?,
            keys.spendingPubKey.to_be_bytes::<32>(),
            prefix_byte(keys.viewingPubKeyPrefix)?,
            keys.viewingPubKey.to_be_bytes::<32>(),
        )
    }

    /// Publish stealth public keys on the name's resolver
    pub async fn set_public_keys(&self, name: &str, keys: &StealthPublicKeys) -> Result<TxHash> {
        let name = self.owned(name)?;
        let node = namehash(&name);

        if self.owner(node).await? == Address::ZERO {
            return Err(Error::NameNotRegistered(name));
        }
        let resolver = self.resolver(node).await?;
        if resolver == Address::ZERO {
            return Err(Error::Unexpected(format!("{} has no resolver set", name)));
        }

        let (spending_prefix, spending_x) = StealthPublicKeys::compressed_parts(&keys.spending);
        let (viewing_prefix, viewing_x) = StealthPublicKeys::compressed_parts(&keys.viewing);
        let call = IStealthKeyResolver::setStealthKeysCall {
            node,
            spendingPubKeyPrefix: U256::from(spending_prefix),
            spendingPubKey: U256::from_be_bytes(spending_x),
            viewingPubKeyPrefix: U256::from(viewing_prefix),
            viewingPubKey: U256::from_be_bytes(viewing_x),
        };

        debug!("Setting stealth keys for {} on resolver {}", name, resolver);
        Ok(self
            .provider
            .send_transaction(resolver, Bytes::from(call.abi_encode()))
            .await?)
    }

    /// Reverse-resolve an address to its primary ENS name
    ///
    /// The reverse record is only trusted when the name resolves forward to
    /// the same address.
    pub async fn lookup_name(&self, address: Address) -> Result<Option<String>> {
        let reverse_node = namehash(&reverse_name(address));
        let resolver = self.resolver(reverse_node).await?;
        if resolver == Address::ZERO {
            return Ok(None);
        }

        let name = match read(
            self.provider.as_ref(),
            resolver,
            IEnsResolver::nameCall { node: reverse_node },
        )
        .await
        {
            Ok(ret) => ret._0,
            Err(Error::Provider(ProviderError::Reverted(_))) | Err(Error::Abi(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Ok(name) = normalize(&name) else {
            return Ok(None);
        };

        let node = namehash(&name);
        let forward_resolver = self.resolver(node).await?;
        if forward_resolver == Address::ZERO {
            return Ok(None);
        }
        let forward = match read(
            self.provider.as_ref(),
            forward_resolver,
            IEnsResolver::addrCall { node },
        )
        .await
        {
            Ok(ret) => ret._0,
            Err(Error::Provider(ProviderError::Reverted(_))) | Err(Error::Abi(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if forward == address {
            Ok(Some(name))
        } else {
            debug!("Reverse record {} does not resolve back to {}", name, address);
            Ok(None)
        }
    }

    fn owned(&self, name: &str) -> Result<String> {
        if !self.is_owned_domain(name) {
            return Err(Error::UnsupportedName(name.to_string()));
        }
        normalize(name)
    }

    async fn owner(&self, node: B256) -> Result<Address> {
        Ok(read(self.provider.as_ref(), self.registry, IEnsRegistry::ownerCall { node })
            .await?
            ._0)
    }

    async fn resolver(&self, node: B256) -> Result<Address> {
        Ok(read(self.provider.as_ref(), self.registry, IEnsRegistry::resolverCall { node })
            .await?
            ._0)
    }
}

/// Reverse-registrar name for an address, e.g. `<hex>.addr.reverse`
pub fn reverse_name(address: Address) -> String {
    format!("{}.addr.reverse", hex::encode(address.as_slice()))
}

fn prefix_byte(prefix: U256) -> Result<u8> {
    if prefix > U256::from(u8::MAX) {
        return Err(Error::InvalidKey(format!("bad key prefix {}", prefix)));
    }
    Ok(prefix.to_be_bytes::<32>()[31])
}
