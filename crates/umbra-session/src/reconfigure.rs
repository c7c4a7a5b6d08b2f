//! Reconfiguration passes
//!
//! Each pass runs in a spawned task and hands its result back to the actor.
//! Nothing in here reads or writes session state.

use crate::backends::SessionBackends;
use crate::balances::BalanceAggregator;
use crate::snapshot::{KeysConfigured, ResolvedNames};
use crate::tokens::token_list;
use alloy_primitives::{Address, U256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use umbra_core::{Error, Network, Relayer, Result, TokenInfo, WalletProvider};
use umbra_names::{DomainKeyRegistry, NameService, NamingSystem};

/// Account and network reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub account: Address,
    pub network: Network,
}

/// Everything resolved for an identity on a supported network
pub(crate) struct Resolution {
    pub names: ResolvedNames,
    pub keys_configured: KeysConfigured,
    pub tokens: Vec<TokenInfo>,
    pub relayer: Option<Arc<dyn Relayer>>,
    pub name_service: Arc<dyn NameService>,
}

/// Fetch account and network in parallel
pub(crate) async fn fetch_identity(provider: &dyn WalletProvider) -> Result<Identity> {
    let (account, network) = tokio::try_join!(provider.get_address(), provider.get_network())?;
    Ok(Identity { account, network })
}

/// Resolve names, relayer tokens and key configuration for an identity
///
/// Never fails: lookups that error are logged and treated as absent.
pub(crate) async fn resolve(
    backends: &SessionBackends,
    provider: Arc<dyn WalletProvider>,
    identity: &Identity,
) -> Resolution {
    let service = backends.names.name_service(provider, &identity.network);
    let relayer = backends.relayers.relayer(&identity.network);

    let (ens, cns, relayer_tokens) = tokio::join!(
        lookup(service.as_ref(), NamingSystem::Ens, identity.account),
        lookup(service.as_ref(), NamingSystem::Cns, identity.account),
        relayer_tokens(relayer.as_deref()),
    );

    let registry = DomainKeyRegistry::new(service.clone());
    let (ens_keys, cns_keys) = tokio::join!(
        is_configured(&registry, ens.as_deref()),
        is_configured(&registry, cns.as_deref()),
    );

    debug!(
        "Resolved {}: ens={:?} ({}), cns={:?} ({})",
        identity.account, ens, ens_keys, cns, cns_keys
    );

    Resolution {
        names: ResolvedNames { ens, cns },
        keys_configured: KeysConfigured {
            ens: ens_keys,
            cns: cns_keys,
        },
        tokens: token_list(identity.network.chain_id, relayer_tokens),
        relayer,
        name_service: service,
    }
}

/// Fetch balances for the token list through the network's multicall
pub(crate) async fn fetch_balances(
    backends: &SessionBackends,
    provider: Arc<dyn WalletProvider>,
    network: &Network,
    account: Address,
    tokens: &[TokenInfo],
) -> Result<BTreeMap<Address, U256>> {
    let multicall = backends
        .multicall
        .multicall(provider, network)
        .ok_or(Error::UnsupportedNetwork(network.chain_id))?;
    BalanceAggregator::fetch(multicall.as_ref(), account, tokens).await
}

async fn lookup(service: &dyn NameService, system: NamingSystem, account: Address) -> Option<String> {
    match service.lookup_name(system, account).await {
        Ok(name) => name,
        Err(e) => {
            warn!("{} lookup for {} failed: {}", system, account, e);
            None
        }
    }
}

async fn relayer_tokens(relayer: Option<&dyn Relayer>) -> Vec<TokenInfo> {
    let Some(relayer) = relayer else {
        return Vec::new();
    };
    match relayer.tokens().await {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("Relayer token fetch failed: {}", e);
            Vec::new()
        }
    }
}

async fn is_configured(registry: &DomainKeyRegistry, name: Option<&str>) -> bool {
    match name {
        Some(name) => registry.has_public_keys_configured(name).await,
        None => false,
    }
}
