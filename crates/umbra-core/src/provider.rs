//! Wallet provider boundary
//!
//! An EIP-1193-shaped capability: account and network queries, read-only
//! contract calls, transaction submission, message signing, and an optional
//! change-event subscription. The session treats it as an event source plus
//! query capability and never looks behind it.

use crate::{Network, ProviderError};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Transaction hash
pub type TxHash = B256;

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Change events emitted by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Selected accounts changed; empty when the wallet locked
    AccountsChanged(Vec<Address>),
    /// Active chain changed
    ChainChanged(u64),
    /// Provider lost its connection
    Disconnected,
}

/// Connected wallet transport
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Address of the signing account
    async fn get_address(&self) -> ProviderResult<Address>;

    /// Network the provider is connected to
    async fn get_network(&self) -> ProviderResult<Network>;

    /// Read-only contract call (`eth_call` at the latest block)
    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes>;

    /// Submit a transaction from the signing account
    async fn send_transaction(&self, to: Address, data: Bytes) -> ProviderResult<TxHash>;

    /// Sign a message with the account key (`personal_sign`)
    async fn sign_message(&self, message: &[u8]) -> ProviderResult<Bytes>;

    /// Subscribe to change events, if the provider emits any
    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        None
    }
}
