//! JSON-RPC wallet provider
//!
//! Talks to a node or wallet over HTTP. Account and chain changes are not
//! pushed over HTTP, so [`JsonRpcProvider::spawn_watcher`] polls for them and
//! republishes what it sees as [`ProviderEvent`]s.

use crate::{Error, Result, RpcConfig};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use umbra_core::{Network, ProviderError, ProviderEvent, ProviderResult, TxHash, WalletProvider};

const EVENT_CAPACITY: usize = 16;

/// Wallet provider over HTTP JSON-RPC
pub struct JsonRpcProvider {
    config: RpcConfig,
    client: reqwest::Client,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl JsonRpcProvider {
    /// Create provider for a configured endpoint
    pub fn new(config: RpcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            config,
            client,
            next_id: AtomicU64::new(1),
            events,
        })
    }

    /// RPC endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.url
    }

    /// Call a JSON-RPC method
    async fn request<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> Result<R> {
        #[derive(Serialize)]
        struct RpcRequest<'a, P> {
            jsonrpc: &'static str,
            id: u64,
            method: &'a str,
            params: P,
        }

        #[derive(Deserialize)]
        struct RpcResponse<R> {
            result: Option<R>,
            error: Option<RpcErrorObject>,
        }

        #[derive(Deserialize)]
        struct RpcErrorObject {
            code: i64,
            message: String,
        }

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Http(format!("{} returned {}", method, response.status())));
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("{}: {}", method, e)))?;

        if let Some(error) = body.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        body.result
            .ok_or_else(|| Error::Decode(format!("{} returned no result", method)))
    }

    /// Chain id reported by the endpoint
    pub async fn chain_id(&self) -> Result<u64> {
        let quantity: String = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&quantity)
    }

    /// Accounts exposed by the endpoint
    pub async fn accounts(&self) -> Result<Vec<Address>> {
        if let Some(account) = self.config.account {
            return Ok(vec![account]);
        }
        self.request("eth_accounts", json!([])).await
    }

    /// Poll for account and chain changes until the provider is dropped
    ///
    /// Emits `AccountsChanged` and `ChainChanged` when the polled values
    /// differ from the previous poll, and `Disconnected` once when the
    /// endpoint stops answering.
    pub fn spawn_watcher(self: &Arc<Self>) -> JoinHandle<()> {
        let provider: Weak<Self> = Arc::downgrade(self);
        let interval = Duration::from_millis(self.config.poll_interval_ms.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut last: Option<(Vec<Address>, u64)> = None;
            let mut reachable = true;

            loop {
                ticker.tick().await;
                let Some(provider) = provider.upgrade() else {
                    debug!("Provider dropped, stopping watcher");
                    return;
                };

                let polled = tokio::try_join!(provider.accounts(), provider.chain_id());
                match polled {
                    Ok((accounts, chain_id)) => {
                        if !reachable {
                            info!("RPC endpoint {} reachable again", provider.endpoint());
                        }
                        reachable = true;
                        if let Some((prev_accounts, prev_chain)) = &last {
                            if *prev_chain != chain_id {
                                let _ = provider.events.send(ProviderEvent::ChainChanged(chain_id));
                            }
                            if *prev_accounts != accounts {
                                let _ = provider
                                    .events
                                    .send(ProviderEvent::AccountsChanged(accounts.clone()));
                            }
                        }
                        last = Some((accounts, chain_id));
                    }
                    Err(e) => {
                        if reachable {
                            warn!("RPC endpoint {} unreachable: {}", provider.endpoint(), e);
                            let _ = provider.events.send(ProviderEvent::Disconnected);
                        }
                        reachable = false;
                    }
                }
            }
        })
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn get_address(&self) -> ProviderResult<Address> {
        let accounts = self.accounts().await?;
        accounts.first().copied().ok_or_else(|| {
            ProviderError::from_rpc(ProviderError::UNAUTHORIZED_CODE, "No unlocked accounts")
        })
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        Ok(Network::from_chain_id(self.chain_id().await?))
    }

    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
        let result: Bytes = self
            .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await?;
        Ok(result)
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> ProviderResult<TxHash> {
        let from = self.get_address().await?;
        debug!("Submitting transaction from {} to {}", from, to);
        let hash: B256 = self
            .request(
                "eth_sendTransaction",
                json!([{ "from": from, "to": to, "data": data }]),
            )
            .await?;
        Ok(hash)
    }

    async fn sign_message(&self, message: &[u8]) -> ProviderResult<Bytes> {
        let from = self.get_address().await?;
        let payload = format!("0x{}", hex::encode(message));
        let signature: Bytes = self.request("personal_sign", json!([payload, from])).await?;
        Ok(signature)
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        Some(self.events.subscribe())
    }
}

/// Parse a hex-encoded JSON-RPC quantity
pub fn parse_quantity(quantity: &str) -> Result<u64> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| Error::Decode(format!("quantity without 0x prefix: {}", quantity)))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| Error::Decode(format!("invalid quantity {}: {}", quantity, e)))
}
