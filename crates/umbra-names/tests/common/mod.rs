//! Scripted chain provider for resolver tests

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use umbra_core::{
    KeyPair, Network, ProtocolKeyPairs, ProviderError, ProviderResult, StealthPublicKeys, TxHash,
    WalletProvider,
};

/// Provider answering `eth_call` from a table keyed by target and calldata
///
/// Unscripted calls revert, like a contract without the function would.
pub struct MockChain {
    network: Network,
    responses: Mutex<HashMap<(Address, Vec<u8>), ProviderResult<Bytes>>>,
    sent: Mutex<Vec<(Address, Bytes)>>,
}

impl MockChain {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            responses: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn mainnet() -> Self {
        Self::new(Network::new(1, "homestead"))
    }

    /// Script a successful call
    pub fn returns<C: SolCall>(&self, to: Address, call: C, ret: Vec<u8>) {
        self.responses
            .lock()
            .insert((to, call.abi_encode()), Ok(Bytes::from(ret)));
    }

    /// Script a failing call
    pub fn fails<C: SolCall>(&self, to: Address, call: C, err: ProviderError) {
        self.responses.lock().insert((to, call.abi_encode()), Err(err));
    }

    /// Transactions submitted so far
    pub fn sent(&self) -> Vec<(Address, Bytes)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn get_address(&self) -> ProviderResult<Address> {
        Ok(Address::repeat_byte(0x11))
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        Ok(self.network.clone())
    }

    async fn call(&self, to: Address, data: Bytes) -> ProviderResult<Bytes> {
        self.responses
            .lock()
            .get(&(to, data.to_vec()))
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::Reverted("unscripted call".to_string())))
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> ProviderResult<TxHash> {
        self.sent.lock().push((to, data));
        Ok(B256::repeat_byte(0xab))
    }

    async fn sign_message(&self, _message: &[u8]) -> ProviderResult<Bytes> {
        Err(ProviderError::Rejected)
    }
}

/// Deterministic stealth keys for fixtures
pub fn stealth_keys(seed: u8) -> StealthPublicKeys {
    ProtocolKeyPairs {
        spending: KeyPair::from_secret_bytes(&[seed; 32]).unwrap(),
        viewing: KeyPair::from_secret_bytes(&[seed.wrapping_add(1); 32]).unwrap(),
    }
    .public_keys()
}
