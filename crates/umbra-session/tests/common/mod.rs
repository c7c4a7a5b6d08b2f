//! Stub collaborators for session tests

#![allow(dead_code)]

use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use umbra_core::{
    Error, KeyPair, Network, ProtocolKeyPairs, ProviderError, ProviderEvent, ProviderResult,
    Relayer, Result, StealthPublicKeys, TokenInfo, TxHash, WalletProvider,
};
use umbra_names::{namehash, NameService, NamingSystem};
use umbra_session::{
    KeyGenerator, Multicall, MulticallFactory, NameServiceFactory, ProtocolInstance,
    SessionBackends, SessionConfig, SessionHandle, Session,
};

pub const ALICE: Address = address!("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
pub const BOB: Address = address!("b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0");
pub const MULTICALL: Address = address!("9999999999999999999999999999999999999999");

// ============================================================================
// Wallet
// ============================================================================

/// Wallet whose account and chain can be switched from the test
pub struct StubWallet {
    account: Mutex<Option<Address>>,
    chain_id: Mutex<u64>,
    delay: Duration,
    calls: AtomicUsize,
    events: broadcast::Sender<ProviderEvent>,
}

impl StubWallet {
    pub fn new(account: Address, chain_id: u64) -> Arc<Self> {
        Self::with_delay(account, chain_id, Duration::ZERO)
    }

    /// Wallet that takes `delay` to answer account and network queries
    pub fn with_delay(account: Address, chain_id: u64, delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            account: Mutex::new(Some(account)),
            chain_id: Mutex::new(chain_id),
            delay,
            calls: AtomicUsize::new(0),
            events,
        })
    }

    /// Switch accounts and announce it
    pub fn switch_account(&self, account: Address) {
        *self.account.lock() = Some(account);
        let _ = self.events.send(ProviderEvent::AccountsChanged(vec![account]));
    }

    /// Lock the wallet so it exposes no account, and announce it
    pub fn lock(&self) {
        *self.account.lock() = None;
        let _ = self.events.send(ProviderEvent::AccountsChanged(Vec::new()));
    }

    /// Number of contract calls routed through this wallet
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Switch chains and announce it
    pub fn switch_chain(&self, chain_id: u64) {
        *self.chain_id.lock() = chain_id;
        let _ = self.events.send(ProviderEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletProvider for StubWallet {
    async fn get_address(&self) -> ProviderResult<Address> {
        tokio::time::sleep(self.delay).await;
        self.account.lock().ok_or_else(|| {
            ProviderError::from_rpc(ProviderError::UNAUTHORIZED_CODE, "wallet is locked")
        })
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        tokio::time::sleep(self.delay).await;
        Ok(Network::from_chain_id(*self.chain_id.lock()))
    }

    async fn call(&self, _to: Address, _data: Bytes) -> ProviderResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Reverted("no contracts here".to_string()))
    }

    async fn send_transaction(&self, _to: Address, _data: Bytes) -> ProviderResult<TxHash> {
        Ok(B256::repeat_byte(0xab))
    }

    async fn sign_message(&self, _message: &[u8]) -> ProviderResult<Bytes> {
        Ok(Bytes::from(vec![7u8; 65]))
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ProviderEvent>> {
        Some(self.events.subscribe())
    }
}

/// Wallet that cannot report its account
pub struct LockedWallet;

#[async_trait]
impl WalletProvider for LockedWallet {
    async fn get_address(&self) -> ProviderResult<Address> {
        Err(ProviderError::from_rpc(4100, "locked"))
    }

    async fn get_network(&self) -> ProviderResult<Network> {
        Ok(Network::from_chain_id(4))
    }

    async fn call(&self, _to: Address, _data: Bytes) -> ProviderResult<Bytes> {
        Err(ProviderError::Disconnected)
    }

    async fn send_transaction(&self, _to: Address, _data: Bytes) -> ProviderResult<TxHash> {
        Err(ProviderError::Disconnected)
    }

    async fn sign_message(&self, _message: &[u8]) -> ProviderResult<Bytes> {
        Err(ProviderError::Disconnected)
    }
}

// ============================================================================
// Names
// ============================================================================

#[derive(Default)]
struct NamesInner {
    names: HashMap<(Address, NamingSystem), String>,
    with_keys: HashSet<String>,
}

/// In-memory name service
#[derive(Clone, Default)]
pub struct FakeNames {
    inner: Arc<Mutex<NamesInner>>,
}

impl FakeNames {
    /// Give `account` a primary name
    pub fn name(&self, account: Address, name: &str) -> &Self {
        let system = NamingSystem::classify(name).expect("fixture names are classifiable");
        self.inner
            .lock()
            .names
            .insert((account, system), name.to_string());
        self
    }

    /// Mark a name as having stealth keys
    pub fn keys(&self, name: &str) -> &Self {
        self.inner.lock().with_keys.insert(name.to_string());
        self
    }
}

pub fn stealth_keys() -> StealthPublicKeys {
    ProtocolKeyPairs {
        spending: KeyPair::from_secret_bytes(&[5; 32]).unwrap(),
        viewing: KeyPair::from_secret_bytes(&[6; 32]).unwrap(),
    }
    .public_keys()
}

#[async_trait]
impl NameService for FakeNames {
    fn is_owned_domain(&self, name: &str) -> bool {
        NamingSystem::classify(name).is_some()
    }

    fn namehash(&self, name: &str) -> Result<B256> {
        if !self.is_owned_domain(name) {
            return Err(Error::UnsupportedName(name.to_string()));
        }
        Ok(namehash(name))
    }

    async fn get_public_keys(&self, name: &str) -> Result<StealthPublicKeys> {
        if !self.is_owned_domain(name) {
            return Err(Error::UnsupportedName(name.to_string()));
        }
        if self.inner.lock().with_keys.contains(name) {
            Ok(stealth_keys())
        } else {
            Err(Error::KeysNotSet(name.to_string()))
        }
    }

    async fn set_public_keys(&self, name: &str, _keys: &StealthPublicKeys) -> Result<TxHash> {
        if !self.is_owned_domain(name) {
            return Err(Error::UnsupportedName(name.to_string()));
        }
        self.inner.lock().with_keys.insert(name.to_string());
        Ok(B256::repeat_byte(1))
    }

    async fn lookup_name(&self, system: NamingSystem, address: Address) -> Result<Option<String>> {
        Ok(self.inner.lock().names.get(&(address, system)).cloned())
    }
}

impl NameServiceFactory for FakeNames {
    fn name_service(
        &self,
        _provider: Arc<dyn WalletProvider>,
        _network: &Network,
    ) -> Arc<dyn NameService> {
        Arc::new(self.clone())
    }
}

// ============================================================================
// Balances
// ============================================================================

#[derive(Clone)]
enum Answer {
    Words(Vec<u64>),
    Fail,
}

#[derive(Default)]
struct BalancesInner {
    answers: HashMap<Address, (Duration, Answer)>,
}

/// Multicall answering per account, read from the calldata
#[derive(Clone, Default)]
pub struct StubBalances {
    inner: Arc<Mutex<BalancesInner>>,
    calls: Arc<AtomicUsize>,
}

impl StubBalances {
    /// Answer `words` for `account` after `delay`
    pub fn set(&self, account: Address, words: Vec<u64>, delay: Duration) {
        self.inner
            .lock()
            .answers
            .insert(account, (delay, Answer::Words(words)));
    }

    /// Fail every aggregate for `account`
    pub fn fail(&self, account: Address) {
        self.inner
            .lock()
            .answers
            .insert(account, (Duration::ZERO, Answer::Fail));
    }

    /// Number of aggregate calls seen
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Multicall for StubBalances {
    fn address(&self) -> Address {
        MULTICALL
    }

    async fn aggregate(&self, calls: Vec<(Address, Bytes)>) -> Result<Vec<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // getEthBalance(address) and balanceOf(address) share the layout
        let account = Address::from_slice(&calls[0].1[16..36]);
        let (delay, answer) = self
            .inner
            .lock()
            .answers
            .get(&account)
            .cloned()
            .unwrap_or((Duration::ZERO, Answer::Words(vec![0; calls.len()])));

        tokio::time::sleep(delay).await;
        match answer {
            Answer::Words(words) => Ok(words
                .into_iter()
                .map(|w| Bytes::from(U256::from(w).to_be_bytes::<32>().to_vec()))
                .collect()),
            Answer::Fail => Err(Error::AggregationFailure("stub failure".to_string())),
        }
    }
}

impl MulticallFactory for StubBalances {
    fn multicall(
        &self,
        _provider: Arc<dyn WalletProvider>,
        _network: &Network,
    ) -> Option<Arc<dyn Multicall>> {
        Some(Arc::new(self.clone()))
    }
}

// ============================================================================
// Keys and relayer
// ============================================================================

/// Key generator counting its prompts
pub struct CountingKeys {
    prompts: AtomicUsize,
    delay: Duration,
    reject: AtomicBool,
}

impl CountingKeys {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            prompts: AtomicUsize::new(0),
            delay,
            reject: AtomicBool::new(false),
        })
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Make the user decline future prompts
    pub fn reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyGenerator for CountingKeys {
    async fn generate_private_keys(
        &self,
        _protocol: &ProtocolInstance,
        _signer: Arc<dyn WalletProvider>,
    ) -> Result<ProtocolKeyPairs> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::Provider(ProviderError::Rejected));
        }
        Ok(ProtocolKeyPairs {
            spending: KeyPair::from_secret_bytes(&[1; 32])?,
            viewing: KeyPair::from_secret_bytes(&[2; 32])?,
        })
    }
}

/// Relayer with a fixed answer
pub struct FixedRelayer(pub Option<Vec<TokenInfo>>);

#[async_trait]
impl Relayer for FixedRelayer {
    async fn tokens(&self) -> Result<Vec<TokenInfo>> {
        self.0
            .clone()
            .ok_or_else(|| Error::Provider(ProviderError::Transport("relayer down".to_string())))
    }
}

pub fn token(chain_id: u64, byte: u8, symbol: &str) -> TokenInfo {
    TokenInfo {
        chain_id,
        address: Address::repeat_byte(byte),
        name: symbol.to_string(),
        symbol: symbol.to_string(),
        decimals: 18,
        logo_uri: None,
    }
}

// ============================================================================
// Session
// ============================================================================

/// Test fixture bundling the stubs behind one session
pub struct Fixture {
    pub names: FakeNames,
    pub balances: StubBalances,
    pub keys: Arc<CountingKeys>,
    pub handle: SessionHandle,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(SessionConfig::default(), Duration::ZERO, |b| b)
    }

    /// Fixture with a key prompt taking `key_delay`
    pub fn with_key_delay(key_delay: Duration) -> Self {
        Self::with(SessionConfig::default(), key_delay, |b| b)
    }

    pub fn with(
        config: SessionConfig,
        key_delay: Duration,
        customize: impl FnOnce(SessionBackends) -> SessionBackends,
    ) -> Self {
        let names = FakeNames::default();
        let balances = StubBalances::default();
        let keys = CountingKeys::new(key_delay);
        let backends = SessionBackends::default()
            .with_names(Arc::new(names.clone()))
            .with_multicall(Arc::new(balances.clone()))
            .with_key_generator(keys.clone());
        let handle = Session::spawn(config, customize(backends));
        Self {
            names,
            balances,
            keys,
            handle,
        }
    }
}
