//! Wallet session actor
//!
//! One task owns the canonical [`SessionSnapshot`]. Commands arrive over a
//! bounded channel, results of spawned I/O come back over an unbounded one,
//! and every state change goes out as a new snapshot on a watch channel.
//!
//! Reconfiguration runs in two passes. The first fetches account and network;
//! the actor then either stops (identity unchanged), publishes right away
//! (unsupported network), or starts the second pass that resolves names,
//! relayer tokens and key configuration. Each attempt carries a generation
//! number and only the newest generation may publish.

use crate::backends::SessionBackends;
use crate::keys::{GateAction, KeyDerivationGate, KeyReply, KeyRequestOutcome};
use crate::reconfigure::{fetch_balances, fetch_identity, resolve, Identity, Resolution};
use crate::snapshot::{ProtocolInstance, SessionSnapshot, SessionStatus};
use crate::SessionConfig;
use alloy_primitives::{Address, U256};
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use umbra_core::{Error, Network, ProtocolKeyPairs, ProviderEvent, Result, WalletProvider};
use umbra_names::{NameService, NamingSystem};

/// Change notifications fed into the session
#[derive(Clone)]
pub enum SessionEvent {
    /// A provider was selected, or removed with `None`
    ProviderChanged(Option<Arc<dyn WalletProvider>>),
    /// The wallet switched accounts
    AccountChanged(Option<Address>),
    /// The wallet switched chains
    NetworkChanged(u64),
}

impl SessionEvent {
    /// Translate a provider event; `Disconnected` has no session counterpart
    pub fn from_provider_event(event: ProviderEvent) -> Option<Self> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => {
                Some(SessionEvent::AccountChanged(accounts.first().copied()))
            }
            ProviderEvent::ChainChanged(chain_id) => Some(SessionEvent::NetworkChanged(chain_id)),
            ProviderEvent::Disconnected => None,
        }
    }
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::ProviderChanged(p) => {
                write!(f, "ProviderChanged({})", if p.is_some() { "Some" } else { "None" })
            }
            SessionEvent::AccountChanged(a) => write!(f, "AccountChanged({:?})", a),
            SessionEvent::NetworkChanged(id) => write!(f, "NetworkChanged({})", id),
        }
    }
}

/// Result of a reconfiguration attempt
#[derive(Debug, Clone)]
pub enum ReconfigureOutcome {
    /// A new identity was published
    Published,
    /// Account and chain match the published identity
    Unchanged,
    /// A newer attempt started before this one finished
    Superseded,
    /// No provider is attached
    NoProvider,
    /// Account or network could not be fetched
    Failed(Error),
}

/// Result of a balance refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Balances were replaced
    Updated,
    /// Identity changed while fetching; results were dropped
    Stale,
}

type ReconfigureReply = Option<oneshot::Sender<ReconfigureOutcome>>;
type RefreshReply = Option<oneshot::Sender<Result<RefreshOutcome>>>;

enum Command {
    Connect {
        provider: Arc<dyn WalletProvider>,
        reply: oneshot::Sender<ReconfigureOutcome>,
    },
    Disconnect {
        reply: oneshot::Sender<()>,
    },
    Dispatch(SessionEvent),
    Reconfigure {
        reply: ReconfigureReply,
    },
    RequestKeys {
        reply: KeyReply,
    },
    RefreshBalances {
        reply: oneshot::Sender<Result<RefreshOutcome>>,
    },
    SetKeyConfigured {
        system: NamingSystem,
        configured: bool,
        reply: oneshot::Sender<bool>,
    },
    Settled {
        reply: oneshot::Sender<()>,
    },
}

enum Completion {
    Identity {
        generation: u64,
        provider: Arc<dyn WalletProvider>,
        result: Result<Identity>,
        reply: ReconfigureReply,
    },
    Resolved {
        generation: u64,
        provider: Arc<dyn WalletProvider>,
        identity: Identity,
        resolution: Resolution,
        reply: ReconfigureReply,
    },
    Balances {
        epoch: u64,
        result: Result<BTreeMap<Address, U256>>,
        reply: RefreshReply,
    },
    Keys {
        epoch: u64,
        result: Result<ProtocolKeyPairs>,
    },
}

/// Session entry point
pub struct Session;

impl Session {
    /// Start a session actor on the current Tokio runtime
    ///
    /// The actor stops once every [`SessionHandle`] is dropped.
    pub fn spawn(config: SessionConfig, backends: SessionBackends) -> SessionHandle {
        let (command_tx, commands) = mpsc::channel(config.command_buffer.max(1));
        let (completion_tx, completions) = mpsc::unbounded_channel();
        let allow_list: Arc<[u64]> = Arc::from(config.supported_chain_ids.clone());
        let snapshot = Arc::new(SessionSnapshot::empty(allow_list));
        let (snapshot_tx, snapshots) = watch::channel(snapshot.clone());

        let actor = SessionActor {
            config,
            backends,
            snapshot,
            snapshot_tx,
            commands,
            command_tx: command_tx.downgrade(),
            completions,
            completion_tx,
            provider: None,
            forwarder: None,
            generation: 0,
            gate: KeyDerivationGate::default(),
            in_flight: 0,
            idle_waiters: Vec::new(),
        };
        tokio::spawn(actor.run());

        SessionHandle {
            commands: command_tx,
            snapshots,
        }
    }
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<SessionSnapshot>>,
}

fn actor_stopped() -> Error {
    Error::Unexpected("session actor stopped".to_string())
}

impl SessionHandle {
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| actor_stopped())?;
        rx.await.map_err(|_| actor_stopped())
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshots.borrow().clone()
    }

    /// Watch published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshots.clone()
    }

    /// Attach a provider and configure the session for it
    pub async fn connect(&self, provider: Arc<dyn WalletProvider>) -> Result<ReconfigureOutcome> {
        self.request(|reply| Command::Connect { provider, reply }).await
    }

    /// Drop the provider and clear every field
    pub async fn disconnect(&self) -> Result<()> {
        self.request(|reply| Command::Disconnect { reply }).await
    }

    /// Feed a change event; reconfiguration runs in the background
    pub async fn dispatch(&self, event: SessionEvent) -> Result<()> {
        self.commands
            .send(Command::Dispatch(event))
            .await
            .map_err(|_| actor_stopped())
    }

    /// Re-read account and network and republish identity if it changed
    pub async fn reconfigure(&self) -> Result<ReconfigureOutcome> {
        self.request(|reply| Command::Reconfigure { reply: Some(reply) })
            .await
    }

    /// Derive protocol keys, prompting the signer at most once
    pub async fn request_keys(&self) -> Result<KeyRequestOutcome> {
        self.request(|reply| Command::RequestKeys { reply }).await?
    }

    /// Re-read balances for the active token list
    pub async fn refresh_balances(&self) -> Result<RefreshOutcome> {
        self.request(|reply| Command::RefreshBalances { reply }).await?
    }

    /// Record that keys were published (or removed) for a resolved name
    ///
    /// Returns false, changing nothing, when the network is unsupported or
    /// no name is resolved for the system.
    pub async fn set_key_configured(&self, system: NamingSystem, configured: bool) -> Result<bool> {
        self.request(|reply| Command::SetKeyConfigured {
            system,
            configured,
            reply,
        })
        .await
    }

    /// Wait until no spawned session work is in flight
    pub async fn settled(&self) -> Result<()> {
        self.request(|reply| Command::Settled { reply }).await
    }

    /// Name service for the current provider and network
    pub fn domain_service(&self) -> Option<Arc<dyn NameService>> {
        self.snapshot().name_service.clone()
    }

    /// Lifecycle state
    pub fn status(&self) -> SessionStatus {
        self.snapshots.borrow().status
    }

    /// Connected account
    pub fn account(&self) -> Option<Address> {
        self.snapshots.borrow().account
    }

    /// Connected network
    pub fn network(&self) -> Option<Network> {
        self.snapshots.borrow().network.clone()
    }

    /// Best human-readable identity
    pub fn display_identity(&self) -> Option<String> {
        self.snapshots.borrow().display_identity()
    }

    /// True when the connected network is supported (or unknown)
    pub fn is_supported_network(&self) -> bool {
        self.snapshots.borrow().is_supported_network()
    }

    /// True when protocol keys are derived
    pub fn has_keys(&self) -> bool {
        self.snapshots.borrow().has_keys()
    }
}

struct SessionActor {
    config: SessionConfig,
    backends: SessionBackends,
    snapshot: Arc<SessionSnapshot>,
    snapshot_tx: watch::Sender<Arc<SessionSnapshot>>,
    commands: mpsc::Receiver<Command>,
    command_tx: mpsc::WeakSender<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    /// Provider from the latest event; may be ahead of the snapshot's
    provider: Option<Arc<dyn WalletProvider>>,
    forwarder: Option<JoinHandle<()>>,
    generation: u64,
    gate: KeyDerivationGate,
    in_flight: usize,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl SessionActor {
    async fn run(mut self) {
        debug!("Session actor started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions.recv() => {
                    self.handle_completion(completion);
                    self.in_flight = self.in_flight.saturating_sub(1);
                    self.notify_if_idle();
                }
            }
        }
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        debug!("Session actor stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { provider, reply } => {
                self.attach(provider);
                self.start_reconfigure(Some(reply));
            }
            Command::Disconnect { reply } => {
                self.detach();
                let _ = reply.send(());
            }
            Command::Dispatch(event) => self.handle_event(event),
            Command::Reconfigure { reply } => self.start_reconfigure(reply),
            Command::RequestKeys { reply } => self.request_keys(reply),
            Command::RefreshBalances { reply } => self.start_balance_refresh(Some(reply)),
            Command::SetKeyConfigured {
                system,
                configured,
                reply,
            } => {
                let _ = reply.send(self.set_key_configured(system, configured));
            }
            Command::Settled { reply } => {
                if self.in_flight == 0 {
                    let _ = reply.send(());
                } else {
                    self.idle_waiters.push(reply);
                }
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        debug!("Session event: {:?}", event);
        match event {
            SessionEvent::ProviderChanged(Some(provider)) => {
                self.attach(provider);
                self.start_reconfigure(None);
            }
            SessionEvent::ProviderChanged(None) => self.detach(),
            SessionEvent::AccountChanged(None) => {
                self.forget_account();
                self.start_reconfigure(None);
            }
            SessionEvent::AccountChanged(Some(_)) | SessionEvent::NetworkChanged(_) => {
                self.start_reconfigure(None);
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Identity {
                generation,
                provider,
                result,
                reply,
            } => self.on_identity(generation, provider, result, reply),
            Completion::Resolved {
                generation,
                provider,
                identity,
                resolution,
                reply,
            } => self.on_resolved(generation, provider, identity, resolution, reply),
            Completion::Balances {
                epoch,
                result,
                reply,
            } => self.on_balances(epoch, result, reply),
            Completion::Keys { epoch, result } => {
                let mut resolution = self.gate.complete(epoch, self.snapshot.epoch, result);
                if let Some(keys) = resolution.keys.take() {
                    info!("Protocol keys derived");
                    self.update(|s| s.key_pairs = Some(keys));
                }
                resolution.reply();
            }
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.in_flight += 1;
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let _ = completions.send(task.await);
        });
    }

    fn notify_if_idle(&mut self) {
        if self.in_flight == 0 {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    fn publish(&mut self, snapshot: SessionSnapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshot = snapshot.clone();
        self.snapshot_tx.send_replace(snapshot);
    }

    fn update(&mut self, f: impl FnOnce(&mut SessionSnapshot)) {
        let mut next = (*self.snapshot).clone();
        f(&mut next);
        self.publish(next);
    }

    /// Publish a new identity under the next epoch
    fn publish_identity(&mut self, mut next: SessionSnapshot) {
        next.epoch = self.snapshot.epoch + 1;
        next.configured_at = Some(Utc::now());
        info!(
            "Session ready: account={:?} chain={:?} supported={} epoch={}",
            next.account,
            next.network.as_ref().map(|n| n.chain_id),
            next.is_supported_network(),
            next.epoch
        );
        self.publish(next);
    }

    fn attach(&mut self, provider: Arc<dyn WalletProvider>) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.forwarder = provider
            .subscribe()
            .map(|events| spawn_forwarder(events, self.command_tx.clone()));
        self.provider = Some(provider);
        info!("Wallet provider attached");
    }

    fn detach(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.provider = None;
        // In-flight passes must not publish over the cleared state
        self.generation += 1;

        let mut next = self.snapshot.reset();
        next.epoch = self.snapshot.epoch + 1;
        next.status = SessionStatus::Disconnected;
        self.publish(next);
        info!("Wallet disconnected");
    }

    /// Drop the published identity but stay attached, e.g. when the wallet locks
    fn forget_account(&mut self) {
        if self.provider.is_none() || self.snapshot.account.is_none() {
            return;
        }
        let mut next = self.snapshot.reset();
        next.epoch = self.snapshot.epoch + 1;
        next.status = SessionStatus::Connecting;
        next.provider = self.provider.clone();
        self.publish(next);
        info!("Wallet exposes no account, identity cleared");
    }

    /// Status to show when no attempt is in flight
    fn settled_status(&self) -> SessionStatus {
        if self.snapshot.account.is_some() {
            SessionStatus::Ready {
                supported: self.snapshot.is_supported_network(),
            }
        } else if self.provider.is_some() {
            SessionStatus::Connecting
        } else {
            SessionStatus::Disconnected
        }
    }

    fn start_reconfigure(&mut self, reply: ReconfigureReply) {
        let Some(provider) = self.provider.clone() else {
            debug!("Reconfigure requested without a provider");
            if let Some(reply) = reply {
                let _ = reply.send(ReconfigureOutcome::NoProvider);
            }
            return;
        };

        self.generation += 1;
        let generation = self.generation;
        let status = if self.snapshot.account.is_some() {
            SessionStatus::Configuring
        } else {
            SessionStatus::Connecting
        };
        if self.snapshot.status != status {
            self.update(|s| s.status = status);
        }

        debug!("Reconfiguring session, generation {}", generation);
        self.spawn(async move {
            let result = fetch_identity(provider.as_ref()).await;
            Completion::Identity {
                generation,
                provider,
                result,
                reply,
            }
        });
    }

    fn on_identity(
        &mut self,
        generation: u64,
        provider: Arc<dyn WalletProvider>,
        result: Result<Identity>,
        reply: ReconfigureReply,
    ) {
        if generation != self.generation {
            debug!("Dropping identity of superseded generation {}", generation);
            return send(reply, ReconfigureOutcome::Superseded);
        }

        let identity = match result {
            Ok(identity) => identity,
            Err(e) if e.is_unauthorized() => {
                warn!("Reconfiguration failed: {}", e);
                self.forget_account();
                let status = self.settled_status();
                if self.snapshot.status != status {
                    self.update(|s| s.status = status);
                }
                return send(reply, ReconfigureOutcome::Failed(e));
            }
            Err(e) => {
                warn!("Reconfiguration failed: {}", e);
                let status = self.settled_status();
                self.update(|s| s.status = status);
                return send(reply, ReconfigureOutcome::Failed(e));
            }
        };

        let current_chain = self.snapshot.network.as_ref().map(|n| n.chain_id);
        if self.snapshot.account == Some(identity.account)
            && current_chain == Some(identity.network.chain_id)
        {
            debug!("Identity unchanged for {}", identity.account);
            let status = self.settled_status();
            let same_provider = self
                .snapshot
                .provider
                .as_ref()
                .is_some_and(|p| Arc::ptr_eq(p, &provider));
            // Name service calls must go through the provider now attached
            let name_service = (!same_provider && self.snapshot.name_service.is_some())
                .then(|| {
                    self.backends
                        .names
                        .name_service(provider.clone(), &identity.network)
                });
            self.update(|s| {
                s.status = status;
                if !same_provider {
                    s.provider = Some(provider);
                }
                if name_service.is_some() {
                    s.name_service = name_service;
                }
            });
            return send(reply, ReconfigureOutcome::Unchanged);
        }

        if !self.config.is_supported_chain(identity.network.chain_id) {
            info!("Network {} is not supported", identity.network.chain_id);
            let mut next = self.snapshot.reset();
            next.status = SessionStatus::Ready { supported: false };
            next.provider = Some(provider);
            next.account = Some(identity.account);
            next.network = Some(identity.network);
            self.publish_identity(next);
            return send(reply, ReconfigureOutcome::Published);
        }

        let backends = self.backends.clone();
        self.spawn(async move {
            let resolution = resolve(&backends, provider.clone(), &identity).await;
            Completion::Resolved {
                generation,
                provider,
                identity,
                resolution,
                reply,
            }
        });
    }

    fn on_resolved(
        &mut self,
        generation: u64,
        provider: Arc<dyn WalletProvider>,
        identity: Identity,
        resolution: Resolution,
        reply: ReconfigureReply,
    ) {
        if generation != self.generation {
            debug!("Dropping resolution of superseded generation {}", generation);
            return send(reply, ReconfigureOutcome::Superseded);
        }

        let mut next = self.snapshot.reset();
        next.status = SessionStatus::Ready { supported: true };
        next.protocol = ProtocolInstance::for_chain(identity.network.chain_id);
        next.provider = Some(provider);
        next.account = Some(identity.account);
        next.network = Some(identity.network);
        next.names = resolution.names;
        next.keys_configured = resolution.keys_configured;
        next.tokens = resolution.tokens;
        next.relayer = resolution.relayer;
        next.name_service = Some(resolution.name_service);
        self.publish_identity(next);
        send(reply, ReconfigureOutcome::Published);

        if self.config.refresh_balances_on_publish {
            self.start_balance_refresh(None);
        }
    }

    fn start_balance_refresh(&mut self, reply: RefreshReply) {
        let snapshot = self.snapshot.clone();
        let (Some(provider), Some(account), Some(network)) = (
            snapshot.provider.clone(),
            snapshot.account,
            snapshot.network.clone(),
        ) else {
            return send(reply, Err(Error::NotConnected));
        };
        if !snapshot.is_supported_network() {
            return send(reply, Err(Error::UnsupportedNetwork(network.chain_id)));
        }

        let backends = self.backends.clone();
        let epoch = snapshot.epoch;
        self.spawn(async move {
            let result =
                fetch_balances(&backends, provider, &network, account, &snapshot.tokens).await;
            Completion::Balances {
                epoch,
                result,
                reply,
            }
        });
    }

    fn on_balances(
        &mut self,
        epoch: u64,
        result: Result<BTreeMap<Address, U256>>,
        reply: RefreshReply,
    ) {
        if epoch != self.snapshot.epoch {
            debug!("Dropping balances of superseded identity epoch {}", epoch);
            return send(reply, Ok(RefreshOutcome::Stale));
        }

        match result {
            Ok(mut balances) => {
                let listed: HashSet<Address> = self.snapshot.tokens.iter().map(|t| t.address).collect();
                balances.retain(|token, _| listed.contains(token));
                self.update(|s| {
                    s.balances = balances;
                    s.balances_updated_at = Some(Utc::now());
                });
                send(reply, Ok(RefreshOutcome::Updated));
            }
            Err(e) => {
                warn!("Balance refresh failed: {}", e);
                send(reply, Err(e));
            }
        }
    }

    fn request_keys(&mut self, reply: KeyReply) {
        match self.gate.request(&self.snapshot, reply) {
            GateAction::Start {
                epoch,
                protocol,
                signer,
            } => {
                debug!("Starting key derivation for epoch {}", epoch);
                let keys = self.backends.keys.clone();
                self.spawn(async move {
                    let result = keys.generate_private_keys(&protocol, signer).await;
                    Completion::Keys { epoch, result }
                });
            }
            GateAction::Joined | GateAction::Answered => {}
        }
    }

    fn set_key_configured(&mut self, system: NamingSystem, configured: bool) -> bool {
        if !self.snapshot.is_supported_network() || self.snapshot.names.get(system).is_none() {
            debug!("Ignoring key flag for {}: no resolved name", system);
            return false;
        }
        if self.snapshot.keys_configured.get(system) != configured {
            self.update(|s| s.keys_configured.set(system, configured));
        }
        true
    }
}

fn send<T>(reply: Option<oneshot::Sender<T>>, value: T) {
    if let Some(reply) = reply {
        let _ = reply.send(value);
    }
}

/// Forward provider events into the actor until either side goes away
fn spawn_forwarder(
    mut events: broadcast::Receiver<ProviderEvent>,
    commands: mpsc::WeakSender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let command = match events.recv().await {
                Ok(event) => match SessionEvent::from_provider_event(event) {
                    Some(event) => Command::Dispatch(event),
                    None => {
                        warn!("Provider reported a disconnect");
                        continue;
                    }
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Missed {} provider events, reconfiguring", missed);
                    Command::Reconfigure { reply: None }
                }
                Err(broadcast::error::RecvError::Closed) => return,
            };
            let Some(commands) = commands.upgrade() else {
                return;
            };
            if commands.send(command).await.is_err() {
                return;
            }
        }
    })
}
