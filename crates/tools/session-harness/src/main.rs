//! CLI harness for exercising a wallet session against a live node
//!
//! This tool allows testing:
//! - Connection and identity resolution
//! - Name and stealth key lookups
//! - Balance aggregation
//! - Key derivation and publication

mod config;
mod report;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use config::{parse_relayer, HarnessConfig, Overrides};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use umbra_core::{Network, Relayer};
use umbra_names::NamingSystem;
use umbra_net::{HttpRelayer, JsonRpcProvider};
use umbra_session::{
    KeyRequestOutcome, ReconfigureOutcome, RelayerFactory, Session, SessionBackends,
    SessionHandle,
};

#[derive(Parser)]
#[command(name = "session-harness")]
#[command(about = "Umbra wallet session testing harness", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Account to act as instead of the node's first account
    #[arg(long, global = true)]
    account: Option<Address>,

    /// Relayer for a chain, as CHAIN=URL (repeatable)
    #[arg(long = "relayer", global = true, value_parser = parse_relayer)]
    relayers: Vec<(u64, String)>,

    /// Unstoppable resolution API key, enables CNS reverse lookup
    #[arg(long, global = true)]
    cns_api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and print the session snapshot
    Status,

    /// Look up stealth keys for a name, or primary names for an address
    Resolve {
        /// `name.eth`, `name.crypto` or a 0x address
        target: String,
    },

    /// Refresh and print token balances
    Balances,

    /// Derive protocol keys and optionally publish them under a name
    Keys {
        /// Name to publish the public keys under
        #[arg(long)]
        publish: Option<String>,
    },

    /// Follow account and network changes until interrupted
    Watch,
}

/// Relayer clients built from the configured endpoints
struct ConfiguredRelayers(umbra_net::RelayerConfig);

impl RelayerFactory for ConfiguredRelayers {
    fn relayer(&self, network: &Network) -> Option<Arc<dyn Relayer>> {
        match HttpRelayer::from_config(&self.0, network.chain_id) {
            Ok(relayer) => relayer.map(|r| Arc::new(r) as Arc<dyn Relayer>),
            Err(e) => {
                warn!("Relayer for chain {} unavailable: {}", network.chain_id, e);
                None
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = HarnessConfig::load(cli.config.as_deref())?;
    config.apply(Overrides {
        rpc_url: cli.rpc_url,
        account: cli.account,
        relayers: cli.relayers,
        cns_api_key: cli.cns_api_key,
    });

    let provider = Arc::new(JsonRpcProvider::new(config.rpc.clone())?);
    let handle = open_session(&config, provider.clone()).await?;

    match cli.command {
        Commands::Status => run_status(&handle).await?,
        Commands::Resolve { target } => run_resolve(&handle, &target).await?,
        Commands::Balances => run_balances(&handle).await?,
        Commands::Keys { publish } => run_keys(&handle, publish).await?,
        Commands::Watch => run_watch(&handle, provider).await?,
    }

    Ok(())
}

async fn open_session(
    config: &HarnessConfig,
    provider: Arc<JsonRpcProvider>,
) -> anyhow::Result<SessionHandle> {
    info!("Endpoint: {}", provider.endpoint());

    let backends = SessionBackends::from_config(&config.session)
        .with_relayers(Arc::new(ConfiguredRelayers(config.relayer.clone())));
    let handle = Session::spawn(config.session.clone(), backends);

    match handle.connect(provider).await? {
        ReconfigureOutcome::Published | ReconfigureOutcome::Unchanged => {}
        ReconfigureOutcome::Failed(e) => anyhow::bail!("connect failed: {}", e.user_message()),
        other => anyhow::bail!("connect did not complete: {:?}", other),
    }

    let snapshot = handle.snapshot();
    if !snapshot.is_supported_network() {
        warn!(
            "Network {:?} is not supported; only the address is available",
            snapshot.network.as_ref().map(|n| n.chain_id)
        );
    }
    Ok(handle)
}

async fn run_status(handle: &SessionHandle) -> anyhow::Result<()> {
    handle.settled().await?;
    let snapshot = handle.snapshot();
    println!("{}", serde_json::to_string_pretty(&report::snapshot_json(&snapshot))?);
    Ok(())
}

async fn run_resolve(handle: &SessionHandle, target: &str) -> anyhow::Result<()> {
    let service = handle
        .domain_service()
        .ok_or_else(|| anyhow::anyhow!("no name service on this network"))?;

    if let Ok(address) = target.parse::<Address>() {
        for system in NamingSystem::ALL {
            match service.lookup_name(system, address).await {
                Ok(Some(name)) => println!("{}: {}", system, name),
                Ok(None) => println!("{}: -", system),
                Err(e) => warn!("{} lookup failed: {}", system, e.user_message()),
            }
        }
        return Ok(());
    }

    let keys = service.get_public_keys(target).await.map_err(|e| {
        anyhow::anyhow!("{}: {}", target, e.user_message())
    })?;
    println!("spending: {}", keys.spending_hex());
    println!("viewing:  {}", keys.viewing_hex());
    Ok(())
}

async fn run_balances(handle: &SessionHandle) -> anyhow::Result<()> {
    let start = std::time::Instant::now();
    let outcome = handle.refresh_balances().await?;
    info!(
        "Balance refresh {:?} in {:.2}s",
        outcome,
        start.elapsed().as_secs_f64()
    );

    let snapshot = handle.snapshot();
    for (symbol, amount) in report::balance_rows(&snapshot) {
        println!("{:>8}  {}", symbol, amount);
    }
    Ok(())
}

async fn run_keys(handle: &SessionHandle, publish: Option<String>) -> anyhow::Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message("Waiting for the wallet to sign the key derivation message");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = handle.request_keys().await;
    spinner.finish_and_clear();

    if outcome? == KeyRequestOutcome::Denied {
        anyhow::bail!("key derivation was declined");
    }

    let snapshot = handle.snapshot();
    let keys = snapshot
        .key_pairs
        .as_ref()
        .map(|k| k.public_keys())
        .ok_or_else(|| anyhow::anyhow!("identity changed while deriving keys"))?;
    println!("spending: {}", keys.spending_hex());
    println!("viewing:  {}", keys.viewing_hex());

    let Some(name) = publish else {
        return Ok(());
    };
    let system = NamingSystem::classify(&name)
        .ok_or_else(|| anyhow::anyhow!("{} is not an ENS or CNS name", name))?;
    let service = handle
        .domain_service()
        .ok_or_else(|| anyhow::anyhow!("no name service on this network"))?;

    let tx = service.set_public_keys(&name, &keys).await?;
    info!("Published keys for {} in {}", name, tx);
    if !handle.set_key_configured(system, true).await? {
        info!("{} is not the account's primary {} name", name, system);
    }
    Ok(())
}

async fn run_watch(handle: &SessionHandle, provider: Arc<JsonRpcProvider>) -> anyhow::Result<()> {
    let watcher = provider.spawn_watcher();
    let mut snapshots = handle.subscribe();
    info!("Watching for account and network changes, Ctrl-C to stop");

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = report::snapshot_json(&snapshots.borrow_and_update());
                println!("{}", line);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        }
    }

    watcher.abort();
    Ok(())
}
