//! Umbra wallet session
//!
//! Binds a wallet provider to one consistent view of account, network,
//! resolved names, protocol keys and token balances. A single actor task owns
//! the state; callers talk to it through a [`SessionHandle`] and read
//! immutable [`SessionSnapshot`]s.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backends;
pub mod balances;
pub mod config;
pub mod keys;
mod reconfigure;
pub mod session;
pub mod snapshot;
pub mod tokens;

pub use backends::{
    ContractMulticallFactory, DomainServiceFactory, KeyGenerator, Multicall, MulticallFactory,
    NameServiceFactory, NoRelayer, RelayerFactory, SessionBackends, StaticRelayers,
};
pub use balances::{BalanceAggregator, ContractMulticall};
pub use config::SessionConfig;
pub use keys::{keys_from_signature, KeyRequestOutcome, SignatureKeyGenerator, KEY_DERIVATION_MESSAGE};
pub use session::{ReconfigureOutcome, RefreshOutcome, Session, SessionEvent, SessionHandle};
pub use snapshot::{KeysConfigured, ProtocolInstance, ResolvedNames, SessionSnapshot, SessionStatus};
pub use umbra_core::{Error, Result};
