//! Umbra wallet core types
//!
//! This crate holds the pieces every other crate in the workspace agrees on:
//! the error taxonomy, the wallet provider boundary, network descriptors,
//! address formatting, protocol key types and the relayer boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod keys;
pub mod network;
pub mod provider;
pub mod relayer;

pub use address::{format_address, to_checksum};
pub use error::{Error, ErrorCategory, ProviderError, Result};
pub use keys::{KeyPair, ProtocolKeyPairs, StealthPublicKeys};
pub use network::Network;
pub use provider::{ProviderEvent, ProviderResult, TxHash, WalletProvider};
pub use relayer::Relayer;
pub use umbra_params::TokenInfo;
