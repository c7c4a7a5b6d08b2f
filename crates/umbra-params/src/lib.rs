//! Umbra chain parameters and constants
//!
//! This crate provides the supported-chain allow-list, per-chain contract
//! addresses (multicall, naming registries, protocol instance) and the
//! default token lists used by the wallet session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod network;
pub mod tokens;

pub use network::{
    chain_params, is_supported_chain, ChainParams, NetworkType, ENS_REGISTRY_ADDRESS,
    SUPPORTED_CHAIN_IDS,
};
pub use tokens::{default_tokens, TokenInfo, NATIVE_TOKEN_ADDRESS};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Chain id is not in the allow-list
    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    /// Network name not recognized
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
