//! Network adapters for the Umbra wallet session
//!
//! A JSON-RPC implementation of the wallet provider boundary and an HTTP
//! client for relayer token lists.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod relayer;
pub mod rpc;

pub use config::{RelayerConfig, RpcConfig};
pub use error::{Error, Result};
pub use relayer::HttpRelayer;
pub use rpc::JsonRpcProvider;
