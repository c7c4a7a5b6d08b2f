//! Relayer boundary
//!
//! A relayer submits withdrawals on the user's behalf and only accepts a
//! fixed set of tokens per network. The session uses it as an extra token
//! source on top of the chain defaults.

use crate::{Result, TokenInfo};
use async_trait::async_trait;

/// Network-scoped relayer service
#[async_trait]
pub trait Relayer: Send + Sync {
    /// Tokens the relayer accepts for withdrawal
    async fn tokens(&self) -> Result<Vec<TokenInfo>>;
}
