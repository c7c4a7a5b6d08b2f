//! Token balances in one multicall round trip
//!
//! The native asset is read through the multicall contract's
//! `getEthBalance`; every other token through its own `balanceOf`.

#![allow(missing_docs)]

use crate::backends::Multicall;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use umbra_core::{Error, Result, TokenInfo, WalletProvider};

sol! {
    interface IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calls) external returns (uint256 blockNumber, bytes[] returnData);
        function getEthBalance(address addr) external view returns (uint256 balance);
    }

    interface IERC20 {
        function balanceOf(address account) external view returns (uint256 balance);
    }
}

/// Multicall contract reached through the wallet provider
pub struct ContractMulticall {
    provider: Arc<dyn WalletProvider>,
    address: Address,
}

impl ContractMulticall {
    /// Create client for the contract at `address`
    pub fn new(provider: Arc<dyn WalletProvider>, address: Address) -> Self {
        Self { provider, address }
    }
}

#[async_trait]
impl Multicall for ContractMulticall {
    fn address(&self) -> Address {
        self.address
    }

    async fn aggregate(&self, calls: Vec<(Address, Bytes)>) -> Result<Vec<Bytes>> {
        let call = IMulticall::aggregateCall {
            calls: calls
                .into_iter()
                .map(|(target, data)| IMulticall::Call {
                    target,
                    callData: data,
                })
                .collect(),
        };
        let raw = self
            .provider
            .call(self.address, Bytes::from(call.abi_encode()))
            .await?;
        let ret = IMulticall::aggregateCall::abi_decode_returns(&raw, true)
            .map_err(|e| Error::AggregationFailure(format!("aggregate: {}", e)))?;
        Ok(ret.returnData)
    }
}

/// Balance queries for a token list
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Calls that read each token's balance for `account`, in token order
    pub fn calls(multicall: Address, account: Address, tokens: &[TokenInfo]) -> Vec<(Address, Bytes)> {
        tokens
            .iter()
            .map(|token| {
                if token.is_native() {
                    let call = IMulticall::getEthBalanceCall { addr: account };
                    (multicall, Bytes::from(call.abi_encode()))
                } else {
                    let call = IERC20::balanceOfCall { account };
                    (token.address, Bytes::from(call.abi_encode()))
                }
            })
            .collect()
    }

    /// Fetch balances for every token
    ///
    /// All or nothing: a short response or an undecodable entry fails the
    /// whole refresh.
    pub async fn fetch(
        multicall: &dyn Multicall,
        account: Address,
        tokens: &[TokenInfo],
    ) -> Result<BTreeMap<Address, U256>> {
        if tokens.is_empty() {
            return Ok(BTreeMap::new());
        }

        let calls = Self::calls(multicall.address(), account, tokens);
        let results = multicall.aggregate(calls).await?;
        if results.len() != tokens.len() {
            return Err(Error::AggregationFailure(format!(
                "expected {} results, got {}",
                tokens.len(),
                results.len()
            )));
        }

        let mut balances = BTreeMap::new();
        for (token, data) in tokens.iter().zip(results) {
            let balance = IERC20::balanceOfCall::abi_decode_returns(&data, true)
                .map_err(|e| Error::AggregationFailure(format!("{}: {}", token.symbol, e)))?
                .balance;
            balances.insert(token.address, balance);
        }

        debug!("Fetched {} balances for {}", balances.len(), account);
        Ok(balances)
    }
}
