//! Active token list assembly

use alloy_primitives::Address;
use std::collections::HashSet;
use umbra_core::TokenInfo;
use umbra_params::default_tokens;

/// Chain defaults followed by relayer tokens, first entry per address wins
pub fn merge_tokens(defaults: Vec<TokenInfo>, extra: Vec<TokenInfo>) -> Vec<TokenInfo> {
    let mut seen: HashSet<Address> = HashSet::new();
    defaults
        .into_iter()
        .chain(extra)
        .filter(|token| seen.insert(token.address))
        .collect()
}

/// Token list for a chain given the relayer's tokens
pub fn token_list(chain_id: u64, relayer_tokens: Vec<TokenInfo>) -> Vec<TokenInfo> {
    let relayer_tokens = relayer_tokens
        .into_iter()
        .filter(|t| t.chain_id == chain_id)
        .collect();
    merge_tokens(default_tokens(chain_id), relayer_tokens)
}
