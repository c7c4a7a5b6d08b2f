//! Property-based tests for umbra-session
//!
//! Uses proptest to verify display identity priority and token list
//! assembly across randomized inputs

use alloy_primitives::Address;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use umbra_core::TokenInfo;
use umbra_names::NamingSystem;
use umbra_params::default_tokens;
use umbra_session::tokens::{merge_tokens, token_list};
use umbra_session::SessionSnapshot;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn token_strategy() -> impl Strategy<Value = TokenInfo> {
    (prop_oneof![Just(1u64), Just(4u64)], 0u8..8, "[A-Z]{3,5}").prop_map(
        |(chain_id, byte, symbol)| TokenInfo {
            chain_id,
            address: Address::repeat_byte(byte),
            name: symbol.clone(),
            symbol,
            decimals: 18,
            logo_uri: None,
        },
    )
}

fn tokens_strategy() -> impl Strategy<Value = Vec<TokenInfo>> {
    prop::collection::vec(token_strategy(), 0..12)
}

fn snapshot(ens: Option<String>, cns: Option<String>, ens_keys: bool, cns_keys: bool) -> SessionSnapshot {
    let mut s = SessionSnapshot::empty(Arc::from(vec![1u64, 4]));
    s.account = Some(Address::repeat_byte(0x5a));
    s.names.ens = ens;
    s.names.cns = cns;
    s.keys_configured.ens = ens_keys;
    s.keys_configured.cns = cns_keys;
    s
}

proptest! {
    /// Property: merged lists never repeat an address
    #[test]
    fn prop_merge_has_no_duplicates(defaults in tokens_strategy(), extra in tokens_strategy()) {
        let merged = merge_tokens(defaults, extra);
        let unique: HashSet<_> = merged.iter().map(|t| t.address).collect();
        prop_assert_eq!(unique.len(), merged.len());
    }

    /// Property: defaults keep their position and relayer tokens follow
    #[test]
    fn prop_token_list_keeps_defaults(chain_id in prop_oneof![Just(1u64), Just(4u64)], extra in tokens_strategy()) {
        let defaults = default_tokens(chain_id);
        let list = token_list(chain_id, extra);

        prop_assert!(list.len() >= defaults.len());
        for (listed, default) in list.iter().zip(defaults.iter()) {
            prop_assert_eq!(listed, default);
        }
        prop_assert!(list.iter().all(|t| t.chain_id == chain_id));
    }

    /// Property: a name with keys always wins, then ENS, then CNS, then the address
    #[test]
    fn prop_display_identity_priority(
        ens in prop::option::of("[a-z]{1,10}\\.eth"),
        cns in prop::option::of("[a-z]{1,10}\\.crypto"),
        ens_keys in any::<bool>(),
        cns_keys in any::<bool>(),
    ) {
        let s = snapshot(ens.clone(), cns.clone(), ens_keys, cns_keys);
        let shown = s.display_identity();

        let expected = match (&ens, &cns) {
            (Some(e), _) if ens_keys => Some(e.clone()),
            (_, Some(c)) if cns_keys => Some(c.clone()),
            (Some(e), _) => Some(e.clone()),
            (None, Some(c)) => Some(c.clone()),
            (None, None) => s.display_address(),
        };
        prop_assert_eq!(shown.clone(), expected);

        if let Some(shown) = shown {
            if let Some(system) = NamingSystem::classify(&shown) {
                prop_assert!(s.names.get(system).is_some());
            }
        }
    }
}
