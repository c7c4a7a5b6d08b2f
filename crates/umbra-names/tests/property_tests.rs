//! Property-based tests for umbra-names
//!
//! Uses proptest to verify classifier and namehash invariants across
//! randomized inputs

use proptest::prelude::*;
use umbra_names::{namehash, normalize, NamingSystem};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate a single DNS-style label
fn label_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9-]{1,20}").unwrap()
}

/// Generate arbitrary text that may or may not look like a name
fn any_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9.\\- ]{0,40}").unwrap()
}

proptest! {
    /// Property: classification is total and picks at most one system
    #[test]
    fn prop_classifier_total(name in any_name_strategy()) {
        let owners: Vec<_> = NamingSystem::ALL
            .into_iter()
            .filter(|s| s.owns(&name))
            .collect();
        prop_assert!(owners.len() <= 1);
        prop_assert_eq!(NamingSystem::classify(&name), owners.first().copied());
    }

    /// Property: a label under a system suffix always routes to that system
    #[test]
    fn prop_suffix_routes(label in label_strategy()) {
        prop_assert_eq!(
            NamingSystem::classify(&format!("{}.eth", label)),
            Some(NamingSystem::Ens)
        );
        prop_assert_eq!(
            NamingSystem::classify(&format!("{}.crypto", label)),
            Some(NamingSystem::Cns)
        );
    }

    /// Property: normalization is idempotent and case-insensitive
    #[test]
    fn prop_normalize_idempotent(label in label_strategy()) {
        let upper = format!("{}.ETH", label.to_uppercase());
        let once = normalize(&upper).unwrap();
        prop_assert_eq!(normalize(&once).unwrap(), once.clone());
        prop_assert_eq!(namehash(&once), namehash(&format!("{}.eth", label)));
    }

    /// Property: different labels under the same parent hash differently
    #[test]
    fn prop_namehash_label_sensitive(a in label_strategy(), b in label_strategy()) {
        prop_assume!(a != b);
        prop_assert_ne!(
            namehash(&format!("{}.eth", a)),
            namehash(&format!("{}.eth", b))
        );
    }
}
