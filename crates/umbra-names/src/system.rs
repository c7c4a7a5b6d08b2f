//! Naming-system classification by suffix

use serde::{Deserialize, Serialize};
use std::fmt;

const ENS_SUFFIXES: &[&str] = &[".eth"];
const CNS_SUFFIXES: &[&str] = &[".crypto"];

/// The two naming systems the wallet understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingSystem {
    /// Ethereum Name Service
    Ens,
    /// Unstoppable Domains CNS registry
    Cns,
}

impl NamingSystem {
    /// Both systems, in display-priority order
    pub const ALL: [NamingSystem; 2] = [NamingSystem::Ens, NamingSystem::Cns];

    /// Pick the naming system for a name
    ///
    /// Purely syntactic: the name must end in one of the system's suffixes and
    /// carry at least one character before it. Suffix sets are disjoint, so at
    /// most one system matches.
    pub fn classify(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|system| system.suffixes().iter().any(|s| has_suffix(&lower, s)))
    }

    /// Recognized top-level suffixes
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            NamingSystem::Ens => ENS_SUFFIXES,
            NamingSystem::Cns => CNS_SUFFIXES,
        }
    }

    /// True when the name belongs to this system
    pub fn owns(self, name: &str) -> bool {
        Self::classify(name) == Some(self)
    }
}

fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() > suffix.len() && name.ends_with(suffix)
}

impl fmt::Display for NamingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingSystem::Ens => write!(f, "ENS"),
            NamingSystem::Cns => write!(f, "CNS"),
        }
    }
}
