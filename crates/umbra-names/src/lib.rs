//! Name resolution for stealth-payment keys
//!
//! Wraps ENS and CNS (Unstoppable Domains) behind one interface: every name is
//! routed to exactly one backend by its suffix, and both backends expose the
//! same namehash / public-key operations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cns;
pub mod contracts;
pub mod ens;
pub mod namehash;
pub mod registry;
pub mod service;
pub mod system;
pub mod unstoppable;

pub use cns::{CnsResolver, ResolutionClient, SPENDING_KEY_RECORD, VIEWING_KEY_RECORD};
pub use ens::EnsResolver;
pub use namehash::{namehash, normalize};
pub use registry::DomainKeyRegistry;
pub use service::{DomainService, NameService};
pub use system::NamingSystem;
pub use umbra_core::{Error, Result};
pub use unstoppable::UnstoppableApi;
