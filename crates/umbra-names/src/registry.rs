//! Key-configuration checks for resolved names

use crate::NameService;
use std::sync::Arc;
use tracing::{debug, warn};
use umbra_core::{Result, StealthPublicKeys, TxHash};

/// Boolean view over a name service's public-key records
#[derive(Clone)]
pub struct DomainKeyRegistry {
    service: Arc<dyn NameService>,
}

impl DomainKeyRegistry {
    /// Create registry over a name service
    pub fn new(service: Arc<dyn NameService>) -> Self {
        Self { service }
    }

    /// True when the name has stealth keys published
    ///
    /// Never fails: "not found" outcomes are expected and logged at debug
    /// level, anything else is logged as a warning.
    pub async fn has_public_keys_configured(&self, name: &str) -> bool {
        match self.service.get_public_keys(name).await {
            Ok(_) => true,
            Err(e) if e.is_not_found() => {
                debug!("No stealth keys for {}: {}", name, e);
                false
            }
            Err(e) => {
                warn!("Stealth key lookup failed for {}: {}", name, e);
                false
            }
        }
    }

    /// Publish stealth keys for a name
    pub async fn set_public_keys(&self, name: &str, keys: &StealthPublicKeys) -> Result<TxHash> {
        self.service.set_public_keys(name, keys).await
    }
}
