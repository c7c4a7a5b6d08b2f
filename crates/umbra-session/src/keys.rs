//! Protocol key derivation
//!
//! Keys are derived from a signature over a fixed message, so producing them
//! prompts the user. [`KeyDerivationGate`] makes sure one prompt serves every
//! concurrent request and that keys never outlive the identity they were
//! derived for.

use crate::backends::KeyGenerator;
use crate::snapshot::{ProtocolInstance, SessionSnapshot};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use umbra_core::{Error, KeyPair, ProtocolKeyPairs, Result, WalletProvider};
use zeroize::Zeroizing;

/// Message signed to derive the protocol keys
pub const KEY_DERIVATION_MESSAGE: &str =
    "Sign this message to access your Umbra account.\n\nOnly sign this message for a trusted client!";

const SIGNATURE_LEN: usize = 65;

/// Result of a key request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRequestOutcome {
    /// Keys are available
    Success,
    /// The prompt was declined or failed; nothing changed
    Denied,
}

pub(crate) type KeyReply = oneshot::Sender<Result<KeyRequestOutcome>>;

/// What the caller of [`KeyDerivationGate::request`] must do next
pub(crate) enum GateAction {
    /// The request was answered
    Answered,
    /// The request joined an open prompt
    Joined,
    /// Start a prompt for this identity epoch
    Start {
        epoch: u64,
        protocol: ProtocolInstance,
        signer: Arc<dyn WalletProvider>,
    },
}

/// Finished prompt, ready to be applied and answered
pub(crate) struct KeyResolution {
    pub keys: Option<ProtocolKeyPairs>,
    outcome: KeyRequestOutcome,
    waiters: Vec<KeyReply>,
}

impl KeyResolution {
    /// Answer every request that waited on the prompt
    pub fn reply(self) {
        for waiter in self.waiters {
            let _ = waiter.send(Ok(self.outcome));
        }
    }
}

/// Guard around key generation, owned by the session actor
#[derive(Default)]
pub(crate) struct KeyDerivationGate {
    pending: BTreeMap<u64, Vec<KeyReply>>,
}

impl KeyDerivationGate {
    /// Handle a key request against the current snapshot
    pub fn request(&mut self, snapshot: &SessionSnapshot, reply: KeyReply) -> GateAction {
        let Some(signer) = snapshot.provider.clone() else {
            let _ = reply.send(Err(Error::NoSigner));
            return GateAction::Answered;
        };
        let Some(protocol) = snapshot.protocol else {
            let _ = reply.send(Err(Error::NoProtocolInstance));
            return GateAction::Answered;
        };
        if snapshot.has_keys() {
            let _ = reply.send(Ok(KeyRequestOutcome::Success));
            return GateAction::Answered;
        }

        if let Some(waiters) = self.pending.get_mut(&snapshot.epoch) {
            waiters.push(reply);
            return GateAction::Joined;
        }
        self.pending.insert(snapshot.epoch, vec![reply]);
        GateAction::Start {
            epoch: snapshot.epoch,
            protocol,
            signer,
        }
    }

    /// True while a prompt is open for the epoch
    #[cfg(test)]
    pub fn is_pending(&self, epoch: u64) -> bool {
        self.pending.contains_key(&epoch)
    }

    /// Settle the prompt started for `epoch`
    ///
    /// Keys are only handed back when `epoch` is still the current identity.
    pub fn complete(
        &mut self,
        epoch: u64,
        current_epoch: u64,
        result: Result<ProtocolKeyPairs>,
    ) -> KeyResolution {
        let waiters = self.pending.remove(&epoch).unwrap_or_default();
        let (keys, outcome) = match result {
            Ok(keys) if epoch == current_epoch => (Some(keys), KeyRequestOutcome::Success),
            Ok(_) => {
                debug!("Discarding keys derived for superseded identity epoch {}", epoch);
                (None, KeyRequestOutcome::Denied)
            }
            Err(e) if e.is_user_rejection() => {
                debug!("Key derivation declined: {}", e);
                (None, KeyRequestOutcome::Denied)
            }
            Err(e) => {
                warn!("Key derivation failed: {}", e);
                (None, KeyRequestOutcome::Denied)
            }
        };
        KeyResolution {
            keys,
            outcome,
            waiters,
        }
    }
}

/// Derives keys from a signature over [`KEY_DERIVATION_MESSAGE`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureKeyGenerator;

#[async_trait]
impl KeyGenerator for SignatureKeyGenerator {
    async fn generate_private_keys(
        &self,
        protocol: &ProtocolInstance,
        signer: Arc<dyn WalletProvider>,
    ) -> Result<ProtocolKeyPairs> {
        debug!(
            "Requesting key derivation signature for Umbra {} on chain {}",
            protocol.umbra, protocol.chain_id
        );
        let signature = signer.sign_message(KEY_DERIVATION_MESSAGE.as_bytes()).await?;
        keys_from_signature(&signature)
    }
}

/// Split a 65-byte signature into spending and viewing keys
///
/// The spending key is SHA-256 of `r`, the viewing key SHA-256 of `s`.
pub fn keys_from_signature(signature: &[u8]) -> Result<ProtocolKeyPairs> {
    if signature.len() != SIGNATURE_LEN {
        return Err(Error::InvalidKey(format!(
            "expected {}-byte signature, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }

    let spending: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(&signature[..32]).into());
    let viewing: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(&signature[32..64]).into());

    Ok(ProtocolKeyPairs {
        spending: KeyPair::from_secret_bytes(spending.as_slice())?,
        viewing: KeyPair::from_secret_bytes(viewing.as_slice())?,
    })
}
