//! Protocol key types
//!
//! The session only stores and publishes these; the stealth-address math
//! that consumes them lives elsewhere.

use crate::{Error, Result};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;

/// Spending and viewing public keys published for a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StealthPublicKeys {
    /// Key used to generate stealth receiving addresses
    pub spending: PublicKey,
    /// Key used to encrypt announcements for scanning
    pub viewing: PublicKey,
}

impl StealthPublicKeys {
    /// Parse from hex, compressed (`0x02`/`0x03`) or uncompressed (`0x04`)
    pub fn from_hex(spending: &str, viewing: &str) -> Result<Self> {
        Ok(Self {
            spending: parse_public_key(spending)?,
            viewing: parse_public_key(viewing)?,
        })
    }

    /// Rebuild from the `(prefix, x)` pairs stored on chain
    pub fn from_compressed_parts(
        spending_prefix: u8,
        spending_x: [u8; 32],
        viewing_prefix: u8,
        viewing_x: [u8; 32],
    ) -> Result<Self> {
        Ok(Self {
            spending: key_from_parts(spending_prefix, &spending_x)?,
            viewing: key_from_parts(viewing_prefix, &viewing_x)?,
        })
    }

    /// Split a key into its compressed prefix byte and x coordinate
    pub fn compressed_parts(key: &PublicKey) -> (u8, [u8; 32]) {
        let bytes = key.serialize();
        let mut x = [0u8; 32];
        x.copy_from_slice(&bytes[1..]);
        (bytes[0], x)
    }

    /// Uncompressed hex of the spending key
    pub fn spending_hex(&self) -> String {
        format!("0x{}", hex::encode(self.spending.serialize_uncompressed()))
    }

    /// Uncompressed hex of the viewing key
    pub fn viewing_hex(&self) -> String {
        format!("0x{}", hex::encode(self.viewing.serialize_uncompressed()))
    }
}

fn parse_public_key(value: &str) -> Result<PublicKey> {
    let raw = hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| Error::InvalidKey(format!("{}: {}", value, e)))?;
    PublicKey::from_slice(&raw).map_err(|e| Error::InvalidKey(format!("{}: {}", value, e)))
}

fn key_from_parts(prefix: u8, x: &[u8; 32]) -> Result<PublicKey> {
    let mut bytes = [0u8; 33];
    bytes[0] = prefix;
    bytes[1..].copy_from_slice(x);
    PublicKey::from_slice(&bytes).map_err(|e| Error::InvalidKey(e.to_string()))
}

/// Private/public key pair
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Build from 32 secret bytes
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes).map_err(|e| Error::InvalidKey(e.to_string()))?;
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        Ok(Self { secret, public })
    }

    /// Public half
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Private key as hex
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret.secret_bytes()))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public.serialize()))
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Spending and viewing key pairs derived for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolKeyPairs {
    /// Spending key pair
    pub spending: KeyPair,
    /// Viewing key pair
    pub viewing: KeyPair,
}

impl ProtocolKeyPairs {
    /// Public keys to publish under a name
    pub fn public_keys(&self) -> StealthPublicKeys {
        StealthPublicKeys {
            spending: self.spending.public_key(),
            viewing: self.viewing.public_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(byte: u8) -> KeyPair {
        KeyPair::from_secret_bytes(&[byte; 32]).unwrap()
    }

    #[test]
    fn test_compressed_parts_roundtrip() {
        let keys = ProtocolKeyPairs {
            spending: pair(1),
            viewing: pair(2),
        }
        .public_keys();
        let (sp, sx) = StealthPublicKeys::compressed_parts(&keys.spending);
        let (vp, vx) = StealthPublicKeys::compressed_parts(&keys.viewing);
        assert!(sp == 2 || sp == 3);
        let rebuilt = StealthPublicKeys::from_compressed_parts(sp, sx, vp, vx).unwrap();
        assert_eq!(rebuilt, keys);
    }

    #[test]
    fn test_hex_accepts_both_encodings() {
        let keys = ProtocolKeyPairs {
            spending: pair(3),
            viewing: pair(4),
        }
        .public_keys();
        let compressed = format!("0x{}", hex::encode(keys.viewing.serialize()));
        let parsed = StealthPublicKeys::from_hex(&keys.spending_hex(), &compressed).unwrap();
        assert_eq!(parsed, keys);
        assert!(keys.spending_hex().starts_with("0x04"));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        assert!(matches!(
            StealthPublicKeys::from_hex("0x1234", "0x5678"),
            Err(Error::InvalidKey(_))
        ));
        assert!(KeyPair::from_secret_bytes(&[0u8; 32]).is_err());
        assert!(StealthPublicKeys::from_compressed_parts(0, [0; 32], 0, [0; 32]).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let kp = pair(5);
        let debug = format!("{:?}", kp);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&kp.private_key_hex()[2..]));
    }
}
