//! EIP-137 namehash
//!
//! Both ENS and CNS key their on-chain records by the same recursive
//! keccak-256 hash of the name's labels.

use alloy_primitives::{keccak256, B256};
use umbra_core::{Error, Result};

/// Normalize a name for hashing
///
/// Lowercases and trims the name; rejects empty names and empty labels.
pub fn normalize(name: &str) -> Result<String> {
    let normalized = name.trim().to_lowercase();
    if normalized.is_empty() || normalized.split('.').any(str::is_empty) {
        return Err(Error::UnsupportedName(name.to_string()));
    }
    Ok(normalized)
}

/// Hash an already-normalized name
///
/// The empty name hashes to the zero node.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}
