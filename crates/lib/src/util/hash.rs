//! Hashing utilities for content-addressed identifiers.
//!
//! This module provides:
//! - `Fingerprint`: the 32-character truncated hash embedded in every `OutId`
//! - `Hashable`: fingerprinting of any serializable value via its canonical encoding
//! - `hash_bytes()`: full SHA-256 of arbitrary bytes

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::consts::OUT_HASH_LEN;
use crate::util::canonical::to_canonical_string;

pub type HashError = serde_json::Error;

/// A content-derived fingerprint.
///
/// The fingerprint is the first 32 hex characters (128 bits) of the SHA-256
/// of the canonical JSON encoding. The truncation keeps identifiers short
/// while the collision probability stays negligible.
///
/// # Format
///
/// A lowercase hexadecimal string, e.g., `"3f9a0c1b2d4e5f60718293a4b5c6d7e8"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl std::fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Fingerprint {
  /// Returns true if `s` has the shape of a fingerprint.
  pub fn is_valid(s: &str) -> bool {
    s.len() == OUT_HASH_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
  }
}

pub trait Hashable: Serialize {
  /// Fingerprint the canonical encoding of `self`.
  ///
  /// Key insertion order never affects the result; array order always does.
  fn fingerprint(&self) -> Result<Fingerprint, HashError> {
    let encoded = to_canonical_string(self)?;
    let full = hash_bytes(encoded.as_bytes());
    Ok(Fingerprint(full.0[..OUT_HASH_LEN].to_string()))
  }
}

/// A full 64-character SHA256 hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
///
/// Returns the full 64-character SHA256 hash.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}
