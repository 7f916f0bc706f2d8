//! Content-derived entity identifiers.
//!
//! Every entity (circle, oracle event, dispute, proposal) is keyed by a
//! 32-byte Blake2b hash of a domain tag, the entity content, the submitter,
//! and the submission time. This guarantees global uniqueness without a
//! central counter; a derived id that already exists is a hard failure at
//! the insertion site.

use crate::{Address, Timestamp};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

/// A 32-byte content-derived entity id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId([u8; 32]);

impl EntityId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an id from a domain tag, content, submitter, and submission time.
    pub fn derive(domain: &str, content: &[u8], submitter: &Address, at: Timestamp) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(domain.as_bytes());
        hasher.update(content);
        hasher.update(submitter.as_str().as_bytes());
        hasher.update(at.as_secs().to_be_bytes());
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency of types.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
