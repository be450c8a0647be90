//! # SHA-256 Hashing
//!
//! Every hash on the ledger (addresses, transaction ids, message digests)
//! is plain SHA-256.

use sha2::{Digest, Sha256};

/// SHA-256 digest (256-bit).
pub type Digest32 = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Digest32 {
    Sha256::digest(data).into()
}

/// Hash data with SHA-256 and return the lowercase hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
