//! # Wallet Addresses
//!
//! An address is `"SO" || hex(SHA-256(public_key_pem_utf8)) || "K"`.
//!
//! The derivation depends only on the exact UTF-8 bytes of the textual
//! public key, so it is stable across restarts and across implementations
//! that emit the same PEM text. Addresses are one-way: there is no path from
//! an address back to a key.

use crate::hashing::sha256_hex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed address prefix.
pub const ADDRESS_PREFIX: &str = "SO";

/// Fixed address suffix.
pub const ADDRESS_SUFFIX: &str = "K";

/// Number of hex characters between prefix and suffix.
const DIGEST_HEX_LEN: usize = 64;

/// Ledger account identifier derived from a public key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Borrow the address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the address text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check a string against the address grammar `^SO[0-9a-f]{64}K$`.
    pub fn is_well_formed(candidate: &str) -> bool {
        let Some(body) = candidate
            .strip_prefix(ADDRESS_PREFIX)
            .and_then(|rest| rest.strip_suffix(ADDRESS_SUFFIX))
        else {
            return false;
        };

        body.len() == DIGEST_HEX_LEN && body.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Address {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Address {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Derive the canonical address from a textual public key.
pub fn derive_address(public_key_text: &str) -> Address {
    Address(format!(
        "{ADDRESS_PREFIX}{}{ADDRESS_SUFFIX}",
        sha256_hex(public_key_text.as_bytes())
    ))
}
