//! # SOK Crypto - Keys, Vault and Signatures
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `keys` | RSA-2048, secp256k1, P-256 | Wallet identity, PEM import/export |
//! | `address` | SHA-256 | `SO<hex>K` account identifiers |
//! | `vault` | PBKDF2-HMAC-SHA256 + XChaCha20-Poly1305 | Private key at rest |
//! | `signatures` | RSA-PSS / SHA-256 | Ledger transfer signatures |
//! | `message` | PKCS#1 v1.5, ECDSA / SHA-256 | Off-ledger attestations |
//!
//! ## Security Properties
//!
//! - Scheme selection is driven by the decoded key variant, never by a flag
//! - Vault failures never distinguish wrong password from corrupt blob
//! - Private key text is returned in `Zeroizing` buffers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod message;
pub mod signatures;
pub mod vault;

// Re-exports
pub use address::{derive_address, Address};
pub use errors::{CryptoError, VaultError};
pub use hashing::{sha256, sha256_hex};
pub use keys::{KeyKind, Keypair, PrivateKey, PublicKey};
pub use message::{sign_message, sign_message_with_text, verify_message, verify_message_text};
pub use signatures::{sign_transfer, verify_transfer, verify_transfer_text};
pub use vault::{KeyVault, SealedKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
