//! Crypto error types.

use thiserror::Error;

/// Key and signature errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Text is not a well-formed private or public key encoding
    /// (wrong header/footer, corrupt payload, unsupported algorithm).
    #[error("Invalid key format: {0}")]
    KeyFormat(String),

    /// The key family cannot perform the requested operation.
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// Encoding a key to text failed
    #[error("Key encoding failed: {0}")]
    Encoding(String),

    /// The signing primitive reported an error
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// At-rest key vault failure.
///
/// A wrong password, a truncated blob and a tampered token all collapse into
/// this single outcome so callers cannot use the vault as an oracle.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum VaultError {
    /// Authenticated decryption failed or the blob is malformed.
    #[error("Wrong password or corrupted key file")]
    WrongPasswordOrCorrupt,
}
