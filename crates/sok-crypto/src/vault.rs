//! # Key Vault
//!
//! Password-based at-rest protection for private key text.
//!
//! ## Blob Layout
//!
//! ```text
//! [0..16)   salt (fresh per seal)
//! [16..40)  XChaCha20 nonce
//! [40..)    ciphertext || Poly1305 tag (16)
//! ```
//!
//! The 32-byte cipher key is PBKDF2-HMAC-SHA256(password, salt) with at
//! least 100 000 iterations. Everything after the salt is the
//! self-contained authenticated token.

use crate::keys::Keypair;
use crate::{CryptoError, VaultError};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// XChaCha20 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum PBKDF2 iteration count.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Encrypted private key: `salt || nonce || ciphertext || tag`.
///
/// No `PartialEq`: two seals of the same key are unrelated byte strings.
#[derive(Clone)]
pub struct SealedKey(Vec<u8>);

impl SealedKey {
    /// Wrap bytes read from storage.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrow the raw blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Salt prefix, if the blob is long enough to carry one.
    pub fn salt(&self) -> Option<&[u8]> {
        self.0.get(..SALT_LEN)
    }
}

impl std::fmt::Debug for SealedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SealedKey({} bytes)", self.0.len())
    }
}

/// Password-based key wrapper.
#[derive(Clone, Copy, Debug)]
pub struct KeyVault {
    iterations: u32,
}

impl Default for KeyVault {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyVault {
    /// Vault with the minimum iteration count.
    pub fn new() -> Self {
        Self {
            iterations: MIN_KDF_ITERATIONS,
        }
    }

    /// Vault with a custom iteration count, clamped to the minimum.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(MIN_KDF_ITERATIONS),
        }
    }

    /// Configured PBKDF2 iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn derive_key(&self, password: &str, salt: &[u8]) -> Zeroizing<[u8; 32]> {
        let mut key = Zeroizing::new([0u8; 32]);
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut *key);
        key
    }

    /// Encrypt private key text under a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encoding` if the AEAD rejects the input.
    pub fn seal(&self, private_key_text: &str, password: &str) -> Result<SealedKey, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let key = self.derive_key(password, &salt);
        let cipher = XChaCha20Poly1305::new((&*key).into());
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), private_key_text.as_bytes())
            .map_err(|e| CryptoError::Encoding(format!("key sealing failed: {e}")))?;

        let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(SealedKey(blob))
    }

    /// Decrypt a blob. All failures are `WrongPasswordOrCorrupt`.
    pub fn open(&self, blob: &SealedKey, password: &str) -> Result<Zeroizing<String>, VaultError> {
        let bytes = blob.as_bytes();
        if bytes.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(VaultError::WrongPasswordOrCorrupt);
        }
        let (salt, token) = bytes.split_at(SALT_LEN);
        let (nonce, ciphertext) = token.split_at(NONCE_LEN);

        let key = self.derive_key(password, salt);
        let cipher = XChaCha20Poly1305::new((&*key).into());
        let plaintext = Zeroizing::new(
            cipher
                .decrypt(XNonce::from_slice(nonce), ciphertext)
                .map_err(|_| VaultError::WrongPasswordOrCorrupt)?,
        );

        std::str::from_utf8(&plaintext)
            .map(|text| Zeroizing::new(text.to_owned()))
            .map_err(|_| VaultError::WrongPasswordOrCorrupt)
    }

    /// Re-encrypt key text under a new password.
    ///
    /// Always draws a new salt; nothing from any earlier blob is reused.
    pub fn reseal(
        &self,
        private_key_text: &str,
        new_password: &str,
    ) -> Result<SealedKey, CryptoError> {
        self.seal(private_key_text, new_password)
    }

    /// Create a fresh RSA wallet and seal it.
    pub fn create_wallet(&self, password: &str) -> Result<(Keypair, SealedKey), CryptoError> {
        let keypair = Keypair::generate()?;
        let sealed = self.seal(&keypair.export_private_text()?, password)?;
        tracing::info!(address = %keypair.address()?, "created new wallet");
        Ok((keypair, sealed))
    }

    /// Unlock a sealed wallet.
    ///
    /// A blob that decrypts to something other than a private key is
    /// reported exactly like a wrong password.
    pub fn unlock(&self, blob: &SealedKey, password: &str) -> Result<Keypair, VaultError> {
        let text = self.open(blob, password)?;
        Keypair::import_from_text(&text).map_err(|_| VaultError::WrongPasswordOrCorrupt)
    }

    /// Import a private key and seal it under a new password.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFormat` before anything is sealed if the text
    /// is not a valid private key.
    pub fn import_wallet(
        &self,
        private_key_text: &str,
        password: &str,
    ) -> Result<(Keypair, SealedKey), CryptoError> {
        let keypair = Keypair::import_from_text(private_key_text)?;
        let sealed = self.reseal(&keypair.export_private_text()?, password)?;
        tracing::info!(address = %keypair.address()?, "imported wallet");
        Ok((keypair, sealed))
    }
}
