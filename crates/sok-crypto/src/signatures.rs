//! # Ledger Transfer Signatures (RSA-PSS)
//!
//! Transfers are signed with RSASSA-PSS, MGF1/SHA-256, maximum salt length.
//! The signed input is the raw 32-byte transaction hash; the PSS encoding
//! hashes it once more with SHA-256, exactly as the rest of the network does.
//!
//! This scheme is separate from message attestations (`crate::message`),
//! which use deterministic PKCS#1 v1.5 / ECDSA.

use crate::hashing::sha256;
use crate::keys::{PrivateKey, PublicKey};
use crate::CryptoError;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPublicKey};
use sha2::Sha256;
use sok_telemetry::SIGNATURE_FAILURES;

/// SHA-256 output length in bytes.
const DIGEST_LEN: usize = 32;

/// Maximum PSS salt length for a modulus: `emLen - hLen - 2`.
fn max_salt_len(key: &RsaPublicKey) -> usize {
    let em_bits = key.n().bits().saturating_sub(1);
    let em_len = em_bits.div_ceil(8);
    em_len.saturating_sub(DIGEST_LEN + 2)
}

/// Sign a transaction hash (raw bytes) and return the hex signature.
///
/// # Errors
///
/// - `CryptoError::UnsupportedKeyType` for non-RSA keys
/// - `CryptoError::Signing` if the RSA primitive fails
pub fn sign_transfer(private_key: &PrivateKey, tx_hash: &[u8]) -> Result<String, CryptoError> {
    let PrivateKey::Rsa(key) = private_key else {
        return Err(CryptoError::UnsupportedKeyType(format!(
            "{} keys cannot produce PSS transfer signatures",
            private_key.kind()
        )));
    };

    let salt_len = max_salt_len(&key.to_public_key());
    let hashed = sha256(tx_hash);
    let signature = key
        .sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha256>(salt_len), &hashed)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    Ok(hex::encode(signature))
}

/// Verify a hex PSS signature over a transaction hash.
///
/// Every failure (non-RSA key, bad hex, bad padding) is `false`.
pub fn verify_transfer(public_key: &PublicKey, tx_hash: &[u8], signature_hex: &str) -> bool {
    let PublicKey::Rsa(key) = public_key else {
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    let hashed = sha256(tx_hash);
    key.verify(
        Pss::new_with_salt::<Sha256>(max_salt_len(key)),
        &hashed,
        &signature,
    )
    .is_ok()
}

/// Verify against a PEM public key; undecodable keys are `false`.
pub fn verify_transfer_text(public_key_text: &str, tx_hash: &[u8], signature_hex: &str) -> bool {
    let valid = match PublicKey::from_text(public_key_text) {
        Ok(key) => verify_transfer(&key, tx_hash, signature_hex),
        Err(_) => false,
    };
    if !valid {
        SIGNATURE_FAILURES.with_label_values(&["transfer"]).inc();
    }
    valid
}
