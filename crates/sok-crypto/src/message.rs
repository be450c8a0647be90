//! # Message Signatures
//!
//! Signs arbitrary UTF-8 messages for attestations that never touch the
//! ledger (heartbeats, proof of address control).
//!
//! The message is hashed with SHA-256 first and the 32-byte hash is what
//! gets signed. The scheme follows the key family:
//!
//! | Key | Scheme | Signature encoding |
//! |-----|--------|--------------------|
//! | RSA | PKCS#1 v1.5 / SHA-256 | raw, hex |
//! | secp256k1, P-256 | ECDSA / SHA-256 | DER, hex |

use crate::hashing::sha256;
use crate::keys::{PrivateKey, PublicKey};
use crate::CryptoError;
use rsa::Pkcs1v15Sign;
use sha2::Sha256;
use sok_telemetry::SIGNATURE_FAILURES;

/// Sign a message and return the hex signature.
///
/// # Errors
///
/// Returns `CryptoError::Signing` if the primitive fails.
pub fn sign_message(private_key: &PrivateKey, message: &str) -> Result<String, CryptoError> {
    use k256::ecdsa::signature::Signer;

    let message_hash = sha256(message.as_bytes());

    let signature = match private_key {
        PrivateKey::Rsa(key) => key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &sha256(&message_hash))
            .map_err(|e| CryptoError::Signing(e.to_string()))?,
        PrivateKey::Secp256k1(key) => {
            let signing_key = k256::ecdsa::SigningKey::from(key.clone());
            let signature: k256::ecdsa::Signature = signing_key.sign(&message_hash);
            signature.to_der().as_bytes().to_vec()
        }
        PrivateKey::P256(key) => {
            let signing_key = p256::ecdsa::SigningKey::from(key.clone());
            let signature: p256::ecdsa::Signature = signing_key.sign(&message_hash);
            signature.to_der().as_bytes().to_vec()
        }
    };

    Ok(hex::encode(signature))
}

/// Decode a PEM private key and sign a message with it.
///
/// # Errors
///
/// - `CryptoError::KeyFormat` if the key text does not decode
/// - `CryptoError::UnsupportedKeyType` if it decodes to an unsupported family
pub fn sign_message_with_text(
    private_key_text: &str,
    message: &str,
) -> Result<String, CryptoError> {
    let key = PrivateKey::from_text(private_key_text)?;
    sign_message(&key, message)
}

/// Verify a hex message signature against a decoded public key.
pub fn verify_message(public_key: &PublicKey, message: &str, signature_hex: &str) -> bool {
    use k256::ecdsa::signature::Verifier;

    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let message_hash = sha256(message.as_bytes());

    match public_key {
        PublicKey::Rsa(key) => key
            .verify(
                Pkcs1v15Sign::new::<Sha256>(),
                &sha256(&message_hash),
                &signature,
            )
            .is_ok(),
        // Either S form is valid ECDSA; k256 only verifies the low-S form.
        PublicKey::Secp256k1(key) => k256::ecdsa::Signature::from_der(&signature)
            .map(|sig| {
                let sig = sig.normalize_s().unwrap_or(sig);
                k256::ecdsa::VerifyingKey::from(key)
                    .verify(&message_hash, &sig)
                    .is_ok()
            })
            .unwrap_or(false),
        PublicKey::P256(key) => p256::ecdsa::Signature::from_der(&signature)
            .map(|sig| {
                let sig = sig.normalize_s().unwrap_or(sig);
                p256::ecdsa::VerifyingKey::from(key)
                    .verify(&message_hash, &sig)
                    .is_ok()
            })
            .unwrap_or(false),
    }
}

/// Verify a hex message signature against a PEM public key.
///
/// Decode failures and verification failures are both `false`; nothing is
/// propagated to the caller.
pub fn verify_message_text(public_key_text: &str, message: &str, signature_hex: &str) -> bool {
    let valid = match PublicKey::from_text(public_key_text) {
        Ok(key) => verify_message(&key, message, signature_hex),
        Err(_) => false,
    };

    if !valid {
        SIGNATURE_FAILURES.with_label_values(&["message"]).inc();
        tracing::debug!("message signature rejected");
    }
    valid
}
