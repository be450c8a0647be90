//! # Key Identity
//!
//! Asymmetric keypairs and their portable PEM encodings.
//!
//! ## Encodings
//!
//! | Component | Format | Header |
//! |-----------|--------|--------|
//! | Private | PKCS#8 PEM (unencrypted) | `BEGIN PRIVATE KEY` |
//! | Public | SubjectPublicKeyInfo PEM | `BEGIN PUBLIC KEY` |
//!
//! Legacy PKCS#1 RSA private keys are accepted on import and re-emitted
//! as PKCS#8.
//!
//! ## Key Kinds
//!
//! The key family is a closed enum. Signing and verification pick their
//! scheme from the variant found in the decoded key, never from a
//! caller-supplied flag.

use crate::address::{derive_address, Address};
use crate::CryptoError;
use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// RSA modulus size for freshly generated wallets.
pub const RSA_KEY_BITS: usize = 2048;

/// Supported key families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// RSA (PSS for transfers, PKCS#1 v1.5 for messages)
    Rsa,
    /// ECDSA over secp256k1
    Secp256k1,
    /// ECDSA over NIST P-256
    P256,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Rsa => f.write_str("rsa"),
            KeyKind::Secp256k1 => f.write_str("secp256k1"),
            KeyKind::P256 => f.write_str("p256"),
        }
    }
}

/// Private key material.
#[derive(Clone)]
pub enum PrivateKey {
    /// RSA private key
    Rsa(RsaPrivateKey),
    /// secp256k1 secret scalar
    Secp256k1(k256::SecretKey),
    /// P-256 secret scalar
    P256(p256::SecretKey),
}

impl PrivateKey {
    /// Key family of this key.
    pub fn kind(&self) -> KeyKind {
        match self {
            PrivateKey::Rsa(_) => KeyKind::Rsa,
            PrivateKey::Secp256k1(_) => KeyKind::Secp256k1,
            PrivateKey::P256(_) => KeyKind::P256,
        }
    }

    /// Decode a PEM private key of any supported kind.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFormat` when the text is not a private key
    /// this crate understands.
    pub fn from_text(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();

        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(text) {
            return Ok(PrivateKey::Rsa(key));
        }
        if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(text) {
            return Ok(PrivateKey::Rsa(key));
        }
        if let Ok(key) = k256::SecretKey::from_pkcs8_pem(text) {
            return Ok(PrivateKey::Secp256k1(key));
        }
        if let Ok(key) = p256::SecretKey::from_pkcs8_pem(text) {
            return Ok(PrivateKey::P256(key));
        }

        Err(CryptoError::KeyFormat(
            "not a PKCS#8 or PKCS#1 private key of a supported algorithm".into(),
        ))
    }

    /// Encode as PKCS#8 PEM (LF line endings).
    pub fn to_text(&self) -> Result<Zeroizing<String>, CryptoError> {
        let encoded = match self {
            PrivateKey::Rsa(key) => key.to_pkcs8_pem(LineEnding::LF),
            PrivateKey::Secp256k1(key) => key.to_pkcs8_pem(LineEnding::LF),
            PrivateKey::P256(key) => key.to_pkcs8_pem(LineEnding::LF),
        };
        encoded.map_err(|e| CryptoError::Encoding(e.to_string()))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Rsa(key) => PublicKey::Rsa(key.to_public_key()),
            PrivateKey::Secp256k1(key) => PublicKey::Secp256k1(key.public_key()),
            PrivateKey::P256(key) => PublicKey::P256(key.public_key()),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, <redacted>)", self.kind())
    }
}

/// Public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA public key
    Rsa(RsaPublicKey),
    /// secp256k1 point
    Secp256k1(k256::PublicKey),
    /// P-256 point
    P256(p256::PublicKey),
}

impl PublicKey {
    /// Key family of this key.
    pub fn kind(&self) -> KeyKind {
        match self {
            PublicKey::Rsa(_) => KeyKind::Rsa,
            PublicKey::Secp256k1(_) => KeyKind::Secp256k1,
            PublicKey::P256(_) => KeyKind::P256,
        }
    }

    /// Decode a SubjectPublicKeyInfo PEM of any supported kind.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFormat` for anything else.
    pub fn from_text(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();

        if let Ok(key) = RsaPublicKey::from_public_key_pem(text) {
            return Ok(PublicKey::Rsa(key));
        }
        if let Ok(key) = k256::PublicKey::from_public_key_pem(text) {
            return Ok(PublicKey::Secp256k1(key));
        }
        if let Ok(key) = p256::PublicKey::from_public_key_pem(text) {
            return Ok(PublicKey::P256(key));
        }

        Err(CryptoError::KeyFormat(
            "not a SubjectPublicKeyInfo key of a supported algorithm".into(),
        ))
    }

    /// Encode as SubjectPublicKeyInfo PEM (LF line endings).
    ///
    /// This exact text is what addresses are derived from.
    pub fn to_text(&self) -> Result<String, CryptoError> {
        let encoded = match self {
            PublicKey::Rsa(key) => key.to_public_key_pem(LineEnding::LF),
            PublicKey::Secp256k1(key) => key.to_public_key_pem(LineEnding::LF),
            PublicKey::P256(key) => key.to_public_key_pem(LineEnding::LF),
        };
        encoded.map_err(|e| CryptoError::Encoding(e.to_string()))
    }
}

/// Private/public keypair.
///
/// The address is never cached: it is recomputed from the public key text
/// on every call so it can never go stale.
#[derive(Clone)]
pub struct Keypair {
    private: PrivateKey,
    public: PublicKey,
}

impl Keypair {
    /// Generate an RSA-2048 keypair with public exponent 65537.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::generate_kind(KeyKind::Rsa)
    }

    /// Generate a keypair of the given family.
    pub fn generate_kind(kind: KeyKind) -> Result<Self, CryptoError> {
        let private = match kind {
            KeyKind::Rsa => PrivateKey::Rsa(
                RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
                    .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?,
            ),
            KeyKind::Secp256k1 => PrivateKey::Secp256k1(k256::SecretKey::random(&mut OsRng)),
            KeyKind::P256 => PrivateKey::P256(p256::SecretKey::random(&mut OsRng)),
        };
        Ok(Self::from_private(private))
    }

    /// Build a keypair around existing private key material.
    pub fn from_private(private: PrivateKey) -> Self {
        let public = private.public_key();
        Self { private, public }
    }

    /// Import from a private key PEM.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyFormat` when the text is not a supported
    /// private key.
    pub fn import_from_text(text: &str) -> Result<Self, CryptoError> {
        PrivateKey::from_text(text).map(Self::from_private)
    }

    /// Key family.
    pub fn kind(&self) -> KeyKind {
        self.private.kind()
    }

    /// Private component.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// Public component.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// PKCS#8 PEM of the private component.
    pub fn export_private_text(&self) -> Result<Zeroizing<String>, CryptoError> {
        self.private.to_text()
    }

    /// SubjectPublicKeyInfo PEM of the public component.
    pub fn export_public_text(&self) -> Result<String, CryptoError> {
        self.public.to_text()
    }

    /// Address of this keypair.
    pub fn address(&self) -> Result<Address, CryptoError> {
        self.export_public_text().map(|text| derive_address(&text))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
