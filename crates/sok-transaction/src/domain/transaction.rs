//! # Transfer Transactions
//!
//! A transfer moves `amount` from the account derived from
//! `sender_public_key` to `recipient_address`. The transaction hash covers
//! exactly four fields: sender key text, recipient, amount and timestamp.
//! The signature and the claimed sender address are outside the hash; the
//! address is bound to the key by re-derivation during validation.
//!
//! ## Validation Order
//!
//! 1. System sentinel sender: accept iff the signature is a system marker
//! 2. Required fields present
//! 3. Claimed sender address derives from the sender key
//! 4. PSS signature verifies over the hash
//! 5. Amount is finite and positive
//! 6. Ledger balance covers the amount
//!
//! Cheap structural checks run before signature verification, and the
//! ledger is only queried for otherwise well-formed transactions.

use super::canonical::{encode_object, CanonicalValue};
use super::errors::{address_echo, TransactionError, ValidationError};
use crate::ports::outbound::BalanceSource;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use sok_crypto::hashing::Digest32;
use sok_crypto::{derive_address, sha256, sign_transfer, verify_transfer_text, PrivateKey};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Sender key and address used by system-issued transactions.
///
/// This is a ledger-level sentinel; peer identifiers live in their own
/// namespace and never compare equal to it.
pub const SYSTEM_SENDER: &str = "0";

/// Kind of system-issued transaction, carried in the signature slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SystemKind {
    /// Initial allocation in the genesis block
    Genesis,
    /// Block reward paid to a miner
    MiningReward,
}

impl SystemKind {
    /// Marker string stored in the signature field.
    pub fn marker(&self) -> &'static str {
        match self {
            SystemKind::Genesis => "genesis_transaction",
            SystemKind::MiningReward => "mining_reward",
        }
    }

    /// Parse a signature-field marker.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "genesis_transaction" => Some(SystemKind::Genesis),
            "mining_reward" => Some(SystemKind::MiningReward),
            _ => None,
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Successful validation outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    /// A user transfer passed every check.
    Transfer,
    /// A system transaction with a recognised marker.
    System(SystemKind),
}

impl Validity {
    /// Human-readable confirmation.
    pub fn message(&self) -> &'static str {
        match self {
            Validity::Transfer => "transaction is valid",
            Validity::System(_) => "system transaction is valid",
        }
    }
}

/// Incoming transaction body before defaults are applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// SubjectPublicKeyInfo PEM of the sender, or `"0"`
    pub sender_public_key_pem: Option<String>,
    /// Recipient address
    pub recipient_address: Option<String>,
    /// Amount to transfer
    pub amount: Option<f64>,
    /// Seconds since the Unix epoch; defaults to now
    pub timestamp: Option<Number>,
    /// Hex PSS signature, or a system marker
    pub signature: Option<String>,
    /// Claimed sender address; defaults to the derived address
    pub sender_address: Option<String>,
}

/// A value transfer between two accounts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferTransaction {
    /// Sender key text exactly as submitted (the address derives from it)
    #[serde(rename = "sender_public_key_pem")]
    pub sender_public_key: String,
    /// Recipient address
    pub recipient_address: String,
    /// Amount to transfer
    pub amount: f64,
    /// Seconds since the Unix epoch, as received (integer or float)
    pub timestamp: Number,
    /// Hex PSS signature, a system marker, or `None` before signing
    pub signature: Option<String>,
    /// Claimed sender address
    pub sender_address: String,
}

fn now_timestamp() -> Number {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Number::from_f64(seconds).unwrap_or_else(|| Number::from(0u64))
}

impl TransferTransaction {
    /// Build an unsigned transfer timestamped now, with the derived sender
    /// address.
    pub fn new(
        sender_public_key: impl Into<String>,
        recipient_address: impl Into<String>,
        amount: f64,
    ) -> Self {
        let sender_public_key = sender_public_key.into();
        let sender_address = default_sender_address(&sender_public_key);
        Self {
            sender_public_key,
            recipient_address: recipient_address.into(),
            amount,
            timestamp: now_timestamp(),
            signature: None,
            sender_address,
        }
    }

    /// Build a genesis or mining-reward transaction.
    pub fn system(recipient_address: impl Into<String>, amount: f64, kind: SystemKind) -> Self {
        Self {
            sender_public_key: SYSTEM_SENDER.to_string(),
            recipient_address: recipient_address.into(),
            amount,
            timestamp: now_timestamp(),
            signature: Some(kind.marker().to_string()),
            sender_address: SYSTEM_SENDER.to_string(),
        }
    }

    /// Apply wire defaults to a decoded request.
    ///
    /// Empty or zero timestamps become "now" and an empty or absent sender
    /// address becomes the derived address.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::MalformedRequest` if the sender key,
    /// recipient or amount is absent.
    pub fn from_request(request: TransactionRequest) -> Result<Self, TransactionError> {
        let sender_public_key = request
            .sender_public_key_pem
            .ok_or(TransactionError::MalformedRequest("sender_public_key_pem"))?;
        let recipient_address = request
            .recipient_address
            .ok_or(TransactionError::MalformedRequest("recipient_address"))?;
        let amount = request
            .amount
            .ok_or(TransactionError::MalformedRequest("amount"))?;

        let timestamp = request
            .timestamp
            .filter(|t| t.as_f64() != Some(0.0))
            .unwrap_or_else(now_timestamp);
        let sender_address = request
            .sender_address
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default_sender_address(&sender_public_key));

        Ok(Self {
            sender_public_key,
            recipient_address,
            amount,
            timestamp,
            signature: request.signature,
            sender_address,
        })
    }

    /// Timestamp as seconds since the Unix epoch.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp.as_f64().unwrap_or(0.0)
    }

    /// Whether the sender is the system sentinel.
    pub fn is_system(&self) -> bool {
        self.sender_public_key == SYSTEM_SENDER
    }

    /// Canonical text of the signed fields.
    ///
    /// The amount is always a float; the timestamp keeps the form it was
    /// received in, so `1700000000` and `1700000000.0` hash differently.
    pub fn signing_payload(&self) -> String {
        encode_object(&[
            ("sender_public_key_pem", CanonicalValue::Text(&self.sender_public_key)),
            ("recipient_address", CanonicalValue::Text(&self.recipient_address)),
            ("amount", CanonicalValue::Float(self.amount)),
            ("timestamp", CanonicalValue::Number(&self.timestamp)),
        ])
    }

    /// Raw SHA-256 of the signing payload.
    pub fn hash_bytes(&self) -> Digest32 {
        sha256(self.signing_payload().as_bytes())
    }

    /// Lowercase hex transaction hash.
    pub fn hash(&self) -> String {
        hex::encode(self.hash_bytes())
    }

    /// Sign the transaction hash with PSS.
    ///
    /// A transaction that already carries a non-empty signature is left
    /// untouched, so signing twice keeps the first signature.
    ///
    /// # Errors
    ///
    /// `TransactionError::Signing` if the key cannot produce PSS signatures.
    pub fn sign(&mut self, private_key: &PrivateKey) -> Result<(), TransactionError> {
        if self.signature.as_deref().is_some_and(|s| !s.is_empty()) {
            return Ok(());
        }
        self.signature = Some(sign_transfer(private_key, &self.hash_bytes())?);
        tracing::debug!(
            tx_hash = %self.hash(),
            sender = %self.sender_address,
            "signed transfer"
        );
        Ok(())
    }

    /// Run the validation policy against a balance source.
    pub async fn validate<B>(&self, balances: &B) -> Result<Validity, ValidationError>
    where
        B: BalanceSource + ?Sized,
    {
        let signature = self.signature.as_deref().unwrap_or_default();

        if self.is_system() {
            return SystemKind::from_marker(signature)
                .map(Validity::System)
                .ok_or(ValidationError::InvalidSystemTransaction);
        }

        if self.sender_public_key.is_empty() {
            return Err(ValidationError::MissingField("sender_public_key_pem"));
        }
        if self.recipient_address.is_empty() {
            return Err(ValidationError::MissingField("recipient_address"));
        }
        if signature.is_empty() {
            return Err(ValidationError::MissingField("signature"));
        }

        if derive_address(&self.sender_public_key) != self.sender_address.as_str() {
            return Err(ValidationError::AddressKeyMismatch);
        }

        if !verify_transfer_text(&self.sender_public_key, &self.hash_bytes(), signature) {
            return Err(ValidationError::BadSignature {
                address: address_echo(&self.sender_address),
            });
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }

        let balance = balances.get_balance(&self.sender_address).await;
        if balance < self.amount {
            return Err(ValidationError::InsufficientBalance {
                address: address_echo(&self.sender_address),
                balance,
            });
        }

        Ok(Validity::Transfer)
    }

    /// Full wire object: signed fields, sender address and signature.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "sender_public_key_pem": self.sender_public_key,
            "recipient_address": self.recipient_address,
            "amount": self.amount,
            "timestamp": self.timestamp,
            "sender_address": self.sender_address,
            "signature": self.signature,
        })
    }
}

fn default_sender_address(sender_public_key: &str) -> String {
    if sender_public_key == SYSTEM_SENDER {
        SYSTEM_SENDER.to_string()
    } else {
        derive_address(sender_public_key).into_string()
    }
}
