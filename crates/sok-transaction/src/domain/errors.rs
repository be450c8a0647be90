//! # Transaction Errors
//!
//! Policy rejections are ordinary outcomes: each carries a stable reason
//! string (its `Display`) and a stable machine code.

use sok_crypto::CryptoError;
use thiserror::Error;

/// Characters of the sender address echoed back in rejection reasons.
pub const ADDRESS_ECHO_LEN: usize = 10;

/// Reasons a transaction fails the validation policy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// Sender is the system sentinel but the signature is not a system marker.
    #[error("invalid system transaction")]
    InvalidSystemTransaction,

    /// A required field is empty or absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The claimed sender address is not derived from the sender's key.
    #[error("sender address does not match the public key")]
    AddressKeyMismatch,

    /// Signature does not verify over the transaction hash.
    #[error("invalid transaction signature for address {address}...")]
    BadSignature {
        /// Leading characters of the claimed sender address
        address: String,
    },

    /// Amount is zero, negative or not a finite number.
    #[error("transaction amount must be greater than 0")]
    NonPositiveAmount,

    /// Sender cannot cover the amount.
    #[error("insufficient balance: {address}... only has {balance} SOK")]
    InsufficientBalance {
        /// Leading characters of the sender address
        address: String,
        /// Balance reported by the ledger
        balance: f64,
    },
}

impl ValidationError {
    /// Stable machine-readable code, used as a metric label.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidSystemTransaction => "invalid_system_transaction",
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::AddressKeyMismatch => "address_key_mismatch",
            ValidationError::BadSignature { .. } => "bad_signature",
            ValidationError::NonPositiveAmount => "non_positive_amount",
            ValidationError::InsufficientBalance { .. } => "insufficient_balance",
        }
    }
}

/// Failures building or signing a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The request lacks a field needed to construct a transaction.
    #[error("malformed transaction request: missing {0}")]
    MalformedRequest(&'static str),

    /// Signing with the provided key failed.
    #[error("transaction signing failed: {0}")]
    Signing(#[from] CryptoError),
}

/// Truncate an address for echoing in a reason string.
pub(crate) fn address_echo(address: &str) -> String {
    address.chars().take(ADDRESS_ECHO_LEN).collect()
}
