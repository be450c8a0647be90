//! # SOK Transactions
//!
//! Transfer transactions and the policy a transaction must satisfy before
//! any ledger may accept it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): transaction model, canonical hashing,
//!   validation policy; no I/O
//! - **Ports Layer** (`ports/`): `BalanceSource`, the only ledger state the
//!   policy reads
//!
//! ## Security Notes
//!
//! - The hash covers sender key, recipient, amount and timestamp; the
//!   signature is RSA-PSS over that hash
//! - The claimed sender address is re-derived from the key on every
//!   validation, never trusted

pub mod domain;
pub mod ports;

// Re-export public API
pub use domain::canonical::{encode_object, format_float, CanonicalValue, PayloadFormatter};
pub use domain::errors::{TransactionError, ValidationError};
pub use domain::transaction::{
    SystemKind, TransactionRequest, TransferTransaction, Validity, SYSTEM_SENDER,
};
pub use ports::outbound::{BalanceSource, MockBalances};
