//! # Domain Layer
//!
//! Transaction model, canonical hashing and the validation policy.
//! No I/O; balance lookups go through `ports::outbound::BalanceSource`.

pub mod canonical;
pub mod errors;
pub mod transaction;
