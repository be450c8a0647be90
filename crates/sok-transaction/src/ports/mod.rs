//! # Ports Layer
//!
//! - **Outbound (Driven)**: ledger state this crate reads during validation

pub mod outbound;
