//! # Ports Layer
//!
//! - **Outbound (Driven)**: the ledger and the peer broadcaster the gateway
//!   delegates to

pub mod outbound;
