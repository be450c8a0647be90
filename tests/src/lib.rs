//! # SOK Test Suite
//!
//! ```text
//! tests/
//! ├── benches/          # Hashing and signing throughput
//! └── src/integration/  # Cross-crate flows
//!     ├── wallet_lifecycle.rs
//!     ├── transfer_flow.rs
//!     ├── mining_conflict.rs
//!     └── http_api.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sok-tests
//! cargo bench -p sok-tests
//! ```

#[cfg(test)]
mod integration;
