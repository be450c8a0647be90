//! # SOK Node Gateway
//!
//! The HTTP contract a ledger node exposes to wallets and peers.
//!
//! ## Architecture
//!
//! ```text
//! wallet / peer ──HTTP──> adapters::http ──> NodeGateway ──> Ledger (port)
//!                                                 │
//!                                                 ├──> PeerBroadcaster (port)
//!                                                 └──> NetworkMapStore (file)
//! ```
//!
//! Transactions are validated by `sok-transaction` before the ledger sees
//! them. The ledger itself (block assembly, proof of work, peer sync) sits
//! behind the [`ports::outbound::Ledger`] trait.
//!
//! ## Usage
//!
//! ```ignore
//! use sok_gateway::{GatewayConfig, NodeGateway, NodeGatewayService, NetworkMapStore};
//!
//! let config = GatewayConfig::from_env()?;
//! let store = NetworkMapStore::new(config.network_map_path.clone());
//! let gateway = NodeGateway::new(ledger, broadcaster, &node_wallet, store)?;
//! let running = NodeGatewayService::new(config, gateway)?.start().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod server;
pub mod service;

// Re-exports
pub use adapters::http::{build_router, AppState};
pub use adapters::network_map::{NetworkMap, NetworkMapStore};
pub use domain::config::{ConfigError, GatewayConfig, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::types::{
    Block, BlockAcceptance, ChainStats, ChainView, GenesisInfo, MempoolView, PeerId, SubmitReceipt,
};
pub use ports::outbound::{
    BroadcastError, Ledger, LedgerError, MockBroadcaster, MockLedger, PeerBroadcaster,
    MOCK_MINING_REWARD,
};
pub use server::{NodeGatewayService, RunningGateway};
pub use service::NodeGateway;
