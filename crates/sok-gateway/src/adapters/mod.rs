//! # Adapters
//!
//! - `http`: axum binding of the node API
//! - `network_map`: on-disk persistence of the gossiped node list

pub mod http;
pub mod network_map;
