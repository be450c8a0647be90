//! # Domain Layer
//!
//! Gateway configuration, error mapping and the request/response shapes of
//! the node API.

pub mod config;
pub mod error;
pub mod types;
