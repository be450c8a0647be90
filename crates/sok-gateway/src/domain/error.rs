//! Gateway error types and their HTTP status mapping.
//!
//! Every internal failure is converted into one of these at the gateway
//! boundary; nothing below the gateway knows about status codes.

use super::types::Block;
use std::fmt;

/// HTTP status code carried by an [`ApiError`].
pub type StatusCode = u16;

/// Transport-facing error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Malformed request (missing field, bad JSON, bad query parameter)
    #[error("{0}")]
    BadRequest(String),

    /// Endpoint not available on this node
    #[error("{0}")]
    Forbidden(String),

    /// Chain statistics could not be computed
    #[error("unable to compute chain statistics")]
    StatsUnavailable,

    /// The ledger failed to assemble a block
    #[error("mining failed: {0}")]
    MiningFailed(String),

    /// A block was mined but could not be announced to peers
    #[error("block mined but broadcast failed: {reason}")]
    BroadcastFailed {
        /// The block that was mined
        block: Box<Block>,
        /// Why the broadcast failed
        reason: String,
    },
}

impl ApiError {
    /// Shorthand for a bad request.
    pub fn bad_request(details: impl fmt::Display) -> Self {
        Self::BadRequest(details.to_string())
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::StatsUnavailable | ApiError::MiningFailed(_) => 500,
            ApiError::BroadcastFailed { .. } => 502,
        }
    }

    /// JSON body of this error: always `{error}`, plus `block` for
    /// broadcast failures.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::BroadcastFailed { block, .. } => serde_json::json!({
                "error": self.to_string(),
                "block": block,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (service start-up and serving)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server terminated with an error
    #[error("server error: {0}")]
    Serve(String),
}
