//! # SOK Telemetry
//!
//! Logging and metrics shared by every SOK crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sok_telemetry::{init_tracing, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_tracing(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOK_SERVICE_NAME` | `sok-node` | Service name in the startup log |
//! | `RUST_LOG` / `SOK_LOG_LEVEL` | `info` | Log level filter |
//! | `SOK_JSON_LOGS` | `false` | JSON log output |

#![warn(missing_docs)]

mod config;
mod metrics;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_LOG_LEVEL};
pub use metrics::{
    encode_metrics, metrics_content_type, BLOCKS_MINED, BLOCK_CONFLICTS, REGISTRY,
    SIGNATURE_FAILURES, TRANSACTIONS_RECEIVED, TRANSACTIONS_REJECTED,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("Tracing subscriber already initialised")]
    AlreadyInitialised,

    /// Metric encoding failed.
    #[error("Failed to encode Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
