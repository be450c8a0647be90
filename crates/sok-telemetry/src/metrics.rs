//! Prometheus metrics for SOK nodes.
//!
//! All metrics follow the naming convention: `sok_<component>_<metric>_<unit>`.
//! Every collector is registered with [`REGISTRY`] the first time the
//! registry is touched, so callers only ever increment.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    // =========================================================================
    // GATEWAY METRICS
    // =========================================================================

    /// Transactions submitted to the gateway (client and peer relay)
    pub static ref TRANSACTIONS_RECEIVED: Counter = Counter::new(
        "sok_gateway_transactions_received_total",
        "Total number of transactions submitted to the gateway"
    ).expect("metric creation failed");

    /// Transactions rejected by validation
    pub static ref TRANSACTIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new(
            "sok_gateway_transactions_rejected_total",
            "Transactions rejected by the validation policy"
        ),
        &["reason"]  // reason: ValidationError::code()
    ).expect("metric creation failed");

    /// Blocks mined by this node
    pub static ref BLOCKS_MINED: Counter = Counter::new(
        "sok_gateway_blocks_mined_total",
        "Total number of blocks mined by this node"
    ).expect("metric creation failed");

    /// Peer blocks refused because the slot was already filled
    pub static ref BLOCK_CONFLICTS: Counter = Counter::new(
        "sok_gateway_block_conflicts_total",
        "Peer blocks rejected as mining conflicts"
    ).expect("metric creation failed");

    // =========================================================================
    // CRYPTO METRICS
    // =========================================================================

    /// Signature verification failures (for alerting)
    pub static ref SIGNATURE_FAILURES: CounterVec = CounterVec::new(
        Opts::new(
            "sok_crypto_signature_failures_total",
            "Total signature verification failures"
        ),
        &["scheme"]  // scheme: transfer/message
    ).expect("metric creation failed");

    /// Global metrics registry
    pub static ref REGISTRY: Registry = build_registry();
}

fn build_registry() -> Registry {
    let registry = Registry::new();
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(TRANSACTIONS_RECEIVED.clone()),
        Box::new(TRANSACTIONS_REJECTED.clone()),
        Box::new(BLOCKS_MINED.clone()),
        Box::new(BLOCK_CONFLICTS.clone()),
        Box::new(SIGNATURE_FAILURES.clone()),
    ];
    for collector in collectors {
        // Names are distinct constants, so registration cannot collide.
        if let Err(e) = registry.register(collector) {
            tracing::error!(error = %e, "metric registration failed");
        }
    }
    registry
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Content type of [`encode_metrics`] output.
pub fn metrics_content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
