//! HTTP binding of the node API.
//!
//! | Method | Path | Success | Failures |
//! |--------|------|---------|----------|
//! | POST | `/transactions/new` | 201 `{message}` | 400 `{message}` duplicate, 400 `{error}` |
//! | POST | `/transactions/add_from_peer` | 200 | 409 duplicate, 400 |
//! | POST | `/blocks/add_from_peer` | 200 | 409 conflict, 400 |
//! | GET | `/mine?miner_address=` | 200 `{message, block}` | 400, 500, 502 |
//! | GET | `/chain?start=` | 200 `{chain, length}` | 400 |
//! | GET | `/chain/stats` | 200 | 500 `{error}` |
//! | GET | `/mempool` | 200 `{pending_transactions, count}` | |
//! | POST | `/nodes/update_map` | 202 `{message}` | 400 |
//! | GET | `/nodes/peers`, `/handshake`, `/balance/{address}` | 200 | |
//! | GET | `/genesis/info` | 200 | 403 |
//! | GET | `/health`, `/metrics` | 200 | |
//!
//! Bodies are decoded by hand so every malformed payload becomes a plain
//! 400 instead of an extractor-specific status.

use crate::domain::config::GatewayConfig;
use crate::domain::error::ApiError;
use crate::domain::types::{
    BlockAcceptance, ChainStats, ChainView, GenesisInfo, MempoolView, PeerId, SubmitReceipt,
};
use crate::service::NodeGateway;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sok_telemetry::{encode_metrics, metrics_content_type};
use sok_transaction::TransactionRequest;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub type AppState = Arc<NodeGateway>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Build the node API router.
pub fn build_router(gateway: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/transactions/new", post(new_transaction))
        .route(
            "/transactions/add_from_peer",
            post(add_transaction_from_peer),
        )
        .route("/blocks/add_from_peer", post(add_block_from_peer))
        .route("/mine", get(mine))
        .route("/chain", get(chain))
        .route("/chain/stats", get(chain_stats))
        .route("/mempool", get(mempool))
        .route("/nodes/update_map", post(update_network_map))
        .route("/nodes/peers", get(peers))
        .route("/handshake", get(handshake))
        .route("/balance/:address", get(balance))
        .route("/genesis/info", get(genesis_info))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

fn decode_transaction(body: &Bytes) -> Result<TransactionRequest, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("invalid transaction body: {e}")))
}

fn rejection(reason: impl std::fmt::Display) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("invalid transaction: {reason}") })),
    )
        .into_response()
}

async fn new_transaction(
    State(gateway): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = decode_transaction(&body)?;
    let response = match gateway.submit_transaction(request).await? {
        SubmitReceipt::AcceptedPending => (
            StatusCode::CREATED,
            Json(json!({ "message": "transaction will be added to the next block" })),
        )
            .into_response(),
        SubmitReceipt::Duplicate => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "transaction already exists or was already processed" })),
        )
            .into_response(),
        SubmitReceipt::Rejected(reason) => rejection(reason),
    };
    Ok(response)
}

async fn add_transaction_from_peer(State(gateway): State<AppState>, body: Bytes) -> Response {
    let Ok(request) = decode_transaction(&body) else {
        return (StatusCode::BAD_REQUEST, "invalid data").into_response();
    };
    match gateway.submit_peer_transaction(request).await {
        Ok(SubmitReceipt::AcceptedPending) => {
            (StatusCode::OK, "transaction accepted").into_response()
        }
        Ok(SubmitReceipt::Duplicate) => {
            (StatusCode::CONFLICT, "transaction already exists").into_response()
        }
        Ok(SubmitReceipt::Rejected(reason)) => rejection(reason),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid data").into_response(),
    }
}

async fn add_block_from_peer(State(gateway): State<AppState>, body: Bytes) -> Response {
    let Ok(payload) = serde_json::from_slice::<Value>(&body) else {
        return (StatusCode::BAD_REQUEST, "invalid data").into_response();
    };
    match gateway.submit_block(payload).await {
        Ok(BlockAcceptance::Accepted) => (StatusCode::OK, "block accepted").into_response(),
        Ok(BlockAcceptance::Conflict) => {
            (StatusCode::CONFLICT, "conflict or invalid block").into_response()
        }
        Err(_) => (StatusCode::BAD_REQUEST, "invalid data").into_response(),
    }
}

async fn mine(
    State(gateway): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let block = gateway
        .mine(params.get("miner_address").map(String::as_str))
        .await?;
    Ok(Json(json!({ "message": "mined a new block", "block": block })))
}

async fn chain(
    State(gateway): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ChainView>, ApiError> {
    let start = match params.get("start").filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("start must be an integer"))?,
        ),
        None => None,
    };
    Ok(Json(gateway.chain(start).await))
}

async fn chain_stats(State(gateway): State<AppState>) -> Result<Json<ChainStats>, ApiError> {
    Ok(Json(gateway.stats().await?))
}

async fn mempool(State(gateway): State<AppState>) -> Json<MempoolView> {
    Json(gateway.mempool().await)
}

async fn update_network_map(
    State(gateway): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: Value =
        serde_json::from_slice(&body).map_err(|_| ApiError::bad_request("invalid data"))?;
    // Detached: persistence never holds up the response.
    drop(gateway.update_network_map(&payload)?);
    let body = Json(json!({ "message": "network map received" }));
    Ok((StatusCode::ACCEPTED, body).into_response())
}

async fn peers(State(gateway): State<AppState>) -> Json<BTreeMap<PeerId, String>> {
    Json(gateway.peers().await)
}

async fn handshake(State(gateway): State<AppState>) -> Json<Value> {
    Json(json!({ "node_id": gateway.handshake() }))
}

async fn balance(State(gateway): State<AppState>, Path(address): Path<String>) -> Json<Value> {
    let balance = gateway.balance(&address).await;
    Json(json!({ "address": address, "balance": balance }))
}

async fn genesis_info(State(gateway): State<AppState>) -> Result<Json<GenesisInfo>, ApiError> {
    Ok(Json(gateway.genesis_info().await?))
}

async fn health_check() -> &'static str {
    "ok"
}

async fn metrics() -> Response {
    match encode_metrics() {
        Ok(text) => {
            let headers = [(header::CONTENT_TYPE, metrics_content_type())];
            (StatusCode::OK, headers, text).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
