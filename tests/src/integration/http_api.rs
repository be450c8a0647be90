//! The node API over a real socket.

use super::{node, rsa_wallet};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sok_gateway::{GatewayConfig, NetworkMapStore, NodeGatewayService};
use sok_transaction::TransferTransaction;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tower::ServiceExt;

async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn post(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_wallet_to_block_over_http() {
    let n = node();
    let sender = rsa_wallet().address().unwrap();
    n.ledger.set_balance(sender.as_str(), 10.0);
    let service = NodeGatewayService::new(GatewayConfig::default(), n.gateway).unwrap();
    let router = service.router();

    let mut tx = TransferTransaction::new(
        rsa_wallet().export_public_text().unwrap(),
        "SOrecipientK",
        4.0,
    );
    tx.sign(rsa_wallet().private_key()).unwrap();

    let (status, _) = call(&router, post("/transactions/new", &tx.to_wire())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, mempool) = call(&router, get("/mempool")).await;
    assert_eq!(mempool["count"], 1);

    let (status, mined) = call(&router, get("/mine?miner_address=SOminerK")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mined["block"]["transactions"].as_array().unwrap().len(), 2);

    let (_, balance) = call(&router, get(&format!("/balance/{sender}"))).await;
    assert_eq!(balance, json!({"address": sender.as_str(), "balance": 6.0}));

    let (_, chain) = call(&router, get("/chain?start=1")).await;
    assert_eq!(chain["length"], 2);
    assert_eq!(chain["chain"][0]["index"], 1);
}

#[tokio::test]
async fn test_network_map_reaches_disk() {
    let n = node();
    let path = n.dir.path().join("live_network_nodes.json");
    let service = NodeGatewayService::new(GatewayConfig::default(), n.gateway).unwrap();
    let router = service.router();

    let map = json!({"active_nodes": ["http://b:5000", "http://a:5000"]});
    let (status, _) = call(&router, post("/nodes/update_map", &map)).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let store = NetworkMapStore::new(path);
    let mut persisted = store.load().await.unwrap();
    for _ in 0..50 {
        if !persisted.active_nodes.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        persisted = store.load().await.unwrap();
    }
    assert_eq!(
        persisted.active_nodes,
        vec!["http://a:5000", "http://b:5000"]
    );
}

#[tokio::test]
async fn test_served_node_answers_handshake() {
    let n = node();
    let expected = n.gateway.node_address().clone();
    let config = GatewayConfig {
        host: "127.0.0.1".into(),
        port: 0,
        ..GatewayConfig::default()
    };
    let running = NodeGatewayService::new(config, n.gateway)
        .unwrap()
        .start()
        .await
        .unwrap();

    let mut stream = TcpStream::connect(running.local_addr()).await.unwrap();
    stream
        .write_all(b"GET /handshake HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(expected.as_str()), "{response}");

    running.shutdown().await.unwrap();
}
