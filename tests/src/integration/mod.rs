//! Cross-crate integration flows.

mod http_api;
mod mining_conflict;
mod transfer_flow;
mod wallet_lifecycle;

use sok_crypto::{KeyKind, Keypair};
use sok_gateway::{MockBroadcaster, MockLedger, NetworkMapStore, NodeGateway};
use std::sync::{Arc, OnceLock};

/// RSA wallet shared across flows; generation dominates test time.
pub(crate) fn rsa_wallet() -> &'static Keypair {
    static WALLET: OnceLock<Keypair> = OnceLock::new();
    WALLET.get_or_init(|| Keypair::generate().unwrap())
}

pub(crate) struct Node {
    pub gateway: NodeGateway,
    pub ledger: Arc<MockLedger>,
    pub broadcaster: Arc<MockBroadcaster>,
    pub dir: tempfile::TempDir,
}

pub(crate) fn node() -> Node {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(MockLedger::new());
    let broadcaster = Arc::new(MockBroadcaster::new());
    let node_wallet = Keypair::generate_kind(KeyKind::Secp256k1).unwrap();
    let gateway = NodeGateway::new(
        ledger.clone(),
        broadcaster.clone(),
        &node_wallet,
        NetworkMapStore::new(dir.path().join("live_network_nodes.json")),
    )
    .unwrap();
    Node {
        gateway,
        ledger,
        broadcaster,
        dir,
    }
}
