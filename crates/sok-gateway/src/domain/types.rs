//! Request and response shapes of the node API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sok_transaction::ValidationError;
use std::fmt;

/// A block as exchanged with peers.
///
/// The gateway only needs the index; every other field is carried through
/// untouched for the ledger to judge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Height of the block in the chain
    pub index: u64,
    /// Remaining block fields (transactions, proof, hashes, ...)
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Block {
    /// Block with an empty body.
    pub fn new(index: u64) -> Self {
        Self {
            index,
            body: Map::new(),
        }
    }

    /// Add a body field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.body.insert(key.into(), value);
        self
    }

    /// Decode a peer payload.
    ///
    /// Anything but a JSON object with a non-negative integer `index` is
    /// structurally invalid.
    pub fn from_payload(payload: Value) -> Option<Self> {
        let Value::Object(mut body) = payload else {
            return None;
        };
        let index = body.remove("index")?.as_u64()?;
        Some(Self { index, body })
    }
}

/// Identifier a node uses for a peer in its own bookkeeping.
///
/// Distinct from account addresses and from the system sender sentinel;
/// a peer named `"0"` is just a peer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Wrap a peer identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of submitting a transaction.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitReceipt {
    /// New to the ledger; pending inclusion in the next block
    AcceptedPending,
    /// Already known or already processed
    Duplicate,
    /// Failed the validation policy
    Rejected(ValidationError),
}

/// Outcome of a peer block submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockAcceptance {
    /// Appended by the ledger
    Accepted,
    /// Slot already filled by a competing block; retry-worthy
    Conflict,
}

/// Chain query result.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainView {
    /// Blocks at or above the requested start index
    pub chain: Vec<Block>,
    /// Length of the unfiltered chain
    pub length: usize,
}

/// Chain statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainStats {
    /// Coins in circulation
    pub total_supply: f64,
    /// Index of the tip block
    pub block_height: u64,
    /// Transactions waiting in the mempool
    pub pending_tx_count: usize,
    /// Current proof-of-work difficulty
    pub difficulty: u32,
    /// Known peers
    pub peer_count: usize,
}

/// Mempool projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MempoolView {
    /// Pending transactions in wire form
    pub pending_transactions: Vec<Value>,
    /// Number of pending transactions
    pub count: usize,
}

/// Genesis wallet summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenesisInfo {
    /// Address of the genesis wallet
    pub genesis_address: String,
    /// Its current balance
    pub current_balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_payload_decoding() {
        let block = Block::from_payload(json!({"index": 3, "proof": 42})).unwrap();
        assert_eq!(block.index, 3);
        assert_eq!(block.body["proof"], 42);

        let wire = serde_json::to_value(&block).unwrap();
        assert_eq!(wire, json!({"index": 3, "proof": 42}));
    }

    #[test]
    fn test_structurally_invalid_blocks() {
        for payload in [
            json!(null),
            json!([1, 2]),
            json!({}),
            json!({"index": "3"}),
            json!({"index": -1}),
            json!({"index": 1.5}),
        ] {
            assert!(Block::from_payload(payload.clone()).is_none(), "{payload}");
        }
    }

    #[test]
    fn test_peer_map_serializes_as_object() {
        let mut peers = std::collections::BTreeMap::new();
        peers.insert(PeerId::new("0"), "http://10.0.0.1:5000".to_string());
        assert_eq!(
            serde_json::to_value(&peers).unwrap(),
            json!({"0": "http://10.0.0.1:5000"})
        );
    }
}
