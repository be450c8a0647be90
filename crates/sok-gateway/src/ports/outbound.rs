//! Outbound ports for the node gateway.
//!
//! The ledger (chain, balances, mempool) and the peer layer are external
//! collaborators. The gateway performs exactly one mutating call per
//! accepted transaction or block and treats the boolean result as
//! authoritative.

use crate::domain::types::{Block, PeerId};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sok_transaction::{BalanceSource, SystemKind, TransferTransaction};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Error from ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not complete the computation
    #[error("ledger internal error: {0}")]
    Internal(String),
}

/// Error from peer broadcasts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BroadcastError {
    /// No peer accepted the announcement
    #[error("peers unreachable: {0}")]
    Unreachable(String),
}

/// The ledger a node fronts.
#[async_trait]
pub trait Ledger: BalanceSource {
    /// Add a validated transaction to the mempool; `false` if already known.
    async fn add_transaction(&self, transaction: &TransferTransaction) -> bool;

    /// Offer a peer block; `false` if it lost a race or does not link.
    async fn add_block_from_peer(&self, block: &Block) -> bool;

    /// Assemble and prove a block from the mempool, rewarding the miner.
    async fn mine_pending_transactions(&self, miner_address: &str) -> Result<Block, LedgerError>;

    /// Snapshot of the mempool.
    async fn pending_transactions(&self) -> Vec<TransferTransaction>;

    /// Snapshot of the full chain.
    async fn chain(&self) -> Vec<Block>;

    /// Current proof-of-work difficulty.
    async fn difficulty(&self) -> u32;

    /// Coins in circulation.
    async fn total_supply(&self) -> Result<f64, LedgerError>;

    /// Known peers by identifier.
    async fn peers(&self) -> BTreeMap<PeerId, String>;
}

/// Announces new transactions and blocks to peers.
///
/// Timeouts and retries are the implementation's concern.
#[async_trait]
pub trait PeerBroadcaster: Send + Sync {
    /// Relay an accepted transaction.
    async fn broadcast_transaction(
        &self,
        transaction: &TransferTransaction,
    ) -> Result<(), BroadcastError>;

    /// Announce a freshly mined block.
    async fn broadcast_block(&self, block: &Block) -> Result<(), BroadcastError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Reward paid by [`MockLedger`] per mined block.
pub const MOCK_MINING_REWARD: f64 = 50.0;

struct LedgerState {
    chain: Vec<Block>,
    pending: Vec<TransferTransaction>,
    seen: HashSet<String>,
    balances: HashMap<String, f64>,
    peers: BTreeMap<PeerId, String>,
    difficulty: u32,
    stats_broken: bool,
    mining_broken: bool,
}

/// In-memory ledger for tests.
///
/// Starts with a genesis block at index 0. Peer blocks are accepted only
/// for the next free index, so a second block for the same slot is a
/// conflict. Mining applies pending transfers to balances.
pub struct MockLedger {
    state: RwLock<LedgerState>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Ledger holding only the genesis block.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState {
                chain: vec![Block::new(0)],
                pending: Vec::new(),
                seen: HashSet::new(),
                balances: HashMap::new(),
                peers: BTreeMap::new(),
                difficulty: 4,
                stats_broken: false,
                mining_broken: false,
            }),
        }
    }

    /// Overwrite an address balance.
    pub fn set_balance(&self, address: impl Into<String>, balance: f64) {
        self.state.write().balances.insert(address.into(), balance);
    }

    /// Register a peer.
    pub fn add_peer(&self, id: PeerId, url: impl Into<String>) {
        self.state.write().peers.insert(id, url.into());
    }

    /// Make supply computation fail.
    pub fn break_stats(&self) {
        self.state.write().stats_broken = true;
    }

    /// Make mining fail.
    pub fn break_mining(&self) {
        self.state.write().mining_broken = true;
    }
}

#[async_trait]
impl BalanceSource for MockLedger {
    async fn get_balance(&self, address: &str) -> f64 {
        let state = self.state.read();
        state.balances.get(address).copied().unwrap_or(0.0)
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn add_transaction(&self, transaction: &TransferTransaction) -> bool {
        let key = format!(
            "{}:{}",
            transaction.hash(),
            transaction.signature.as_deref().unwrap_or_default()
        );
        let mut state = self.state.write();
        if !state.seen.insert(key) {
            return false;
        }
        state.pending.push(transaction.clone());
        true
    }

    async fn add_block_from_peer(&self, block: &Block) -> bool {
        let mut state = self.state.write();
        if block.index != state.chain.len() as u64 {
            return false;
        }
        state.chain.push(block.clone());
        true
    }

    async fn mine_pending_transactions(&self, miner_address: &str) -> Result<Block, LedgerError> {
        let mut state = self.state.write();
        if state.mining_broken {
            return Err(LedgerError::Internal("proof search aborted".into()));
        }

        let mut transactions = std::mem::take(&mut state.pending);
        transactions.push(TransferTransaction::system(
            miner_address,
            MOCK_MINING_REWARD,
            SystemKind::MiningReward,
        ));

        let balances = &mut state.balances;
        for tx in &transactions {
            if !tx.is_system() {
                *balances.entry(tx.sender_address.clone()).or_default() -= tx.amount;
            }
            *balances.entry(tx.recipient_address.clone()).or_default() += tx.amount;
        }

        let wire = transactions.iter().map(TransferTransaction::to_wire);
        let block = Block::new(state.chain.len() as u64)
            .with_field("transactions", wire.collect())
            .with_field("miner", miner_address.into());
        state.chain.push(block.clone());
        Ok(block)
    }

    async fn pending_transactions(&self) -> Vec<TransferTransaction> {
        self.state.read().pending.clone()
    }

    async fn chain(&self) -> Vec<Block> {
        self.state.read().chain.clone()
    }

    async fn difficulty(&self) -> u32 {
        self.state.read().difficulty
    }

    async fn total_supply(&self) -> Result<f64, LedgerError> {
        let state = self.state.read();
        if state.stats_broken {
            return Err(LedgerError::Internal("supply accounting diverged".into()));
        }
        Ok(state.balances.values().sum())
    }

    async fn peers(&self) -> BTreeMap<PeerId, String> {
        self.state.read().peers.clone()
    }
}

/// Broadcaster that records announcements.
#[derive(Default)]
pub struct MockBroadcaster {
    blocks: Mutex<Vec<Block>>,
    transactions: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MockBroadcaster {
    /// Broadcaster that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent broadcast fail.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Blocks announced so far.
    pub fn broadcast_blocks(&self) -> Vec<Block> {
        self.blocks.lock().clone()
    }

    /// Hashes of transactions relayed so far.
    pub fn broadcast_transactions(&self) -> Vec<String> {
        self.transactions.lock().clone()
    }
}

#[async_trait]
impl PeerBroadcaster for MockBroadcaster {
    async fn broadcast_transaction(
        &self,
        transaction: &TransferTransaction,
    ) -> Result<(), BroadcastError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BroadcastError::Unreachable("mock failure".into()));
        }
        self.transactions.lock().push(transaction.hash());
        Ok(())
    }

    async fn broadcast_block(&self, block: &Block) -> Result<(), BroadcastError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BroadcastError::Unreachable("mock failure".into()));
        }
        self.blocks.lock().push(block.clone());
        Ok(())
    }
}
