//! Node gateway service.
//!
//! Each operation maps one request onto at most one mutating ledger call
//! (plus the broadcast that completes a mine). Validation policy lives in
//! `sok-transaction`; this layer only sequences calls and classifies
//! outcomes.

use crate::adapters::network_map::NetworkMapStore;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    Block, BlockAcceptance, ChainStats, ChainView, GenesisInfo, MempoolView, PeerId, SubmitReceipt,
};
use crate::ports::outbound::{Ledger, PeerBroadcaster};
use serde_json::Value;
use sok_crypto::{Address, Keypair};
use sok_telemetry::{
    metric_inc, BLOCKS_MINED, BLOCK_CONFLICTS, TRANSACTIONS_RECEIVED, TRANSACTIONS_REJECTED,
};
use sok_transaction::{TransactionRequest, TransferTransaction};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The API a ledger node exposes, independent of transport.
pub struct NodeGateway {
    ledger: Arc<dyn Ledger>,
    broadcaster: Arc<dyn PeerBroadcaster>,
    node_address: Address,
    genesis_address: Option<Address>,
    network_map: Arc<NetworkMapStore>,
}

impl NodeGateway {
    /// Create a gateway for the node identified by `node_wallet`.
    ///
    /// # Errors
    ///
    /// Fails only if the wallet's public key cannot be encoded.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        broadcaster: Arc<dyn PeerBroadcaster>,
        node_wallet: &Keypair,
        network_map: NetworkMapStore,
    ) -> Result<Self, sok_crypto::CryptoError> {
        Ok(Self {
            ledger,
            broadcaster,
            node_address: node_wallet.address()?,
            genesis_address: None,
            network_map: Arc::new(network_map),
        })
    }

    /// Expose `/genesis/info` for the given genesis wallet.
    pub fn with_genesis(
        mut self,
        genesis_wallet: &Keypair,
    ) -> Result<Self, sok_crypto::CryptoError> {
        self.genesis_address = Some(genesis_wallet.address()?);
        Ok(self)
    }

    /// Address of this node's wallet.
    pub fn node_address(&self) -> &Address {
        &self.node_address
    }

    /// Network map store used by `update_network_map`.
    pub fn network_map(&self) -> &NetworkMapStore {
        &self.network_map
    }

    async fn decode_and_validate(
        &self,
        request: TransactionRequest,
    ) -> ApiResult<Result<TransferTransaction, SubmitReceipt>> {
        metric_inc!(TRANSACTIONS_RECEIVED);
        let transaction =
            TransferTransaction::from_request(request).map_err(ApiError::bad_request)?;

        match transaction.validate(self.ledger.as_ref()).await {
            Ok(validity) => {
                debug!(
                    tx_hash = %transaction.hash(),
                    outcome = validity.message(),
                    "transaction validated"
                );
                Ok(Ok(transaction))
            }
            Err(reason) => {
                metric_inc!(TRANSACTIONS_REJECTED, &[reason.code()]);
                warn!(
                    sender = %transaction.sender_address,
                    code = reason.code(),
                    %reason,
                    "rejected invalid transaction"
                );
                Ok(Err(SubmitReceipt::Rejected(reason)))
            }
        }
    }

    /// Submit a client transaction.
    ///
    /// New transactions are relayed to peers; a failed relay is logged and
    /// does not change the receipt.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` if the request lacks sender key, recipient
    /// or amount.
    pub async fn submit_transaction(
        &self,
        request: TransactionRequest,
    ) -> ApiResult<SubmitReceipt> {
        let transaction = match self.decode_and_validate(request).await? {
            Ok(transaction) => transaction,
            Err(receipt) => return Ok(receipt),
        };

        if !self.ledger.add_transaction(&transaction).await {
            debug!(tx_hash = %transaction.hash(), "duplicate transaction");
            return Ok(SubmitReceipt::Duplicate);
        }

        if let Err(e) = self.broadcaster.broadcast_transaction(&transaction).await {
            error!(tx_hash = %transaction.hash(), error = %e, "transaction relay failed");
        }
        info!(
            tx_hash = %transaction.hash(),
            sender = %transaction.sender_address,
            amount = transaction.amount,
            "transaction accepted"
        );
        Ok(SubmitReceipt::AcceptedPending)
    }

    /// Accept a transaction relayed by a peer.
    ///
    /// Peer relays go through the same validation policy but are not
    /// relayed again.
    pub async fn submit_peer_transaction(
        &self,
        request: TransactionRequest,
    ) -> ApiResult<SubmitReceipt> {
        let transaction = match self.decode_and_validate(request).await? {
            Ok(transaction) => transaction,
            Err(receipt) => return Ok(receipt),
        };

        if self.ledger.add_transaction(&transaction).await {
            Ok(SubmitReceipt::AcceptedPending)
        } else {
            Ok(SubmitReceipt::Duplicate)
        }
    }

    /// Offer a peer's block to the ledger.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` for payloads that are not a block object with
    /// an integer `index`. A ledger refusal is a conflict, not an error.
    pub async fn submit_block(&self, payload: Value) -> ApiResult<BlockAcceptance> {
        let block = Block::from_payload(payload)
            .ok_or_else(|| ApiError::bad_request("invalid block payload"))?;

        if self.ledger.add_block_from_peer(&block).await {
            info!(index = block.index, "accepted block from peer");
            Ok(BlockAcceptance::Accepted)
        } else {
            metric_inc!(BLOCK_CONFLICTS);
            warn!(index = block.index, "block conflict");
            Ok(BlockAcceptance::Conflict)
        }
    }

    /// Mine the mempool and announce the new block.
    ///
    /// The operation completes only once peers have been told about the
    /// block.
    ///
    /// # Errors
    ///
    /// - `ApiError::BadRequest` without a miner address
    /// - `ApiError::MiningFailed` if the ledger cannot assemble a block
    /// - `ApiError::BroadcastFailed` if the block was mined but not announced
    pub async fn mine(&self, miner_address: Option<&str>) -> ApiResult<Block> {
        let miner_address = miner_address
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::bad_request("miner_address is required"))?;

        let block = self
            .ledger
            .mine_pending_transactions(miner_address)
            .await
            .map_err(|e| {
                error!(error = %e, "mining failed");
                ApiError::MiningFailed(e.to_string())
            })?;
        metric_inc!(BLOCKS_MINED);

        if let Err(e) = self.broadcaster.broadcast_block(&block).await {
            error!(index = block.index, error = %e, "mined block was not announced");
            return Err(ApiError::BroadcastFailed {
                block: Box::new(block),
                reason: e.to_string(),
            });
        }

        info!(
            index = block.index,
            miner = miner_address,
            "mined and announced block"
        );
        Ok(block)
    }

    /// Chain from `start` onwards with the full chain length.
    pub async fn chain(&self, start: Option<i64>) -> ChainView {
        let chain = self.ledger.chain().await;
        let length = chain.len();
        let chain = match start {
            Some(start) => chain
                .into_iter()
                .filter(|block| i128::from(block.index) >= i128::from(start))
                .collect(),
            None => chain,
        };
        ChainView { chain, length }
    }

    /// Aggregate chain statistics.
    ///
    /// # Errors
    ///
    /// `ApiError::StatsUnavailable` if any figure cannot be computed.
    pub async fn stats(&self) -> ApiResult<ChainStats> {
        let total_supply = self.ledger.total_supply().await.map_err(|e| {
            error!(error = %e, "failed to compute chain statistics");
            ApiError::StatsUnavailable
        })?;
        let block_height = self
            .ledger
            .chain()
            .await
            .last()
            .map(|block| block.index)
            .ok_or_else(|| {
                error!("failed to compute chain statistics: empty chain");
                ApiError::StatsUnavailable
            })?;

        Ok(ChainStats {
            total_supply,
            block_height,
            pending_tx_count: self.ledger.pending_transactions().await.len(),
            difficulty: self.ledger.difficulty().await,
            peer_count: self.ledger.peers().await.len(),
        })
    }

    /// Pending transactions in wire form.
    pub async fn mempool(&self) -> MempoolView {
        let pending: Vec<Value> = self
            .ledger
            .pending_transactions()
            .await
            .iter()
            .map(TransferTransaction::to_wire)
            .collect();
        MempoolView {
            count: pending.len(),
            pending_transactions: pending,
        }
    }

    /// Replace the persisted network map in the background.
    ///
    /// Returns as soon as the payload is checked; persistence failures are
    /// logged by the background task. The handle lets callers wait for the
    /// write when they need to.
    ///
    /// # Errors
    ///
    /// `ApiError::BadRequest` if `active_nodes` is missing or is not a list
    /// of strings.
    pub fn update_network_map(&self, payload: &Value) -> ApiResult<JoinHandle<()>> {
        let nodes = payload
            .get("active_nodes")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::bad_request("active_nodes is required"))?
            .iter()
            .map(|node| node.as_str().map(str::to_owned))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(|| ApiError::bad_request("active_nodes must be a list of strings"))?;

        let store = Arc::clone(&self.network_map);
        Ok(tokio::spawn(async move {
            if let Err(e) = store.replace(nodes).await {
                error!(path = %store.path().display(), error = %e, "failed to persist network map");
            }
        }))
    }

    /// Identify this node to a peer.
    pub fn handshake(&self) -> &Address {
        &self.node_address
    }

    /// Known peers.
    pub async fn peers(&self) -> BTreeMap<PeerId, String> {
        self.ledger.peers().await
    }

    /// Balance of any address.
    pub async fn balance(&self, address: &str) -> f64 {
        self.ledger.get_balance(address).await
    }

    /// Genesis wallet address and balance.
    ///
    /// # Errors
    ///
    /// `ApiError::Forbidden` on nodes that do not hold the genesis wallet.
    pub async fn genesis_info(&self) -> ApiResult<GenesisInfo> {
        let address = self
            .genesis_address
            .as_ref()
            .ok_or_else(|| ApiError::Forbidden("forbidden".into()))?;
        Ok(GenesisInfo {
            genesis_address: address.to_string(),
            current_balance: self.ledger.get_balance(address.as_str()).await,
        })
    }
}
