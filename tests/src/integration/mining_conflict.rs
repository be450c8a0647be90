//! Two nodes mining and gossiping blocks at the same height.

use super::node;
use sok_gateway::{ApiError, BlockAcceptance, MOCK_MINING_REWARD};

#[tokio::test]
async fn test_peer_block_for_filled_slot_is_a_conflict() {
    let alice = node();
    let bob = node();

    let mined = alice.gateway.mine(Some("SOaliceK")).await.unwrap();
    let announced = alice.broadcaster.broadcast_blocks();
    assert_eq!(announced, vec![mined.clone()]);

    let payload = serde_json::to_value(&announced[0]).unwrap();
    assert_eq!(
        bob.gateway.submit_block(payload.clone()).await.unwrap(),
        BlockAcceptance::Accepted
    );
    assert_eq!(bob.gateway.chain(None).await.length, 2);

    // Bob mines on top of Alice's block; a replay of it now conflicts.
    bob.gateway.mine(Some("SObobK")).await.unwrap();
    assert_eq!(
        bob.gateway.submit_block(payload).await.unwrap(),
        BlockAcceptance::Conflict
    );
    let view = bob.gateway.chain(Some(2)).await;
    assert_eq!(view.chain[0].body["miner"], "SObobK");
}

#[tokio::test]
async fn test_unannounced_block_is_still_on_the_chain() {
    let n = node();
    n.broadcaster.fail();

    let block = match n.gateway.mine(Some("SOminerK")).await {
        Err(ApiError::BroadcastFailed { block, .. }) => block,
        other => panic!("expected broadcast failure, got {other:?}"),
    };
    assert_eq!(block.index, 1);
    assert_eq!(n.gateway.chain(None).await.length, 2);
    assert_eq!(n.gateway.balance("SOminerK").await, MOCK_MINING_REWARD);
}

#[tokio::test]
async fn test_stats_follow_the_chain() {
    let n = node();
    for _ in 0..3 {
        n.gateway.mine(Some("SOminerK")).await.unwrap();
    }
    let stats = n.gateway.stats().await.unwrap();
    assert_eq!(stats.block_height, 3);
    assert_eq!(stats.pending_tx_count, 0);
    assert_eq!(stats.total_supply, 3.0 * MOCK_MINING_REWARD);
}
