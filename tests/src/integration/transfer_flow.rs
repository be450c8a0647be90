//! Transfer flow: sign in the wallet, validate at the node, settle by mining.

use super::{node, rsa_wallet};
use sok_crypto::{KeyKind, Keypair};
use sok_gateway::SubmitReceipt;
use sok_transaction::{
    MockBalances, SystemKind, TransactionError, TransactionRequest, TransferTransaction,
    ValidationError, Validity,
};

fn signed(amount: f64, recipient: &str) -> TransferTransaction {
    let mut tx = TransferTransaction::new(
        rsa_wallet().export_public_text().unwrap(),
        recipient,
        amount,
    );
    tx.sign(rsa_wallet().private_key()).unwrap();
    tx
}

fn as_request(tx: &TransferTransaction) -> TransactionRequest {
    serde_json::from_value(tx.to_wire()).unwrap()
}

#[tokio::test]
async fn test_spend_is_limited_by_settled_balance() {
    let n = node();
    let sender = rsa_wallet().address().unwrap();
    n.ledger.set_balance(sender.as_str(), 10.0);

    let first = signed(4.0, "SOrecipientK");
    let receipt = n.gateway.submit_transaction(as_request(&first)).await;
    assert_eq!(receipt.unwrap(), SubmitReceipt::AcceptedPending);
    n.gateway.mine(Some("SOminerK")).await.unwrap();
    assert_eq!(n.gateway.balance(sender.as_str()).await, 6.0);
    assert_eq!(n.gateway.balance("SOrecipientK").await, 4.0);

    let too_much = signed(7.0, "SOrecipientK");
    let receipt = n.gateway.submit_transaction(as_request(&too_much)).await;
    match receipt.unwrap() {
        SubmitReceipt::Rejected(ValidationError::InsufficientBalance { address, balance }) => {
            assert_eq!(address, &sender.as_str()[..10]);
            assert_eq!(balance, 6.0);
        }
        other => panic!("unexpected receipt: {other:?}"),
    }

    let exact = signed(6.0, "SOrecipientK");
    let receipt = n.gateway.submit_transaction(as_request(&exact)).await;
    assert_eq!(receipt.unwrap(), SubmitReceipt::AcceptedPending);
}

#[tokio::test]
async fn test_wire_form_preserves_hash_and_signature() {
    let n = node();
    n.ledger
        .set_balance(rsa_wallet().address().unwrap().into_string(), 100.0);
    let tx = signed(12.5, "SOrecipientK");

    n.gateway.submit_transaction(as_request(&tx)).await.unwrap();
    let mempool = n.gateway.mempool().await;
    assert_eq!(mempool.count, 1);

    let received: TransactionRequest =
        serde_json::from_value(mempool.pending_transactions[0].clone()).unwrap();
    let received = TransferTransaction::from_request(received).unwrap();
    assert_eq!(received.hash(), tx.hash());
    assert_eq!(received.signature, tx.signature);
    assert_eq!(n.broadcaster.broadcast_transactions(), vec![tx.hash()]);
}

#[tokio::test]
async fn test_tampering_after_signing_is_detected() {
    let balances = MockBalances::with_balance(rsa_wallet().address().unwrap().into_string(), 50.0);

    let mut amount = signed(5.0, "SOrecipientK");
    amount.amount = 50.0;
    assert!(matches!(
        amount.validate(&balances).await,
        Err(ValidationError::BadSignature { .. })
    ));

    let mut recipient = signed(5.0, "SOrecipientK");
    recipient.recipient_address = "SOattackerK".into();
    assert!(matches!(
        recipient.validate(&balances).await,
        Err(ValidationError::BadSignature { .. })
    ));

    let mut sender = signed(5.0, "SOrecipientK");
    sender.sender_address = "SOsomeoneelseK".into();
    assert_eq!(
        sender.validate(&balances).await,
        Err(ValidationError::AddressKeyMismatch)
    );

    assert_eq!(
        signed(5.0, "SOrecipientK").validate(&balances).await,
        Ok(Validity::Transfer)
    );
}

#[tokio::test]
async fn test_system_transactions_need_a_known_marker() {
    let balances = MockBalances::new();
    let reward = TransferTransaction::system("SOminerK", 50.0, SystemKind::MiningReward);
    assert_eq!(
        reward.validate(&balances).await,
        Ok(Validity::System(SystemKind::MiningReward))
    );

    let mut forged = reward.clone();
    forged.signature = Some("free money".into());
    assert_eq!(
        forged.validate(&balances).await,
        Err(ValidationError::InvalidSystemTransaction)
    );
}

#[test]
fn test_ec_wallets_cannot_sign_transfers() {
    let wallet = Keypair::generate_kind(KeyKind::P256).unwrap();
    let public = wallet.export_public_text().unwrap();
    let mut tx = TransferTransaction::new(public, "SOrecipientK", 1.0);
    assert!(matches!(
        tx.sign(wallet.private_key()),
        Err(TransactionError::Signing(_))
    ));
    assert!(tx.signature.is_none());
}
