//! Integration test: live settlement through a ledger client, including
//! failed submissions leaving local state untouched.

use std::sync::Arc;

use xpay_core::{ClaimState, ErrorKind, PAYMENT_CHANNEL_CLAIM};
use xpay_crypto::KeyScheme;
use xpay_integration_tests::{channel_hex, live_engine, snapshot, Payer, ScriptedLedger, MERCHANT};
use xpay_settlement::{LedgerClientError, SubmitOutcome};

#[tokio::test]
async fn test_live_settlement_descriptor() {
    let ledger = Arc::new(ScriptedLedger::new());
    let (engine, _) = live_engine(ledger.clone());
    let payer = Payer::new(KeyScheme::Secp256k1, 1, &channel_hex(0x5D));

    engine.queue_claim(&payer.claim(1_234_567)).await.unwrap();
    let result = engine.settle(None).await.unwrap();
    assert!(result.ok);
    assert_eq!(result.simulated, Some(false));
    assert_eq!(result.transaction_hash.as_deref(), Some("LIVE1234567"));

    let sent = ledger.submitted();
    assert_eq!(sent.len(), 1);
    let tx = &sent[0];
    assert_eq!(tx.transaction_type, PAYMENT_CHANNEL_CLAIM);
    assert_eq!(tx.account, MERCHANT);
    assert_eq!(tx.channel, *payer.channel());
    assert_eq!(tx.amount, "1234567");
    assert_eq!(tx.balance, tx.amount);
    assert_eq!(tx.public_key, payer.pubkey_hex());
    assert_eq!(tx.signature, payer.signature(1_234_567));

    let json = serde_json::to_value(tx).unwrap();
    for field in ["TransactionType", "Account", "Channel", "Amount", "Balance", "PublicKey", "Signature"] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }

    let receipts = engine.list_receipts(None).unwrap();
    assert_eq!(receipts[0].ledger_index, 1000);
    assert!(!receipts[0].simulated);
}

#[tokio::test]
async fn test_failures_leave_state_unchanged() {
    let ledger = Arc::new(
        ScriptedLedger::new()
            .then(Err(LedgerClientError::Transport("connection refused".into())))
            .then(Ok(ScriptedLedger::rejected("tecUNFUNDED_PAYMENT")))
            .then(Err(LedgerClientError::Timeout("ABC".into())))
            .then(Ok(SubmitOutcome {
                engine_result: Some("tesSUCCESS".into()),
                ..Default::default()
            })),
    );
    let (engine, store) = live_engine(ledger.clone());
    let payer = Payer::new(KeyScheme::Ed25519, 2, &channel_hex(0x42));

    engine.queue_claim(&payer.claim(50_000)).await.unwrap();
    let before = snapshot(store.as_ref());

    let mut details = Vec::new();
    for _ in 0..4 {
        let result = engine.settle(Some(payer.channel_hex())).await.unwrap();
        assert!(!result.ok);
        assert_eq!(result.reason, Some(ErrorKind::XrplSubmitError));
        details.push(result.error.unwrap_or_default());

        assert_eq!(snapshot(store.as_ref()), before);
        assert_eq!(engine.channel_status(payer.channel_hex()).unwrap().state, ClaimState::Queued);
    }
    assert!(details[0].contains("connection refused"));
    assert_eq!(details[1], "tecUNFUNDED_PAYMENT");
    assert!(details[2].contains("timed out"));
    assert_eq!(details[3], "missing_transaction_hash");

    // Script exhausted: the retry goes through.
    let result = engine.settle(Some(payer.channel_hex())).await.unwrap();
    assert!(result.ok);
    assert_eq!(ledger.submitted().len(), 5);
    assert_eq!(engine.list_receipts(None).unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_channel_does_not_block_others() {
    let ledger = Arc::new(ScriptedLedger::new().then(Ok(ScriptedLedger::rejected("tefBAD_AUTH"))));
    let (engine, _) = live_engine(ledger);
    let big = Payer::new(KeyScheme::Ed25519, 3, &channel_hex(0x0A));
    let small = Payer::new(KeyScheme::Ed25519, 4, &channel_hex(0x0B));

    engine.queue_claim(&big.claim(900)).await.unwrap();
    engine.queue_claim(&small.claim(100)).await.unwrap();

    assert!(!engine.settle(None).await.unwrap().ok);
    assert!(engine.settle(Some(small.channel_hex())).await.unwrap().ok);
    assert!(engine.settle(None).await.unwrap().ok);
    assert_eq!(engine.settle(None).await.unwrap().reason, Some(ErrorKind::NoClaims));
}

#[tokio::test]
async fn test_settle_unknown_channel_is_not_found() {
    let (engine, _) = live_engine(Arc::new(ScriptedLedger::new()));
    let result = engine.settle(Some(&channel_hex(0xEE))).await.unwrap();
    assert!(!result.ok);
    assert_eq!(result.reason, Some(ErrorKind::NotFound));

    let result = engine.settle(Some("nope")).await.unwrap();
    assert_eq!(result.reason, Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_inspect_passes_through_ledger_entry() {
    let (engine, _) = live_engine(Arc::new(ScriptedLedger::new()));
    let channel = channel_hex(0x3C);
    let entry = engine.inspect_channel(&channel).await.unwrap();
    assert_eq!(entry["index"], channel);
    assert_eq!(entry["node"]["Destination"], MERCHANT);

    let err = engine.inspect_channel("").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}
