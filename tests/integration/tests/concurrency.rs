//! Integration test: concurrent admissions and settlements never push a
//! channel's unsettled exposure past its cap.

use std::sync::Arc;

use futures::future::join_all;
use xpay_core::{Drops, DEFAULT_EXPOSURE_CAP};
use xpay_crypto::KeyScheme;
use xpay_integration_tests::{channel_hex, live_engine, simulated_engine, Payer, ScriptedLedger};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_respect_cap() {
    let (engine, _) = simulated_engine();
    let engine = Arc::new(engine);
    let payer = Arc::new(Payer::new(KeyScheme::Ed25519, 1, &channel_hex(0x99)));

    let amounts: Vec<Drops> = (1..=40).map(|i| i * 100_000).collect();
    let tasks = amounts.iter().map(|&amount| {
        let engine = engine.clone();
        let payer = payer.clone();
        tokio::spawn(async move { engine.queue_claim(&payer.claim(amount)).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap().unwrap()).collect();
    assert!(results.iter().any(|r| r.accepted));

    let status = engine.channel_status(payer.channel_hex()).unwrap();
    let channel = status.channel;
    assert!(channel.last_seen_amount - channel.last_settled_amount <= DEFAULT_EXPOSURE_CAP);
    assert_eq!(status.queued_claim.unwrap().amount, channel.last_seen_amount);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_settles_submit_once() {
    let ledger = Arc::new(ScriptedLedger::new());
    let (engine, _) = live_engine(ledger.clone());
    let engine = Arc::new(engine);
    let payer = Payer::new(KeyScheme::Secp256k1, 2, &channel_hex(0x12));
    engine.queue_claim(&payer.claim(5_000)).await.unwrap();

    let channel = payer.channel_hex().to_string();
    let tasks = (0..8).map(|_| {
        let engine = engine.clone();
        let channel = channel.clone();
        tokio::spawn(async move { engine.settle(Some(&channel)).await })
    });
    let results: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.ok).count(), 1);
    assert_eq!(ledger.submitted().len(), 1);
    assert_eq!(engine.list_receipts(None).unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_traffic_across_channels() {
    let (engine, _) = simulated_engine();
    let engine = Arc::new(engine);
    let payers: Vec<Arc<Payer>> = (0..5u8)
        .map(|i| Arc::new(Payer::new(KeyScheme::Ed25519, 10 + i, &channel_hex(0x30 + i))))
        .collect();

    let mut tasks = Vec::new();
    for step in 1..=10u64 {
        for payer in &payers {
            let engine = engine.clone();
            let payer = payer.clone();
            tasks.push(tokio::spawn(async move {
                engine.queue_claim(&payer.claim(step * 200_000)).await.map(|_| ())
            }));
        }
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move { engine.settle(None).await.map(|_| ()) }));
    }
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    for payer in &payers {
        let channel = engine.channel_status(payer.channel_hex()).unwrap().channel;
        assert!(channel.last_settled_amount <= channel.last_seen_amount);
        assert!(channel.last_seen_amount - channel.last_settled_amount <= DEFAULT_EXPOSURE_CAP);
    }

    // Every receipt amount is one that was actually signed.
    for receipt in engine.list_receipts(None).unwrap() {
        assert_eq!(receipt.amount % 200_000, 0);
    }
}
