//! Integration test: sign → verify → queue → settle → receipts, across
//! several channels and devices.

use std::sync::Arc;

use xpay_core::{ClaimState, EngineConfig, ErrorKind};
use xpay_crypto::{simulated_tx_hash, KeyScheme};
use xpay_integration_tests::{channel_hex, simulated_engine, Payer};
use xpay_settlement::{OfflineLedger, SettlementEngine};

#[tokio::test]
async fn test_full_simulated_lifecycle() {
    let (engine, _) = simulated_engine();
    let payer = Payer::new(KeyScheme::Ed25519, 1, &channel_hex(0x5D));

    assert!(engine.verify(&payer.claim(400_000)).valid);
    assert!(engine.queue_claim(&payer.claim(400_000)).await.unwrap().accepted);
    assert!(engine.queue_claim(&payer.claim(900_000)).await.unwrap().accepted);

    let status = engine.channel_status(payer.channel_hex()).unwrap();
    assert_eq!(status.state, ClaimState::Queued);
    assert_eq!(status.queued_claim.unwrap().amount, 900_000);

    let result = engine.settle(Some(payer.channel_hex())).await.unwrap();
    assert!(result.ok);
    assert_eq!(result.simulated, Some(true));
    assert_eq!(
        result.transaction_hash.as_deref(),
        Some(simulated_tx_hash(payer.channel(), 900_000).as_str())
    );

    let status = engine.channel_status(payer.channel_hex()).unwrap();
    assert_eq!(status.state, ClaimState::Settled);
    assert_eq!(status.channel.last_settled_amount, 900_000);
    assert_eq!(status.channel.last_seen_amount, 900_000);
    assert!(status.queued_claim.is_none());

    // Nothing left; the same claim is now stale.
    let again = engine.settle(None).await.unwrap();
    assert_eq!(again.reason, Some(ErrorKind::NoClaims));
    let stale = engine.queue_claim(&payer.claim(900_000)).await.unwrap();
    assert_eq!(stale.reason, Some(ErrorKind::StaleOrLowerAmount));

    // The channel keeps going after settlement.
    assert!(engine.queue_claim(&payer.claim(2_400_000)).await.unwrap().accepted);
    assert_eq!(
        engine.channel_status(payer.channel_hex()).unwrap().state,
        ClaimState::Queued
    );
}

#[tokio::test]
async fn test_two_million_drop_settlement() {
    let config = EngineConfig {
        default_exposure_cap: 2_000_000,
        ..EngineConfig::default()
    };
    let engine = SettlementEngine::new(
        config,
        Arc::new(xpay_settlement::MemoryStore::new()),
        Arc::new(OfflineLedger::new()),
    )
    .unwrap();
    let payer = Payer::new(KeyScheme::Secp256k1, 2, &channel_hex(0x20));

    assert!(engine.queue_claim(&payer.claim(2_000_000)).await.unwrap().accepted);
    assert!(engine.settle(None).await.unwrap().ok);

    let receipts = engine.list_receipts(Some(payer.channel_hex())).unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].amount, 2_000_000);
    assert!(receipts[0].simulated);
    assert!(engine.queued_claims().unwrap().is_empty());
}

#[tokio::test]
async fn test_settle_without_channel_takes_largest() {
    let (engine, _) = simulated_engine();
    let small = Payer::new(KeyScheme::Ed25519, 3, &channel_hex(0x01));
    let large = Payer::new(KeyScheme::Ed25519, 4, &channel_hex(0x02));
    let medium = Payer::new(KeyScheme::Secp256k1, 5, &channel_hex(0x03));

    for (payer, amount) in [(&small, 100), (&large, 1_200_000), (&medium, 700_000)] {
        assert!(engine.queue_claim(&payer.claim(amount)).await.unwrap().accepted);
    }

    let settled_order: Vec<u64> = {
        let mut order = Vec::new();
        while engine.settle(None).await.unwrap().ok {
            order.push(engine.list_receipts(None).unwrap()[0].amount);
        }
        order
    };
    assert_eq!(settled_order, vec![1_200_000, 700_000, 100]);

    // Most recent first.
    let amounts: Vec<u64> = engine.list_receipts(None).unwrap().iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![100, 700_000, 1_200_000]);
}

#[tokio::test]
async fn test_receipts_filter_and_order() {
    let (engine, _) = simulated_engine();
    let a = Payer::new(KeyScheme::Ed25519, 6, &channel_hex(0xA1));
    let b = Payer::new(KeyScheme::Ed25519, 7, &channel_hex(0xB2));

    for amount in [10, 20, 30] {
        engine.queue_claim(&a.claim(amount)).await.unwrap();
        engine.settle(Some(a.channel_hex())).await.unwrap();
        engine.queue_claim(&b.claim(amount * 100)).await.unwrap();
        engine.settle(Some(b.channel_hex())).await.unwrap();
    }

    let only_a: Vec<u64> = engine
        .list_receipts(Some(a.channel_hex()))
        .unwrap()
        .iter()
        .map(|r| r.amount)
        .collect();
    assert_eq!(only_a, vec![30, 20, 10]);

    let all = engine.list_receipts(None).unwrap();
    assert_eq!(all.len(), 6);
    assert!(all.windows(2).all(|w| w[0].sequence > w[1].sequence));
    assert_eq!(all[0].channel_id, *b.channel());

    assert!(engine.list_receipts(Some("bogus")).unwrap().is_empty());
}

#[tokio::test]
async fn test_device_caps_apply_per_device() {
    let (engine, _) = simulated_engine();
    let kiosk = engine.register_device("kiosk-1", Some(5_000_000)).unwrap();
    let till = engine.register_device("till-2", Some(1_000)).unwrap();
    assert_eq!(till.routing_tag, kiosk.routing_tag + 1);

    let payer = Payer::new(KeyScheme::Ed25519, 8, &channel_hex(0xC3));
    let over_default = payer.claim_from(3_000_000, "kiosk-1");
    assert!(engine.queue_claim(&over_default).await.unwrap().accepted);

    let other = Payer::new(KeyScheme::Ed25519, 9, &channel_hex(0xD4));
    let rejected = engine.queue_claim(&other.claim_from(1_001, "till-2")).await.unwrap();
    assert_eq!(rejected.reason, Some(ErrorKind::ExposureCapExceeded));
    assert!(engine.queue_claim(&other.claim_from(1_000, "till-2")).await.unwrap().accepted);

    // Unknown devices fall back to the default cap.
    let third = Payer::new(KeyScheme::Ed25519, 10, &channel_hex(0xE5));
    let result = engine.queue_claim(&third.claim_from(1_500_001, "ghost")).await.unwrap();
    assert_eq!(result.reason, Some(ErrorKind::ExposureCapExceeded));
}

#[tokio::test]
async fn test_exposure_is_measured_from_last_settlement() {
    let (engine, _) = simulated_engine();
    let payer = Payer::new(KeyScheme::Secp256k1, 11, &channel_hex(0x44));

    assert!(engine.queue_claim(&payer.claim(1_500_000)).await.unwrap().accepted);
    let over = engine.queue_claim(&payer.claim(1_500_001)).await.unwrap();
    assert_eq!(over.reason, Some(ErrorKind::ExposureCapExceeded));

    engine.settle(None).await.unwrap();

    // S = 1_500_000, C = 1_500_000: boundary accepted, one more rejected.
    let over = engine.queue_claim(&payer.claim(3_000_001)).await.unwrap();
    assert_eq!(over.reason, Some(ErrorKind::ExposureCapExceeded));
    assert!(engine.queue_claim(&payer.claim(3_000_000)).await.unwrap().accepted);
}

#[tokio::test]
async fn test_state_survives_engine_restart() {
    let store = Arc::new(xpay_settlement::MemoryStore::new());
    let payer = Payer::new(KeyScheme::Ed25519, 12, &channel_hex(0x66));

    {
        let engine =
            SettlementEngine::new(EngineConfig::default(), store.clone(), Arc::new(OfflineLedger::new())).unwrap();
        engine.register_device("pos-1", None).unwrap();
        engine.queue_claim(&payer.claim(100)).await.unwrap();
        engine.settle(None).await.unwrap();
        engine.queue_claim(&payer.claim(200)).await.unwrap();
    }

    let engine =
        SettlementEngine::new(EngineConfig::default(), store, Arc::new(OfflineLedger::new())).unwrap();
    assert_eq!(engine.register_device("pos-2", None).unwrap().routing_tag, 700_001);
    assert_eq!(engine.list_receipts(None).unwrap().len(), 1);

    let status = engine.channel_status(payer.channel_hex()).unwrap();
    assert_eq!(status.state, ClaimState::Queued);
    assert_eq!(status.channel.last_settled_amount, 100);
    assert_eq!(status.channel.last_seen_amount, 200);

    assert!(engine.settle(None).await.unwrap().ok);
    let receipts = engine.list_receipts(None).unwrap();
    assert_eq!(receipts[0].amount, 200);
    assert!(receipts[0].sequence > receipts[1].sequence);
}
