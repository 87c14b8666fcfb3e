//! Fixtures shared by the cross-crate tests: deterministic payers, engines
//! over an in-memory store, and a scriptable ledger.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use xpay_core::{ChannelId, ClaimSubmission, Drops, EngineConfig, SettlementMode, SettlementTx};
use xpay_crypto::{sign_claim, KeyPair, KeyScheme};
use xpay_settlement::{
    LedgerClient, LedgerClientError, MemoryStore, Namespace, OfflineLedger, SettlementEngine, Store,
    SubmitOutcome,
};

/// A valid classic address used as the merchant account.
pub const MERCHANT: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

/// Channel id made of one repeated byte.
pub fn channel_hex(byte: u8) -> String {
    format!("{:02X}", byte).repeat(32)
}

/// The paying side of one channel, with a key derived from a fixed seed.
pub struct Payer {
    keypair: KeyPair,
    channel: ChannelId,
}

impl Payer {
    pub fn new(scheme: KeyScheme, seed: u8, channel: &str) -> Self {
        let keypair = KeyPair::from_seed(scheme, &[seed; 32]).expect("fixed seed is a valid key");
        let channel = ChannelId::parse(channel).expect("fixture channel id is valid");
        Self { keypair, channel }
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    pub fn channel_hex(&self) -> &str {
        self.channel.as_str()
    }

    pub fn pubkey_hex(&self) -> String {
        self.keypair.public_key().to_hex()
    }

    pub fn signature(&self, amount: Drops) -> String {
        sign_claim(&self.channel, amount, &self.keypair)
    }

    pub fn claim(&self, amount: Drops) -> ClaimSubmission {
        ClaimSubmission {
            channel_id: self.channel.to_string(),
            amount: amount.to_string(),
            signature: self.signature(amount),
            public_key: self.pubkey_hex(),
            device_id: None,
        }
    }

    pub fn claim_from(&self, amount: Drops, device_id: &str) -> ClaimSubmission {
        ClaimSubmission {
            device_id: Some(device_id.to_string()),
            ..self.claim(amount)
        }
    }
}

/// Simulated-mode engine over a fresh in-memory store.
pub fn simulated_engine() -> (SettlementEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = SettlementEngine::new(EngineConfig::default(), store.clone(), Arc::new(OfflineLedger::new()))
        .expect("engine over an empty store");
    (engine, store)
}

/// Live-mode engine submitting through `ledger`.
pub fn live_engine(ledger: Arc<dyn LedgerClient>) -> (SettlementEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = EngineConfig {
        settlement_mode: SettlementMode::Live,
        merchant_address: Some(MERCHANT.to_string()),
        ..EngineConfig::default()
    };
    let engine = SettlementEngine::new(config, store.clone(), ledger).expect("engine over an empty store");
    (engine, store)
}

/// Raw bytes of every channel, queue and receipt record.
pub fn snapshot(store: &dyn Store) -> Vec<Vec<(String, Vec<u8>)>> {
    [Namespace::Channels, Namespace::Queue, Namespace::Receipts]
        .into_iter()
        .map(|ns| store.scan(ns).expect("memory scan"))
        .collect()
}

/// Ledger that plays back scripted replies in order, then validates
/// everything it is sent.
#[derive(Default)]
pub struct ScriptedLedger {
    replies: Mutex<VecDeque<Result<SubmitOutcome, LedgerClientError>>>,
    submitted: Mutex<Vec<SettlementTx>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, reply: Result<SubmitOutcome, LedgerClientError>) -> Self {
        self.replies.lock().expect("replies lock").push_back(reply);
        self
    }

    /// A reply the ledger gives for a transaction it rejected.
    pub fn rejected(engine_result: &str) -> SubmitOutcome {
        SubmitOutcome {
            engine_result: Some(engine_result.to_string()),
            tx_hash: Some("REJECTED".to_string()),
            ..Default::default()
        }
    }

    pub fn submitted(&self) -> Vec<SettlementTx> {
        self.submitted.lock().expect("submitted lock").clone()
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn submit_claim(&self, tx: &SettlementTx) -> Result<SubmitOutcome, LedgerClientError> {
        self.submitted.lock().expect("submitted lock").push(tx.clone());
        let scripted = self.replies.lock().expect("replies lock").pop_front();
        tracing::debug!(amount = %tx.amount, scripted = scripted.is_some(), "scripted submission");
        scripted.unwrap_or_else(|| {
            Ok(SubmitOutcome {
                engine_result: Some("tesSUCCESS".to_string()),
                meta_result: Some("tesSUCCESS".to_string()),
                tx_hash: Some(format!("LIVE{}", tx.amount)),
                validated: true,
                ledger_index: Some(1000),
                raw: serde_json::Value::Null,
            })
        })
    }

    async fn ledger_entry(&self, channel_id: &ChannelId) -> Result<serde_json::Value, LedgerClientError> {
        Ok(serde_json::json!({
            "node": { "LedgerEntryType": "PayChannel", "Destination": MERCHANT },
            "index": channel_id.as_str(),
            "validated": true,
        }))
    }

    fn adapter_id(&self) -> &str {
        "scripted"
    }
}
