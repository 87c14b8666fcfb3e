use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use xpay_core::{
    AdmissionResult, Channel, ChannelId, Claim, ClaimEvent, ClaimState, ClaimStateMachine,
    ClaimSubmission, CoreError, Device, DeviceId, Drops, EngineConfig, ErrorKind, Receipt,
    SettlementMode, SettlementResult, SettlementTx, VerificationResult,
};
use xpay_crypto::simulated_tx_hash;

use crate::admission::{check_admission, precheck};
use crate::error::{SettlementError, StoreError};
use crate::ledger::ChannelLedger;
use crate::locks::ChannelLocks;
use crate::queue::ClaimQueue;
use crate::receipts::ReceiptStore;
use crate::registry::DeviceRegistry;
use crate::store::Store;
use crate::traits::{LedgerClient, SubmitVerdict};
use crate::verifier::{verify_claim, verify_submission};

/// Local view of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub channel: Channel,
    pub state: ClaimState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queued_claim: Option<Claim>,
}

/// A settlement the ledger (or the simulator) accepted.
struct Settled {
    tx_hash: String,
    ledger_index: u64,
    simulated: bool,
}

/// The claim pipeline: verification, admission, settlement and receipts.
///
/// Admission and the local halves of settlement run under a per-channel
/// state lock. A separate per-channel settlement lock is held for the whole
/// of a settlement, so the ledger round-trip never blocks admissions.
pub struct SettlementEngine {
    config: EngineConfig,
    store: Arc<dyn Store>,
    registry: DeviceRegistry,
    channels: ChannelLedger,
    queue: ClaimQueue,
    receipts: ReceiptStore,
    ledger: Arc<dyn LedgerClient>,
    state_locks: ChannelLocks,
    settle_locks: ChannelLocks,
    states: DashMap<ChannelId, ClaimState>,
}

impl SettlementEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn Store>,
        ledger: Arc<dyn LedgerClient>,
    ) -> Result<Self, SettlementError> {
        let registry = DeviceRegistry::new(
            store.clone(),
            config.routing_tag_base,
            config.default_exposure_cap,
        )?;
        let receipts = ReceiptStore::new(store.clone())?;

        tracing::info!(
            backend = store.backend(),
            adapter_id = ledger.adapter_id(),
            mode = %config.effective_mode(),
            default_cap = config.default_exposure_cap,
            "settlement engine ready"
        );

        Ok(Self {
            channels: ChannelLedger::new(store.clone()),
            queue: ClaimQueue::new(store.clone()),
            registry,
            receipts,
            ledger,
            store,
            config,
            state_locks: ChannelLocks::new(),
            settle_locks: ChannelLocks::new(),
            states: DashMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn ledger_adapter(&self) -> &str {
        self.ledger.adapter_id()
    }

    // ---- Verification ----

    /// Dry-run claim verification. No state is read or written.
    pub fn verify(&self, sub: &ClaimSubmission) -> VerificationResult {
        verify_claim(sub)
    }

    // ---- Devices ----

    pub fn register_device(
        &self,
        device_id: &str,
        exposure_cap: Option<Drops>,
    ) -> Result<Device, SettlementError> {
        self.registry.register(device_id, exposure_cap)
    }

    pub fn get_device(&self, device_id: &str) -> Result<Option<Device>, SettlementError> {
        let id = DeviceId::new(device_id)?;
        Ok(self.registry.get(&id)?)
    }

    pub fn list_devices(&self) -> Result<Vec<Device>, SettlementError> {
        Ok(self.registry.list()?)
    }

    // ---- Admission ----

    /// Verify a claim and, if it raises the channel's cumulative amount
    /// within the exposure cap, queue it in place of any earlier claim.
    ///
    /// Rejections are reported in the result; `Err` means the store failed.
    pub async fn queue_claim(&self, sub: &ClaimSubmission) -> Result<AdmissionResult, SettlementError> {
        if let Err(reason) = precheck(sub) {
            tracing::debug!(reason = %reason, "claim rejected before verification");
            return Ok(AdmissionResult::rejected(reason));
        }

        let verified = match verify_submission(sub) {
            Ok(v) => v,
            Err(rejection) => {
                tracing::debug!(
                    channel_id = %sub.channel_id.trim(),
                    reason = %rejection.reason,
                    "claim failed verification"
                );
                return Ok(AdmissionResult::rejected(rejection.reason));
            }
        };

        let device_id = match sub.device_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(DeviceId::new(raw)?),
            _ => None,
        };

        let _state = self.state_locks.lock(&verified.channel_id).await;

        let mut channel = self.channels.get_or_unknown(&verified.channel_id)?;
        let cap = self.registry.exposure_cap_for(device_id.as_ref())?;

        if let Err(reason) = check_admission(&channel, verified.amount, cap) {
            tracing::debug!(
                channel_id = %verified.channel_id,
                amount = verified.amount,
                last_seen = channel.last_seen_amount,
                last_settled = channel.last_settled_amount,
                cap,
                reason = %reason,
                "claim rejected"
            );
            return Ok(AdmissionResult::rejected(reason));
        }

        let claim = Claim {
            channel_id: verified.channel_id,
            amount: verified.amount,
            signature: verified.signature,
            public_key: verified.public_key,
            device_id,
            received_at: Utc::now(),
        };

        channel.last_seen_amount = claim.amount;
        self.channels.put(&channel)?;
        self.queue.put(&claim)?;
        self.advance(&claim.channel_id, ClaimEvent::Admitted)?;

        tracing::info!(
            channel_id = %claim.channel_id,
            amount = claim.amount,
            unsettled = channel.unsettled(),
            cap,
            "claim admitted"
        );
        Ok(AdmissionResult::accepted())
    }

    // ---- Settlement ----

    /// Settle the queued claim of `channel_id`, or the largest queued claim
    /// across all channels when no channel is named.
    ///
    /// On failure the claim stays queued and no local state changes.
    pub async fn settle(&self, channel_id: Option<&str>) -> Result<SettlementResult, SettlementError> {
        let named = match channel_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match ChannelId::parse(raw) {
                Ok(id) => Some(id),
                Err(_) => return Ok(SettlementResult::failed(ErrorKind::NotFound, None)),
            },
            None => None,
        };
        let missing = if named.is_some() {
            ErrorKind::NotFound
        } else {
            ErrorKind::NoClaims
        };

        let channel_id = match named {
            Some(id) => id,
            None => match self.queue.largest()? {
                Some(claim) => claim.channel_id,
                None => return Ok(SettlementResult::failed(ErrorKind::NoClaims, None)),
            },
        };

        let _settling = self.settle_locks.lock(&channel_id).await;

        let claim = {
            let _state = self.state_locks.lock(&channel_id).await;
            let claim = match (self.channels.get(&channel_id)?, self.queue.get(&channel_id)?) {
                (Some(_), Some(claim)) => claim,
                _ => return Ok(SettlementResult::failed(missing, None)),
            };
            self.advance(&channel_id, ClaimEvent::SubmissionStarted)?;
            claim
        };

        let outcome = self.submit(&claim).await;

        let _state = self.state_locks.lock(&channel_id).await;
        match outcome {
            Ok(settled) => match self.record_settlement(&claim, &settled) {
                Ok(receipt) => {
                    self.advance(&channel_id, ClaimEvent::SubmissionConfirmed)?;
                    if self.queue.get(&channel_id)?.is_some() {
                        self.advance(&channel_id, ClaimEvent::Admitted)?;
                    }
                    tracing::info!(
                        channel_id = %channel_id,
                        amount = claim.amount,
                        tx_hash = %receipt.transaction_hash,
                        simulated = receipt.simulated,
                        "claim settled"
                    );
                    Ok(SettlementResult::settled(settled.tx_hash, settled.simulated))
                }
                Err(e) => {
                    self.requeue(&channel_id)?;
                    Err(e)
                }
            },
            Err(detail) => {
                self.requeue(&channel_id)?;
                tracing::warn!(
                    channel_id = %channel_id,
                    amount = claim.amount,
                    error = %detail,
                    "settlement submission failed"
                );
                Ok(SettlementResult::failed(ErrorKind::XrplSubmitError, Some(detail)))
            }
        }
    }

    async fn submit(&self, claim: &Claim) -> Result<Settled, String> {
        let account = match (self.config.effective_mode(), self.config.merchant_address.as_deref()) {
            (SettlementMode::Live, Some(account)) => account,
            _ => {
                return Ok(Settled {
                    tx_hash: simulated_tx_hash(&claim.channel_id, claim.amount),
                    ledger_index: 0,
                    simulated: true,
                })
            }
        };

        let tx = SettlementTx::for_claim(account, claim);
        let outcome = self.ledger.submit_claim(&tx).await.map_err(|e| e.to_string())?;
        match outcome.verdict() {
            SubmitVerdict::Settled {
                tx_hash,
                ledger_index,
            } => Ok(Settled {
                tx_hash,
                ledger_index,
                simulated: false,
            }),
            SubmitVerdict::Failed { detail } => Err(detail),
        }
    }

    fn record_settlement(&self, claim: &Claim, settled: &Settled) -> Result<Receipt, SettlementError> {
        let mut channel = self.channels.get_or_unknown(&claim.channel_id)?;
        channel.last_settled_amount = channel.last_settled_amount.max(claim.amount);
        channel.last_seen_amount = channel.last_seen_amount.max(channel.last_settled_amount);
        self.channels.put(&channel)?;

        let receipt = self.receipts.append(
            &claim.channel_id,
            &settled.tx_hash,
            claim.amount,
            settled.ledger_index,
            settled.simulated,
        )?;
        // A newer claim admitted during submission stays queued.
        self.queue.remove_if_amount(&claim.channel_id, claim.amount)?;
        Ok(receipt)
    }

    fn requeue(&self, channel_id: &ChannelId) -> Result<(), SettlementError> {
        self.advance(channel_id, ClaimEvent::SubmissionFailed)?;
        self.advance(channel_id, ClaimEvent::Retry)?;
        Ok(())
    }

    // ---- Queries ----

    /// Receipts most-recent-first. An unparseable channel filter matches nothing.
    pub fn list_receipts(&self, channel_id: Option<&str>) -> Result<Vec<Receipt>, SettlementError> {
        match channel_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match ChannelId::parse(raw) {
                Ok(id) => Ok(self.receipts.list(Some(&id))?),
                Err(_) => Ok(Vec::new()),
            },
            None => Ok(self.receipts.list(None)?),
        }
    }

    /// Passthrough to the ledger client's entry lookup.
    pub async fn inspect_channel(&self, channel_id: &str) -> Result<serde_json::Value, SettlementError> {
        if channel_id.trim().is_empty() {
            return Err(CoreError::MissingField("channel_id".into()).into());
        }
        let id = ChannelId::parse(channel_id)?;
        Ok(self.ledger.ledger_entry(&id).await?)
    }

    pub fn channel_status(&self, channel_id: &str) -> Result<ChannelStatus, SettlementError> {
        let id = ChannelId::parse(channel_id)?;
        let channel = self
            .channels
            .get(&id)?
            .ok_or_else(|| SettlementError::NotFound(id.to_string()))?;
        Ok(ChannelStatus {
            state: self.current_state(&id)?,
            queued_claim: self.queue.get(&id)?,
            channel,
        })
    }

    /// Queued claims ordered by channel id.
    pub fn queued_claims(&self) -> Result<Vec<Claim>, SettlementError> {
        Ok(self.queue.list()?)
    }

    // ---- State machine ----

    fn current_state(&self, channel_id: &ChannelId) -> Result<ClaimState, StoreError> {
        if let Some(state) = self.states.get(channel_id) {
            return Ok(*state);
        }
        Ok(if self.queue.get(channel_id)?.is_some() {
            ClaimState::Queued
        } else {
            ClaimState::Idle
        })
    }

    fn advance(&self, channel_id: &ChannelId, event: ClaimEvent) -> Result<ClaimState, SettlementError> {
        let current = self.current_state(channel_id)?;
        let next = ClaimStateMachine::transition(current, event)?;
        self.states.insert(channel_id.clone(), next);
        Ok(next)
    }
}
