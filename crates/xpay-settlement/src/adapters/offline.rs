use async_trait::async_trait;
use xpay_core::{ChannelId, SettlementTx};

use crate::error::LedgerClientError;
use crate::traits::{LedgerClient, SubmitOutcome};

/// Ledger client for deployments with no ledger access.
///
/// Every call fails, so live settlement attempts leave the claim queued.
#[derive(Debug, Default, Clone)]
pub struct OfflineLedger;

impl OfflineLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LedgerClient for OfflineLedger {
    async fn submit_claim(&self, tx: &SettlementTx) -> Result<SubmitOutcome, LedgerClientError> {
        Err(LedgerClientError::Unavailable(format!(
            "cannot submit claim on channel {}: no ledger configured",
            tx.channel
        )))
    }

    async fn ledger_entry(&self, channel_id: &ChannelId) -> Result<serde_json::Value, LedgerClientError> {
        Err(LedgerClientError::Unavailable(format!(
            "cannot look up channel {}: no ledger configured",
            channel_id
        )))
    }

    fn adapter_id(&self) -> &str {
        "offline"
    }
}
