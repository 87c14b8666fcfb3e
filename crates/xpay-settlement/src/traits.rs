use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use xpay_core::{ChannelId, SettlementTx};

use crate::error::LedgerClientError;

/// Ledger engine code for an applied, successful transaction.
pub const TES_SUCCESS: &str = "tesSUCCESS";

/// Ledger client interface.
///
/// An implementation owns the merchant signing credential, the network
/// connection and result polling. The engine only hands it a descriptor and
/// reads back the outcome.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Sign the descriptor with the merchant key, submit it and wait for a result.
    async fn submit_claim(&self, tx: &SettlementTx) -> Result<SubmitOutcome, LedgerClientError>;

    /// Fetch the validated on-ledger entry for a channel.
    async fn ledger_entry(&self, channel_id: &ChannelId) -> Result<serde_json::Value, LedgerClientError>;

    /// Return the unique identifier of this adapter (e.g. "xrpl-jsonrpc").
    fn adapter_id(&self) -> &str;
}

/// What the ledger reported for a submitted settlement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    /// Preliminary engine result from submission.
    pub engine_result: Option<String>,
    /// `TransactionResult` from the validated metadata.
    pub meta_result: Option<String>,
    pub tx_hash: Option<String>,
    pub validated: bool,
    pub ledger_index: Option<u64>,
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Classification of a [`SubmitOutcome`]. Exactly one applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitVerdict {
    Settled { tx_hash: String, ledger_index: u64 },
    Failed { detail: String },
}

impl SubmitOutcome {
    /// Any of: engine code success, metadata success, or a validated hash.
    pub fn signals_success(&self) -> bool {
        self.engine_result.as_deref() == Some(TES_SUCCESS)
            || self.meta_result.as_deref() == Some(TES_SUCCESS)
            || (self.tx_hash.is_some() && self.validated)
    }

    pub fn verdict(&self) -> SubmitVerdict {
        if !self.signals_success() {
            let detail = self
                .engine_result
                .clone()
                .or_else(|| self.meta_result.clone())
                .unwrap_or_else(|| "not_validated".to_string());
            return SubmitVerdict::Failed { detail };
        }
        match &self.tx_hash {
            Some(hash) if !hash.is_empty() => SubmitVerdict::Settled {
                tx_hash: hash.clone(),
                ledger_index: self.ledger_index.unwrap_or(0),
            },
            _ => SubmitVerdict::Failed {
                detail: "missing_transaction_hash".to_string(),
            },
        }
    }
}
