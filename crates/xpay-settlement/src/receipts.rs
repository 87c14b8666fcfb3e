use chrono::Utc;
use std::sync::Arc;
use xpay_core::{ChannelId, Drops, Receipt};

use crate::counter::PersistentCounter;
use crate::error::StoreError;
use crate::store::{put_json, scan_json, Namespace, Store};

const RECEIPT_SEQ_KEY: &str = "receipt_seq";

/// Append-only record of successful settlements.
///
/// Receipts are keyed by a zero-padded sequence number so a namespace scan
/// yields insertion order.
pub struct ReceiptStore {
    store: Arc<dyn Store>,
    seq: PersistentCounter,
}

impl ReceiptStore {
    pub fn new(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let seq = PersistentCounter::open(store.clone(), RECEIPT_SEQ_KEY, 1)?;
        Ok(Self { store, seq })
    }

    pub fn append(
        &self,
        channel_id: &ChannelId,
        transaction_hash: &str,
        amount: Drops,
        ledger_index: u64,
        simulated: bool,
    ) -> Result<Receipt, StoreError> {
        let receipt = Receipt {
            sequence: self.seq.next()?,
            channel_id: channel_id.clone(),
            transaction_hash: transaction_hash.to_string(),
            amount,
            ledger_index,
            settled_at: Utc::now(),
            simulated,
        };
        put_json(
            self.store.as_ref(),
            Namespace::Receipts,
            &format!("{:020}", receipt.sequence),
            &receipt,
        )?;
        Ok(receipt)
    }

    /// Receipts most-recent-first, optionally limited to one channel.
    pub fn list(&self, channel_id: Option<&ChannelId>) -> Result<Vec<Receipt>, StoreError> {
        let mut receipts: Vec<Receipt> = scan_json(self.store.as_ref(), Namespace::Receipts)?;
        if let Some(id) = channel_id {
            receipts.retain(|r| &r.channel_id == id);
        }
        receipts.reverse();
        Ok(receipts)
    }
}
