use std::sync::Arc;
use xpay_core::{ChannelId, Claim, Drops};

use crate::error::StoreError;
use crate::store::{get_json, put_json, scan_json, Namespace, Store};

/// Pending claims, at most one per channel.
pub struct ClaimQueue {
    store: Arc<dyn Store>,
}

impl ClaimQueue {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn get(&self, channel_id: &ChannelId) -> Result<Option<Claim>, StoreError> {
        get_json(self.store.as_ref(), Namespace::Queue, channel_id.as_str())
    }

    /// Queue a claim, replacing whatever was queued for its channel.
    pub fn put(&self, claim: &Claim) -> Result<(), StoreError> {
        put_json(self.store.as_ref(), Namespace::Queue, claim.channel_id.as_str(), claim)
    }

    pub fn remove(&self, channel_id: &ChannelId) -> Result<(), StoreError> {
        self.store.delete(Namespace::Queue, channel_id.as_str())
    }

    /// Remove the queued claim only if it is still the one for `amount`.
    ///
    /// Returns whether an entry was removed.
    pub fn remove_if_amount(&self, channel_id: &ChannelId, amount: Drops) -> Result<bool, StoreError> {
        match self.get(channel_id)? {
            Some(claim) if claim.amount == amount => {
                self.remove(channel_id)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// All queued claims, ordered by channel id.
    pub fn list(&self) -> Result<Vec<Claim>, StoreError> {
        scan_json(self.store.as_ref(), Namespace::Queue)
    }

    /// The claim with the largest amount across all channels. Ties go to the
    /// lowest channel id.
    pub fn largest(&self) -> Result<Option<Claim>, StoreError> {
        let mut best: Option<Claim> = None;
        for claim in self.list()? {
            if best.as_ref().map_or(true, |b| claim.amount > b.amount) {
                best = Some(claim);
            }
        }
        Ok(best)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.store.scan(Namespace::Queue)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
