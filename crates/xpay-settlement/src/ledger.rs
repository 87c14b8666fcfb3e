use std::sync::Arc;
use xpay_core::{Channel, ChannelId};

use crate::error::StoreError;
use crate::store::{get_json, put_json, Namespace, Store};

/// Local per-channel state: last seen and last settled cumulative amounts.
pub struct ChannelLedger {
    store: Arc<dyn Store>,
}

impl ChannelLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn get(&self, channel_id: &ChannelId) -> Result<Option<Channel>, StoreError> {
        get_json(self.store.as_ref(), Namespace::Channels, channel_id.as_str())
    }

    /// The stored channel, or a fresh unpersisted record for an unseen one.
    pub fn get_or_unknown(&self, channel_id: &ChannelId) -> Result<Channel, StoreError> {
        Ok(self
            .get(channel_id)?
            .unwrap_or_else(|| Channel::unknown(channel_id.clone())))
    }

    pub fn put(&self, channel: &Channel) -> Result<(), StoreError> {
        put_json(self.store.as_ref(), Namespace::Channels, channel.channel_id.as_str(), channel)
    }
}
