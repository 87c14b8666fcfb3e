use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use xpay_core::ChannelId;

type LockMap = DashMap<ChannelId, Arc<Mutex<()>>>;

/// One async mutex per channel id. Unrelated channels never contend.
///
/// An entry lives only while someone holds or waits on it; the last guard
/// to drop removes it.
#[derive(Default)]
pub struct ChannelLocks {
    locks: Arc<LockMap>,
}

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, channel_id: &ChannelId) -> ChannelGuard {
        let mutex = self.locks.entry(channel_id.clone()).or_default().clone();
        let guard = mutex.lock_owned().await;
        ChannelGuard {
            guard: Some(guard),
            channel_id: channel_id.clone(),
            locks: self.locks.clone(),
        }
    }

    /// Channels with a live entry.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Held lock on one channel.
pub struct ChannelGuard {
    guard: Option<OwnedMutexGuard<()>>,
    channel_id: ChannelId,
    locks: Arc<LockMap>,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Clones are only taken under the shard lock, so a count of one
        // means nobody else holds or waits on this mutex.
        self.locks
            .remove_if(&self.channel_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
