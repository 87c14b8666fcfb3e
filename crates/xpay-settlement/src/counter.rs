use std::sync::{Arc, Mutex};

use crate::error::StoreError;
use crate::store::{get_json, put_json, Namespace, Store};

/// Monotonic sequence persisted in the `Meta` namespace.
///
/// The next value is written back before it is handed out, so values stay
/// unique across restarts.
pub struct PersistentCounter {
    store: Arc<dyn Store>,
    key: &'static str,
    next: Mutex<u64>,
}

impl PersistentCounter {
    /// Open the counter, resuming from the stored value or starting at `base`.
    pub fn open(store: Arc<dyn Store>, key: &'static str, base: u64) -> Result<Self, StoreError> {
        let stored: Option<u64> = get_json(store.as_ref(), Namespace::Meta, key)?;
        let next = stored.map_or(base, |n| n.max(base));
        tracing::debug!(counter = key, next, "opened counter");
        Ok(Self {
            store,
            key,
            next: Mutex::new(next),
        })
    }

    /// Take the next value.
    pub fn next(&self) -> Result<u64, StoreError> {
        let mut guard = self.next.lock().unwrap_or_else(|e| e.into_inner());
        let value = *guard;
        let following = value
            .checked_add(1)
            .ok_or(StoreError::CounterExhausted(self.key))?;
        put_json(self.store.as_ref(), Namespace::Meta, self.key, &following)?;
        *guard = following;
        Ok(value)
    }
}
