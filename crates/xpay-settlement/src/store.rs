//! Storage abstraction for the claim pipeline.
//!
//! Records are kept as `serde_json` bytes under a namespace and a string
//! key. Scans return entries in ascending key order, which the queue and
//! receipt store rely on for deterministic ordering.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

use crate::error::StoreError;

/// Logical keyspaces. Durable backends map each to its own column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Devices,
    Channels,
    Queue,
    Receipts,
    Meta,
}

impl Namespace {
    pub const ALL: [Namespace; 5] = [
        Namespace::Devices,
        Namespace::Channels,
        Namespace::Queue,
        Namespace::Receipts,
        Namespace::Meta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Channels => "channels",
            Self::Queue => "queue",
            Self::Receipts => "receipts",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-lookup key-value store.
pub trait Store: Send + Sync {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError>;

    /// All entries of a namespace in ascending key order.
    fn scan(&self, ns: Namespace) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

/// Read and decode a JSON record.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn Store,
    ns: Namespace,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(ns, key)? {
        Some(bytes) => decode(ns, key, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Encode and write a JSON record.
pub fn put_json<T: Serialize>(
    store: &dyn Store,
    ns: Namespace,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Serialization {
        namespace: ns.as_str(),
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.put(ns, key, &bytes)
}

/// Decode every record of a namespace, in key order.
pub fn scan_json<T: DeserializeOwned>(store: &dyn Store, ns: Namespace) -> Result<Vec<T>, StoreError> {
    store
        .scan(ns)?
        .into_iter()
        .map(|(key, bytes)| decode(ns, &key, &bytes))
        .collect()
}

fn decode<T: DeserializeOwned>(ns: Namespace, key: &str, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Serialization {
        namespace: ns.as_str(),
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Transient store backed by a concurrent map. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<(Namespace, String), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .entries
            .get(&(ns, key.to_string()))
            .map(|v| v.value().clone()))
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert((ns, key.to_string()), value.to_vec());
        Ok(())
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        self.entries.remove(&(ns, key.to_string()));
        Ok(())
    }

    fn scan(&self, ns: Namespace) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let mut out: Vec<(String, Vec<u8>)> = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == ns)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
