//! RocksDB storage backend for the XPay node.

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;

use xpay_settlement::{Namespace, Store, StoreError};

/// RocksDB-backed store, one column family per namespace.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(|e| StoreError::Io(e.to_string()))?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = Namespace::ALL
            .iter()
            .map(|ns| ColumnFamilyDescriptor::new(ns.as_str(), Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors).map_err(io)?;
        tracing::info!(path = %path.display(), "rocksdb store opened");
        Ok(Self { db })
    }
}

fn io(e: rocksdb::Error) -> StoreError {
    StoreError::Io(e.to_string())
}

fn missing_cf(ns: Namespace) -> StoreError {
    StoreError::Io(format!("column family '{}' not found", ns))
}

impl Store for RocksStore {
    fn get(&self, ns: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let cf = self.db.cf_handle(ns.as_str()).ok_or_else(|| missing_cf(ns))?;
        self.db.get_cf(&cf, key.as_bytes()).map_err(io)
    }

    fn put(&self, ns: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let cf = self.db.cf_handle(ns.as_str()).ok_or_else(|| missing_cf(ns))?;
        self.db.put_cf(&cf, key.as_bytes(), value).map_err(io)
    }

    fn delete(&self, ns: Namespace, key: &str) -> Result<(), StoreError> {
        let cf = self.db.cf_handle(ns.as_str()).ok_or_else(|| missing_cf(ns))?;
        self.db.delete_cf(&cf, key.as_bytes()).map_err(io)
    }

    fn scan(&self, ns: Namespace) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let cf = self.db.cf_handle(ns.as_str()).ok_or_else(|| missing_cf(ns))?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item.map_err(io)?;
            let key = String::from_utf8(key.into_vec())
                .map_err(|e| StoreError::Io(format!("non-utf8 key in {}: {}", ns, e)))?;
            out.push((key, value.into_vec()));
        }
        Ok(out)
    }

    fn backend(&self) -> &'static str {
        "rocksdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use xpay_core::{ChannelId, ClaimSubmission, EngineConfig};
    use xpay_crypto::{sign_claim, KeyPair, KeyScheme};
    use xpay_settlement::{OfflineLedger, SettlementEngine};

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("xpay-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_open_storage() {
        let dir = temp_dir();
        let storage = RocksStore::open(&dir);
        assert!(storage.is_ok());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_put_get_delete() {
        let dir = temp_dir();
        let storage = RocksStore::open(&dir).unwrap();

        storage.put(Namespace::Devices, "pos-1", b"device").unwrap();
        assert_eq!(
            storage.get(Namespace::Devices, "pos-1").unwrap(),
            Some(b"device".to_vec())
        );
        assert!(storage.get(Namespace::Channels, "pos-1").unwrap().is_none());

        storage.delete(Namespace::Devices, "pos-1").unwrap();
        assert!(storage.get(Namespace::Devices, "pos-1").unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_scan_in_key_order() {
        let dir = temp_dir();
        let storage = RocksStore::open(&dir).unwrap();

        for key in ["00000000000000000003", "00000000000000000001", "00000000000000000002"] {
            storage.put(Namespace::Receipts, key, key.as_bytes()).unwrap();
        }
        storage.put(Namespace::Meta, "other", b"x").unwrap();

        let keys: Vec<String> = storage
            .scan(Namespace::Receipts)
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec!["00000000000000000001", "00000000000000000002", "00000000000000000003"]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_engine_state_survives_reopen() {
        let dir = temp_dir();
        let channel = "C0FFEE".repeat(10) + "C0FF";
        let kp = KeyPair::from_seed(KeyScheme::Ed25519, &[1u8; 32]).unwrap();
        let id = ChannelId::parse(&channel).unwrap();
        let sub = ClaimSubmission {
            channel_id: channel.clone(),
            amount: "1000".into(),
            signature: sign_claim(&id, 1000, &kp),
            public_key: kp.public_key().to_hex(),
            device_id: None,
        };

        {
            let store = Arc::new(RocksStore::open(&dir).unwrap());
            let engine =
                SettlementEngine::new(EngineConfig::default(), store, Arc::new(OfflineLedger::new())).unwrap();
            engine.register_device("pos-1", None).unwrap();
            assert!(engine.queue_claim(&sub).await.unwrap().accepted);
        }

        let store = Arc::new(RocksStore::open(&dir).unwrap());
        let engine =
            SettlementEngine::new(EngineConfig::default(), store, Arc::new(OfflineLedger::new())).unwrap();

        // Same claim again is now stale; the tag counter resumed.
        assert!(!engine.queue_claim(&sub).await.unwrap().accepted);
        assert_eq!(engine.register_device("pos-2", None).unwrap().routing_tag, 700_001);
        assert!(engine.settle(None).await.unwrap().ok);
        assert_eq!(engine.list_receipts(None).unwrap().len(), 1);

        drop(engine);
        std::fs::remove_dir_all(&dir).ok();
    }
}
