use chrono::Utc;
use std::sync::Arc;
use xpay_core::{Device, DeviceId, Drops, RoutingTag};

use crate::counter::PersistentCounter;
use crate::error::{SettlementError, StoreError};
use crate::store::{get_json, put_json, scan_json, Namespace, Store};

const ROUTING_TAG_KEY: &str = "routing_tag";

/// Device registry: device id → routing tag and exposure cap.
pub struct DeviceRegistry {
    store: Arc<dyn Store>,
    tags: PersistentCounter,
    default_cap: Drops,
}

impl DeviceRegistry {
    pub fn new(
        store: Arc<dyn Store>,
        routing_tag_base: RoutingTag,
        default_cap: Drops,
    ) -> Result<Self, StoreError> {
        let tags = PersistentCounter::open(store.clone(), ROUTING_TAG_KEY, routing_tag_base.into())?;
        Ok(Self {
            store,
            tags,
            default_cap,
        })
    }

    /// Register (or re-register) a device.
    ///
    /// Re-registering the same id overwrites the record and assigns a fresh
    /// routing tag.
    pub fn register(&self, device_id: &str, exposure_cap: Option<Drops>) -> Result<Device, SettlementError> {
        let device_id = DeviceId::new(device_id)?;
        let tag = self.tags.next()?;
        let routing_tag = RoutingTag::try_from(tag)
            .map_err(|_| SettlementError::Internal(format!("routing tag {} out of range", tag)))?;

        let device = Device {
            device_id,
            routing_tag,
            exposure_cap: exposure_cap.unwrap_or(self.default_cap),
            registered_at: Utc::now(),
        };
        put_json(self.store.as_ref(), Namespace::Devices, device.device_id.as_str(), &device)?;

        tracing::info!(
            device_id = %device.device_id,
            routing_tag = device.routing_tag,
            exposure_cap = device.exposure_cap,
            "device registered"
        );
        Ok(device)
    }

    pub fn get(&self, device_id: &DeviceId) -> Result<Option<Device>, StoreError> {
        get_json(self.store.as_ref(), Namespace::Devices, device_id.as_str())
    }

    /// All devices, ordered by device id.
    pub fn list(&self) -> Result<Vec<Device>, StoreError> {
        scan_json(self.store.as_ref(), Namespace::Devices)
    }

    /// Cap for a claim: the device's own cap when it is registered, the
    /// system default otherwise.
    pub fn exposure_cap_for(&self, device_id: Option<&DeviceId>) -> Result<Drops, StoreError> {
        match device_id {
            Some(id) => Ok(self.get(id)?.map_or(self.default_cap, |d| d.exposure_cap)),
            None => Ok(self.default_cap),
        }
    }
}
