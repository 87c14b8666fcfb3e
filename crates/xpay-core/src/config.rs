use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Drops, RoutingTag};

/// Default unsettled exposure allowed per channel, in drops.
pub const DEFAULT_EXPOSURE_CAP: Drops = 1_500_000;

/// First routing tag handed out by the device registry.
pub const DEFAULT_ROUTING_TAG_BASE: RoutingTag = 700_000;

/// How the settlement engine redeems claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettlementMode {
    /// Skip the ledger and synthesize a placeholder transaction hash.
    #[default]
    Simulated,
    /// Submit through the configured ledger client.
    Live,
}

impl fmt::Display for SettlementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Configuration for the claim pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap applied when a claim names no registered device.
    pub default_exposure_cap: Drops,
    /// First routing tag assigned at registration.
    pub routing_tag_base: RoutingTag,
    /// Settlement mode.
    pub settlement_mode: SettlementMode,
    /// Merchant ledger address used as the settlement `Account`.
    pub merchant_address: Option<String>,
}

impl EngineConfig {
    /// Live submission needs a merchant account; without one the engine
    /// always simulates.
    pub fn effective_mode(&self) -> SettlementMode {
        match (self.settlement_mode, &self.merchant_address) {
            (SettlementMode::Live, Some(_)) => SettlementMode::Live,
            _ => SettlementMode::Simulated,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_exposure_cap: DEFAULT_EXPOSURE_CAP,
            routing_tag_base: DEFAULT_ROUTING_TAG_BASE,
            settlement_mode: SettlementMode::Simulated,
            merchant_address: None,
        }
    }
}
