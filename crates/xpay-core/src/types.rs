use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Value in drops, the ledger's smallest native unit.
pub type Drops = u64;

/// Numeric sub-identifier routing ledger payments to a device.
pub type RoutingTag = u32;

/// Payment channel identifier: 32 bytes, carried as 64 upper-case hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelId(String);

impl ChannelId {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 64;

    /// Parse a channel id, accepting either hex case and surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.len() != Self::HEX_LEN || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidChannelId(format!(
                "expected {} hex characters, got {:?}",
                Self::HEX_LEN,
                trimmed
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The canonical upper-case hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 32 raw channel bytes.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // Only constructed from validated hex, so decoding cannot fail.
        let _ = hex::decode_to_slice(&self.0, &mut out);
        out
    }
}

impl FromStr for ChannelId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChannelId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChannelId> for String {
    fn from(id: ChannelId) -> Self {
        id.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a registered point-of-sale device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device id. Must be non-empty after trimming.
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::MissingField("device_id".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DeviceId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a cumulative drops amount: a non-negative base-10 integer string.
pub fn parse_drops(raw: &str) -> Result<Drops, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CoreError::InvalidAmount(format!(
            "expected a non-negative integer, got {:?}",
            trimmed
        )));
    }
    trimmed
        .parse::<Drops>()
        .map_err(|e| CoreError::InvalidAmount(format!("{}: {}", trimmed, e)))
}

/// A registered device and its exposure policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: DeviceId,
    /// Sequentially assigned destination tag.
    pub routing_tag: RoutingTag,
    /// Maximum unsettled drops permitted on this device's channel.
    pub exposure_cap: Drops,
    pub registered_at: DateTime<Utc>,
}

/// Local ledger state of a payment channel.
///
/// `last_settled_amount <= last_seen_amount` holds at all times and both
/// values only ever increase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_id: ChannelId,
    pub dest_address: String,
    pub dest_tag: RoutingTag,
    /// Highest cumulative amount admitted so far.
    pub last_seen_amount: Drops,
    /// Highest cumulative amount settled on-ledger.
    pub last_settled_amount: Drops,
}

impl Channel {
    /// A channel first seen through a claim; destination details are unknown.
    pub fn unknown(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            dest_address: "(unknown)".into(),
            dest_tag: 0,
            last_seen_amount: 0,
            last_settled_amount: 0,
        }
    }

    /// Claimed-but-unsettled drops.
    pub fn unsettled(&self) -> Drops {
        self.last_seen_amount.saturating_sub(self.last_settled_amount)
    }
}

/// Untrusted claim fields exactly as they arrived from a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub channel_id: String,
    pub amount: String,
    pub signature: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// A verified, admitted claim waiting in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub channel_id: ChannelId,
    /// Cumulative drops authorized on the channel, not a delta.
    pub amount: Drops,
    pub signature: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    pub received_at: DateTime<Utc>,
}

/// Proof that a claim was settled on-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Insertion order within the receipt store.
    pub sequence: u64,
    pub channel_id: ChannelId,
    pub transaction_hash: String,
    pub amount: Drops,
    pub ledger_index: u64,
    pub settled_at: DateTime<Utc>,
    #[serde(default)]
    pub simulated: bool,
}

/// Ledger transaction type used to redeem a channel claim.
pub const PAYMENT_CHANNEL_CLAIM: &str = "PaymentChannelClaim";

/// Settlement transaction descriptor handed to the ledger client.
///
/// `amount` and `balance` are the same cumulative value: the signed claim
/// already expresses the total delivered over the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettlementTx {
    pub transaction_type: String,
    /// Merchant's ledger address (the channel destination).
    pub account: String,
    pub channel: ChannelId,
    pub amount: String,
    pub balance: String,
    /// Must match the public key recorded on the channel.
    pub public_key: String,
    pub signature: String,
}

impl SettlementTx {
    /// Build the descriptor that redeems `claim` into `account`.
    pub fn for_claim(account: &str, claim: &Claim) -> Self {
        let cumulative = claim.amount.to_string();
        Self {
            transaction_type: PAYMENT_CHANNEL_CLAIM.to_string(),
            account: account.to_string(),
            channel: claim.channel_id.clone(),
            amount: cumulative.clone(),
            balance: cumulative,
            public_key: claim.public_key.to_ascii_uppercase(),
            signature: claim.signature.to_ascii_uppercase(),
        }
    }
}
