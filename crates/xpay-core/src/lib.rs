//! XPay core types, error kinds, engine configuration, and the claim
//! settlement state machine.

pub mod error;
pub mod types;
pub mod results;
pub mod state_machine;
pub mod config;

pub use config::{EngineConfig, SettlementMode, DEFAULT_EXPOSURE_CAP, DEFAULT_ROUTING_TAG_BASE};
pub use error::{CoreError, ErrorKind};
pub use results::{AdmissionResult, SettlementResult, VerificationResult};
pub use state_machine::{ClaimEvent, ClaimState, ClaimStateMachine};
pub use types::{
    parse_drops, Channel, ChannelId, Claim, ClaimSubmission, Device, DeviceId, Drops, Receipt,
    RoutingTag, SettlementTx, PAYMENT_CHANNEL_CLAIM,
};
