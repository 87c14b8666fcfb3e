//! XPay Settlement Layer
//!
//! The claim pipeline: verification, exposure-limited admission into a
//! one-claim-per-channel queue, and settlement through a pluggable ledger
//! client, with all state kept behind the [`Store`] abstraction.

pub mod error;
pub mod store;
pub mod counter;
pub mod registry;
pub mod ledger;
pub mod queue;
pub mod receipts;
pub mod locks;
pub mod verifier;
pub mod admission;
pub mod traits;
pub mod engine;
pub mod adapters;

pub use error::{LedgerClientError, SettlementError, StoreError};
pub use store::{MemoryStore, Namespace, Store};
pub use registry::DeviceRegistry;
pub use ledger::ChannelLedger;
pub use queue::ClaimQueue;
pub use receipts::ReceiptStore;
pub use locks::{ChannelGuard, ChannelLocks};
pub use verifier::{verify_claim, verify_submission, Rejection, VerifiedClaim};
pub use traits::{LedgerClient, SubmitOutcome, SubmitVerdict};
pub use engine::{ChannelStatus, SettlementEngine};
pub use adapters::{JsonRpcConfig, JsonRpcLedgerClient, OfflineLedger};
