pub mod json_rpc;
pub mod offline;

pub use json_rpc::{JsonRpcConfig, JsonRpcLedgerClient};
pub use offline::OfflineLedger;
