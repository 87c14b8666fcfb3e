//! Shared node state for the HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use xpay_settlement::SettlementEngine;

use crate::auth::Authorizer;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct NodeState {
    pub engine: Arc<SettlementEngine>,
    pub authorizer: Arc<dyn Authorizer>,
    /// Configured JSON-RPC endpoint, for health reporting.
    pub rpc_url: Option<String>,
    /// When the node started.
    pub start_time: Instant,
}

impl NodeState {
    pub fn new(
        engine: Arc<SettlementEngine>,
        authorizer: Arc<dyn Authorizer>,
        rpc_url: Option<String>,
    ) -> Self {
        Self {
            engine,
            authorizer,
            rpc_url,
            start_time: Instant::now(),
        }
    }
}
