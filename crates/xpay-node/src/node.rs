//! The XPay node orchestrator.
//!
//! Opens the configured store, picks a ledger client, builds the settlement
//! engine and serves the HTTP API until shutdown.

use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use xpay_settlement::{
    JsonRpcLedgerClient, LedgerClient, MemoryStore, OfflineLedger, SettlementEngine, Store,
};

use crate::api::start_api_server;
use crate::auth;
use crate::config::{StorageBackend, StorageConfig, XPayConfig};
use crate::state::NodeState;
use crate::storage::RocksStore;

/// A configured XPay node, ready to serve.
pub struct XPayNode {
    config: XPayConfig,
    state: Arc<NodeState>,
}

impl XPayNode {
    pub fn new(config: XPayConfig) -> Result<Self> {
        let store = open_store(&config.storage)?;
        let ledger = build_ledger(&config)?;
        let engine = SettlementEngine::new(config.engine_config(), store, ledger)
            .context("initializing settlement engine")?;
        let authorizer = auth::from_config(&config.auth);

        tracing::info!(
            store = engine.store_backend(),
            ledger = engine.ledger_adapter(),
            mode = %config.engine_config().effective_mode(),
            auth = authorizer.mode(),
            "XPay node created"
        );

        let state = Arc::new(NodeState::new(
            Arc::new(engine),
            authorizer,
            config.ledger.rpc_url.clone(),
        ));
        Ok(Self { config, state })
    }

    pub fn state(&self) -> Arc<NodeState> {
        self.state.clone()
    }

    /// Serve the API until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self
            .config
            .api_addr()
            .parse()
            .with_context(|| format!("invalid API address {}", self.config.api_addr()))?;
        start_api_server(addr, self.state, shutdown).await
    }
}

fn open_store(config: &StorageConfig) -> Result<Arc<dyn Store>> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory store; state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Rocksdb => {
            let store = RocksStore::open(&config.data_dir)
                .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}

fn build_ledger(config: &XPayConfig) -> Result<Arc<dyn LedgerClient>> {
    match config.json_rpc_config() {
        Some(rpc) => {
            let secret = config.ledger.merchant_secret.clone().unwrap_or_default();
            let client = JsonRpcLedgerClient::new(rpc, secret).context("building JSON-RPC client")?;
            Ok(Arc::new(client))
        }
        None => Ok(Arc::new(OfflineLedger::new())),
    }
}
