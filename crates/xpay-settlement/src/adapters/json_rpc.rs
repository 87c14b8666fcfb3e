use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use xpay_core::{ChannelId, SettlementTx};
use zeroize::Zeroizing;

use crate::error::LedgerClientError;
use crate::traits::{LedgerClient, SubmitOutcome, TES_SUCCESS};

/// Connection settings for a rippled JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    pub rpc_url: String,
    pub poll_interval: Duration,
    pub max_polls: u32,
    pub request_timeout: Duration,
}

impl Default for JsonRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://s.altnet.rippletest.net:51234".to_string(),
            poll_interval: Duration::from_millis(1000),
            max_polls: 20,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Ledger client that signs and submits through a trusted rippled node.
///
/// The merchant secret goes to the node in the `submit` call (sign-and-submit
/// mode), so the endpoint must be one the merchant controls.
pub struct JsonRpcLedgerClient {
    config: JsonRpcConfig,
    secret: Zeroizing<String>,
    http: reqwest::Client,
}

impl JsonRpcLedgerClient {
    pub fn new(config: JsonRpcConfig, merchant_secret: String) -> Result<Self, LedgerClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LedgerClientError::Transport(e.to_string()))?;
        Ok(Self {
            config,
            secret: Zeroizing::new(merchant_secret),
            http,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.config.rpc_url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerClientError> {
        let body = json!({ "method": method, "params": [params] });
        let resp = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerClientError::Transport(format!("{} request error: {}", method, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LedgerClientError::Transport(format!("{} HTTP {}", method, status)));
        }

        let parsed: Value = resp
            .json()
            .await
            .map_err(|e| LedgerClientError::InvalidResponse(format!("{} parse error: {}", method, e)))?;
        parsed
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerClientError::InvalidResponse(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn submit_claim(&self, tx: &SettlementTx) -> Result<SubmitOutcome, LedgerClientError> {
        let tx_json =
            serde_json::to_value(tx).map_err(|e| LedgerClientError::InvalidResponse(e.to_string()))?;
        let result = self
            .call("submit", json!({ "tx_json": tx_json, "secret": self.secret.as_str() }))
            .await?;
        let mut outcome = parse_submit_result(result)?;

        tracing::debug!(
            channel_id = %tx.channel,
            engine_result = ?outcome.engine_result,
            tx_hash = ?outcome.tx_hash,
            "claim submitted"
        );

        if !worth_polling(outcome.engine_result.as_deref()) {
            return Ok(outcome);
        }
        let Some(hash) = outcome.tx_hash.clone() else {
            return Ok(outcome);
        };

        for _ in 0..self.config.max_polls {
            tokio::time::sleep(self.config.poll_interval).await;
            let result = self.call("tx", json!({ "transaction": hash })).await?;
            if let Some(validated) = parse_tx_result(&result) {
                outcome.meta_result = validated.meta_result;
                outcome.ledger_index = validated.ledger_index;
                outcome.validated = true;
                outcome.raw = result;
                return Ok(outcome);
            }
        }

        if outcome.engine_result.as_deref() == Some(TES_SUCCESS) {
            Ok(outcome)
        } else {
            Err(LedgerClientError::Timeout(hash))
        }
    }

    async fn ledger_entry(&self, channel_id: &ChannelId) -> Result<Value, LedgerClientError> {
        let result = self
            .call(
                "ledger_entry",
                json!({ "index": channel_id.as_str(), "ledger_index": "validated" }),
            )
            .await?;
        match rpc_error(&result) {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    fn adapter_id(&self) -> &str {
        "xrpl-jsonrpc"
    }
}

/// Validation details read from a `tx` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTx {
    pub meta_result: Option<String>,
    pub ledger_index: Option<u64>,
}

/// Interpret the `result` object of a `submit` call.
pub fn parse_submit_result(result: Value) -> Result<SubmitOutcome, LedgerClientError> {
    if let Some(err) = rpc_error(&result) {
        return Err(err);
    }
    Ok(SubmitOutcome {
        engine_result: str_field(&result, &["engine_result"]),
        meta_result: None,
        tx_hash: str_field(&result, &["tx_json", "hash"]),
        validated: false,
        ledger_index: None,
        raw: result,
    })
}

/// Interpret the `result` object of a `tx` call. `None` while the
/// transaction is unknown or not yet in a validated ledger.
pub fn parse_tx_result(result: &Value) -> Option<ValidatedTx> {
    if rpc_error(result).is_some() || !result.get("validated").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    Some(ValidatedTx {
        meta_result: str_field(result, &["meta", "TransactionResult"]),
        ledger_index: result.get("ledger_index").and_then(Value::as_u64),
    })
}

/// Engine codes that can still end up in a validated ledger.
fn worth_polling(engine_result: Option<&str>) -> bool {
    match engine_result {
        Some(code) => code == TES_SUCCESS || code.starts_with("ter"),
        None => false,
    }
}

fn rpc_error(result: &Value) -> Option<LedgerClientError> {
    if result.get("status").and_then(Value::as_str) != Some("error") {
        return None;
    }
    Some(LedgerClientError::Rpc {
        code: str_field(result, &["error"]).unwrap_or_else(|| "unknown".to_string()),
        message: str_field(result, &["error_message"]).unwrap_or_default(),
    })
}

fn str_field(value: &Value, path: &[&str]) -> Option<String> {
    let mut cur = value;
    for key in path {
        cur = cur.get(*key)?;
    }
    cur.as_str().map(String::from)
}
