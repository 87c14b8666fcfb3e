//! Subcommands and the HTTP client they share.

pub mod health;
pub mod init;
pub mod inspect;
pub mod keygen;
pub mod queue;
pub mod receipts;
pub mod register;
pub mod settle;
pub mod sign;
pub mod verify;

use anyhow::{anyhow, bail, Context};
use clap::{Args, ValueEnum};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use xpay_crypto::KeyScheme;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000";

/// Where the node is and how to authenticate to it.
#[derive(Args, Debug, Clone)]
pub struct NodeArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token for protected endpoints.
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeArg {
    Ed25519,
    Secp256k1,
}

impl From<SchemeArg> for KeyScheme {
    fn from(s: SchemeArg) -> Self {
        match s {
            SchemeArg::Ed25519 => KeyScheme::Ed25519,
            SchemeArg::Secp256k1 => KeyScheme::Secp256k1,
        }
    }
}

/// A claim given either as JSON (inline or a file, e.g. `xpay sign` output)
/// or field by field.
#[derive(Args, Debug, Clone, Default)]
pub struct ClaimArgs {
    /// Claim JSON, inline or a path to a file.
    #[arg(long, conflicts_with_all = ["channel_id", "amount", "signature", "pubkey"])]
    pub claim: Option<String>,

    /// Channel id (64 hex chars).
    #[arg(long)]
    pub channel_id: Option<String>,

    /// Cumulative amount in drops.
    #[arg(long)]
    pub amount: Option<String>,

    /// Claim signature (hex).
    #[arg(long)]
    pub signature: Option<String>,

    /// Channel public key (hex, 33 bytes).
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Registered device submitting the claim.
    #[arg(long)]
    pub device_id: Option<String>,
}

impl ClaimArgs {
    /// Request body for `/claims/verify` and `/claims/queue`.
    pub fn to_body(&self) -> anyhow::Result<Value> {
        let mut body = match &self.claim {
            Some(raw) => {
                let text = if std::path::Path::new(raw).exists() {
                    std::fs::read_to_string(raw).with_context(|| format!("reading {}", raw))?
                } else {
                    raw.clone()
                };
                let value: Value =
                    serde_json::from_str(&text).map_err(|e| anyhow!("invalid claim JSON: {}", e))?;
                if !value.is_object() {
                    bail!("claim JSON must be an object");
                }
                value
            }
            None => json!({
                "channel_id": required(&self.channel_id, "--channel-id")?,
                "amount_drops": required(&self.amount, "--amount")?,
                "signature": required(&self.signature, "--signature")?,
                "pubkey": required(&self.pubkey, "--pubkey")?,
            }),
        };
        if let Some(device_id) = &self.device_id {
            body["device_id"] = json!(device_id);
        }
        Ok(body)
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> anyhow::Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| anyhow!("{} is required unless --claim is given", flag))
}

/// Thin JSON client for the node API.
pub struct NodeClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl NodeClient {
    pub fn new(args: &NodeArgs) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: args.endpoint.trim_end_matches('/').to_string(),
            token: args.token.clone(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<(StatusCode, Value)> {
        let req = self.authorized(self.http.get(self.url(path)).query(query));
        self.send(req).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let req = self.authorized(self.http.post(self.url(path)).json(body));
        self.send(req).await
    }

    async fn send(&self, req: RequestBuilder) -> anyhow::Result<(StatusCode, Value)> {
        let resp = req
            .send()
            .await
            .with_context(|| format!("could not reach node at {} (is xpay-node running?)", self.endpoint))?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%status, body = %text, "node response");
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, body))
    }
}

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the response and turn a non-2xx status into an error.
pub fn report(status: StatusCode, body: &Value) -> anyhow::Result<()> {
    print_json(body)?;
    if status == StatusCode::UNAUTHORIZED {
        bail!("unauthorized (HTTP 401): pass a valid --token");
    }
    if !status.is_success() {
        let reason = body
            .get("reason")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        bail!("request failed (HTTP {}): {}", status, reason);
    }
    Ok(())
}
