//! HTTP API server for the XPay node.
//!
//! JSON endpoints for claim verification, queueing and settlement, device
//! registration, receipts and channel inspection. Everything except
//! `/health` and `/claims/verify` goes through the configured authorizer.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use xpay_core::{
    AdmissionResult, ClaimSubmission, Device, Drops, ErrorKind, Receipt, RoutingTag,
    SettlementResult, VerificationResult,
};
use xpay_settlement::{ChannelStatus, SettlementError};

use crate::auth::bearer_token;
use crate::state::NodeState;

// --- Request types ---

/// Claim fields as devices send them.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ClaimRequest {
    pub channel_id: String,
    /// Decimal drops, as a JSON number or string.
    #[serde(alias = "amount")]
    pub amount_drops: serde_json::Value,
    pub signature: String,
    #[serde(alias = "public_key")]
    pub pubkey: String,
    pub device_id: Option<String>,
}

impl ClaimRequest {
    pub fn into_submission(self) -> ClaimSubmission {
        let amount = match &self.amount_drops {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => number_text(n),
            _ => String::new(),
        };
        ClaimSubmission {
            channel_id: self.channel_id,
            amount,
            signature: self.signature,
            public_key: self.pubkey,
            device_id: self.device_id,
        }
    }
}

/// Integral numbers are written as plain digits, including exponent forms
/// and values past `u64::MAX`, so they reach the amount check as integers.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_u64() || n.is_i64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SettleRequest {
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
    pub exposure_cap_drops: Option<Drops>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelQuery {
    pub channel_id: Option<String>,
}

// --- Response types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub auth: String,
    pub settlement_mode: String,
    pub ledger_adapter: String,
    pub default_exposure_cap_drops: Drops,
    pub rpc_url: Option<String>,
    pub merchant_address: Option<String>,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettleResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SettlementResult> for SettleResponse {
    fn from(r: SettlementResult) -> Self {
        Self {
            ok: r.ok,
            tx_hash: r.transaction_hash,
            simulated: r.simulated,
            reason: r.reason,
            error: r.error,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptView {
    pub channel_id: String,
    pub tx_hash: String,
    pub amount_drops: Drops,
    pub ledger_index: u64,
    pub settled_at: DateTime<Utc>,
    pub simulated: bool,
}

impl From<Receipt> for ReceiptView {
    fn from(r: Receipt) -> Self {
        Self {
            channel_id: r.channel_id.to_string(),
            tx_hash: r.transaction_hash,
            amount_drops: r.amount,
            ledger_index: r.ledger_index,
            settled_at: r.settled_at,
            simulated: r.simulated,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptsResponse {
    pub receipts: Vec<ReceiptView>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceView {
    pub device_id: String,
    pub routing_tag: RoutingTag,
    pub exposure_cap_drops: Drops,
    pub registered_at: DateTime<Utc>,
}

impl From<Device> for DeviceView {
    fn from(d: Device) -> Self {
        Self {
            device_id: d.device_id.to_string(),
            routing_tag: d.routing_tag,
            exposure_cap_drops: d.exposure_cap,
            registered_at: d.registered_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DevicesResponse {
    pub devices: Vec<DeviceView>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a caller-facing reason.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest
        | ErrorKind::BadChannel
        | ErrorKind::BadAmount
        | ErrorKind::BadSignatureHex
        | ErrorKind::BadPubkeyHex
        | ErrorKind::EncodeError
        | ErrorKind::VerifyException
        | ErrorKind::BadSignature => StatusCode::BAD_REQUEST,
        ErrorKind::StaleOrLowerAmount => StatusCode::CONFLICT,
        ErrorKind::ExposureCapExceeded => StatusCode::PAYMENT_REQUIRED,
        // Settlement reports these in the body.
        ErrorKind::NoClaims | ErrorKind::NotFound => StatusCode::OK,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::XrplSubmitError | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(kind: ErrorKind, detail: Option<String>) -> ApiError {
    (
        status_for(kind),
        Json(ErrorResponse {
            ok: false,
            error: kind,
            detail,
        }),
    )
}

fn engine_error(e: SettlementError) -> ApiError {
    let kind = e.kind();
    if kind == ErrorKind::Internal {
        tracing::error!(error = %e, "request failed");
    }
    api_error(kind, Some(e.to_string()))
}

fn authorize(state: &NodeState, headers: &HeaderMap) -> Result<(), ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.authorizer.authorize(bearer_token(header)).map_err(|e| {
        tracing::debug!(error = %e, "request unauthorized");
        api_error(ErrorKind::Unauthorized, Some(e.to_string()))
    })
}

/// Decode a JSON body; an empty body means all defaults.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| api_error(ErrorKind::BadRequest, Some(format!("invalid JSON body: {}", e))))
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<NodeState>>) -> Json<HealthResponse> {
    let config = state.engine.config();
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.engine.store_backend().to_string(),
        auth: state.authorizer.mode().to_string(),
        settlement_mode: config.effective_mode().to_string(),
        ledger_adapter: state.engine.ledger_adapter().to_string(),
        default_exposure_cap_drops: config.default_exposure_cap,
        rpc_url: state.rpc_url.clone(),
        merchant_address: config.merchant_address.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_verify(
    State(state): State<Arc<NodeState>>,
    body: Bytes,
) -> Result<Json<VerificationResult>, ApiError> {
    let req: ClaimRequest = parse_body(&body)?;
    Ok(Json(state.engine.verify(&req.into_submission())))
}

async fn handle_queue(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<AdmissionResult>), ApiError> {
    authorize(&state, &headers)?;
    let req: ClaimRequest = parse_body(&body)?;
    let result = state
        .engine
        .queue_claim(&req.into_submission())
        .await
        .map_err(engine_error)?;
    let status = result.reason.map_or(StatusCode::OK, status_for);
    Ok((status, Json(result)))
}

async fn handle_settle(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SettleResponse>), ApiError> {
    authorize(&state, &headers)?;
    let req: SettleRequest = parse_body(&body)?;
    let result = state
        .engine
        .settle(req.channel_id.as_deref())
        .await
        .map_err(engine_error)?;
    let status = result.reason.map_or(StatusCode::OK, status_for);
    Ok((status, Json(result.into())))
}

async fn handle_receipts(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Query(query): Query<ChannelQuery>,
) -> Result<Json<ReceiptsResponse>, ApiError> {
    authorize(&state, &headers)?;
    let receipts: Vec<ReceiptView> = state
        .engine
        .list_receipts(query.channel_id.as_deref())
        .map_err(engine_error)?
        .into_iter()
        .map(ReceiptView::from)
        .collect();
    let count = receipts.len();
    Ok(Json(ReceiptsResponse { receipts, count }))
}

async fn handle_register_device(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DeviceView>, ApiError> {
    authorize(&state, &headers)?;
    let req: RegisterDeviceRequest = parse_body(&body)?;
    let device = state
        .engine
        .register_device(&req.device_id, req.exposure_cap_drops)
        .map_err(engine_error)?;
    Ok(Json(device.into()))
}

async fn handle_devices(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
) -> Result<Json<DevicesResponse>, ApiError> {
    authorize(&state, &headers)?;
    let devices: Vec<DeviceView> = state
        .engine
        .list_devices()
        .map_err(engine_error)?
        .into_iter()
        .map(DeviceView::from)
        .collect();
    let count = devices.len();
    Ok(Json(DevicesResponse { devices, count }))
}

async fn handle_inspect(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Query(query): Query<ChannelQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let channel_id = query.channel_id.unwrap_or_default();
    let entry = state
        .engine
        .inspect_channel(&channel_id)
        .await
        .map_err(engine_error)?;
    Ok(Json(entry))
}

async fn handle_channel(
    State(state): State<Arc<NodeState>>,
    headers: HeaderMap,
    Path(channel_id): Path<String>,
) -> Result<Json<ChannelStatus>, ApiError> {
    authorize(&state, &headers)?;
    match state.engine.channel_status(&channel_id) {
        Ok(status) => Ok(Json(status)),
        Err(SettlementError::NotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                ok: false,
                error: ErrorKind::NotFound,
                detail: Some(id),
            }),
        )),
        Err(e) => Err(engine_error(e)),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/claims/verify", post(handle_verify))
        .route("/claims/queue", post(handle_queue))
        .route("/claims/settle", post(handle_settle))
        .route("/receipts", get(handle_receipts))
        .route("/devices/register", post(handle_register_device))
        .route("/devices", get(handle_devices))
        .route("/channels/inspect", get(handle_inspect))
        .route("/channels/{channel_id}", get(handle_channel))
        .with_state(state)
}

pub async fn start_api_server<F>(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
