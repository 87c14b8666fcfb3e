//! Result records returned by the logical operations.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// Outcome of `VerifyClaim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
            detail: None,
        }
    }

    pub fn invalid(reason: ErrorKind) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Outcome of `QueueClaim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResult {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
}

impl AdmissionResult {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn rejected(reason: ErrorKind) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }
}

/// Outcome of `SettleClaim`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ErrorKind>,
    /// Engine-specific failure detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SettlementResult {
    pub fn settled(transaction_hash: String, simulated: bool) -> Self {
        Self {
            ok: true,
            transaction_hash: Some(transaction_hash),
            simulated: Some(simulated),
            reason: None,
            error: None,
        }
    }

    pub fn failed(reason: ErrorKind, error: Option<String>) -> Self {
        Self {
            ok: false,
            transaction_hash: None,
            simulated: None,
            reason: Some(reason),
            error,
        }
    }
}
