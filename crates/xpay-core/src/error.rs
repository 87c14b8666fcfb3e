use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state_machine::ClaimState;

/// Caller-facing failure reasons. The serialized form is the wire `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BadRequest,
    BadChannel,
    BadAmount,
    BadSignatureHex,
    BadPubkeyHex,
    EncodeError,
    VerifyException,
    BadSignature,
    StaleOrLowerAmount,
    ExposureCapExceeded,
    NoClaims,
    NotFound,
    XrplSubmitError,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::BadChannel => "bad_channel",
            Self::BadAmount => "bad_amount",
            Self::BadSignatureHex => "bad_signature_hex",
            Self::BadPubkeyHex => "bad_pubkey_hex",
            Self::EncodeError => "encode_error",
            Self::VerifyException => "verify_exception",
            Self::BadSignature => "bad_signature",
            Self::StaleOrLowerAmount => "stale_or_lower_amount",
            Self::ExposureCapExceeded => "exposure_cap_exceeded",
            Self::NoClaims => "no_claims",
            Self::NotFound => "not_found",
            Self::XrplSubmitError => "xrpl_submit_error",
            Self::Unauthorized => "unauthorized",
            Self::Internal => "internal",
        }
    }

    /// Whether this reason comes from the claim verifier.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::BadChannel
                | Self::BadAmount
                | Self::BadSignatureHex
                | Self::BadPubkeyHex
                | Self::EncodeError
                | Self::VerifyException
                | Self::BadSignature
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid claim state transition from {from} to {to}")]
    InvalidStateTransition { from: ClaimState, to: ClaimState },

    #[error("invalid channel id: {0}")]
    InvalidChannelId(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStateTransition { .. } => ErrorKind::Internal,
            Self::InvalidChannelId(_) => ErrorKind::BadChannel,
            Self::InvalidAmount(_) => ErrorKind::BadAmount,
            Self::MissingField(_) | Self::ValidationError(_) => ErrorKind::BadRequest,
        }
    }
}
