//! Claim verifier.
//!
//! Checks run in a fixed order and the first failing one decides the
//! reason: channel id, amount syntax, signature hex, public key hex, payload
//! encoding, then the signature itself. Nothing here touches state.

use std::panic::{catch_unwind, AssertUnwindSafe};

use xpay_core::{ChannelId, ClaimSubmission, Drops, ErrorKind, VerificationResult};
use xpay_crypto::{encode_for_signing_claim, verify, CryptoError, PublicKey};

/// Claim fields that passed every verification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaim {
    pub channel_id: ChannelId,
    pub amount: Drops,
    /// Upper-case hex.
    pub signature: String,
    /// Upper-case hex.
    pub public_key: String,
}

/// Why a claim failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: ErrorKind,
    pub detail: Option<String>,
}

impl Rejection {
    fn new(reason: ErrorKind) -> Self {
        Self { reason, detail: None }
    }

    fn with_detail(reason: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: Some(detail.into()),
        }
    }
}

impl From<Rejection> for VerificationResult {
    fn from(r: Rejection) -> Self {
        let result = VerificationResult::invalid(r.reason);
        match r.detail {
            Some(detail) => result.with_detail(detail),
            None => result,
        }
    }
}

/// Verify a claim, returning the parsed fields on success.
pub fn verify_submission(sub: &ClaimSubmission) -> Result<VerifiedClaim, Rejection> {
    let channel_id =
        ChannelId::parse(&sub.channel_id).map_err(|_| Rejection::new(ErrorKind::BadChannel))?;

    let amount = sub.amount.trim();
    if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Rejection::new(ErrorKind::BadAmount));
    }

    let signature = hex_field(&sub.signature).ok_or_else(|| Rejection::new(ErrorKind::BadSignatureHex))?;
    let public_key = hex_field(&sub.public_key).ok_or_else(|| Rejection::new(ErrorKind::BadPubkeyHex))?;

    let payload = encode_for_signing_claim(channel_id.as_str(), amount)
        .map_err(|e| Rejection::with_detail(ErrorKind::EncodeError, e.to_string()))?;

    // Odd-length hex passes the charset check and fails here.
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let signature = decode_field(signature, "signature")?;
        let public_key = decode_field(public_key, "public key")?;
        let key = PublicKey::from_bytes(&public_key)?;
        verify(&payload, &signature, &key).map(|ok| (ok, signature, public_key))
    }));

    let (signature, public_key) = match outcome {
        Ok(Ok((true, signature, public_key))) => (signature, public_key),
        Ok(Ok((false, _, _))) => return Err(Rejection::new(ErrorKind::BadSignature)),
        Ok(Err(e)) => return Err(Rejection::with_detail(ErrorKind::VerifyException, e.to_string())),
        Err(_) => {
            return Err(Rejection::with_detail(
                ErrorKind::VerifyException,
                "verification aborted",
            ))
        }
    };

    // The amount is all digits and fit the 64-bit payload field above.
    let amount: Drops = amount
        .parse()
        .map_err(|_| Rejection::new(ErrorKind::EncodeError))?;

    Ok(VerifiedClaim {
        channel_id,
        amount,
        signature: hex::encode_upper(&signature),
        public_key: hex::encode_upper(&public_key),
    })
}

/// Dry-run verification for callers that only need the verdict.
pub fn verify_claim(sub: &ClaimSubmission) -> VerificationResult {
    match verify_submission(sub) {
        Ok(_) => VerificationResult::valid(),
        Err(rejection) => {
            tracing::debug!(reason = %rejection.reason, "claim failed verification");
            rejection.into()
        }
    }
}

/// Trimmed field if it is non-empty and hex digits only. Length is not checked.
fn hex_field(field: &str) -> Option<&str> {
    let trimmed = field.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed)
}

fn decode_field(field: &str, name: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(field).map_err(|e| CryptoError::InvalidInput(format!("{}: {}", name, e)))
}
