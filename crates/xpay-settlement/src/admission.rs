//! Admission rules applied after verification, under the channel lock.

use xpay_core::{Channel, ClaimSubmission, Drops, ErrorKind};

/// Reject structurally unusable submissions before any verification work:
/// a missing channel id, or an amount that is not a finite number.
pub fn precheck(sub: &ClaimSubmission) -> Result<(), ErrorKind> {
    if sub.channel_id.trim().is_empty() {
        return Err(ErrorKind::BadRequest);
    }
    match sub.amount.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(()),
        _ => Err(ErrorKind::BadRequest),
    }
}

/// Monotonicity and exposure checks for a verified `amount` on `channel`.
pub fn check_admission(channel: &Channel, amount: Drops, cap: Drops) -> Result<(), ErrorKind> {
    if amount <= channel.last_seen_amount {
        return Err(ErrorKind::StaleOrLowerAmount);
    }
    if amount.saturating_sub(channel.last_settled_amount) > cap {
        return Err(ErrorKind::ExposureCapExceeded);
    }
    Ok(())
}
