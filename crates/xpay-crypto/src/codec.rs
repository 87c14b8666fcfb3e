//! Canonical signing payload for payment channel claims.
//!
//! Layout: `CLM\0` (4 bytes) || channel id (32 bytes) || amount in drops
//! (big-endian u64, 8 bytes).

use xpay_core::{ChannelId, Drops};

use crate::error::CryptoError;

/// Hash prefix the ledger reserves for channel claims.
pub const CLAIM_PREFIX: [u8; 4] = [b'C', b'L', b'M', 0x00];

/// Total length of an encoded claim payload.
pub const CLAIM_PAYLOAD_LEN: usize = 44;

/// Encode a claim from its raw wire fields.
///
/// `channel_hex` must be 32 bytes of hex and `amount` a decimal string that
/// fits the ledger's 64-bit amount field.
pub fn encode_for_signing_claim(channel_hex: &str, amount: &str) -> Result<Vec<u8>, CryptoError> {
    let channel = hex::decode(channel_hex.trim())
        .map_err(|e| CryptoError::Encoding(format!("channel is not hex: {}", e)))?;
    if channel.len() != 32 {
        return Err(CryptoError::Encoding(format!(
            "channel must be 32 bytes, got {}",
            channel.len()
        )));
    }
    let amount: u64 = amount
        .trim()
        .parse()
        .map_err(|e| CryptoError::Encoding(format!("amount {:?} is not a u64: {}", amount, e)))?;

    let mut payload = Vec::with_capacity(CLAIM_PAYLOAD_LEN);
    payload.extend_from_slice(&CLAIM_PREFIX);
    payload.extend_from_slice(&channel);
    payload.extend_from_slice(&amount.to_be_bytes());
    Ok(payload)
}

/// Encode an already validated claim.
pub fn encode_claim(channel_id: &ChannelId, amount: Drops) -> Vec<u8> {
    let mut payload = Vec::with_capacity(CLAIM_PAYLOAD_LEN);
    payload.extend_from_slice(&CLAIM_PREFIX);
    payload.extend_from_slice(&channel_id.to_bytes());
    payload.extend_from_slice(&amount.to_be_bytes());
    payload
}
