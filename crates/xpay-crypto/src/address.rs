//! Classic ledger address codec (base58check, ripple alphabet).

use crate::error::CryptoError;

/// Version byte of an account id in a classic address.
pub const ACCOUNT_ID_VERSION: u8 = 0x00;

/// Encode a 20-byte account id as a classic `r...` address.
pub fn encode_classic_address(account_id: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(ACCOUNT_ID_VERSION);
    payload.extend_from_slice(account_id);
    bs58::encode(payload)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check()
        .into_string()
}

/// Decode a classic address into its 20-byte account id, checking the checksum.
pub fn decode_classic_address(address: &str) -> Result<[u8; 20], CryptoError> {
    let decoded = bs58::decode(address.trim())
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .with_check(Some(ACCOUNT_ID_VERSION))
        .into_vec()
        .map_err(|e| CryptoError::InvalidAddress(format!("{}: {}", address, e)))?;
    if decoded.len() != 21 {
        return Err(CryptoError::InvalidAddress(format!(
            "{}: expected 20-byte account id, got {}",
            address,
            decoded.len().saturating_sub(1)
        )));
    }
    let mut account_id = [0u8; 20];
    account_id.copy_from_slice(&decoded[1..]);
    Ok(account_id)
}

pub fn is_valid_classic_address(address: &str) -> bool {
    decode_classic_address(address).is_ok()
}
