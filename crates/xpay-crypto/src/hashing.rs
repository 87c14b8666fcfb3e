use sha2::{Digest, Sha512};
use xpay_core::{ChannelId, Drops};

/// 32-byte digest.
pub type Hash = [u8; 32];

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// First half of SHA-512, the ledger's signing and identifier digest.
pub fn sha512_half(data: &[u8]) -> Hash {
    let full = Sha512::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&full[..32]);
    out
}

/// Prefix marking transaction hashes that never touched the ledger.
pub const SIMULATED_HASH_PREFIX: &str = "SIM_";

/// Deterministic placeholder hash for a simulated settlement of `amount` on `channel_id`.
pub fn simulated_tx_hash(channel_id: &ChannelId, amount: Drops) -> String {
    let mut data = Vec::with_capacity(40);
    data.extend_from_slice(&channel_id.to_bytes());
    data.extend_from_slice(&amount.to_be_bytes());
    format!("{}{}", SIMULATED_HASH_PREFIX, hex::encode_upper(hash(&data)))
}
