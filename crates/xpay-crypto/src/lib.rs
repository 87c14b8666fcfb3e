pub mod error;
pub mod keys;
pub mod signing;
pub mod codec;
pub mod hashing;
pub mod address;

pub use error::CryptoError;
pub use keys::{KeyPair, KeyScheme, PublicKey};
pub use signing::{sign, sign_claim, verify, verify_claim};
pub use codec::{encode_claim, encode_for_signing_claim};
pub use hashing::{hash, sha512_half, simulated_tx_hash};
pub use address::{decode_classic_address, encode_classic_address, is_valid_classic_address};
