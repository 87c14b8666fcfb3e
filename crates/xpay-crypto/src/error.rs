/// Cryptographic errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("unknown key type prefix: 0x{0:02X}")]
    UnknownKeyType(u8),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("claim encoding failed: {0}")]
    Encoding(String),

    #[error("invalid ledger address: {0}")]
    InvalidAddress(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
