use xpay_core::{CoreError, ErrorKind};

/// Key-value store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error in {namespace}/{key}: {message}")]
    Serialization {
        namespace: &'static str,
        key: String,
        message: String,
    },

    #[error("counter {0} exhausted")]
    CounterExhausted(&'static str),
}

/// Failures reported by a ledger client adapter.
#[derive(Debug, thiserror::Error)]
pub enum LedgerClientError {
    #[error("ledger client unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("ledger rpc error {code}: {message}")]
    Rpc { code: String, message: String },

    #[error("timed out waiting for validation of {0}")]
    Timeout(String),

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),
}

/// Settlement-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Ledger(#[from] LedgerClientError),

    #[error("no claims queued")]
    NoClaims,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SettlementError {
    /// Caller-facing reason for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::Store(_) | Self::Internal(_) => ErrorKind::Internal,
            Self::Ledger(_) => ErrorKind::XrplSubmitError,
            Self::NoClaims => ErrorKind::NoClaims,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
