use thiserror::Error;

#[derive(Error, Debug)]
pub enum TxError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Unsupported calldata value at {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },

    #[error("Value is not invertible modulo the given prime")]
    NotInvertible,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Unsupported transaction version: {0}")]
    UnsupportedVersion(String),

    #[error("Signer unavailable: {0}")]
    SignerUnavailable(String),

    #[error("Invalid signer details: {0}")]
    InvalidDetails(String),

    #[error("Invalid typed data: {0}")]
    InvalidTypedData(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TxError {
    pub(crate) fn unsupported(path: &str, reason: impl Into<String>) -> Self {
        TxError::UnsupportedValue {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TxError>;
