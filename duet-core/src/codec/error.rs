use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed signal payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown signal type '{0}'")]
    UnknownType(String),

    #[error("'{0}' signal carries no data")]
    MissingData(&'static str),

    #[error("invalid data for '{kind}' signal: {reason}")]
    InvalidData { kind: &'static str, reason: String },

    #[error("signal has an empty sender")]
    EmptySender,
}

#[derive(Debug, Error)]
#[error("failed to encode signal: {0}")]
pub struct EncodeError(#[from] pub serde_json::Error);
