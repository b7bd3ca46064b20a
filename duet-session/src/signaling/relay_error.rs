use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay is closed")]
    Closed,

    #[error("failed to subscribe to channel '{channel}': {reason}")]
    Subscribe { channel: String, reason: String },

    #[error("failed to publish to channel '{channel}': {reason}")]
    Publish { channel: String, reason: String },
}
