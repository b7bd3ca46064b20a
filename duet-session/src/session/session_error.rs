use crate::signaling::RelayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("transport setup failed: {0:#}")]
    Transport(anyhow::Error),

    #[error("a session is already running")]
    AlreadyRunning,
}
