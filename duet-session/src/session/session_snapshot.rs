use duet_core::{ConnectionState, MediaHandle};

/// Read-only view of a session handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub remote_stream: Option<MediaHandle>,
    pub connection_state: ConnectionState,
    /// Set only when `connection_state` is `Failed`.
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            remote_stream: None,
            connection_state: ConnectionState::New,
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn closed() -> Self {
        Self {
            connection_state: ConnectionState::Closed,
            ..Self::default()
        }
    }
}
