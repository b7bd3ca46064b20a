use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol state of a single call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NegotiationState {
    Idle,
    AwaitingAnswer,
    AwaitingRemoteOffer,
    Connected,
    Recovering,
    Failed,
    Closed,
}

impl NegotiationState {
    /// `Failed` and `Closed` end the attempt; a new session is needed to retry.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Closed)
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Connectivity signal reported by the underlying peer transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected | Self::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Checking => "checking",
            Self::Connected => "connected",
            Self::Completed => "completed",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

/// Caller-facing connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Failed,
    Closed,
}

impl ConnectionState {
    /// Derives the exposed state. Negotiation alone never reports `Connected`;
    /// the transport has to confirm it.
    pub fn derive(negotiation: NegotiationState, transport_connected: bool) -> Self {
        match negotiation {
            NegotiationState::Idle => Self::New,
            NegotiationState::AwaitingAnswer
            | NegotiationState::AwaitingRemoteOffer
            | NegotiationState::Recovering => Self::Connecting,
            NegotiationState::Connected if transport_connected => Self::Connected,
            NegotiationState::Connected => Self::Connecting,
            NegotiationState::Failed => Self::Failed,
            NegotiationState::Closed => Self::Closed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
