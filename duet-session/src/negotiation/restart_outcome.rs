use duet_core::{NegotiationState, SignalMessage};

/// Result of asking the negotiator to renegotiate connectivity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    /// A restart offer to publish. Repeated requests re-send the pending one.
    Offered(SignalMessage),
    /// This side never offers; the initiator has to restart.
    AwaitingPeer,
    /// Nothing to restart in this state.
    Skipped(NegotiationState),
    /// The transport could not produce a restart offer. State is unchanged.
    Failed(String),
}

impl RestartOutcome {
    pub fn message(&self) -> Option<&SignalMessage> {
        match self {
            Self::Offered(msg) => Some(msg),
            _ => None,
        }
    }
}
