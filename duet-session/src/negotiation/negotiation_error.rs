use thiserror::Error;

/// Errors that end a call attempt. Each one moves the negotiator to
/// `Failed`.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("failed to apply remote description: {0:#}")]
    RemoteDescription(anyhow::Error),

    #[error("failed to create offer: {0:#}")]
    CreateOffer(anyhow::Error),

    #[error("failed to create answer: {0:#}")]
    CreateAnswer(anyhow::Error),

    #[error("transport reported a fatal connectivity failure")]
    Transport,
}

impl NegotiationError {
    /// Text suitable for showing to the person on the call.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RemoteDescription(_) => {
                "The other participant's call setup could not be applied. End the call and try again."
            }
            Self::CreateOffer(_) | Self::CreateAnswer(_) => {
                "The call could not be set up. End the call and try again."
            }
            Self::Transport => "The connection was lost. End the call and try again.",
        }
    }
}
