use crate::model::peer::UserId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

/// An SDP payload together with its role in the offer/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpType::Answer,
            sdp: sdp.into(),
        }
    }
}

/// A connectivity candidate in the browser `RTCIceCandidateInit` JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }

    pub fn with_mid(mut self, sdp_mid: impl Into<String>, sdp_m_line_index: u16) -> Self {
        self.sdp_mid = Some(sdp_mid.into());
        self.sdp_m_line_index = Some(sdp_m_line_index);
        self
    }
}

/// Negotiation payloads. Messages are data: the recipient decides what to do
/// with them from its own state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Offer {
        description: SessionDescription,
        ice_restart: bool,
    },
    Answer(SessionDescription),
    IceCandidate(IceCandidate),
    Ready,
}

impl Signal {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice",
            Self::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalMessage {
    pub sender: UserId,
    pub signal: Signal,
}

impl SignalMessage {
    pub fn new(sender: UserId, signal: Signal) -> Self {
        Self { sender, signal }
    }

    pub fn offer(sender: UserId, description: SessionDescription) -> Self {
        Self::new(
            sender,
            Signal::Offer {
                description,
                ice_restart: false,
            },
        )
    }

    pub fn restart_offer(sender: UserId, description: SessionDescription) -> Self {
        Self::new(
            sender,
            Signal::Offer {
                description,
                ice_restart: true,
            },
        )
    }

    pub fn answer(sender: UserId, description: SessionDescription) -> Self {
        Self::new(sender, Signal::Answer(description))
    }

    pub fn ice(sender: UserId, candidate: IceCandidate) -> Self {
        Self::new(sender, Signal::IceCandidate(candidate))
    }

    pub fn ready(sender: UserId) -> Self {
        Self::new(sender, Signal::Ready)
    }

    pub fn is_from(&self, user_id: &UserId) -> bool {
        &self.sender == user_id
    }
}
