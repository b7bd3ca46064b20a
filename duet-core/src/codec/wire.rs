use crate::codec::error::{DecodeError, EncodeError};
use crate::model::{IceCandidate, SdpType, SessionDescription, Signal, SignalMessage, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OFFER: &str = "offer";
const ANSWER: &str = "answer";
const ICE: &str = "ice";
const READY: &str = "ready";

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireMessage {
    sender: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, rename = "iceRestart", skip_serializing_if = "is_false")]
    ice_restart: bool,
}

impl WireMessage {
    pub(super) fn from_signal(msg: &SignalMessage) -> Result<Self, EncodeError> {
        let (kind, data, ice_restart) = match &msg.signal {
            Signal::Offer {
                description,
                ice_restart,
            } => (OFFER, Some(serde_json::to_value(description)?), *ice_restart),
            Signal::Answer(description) => (ANSWER, Some(serde_json::to_value(description)?), false),
            Signal::IceCandidate(candidate) => (ICE, Some(serde_json::to_value(candidate)?), false),
            Signal::Ready => (READY, None, false),
        };

        Ok(Self {
            sender: msg.sender.0.clone(),
            kind: kind.to_owned(),
            data,
            ice_restart,
        })
    }

    pub(super) fn into_signal(self) -> Result<SignalMessage, DecodeError> {
        if self.sender.trim().is_empty() {
            return Err(DecodeError::EmptySender);
        }

        let signal = match self.kind.as_str() {
            OFFER => Signal::Offer {
                description: description(OFFER, SdpType::Offer, self.data)?,
                ice_restart: self.ice_restart,
            },
            ANSWER => Signal::Answer(description(ANSWER, SdpType::Answer, self.data)?),
            ICE => Signal::IceCandidate(candidate(self.data)?),
            READY => Signal::Ready,
            _ => return Err(DecodeError::UnknownType(self.kind)),
        };

        Ok(SignalMessage::new(UserId(self.sender), signal))
    }
}

fn description(
    kind: &'static str,
    expected: SdpType,
    data: Option<Value>,
) -> Result<SessionDescription, DecodeError> {
    let data = data.ok_or(DecodeError::MissingData(kind))?;

    let description = match data {
        Value::String(sdp) => SessionDescription { kind: expected, sdp },
        other => serde_json::from_value::<SessionDescription>(other).map_err(|e| {
            DecodeError::InvalidData {
                kind,
                reason: e.to_string(),
            }
        })?,
    };

    if description.kind != expected {
        return Err(DecodeError::InvalidData {
            kind,
            reason: format!("description type is {:?}", description.kind),
        });
    }
    if description.sdp.trim().is_empty() {
        return Err(DecodeError::InvalidData {
            kind,
            reason: "empty sdp".to_owned(),
        });
    }

    Ok(description)
}

fn candidate(data: Option<Value>) -> Result<IceCandidate, DecodeError> {
    match data.ok_or(DecodeError::MissingData(ICE))? {
        Value::String(line) => Ok(IceCandidate::new(line)),
        other => serde_json::from_value(other).map_err(|e| DecodeError::InvalidData {
            kind: ICE,
            reason: e.to_string(),
        }),
    }
}
