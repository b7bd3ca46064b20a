//! Wire codec for negotiation messages exchanged over the relay.
//!
//! Payloads are JSON objects of the form
//! `{ "sender": "...", "type": "offer" | "answer" | "ice" | "ready", "data": ... }`.
//! Offers that restart connectivity carry an extra `"iceRestart": true`.

mod error;
mod wire;

pub use error::{DecodeError, EncodeError};

use crate::model::SignalMessage;
use bytes::Bytes;

pub fn encode(msg: &SignalMessage) -> Result<Bytes, EncodeError> {
    let wire = wire::WireMessage::from_signal(msg)?;
    let json = serde_json::to_vec(&wire)?;
    Ok(Bytes::from(json))
}

pub fn decode(payload: &[u8]) -> Result<SignalMessage, DecodeError> {
    let wire: wire::WireMessage = serde_json::from_slice(payload)?;
    wire.into_signal()
}
