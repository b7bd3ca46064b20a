mod media;
mod peer;
mod quality;
mod room;
mod signaling;
mod state;

pub use media::{MediaHandle, MediaKind, MediaTrack};
pub use peer::{Participant, Role, UserId};
pub use quality::{QualityRecord, QualitySample, Resolution, TelemetryRecord};
pub use room::RoomId;
pub use signaling::{IceCandidate, IceServerConfig, SdpType, SessionDescription, Signal, SignalMessage};
pub use state::{ConnectionState, NegotiationState, TransportState};
