use duet_core::{IceCandidate, MediaTrack, TransportState};

/// Events the transport raises for the session worker.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A local candidate was gathered and must be trickled to the peer.
    LocalCandidate(IceCandidate),

    /// The connectivity state of the transport changed.
    StateChanged(TransportState),

    /// The peer started sending a track.
    RemoteTrack { stream_id: String, track: MediaTrack },
}
