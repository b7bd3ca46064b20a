use crate::transport::{TransportConfig, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use duet_core::{
    IceCandidate, MediaHandle, MediaKind, MediaTrack, QualitySample, SessionDescription,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The direct media connection to the other participant.
///
/// Offer and answer creation also install the result as the local
/// description. Asynchronous occurrences (gathered candidates, state changes,
/// remote tracks) are reported through the event channel handed to
/// [`TransportFactory::create`].
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates an offer with fresh ICE credentials, restarting connectivity
    /// checks without tearing the connection down.
    async fn create_restart_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Attaches `stream` and reserves an outbound slot for every
    /// [`MediaKind`], so kinds the stream lacks can be filled in later.
    async fn attach_local_media(&self, stream: &MediaHandle) -> Result<()>;

    /// Swaps the outbound track of `kind` in place, no renegotiation.
    /// `None` stops sending that kind.
    async fn replace_track(&self, kind: MediaKind, track: Option<&MediaTrack>) -> Result<()>;

    /// Raw counters for video: inbound bytes, loss as reported by the peer,
    /// and the active candidate pair.
    async fn stats(&self) -> Result<QualitySample>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    async fn create(
        &self,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}
