use crate::transport::{PeerTransport, TransportConfig, TransportEvent, TransportFactory};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use duet_core::{
    IceCandidate, MediaHandle, MediaKind, MediaTrack, QualitySample, SdpType, SessionDescription,
    TransportState,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::stats::StatsReportType;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// One outbound slot per media kind. `track` is `None` while the kind is
/// not being sent; the sender stays so a track can be put back in place.
struct OutboundTrack {
    sender: Arc<RTCRtpSender>,
    stream_id: String,
    track: Option<Arc<TrackLocalStaticSample>>,
}

/// [`PeerTransport`] backed by a webrtc-rs `RTCPeerConnection`.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    outbound: Mutex<HashMap<MediaKind, OutboundTrack>>,
    created_at: Instant,
}

impl WebRtcTransport {
    pub async fn new(
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    let Some(state) = transport_state(s) else {
                        return;
                    };
                    info!("ICE connection state changed: {:?}", s);
                    let _ = tx.send(TransportEvent::StateChanged(state)).await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = match serde_json::to_value(&init).and_then(serde_json::from_value) {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        warn!("Failed to convert local ICE candidate: {}", e);
                        return;
                    }
                };
                let _ = tx.send(TransportEvent::LocalCandidate(candidate)).await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => MediaKind::Audio,
                        RTPCodecType::Video => MediaKind::Video,
                        _ => return,
                    };
                    debug!("Remote {:?} track '{}' started", kind, track.id());
                    let _ = tx
                        .send(TransportEvent::RemoteTrack {
                            stream_id: track.stream_id(),
                            track: MediaTrack {
                                id: track.id(),
                                kind,
                            },
                        })
                        .await;
                })
            },
        ));

        Ok(Self {
            peer_connection,
            outbound: Mutex::new(HashMap::new()),
            created_at: Instant::now(),
        })
    }

    /// The local track samples for `kind` are written to by the capture side.
    pub async fn local_track(&self, kind: MediaKind) -> Option<Arc<TrackLocalStaticSample>> {
        self.outbound
            .lock()
            .await
            .get(&kind)
            .and_then(|outbound| outbound.track.clone())
    }

    async fn create_offer_with(
        &self,
        options: Option<RTCOfferOptions>,
    ) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(options).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }
}

fn transport_state(state: RTCIceConnectionState) -> Option<TransportState> {
    match state {
        RTCIceConnectionState::New => Some(TransportState::New),
        RTCIceConnectionState::Checking => Some(TransportState::Checking),
        RTCIceConnectionState::Connected => Some(TransportState::Connected),
        RTCIceConnectionState::Completed => Some(TransportState::Completed),
        RTCIceConnectionState::Disconnected => Some(TransportState::Disconnected),
        RTCIceConnectionState::Failed => Some(TransportState::Failed),
        RTCIceConnectionState::Closed => Some(TransportState::Closed),
        _ => None,
    }
}

fn codec_type(kind: MediaKind) -> RTPCodecType {
    match kind {
        MediaKind::Audio => RTPCodecType::Audio,
        MediaKind::Video => RTPCodecType::Video,
    }
}

fn local_sample_track(track: &MediaTrack, stream_id: &str) -> Arc<TrackLocalStaticSample> {
    let mime_type = match track.kind {
        MediaKind::Audio => MIME_TYPE_OPUS,
        MediaKind::Video => MIME_TYPE_VP8,
    };

    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            ..Default::default()
        },
        track.id.clone(),
        stream_id.to_owned(),
    ))
}

/// Video counters collected from one stats report.
///
/// Loss is computed over a single direction: both packet counters come from
/// the peer's receiver reports on our outbound video, so a peer that sends
/// no video cannot turn outbound loss into 100%.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct VideoCounters {
    inbound_bytes: u64,
    remote_packets_received: u64,
    remote_packets_lost: i64,
}

impl VideoCounters {
    fn apply(self, sample: &mut QualitySample) {
        sample.bytes_received = self.inbound_bytes;
        sample.packets_received = self.remote_packets_received;
        sample.packets_lost = counter(self.remote_packets_lost);
    }
}

/// Counters saturate at zero when the underlying stat is signed.
fn counter<T>(value: T) -> u64
where
    u64: TryFrom<T>,
{
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        self.create_offer_with(None).await
    }

    async fn create_restart_offer(&self) -> Result<SessionDescription> {
        self.create_offer_with(Some(RTCOfferOptions {
            ice_restart: true,
            ..Default::default()
        }))
        .await
        .context("Failed to create ICE restart offer")
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = match description.kind {
            SdpType::Offer => RTCSessionDescription::offer(description.sdp)?,
            SdpType::Answer => RTCSessionDescription::answer(description.sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let json = serde_json::to_string(&candidate)?;
        let init: RTCIceCandidateInit =
            serde_json::from_str(&json).context("Failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn attach_local_media(&self, stream: &MediaHandle) -> Result<()> {
        let mut outbound = self.outbound.lock().await;

        for kind in MediaKind::ALL {
            if outbound.contains_key(&kind) {
                continue;
            }
            if stream.tracks.iter().filter(|t| t.kind == kind).count() > 1 {
                warn!(
                    "Stream '{}' has more than one {:?} track, extra ignored",
                    stream.id, kind
                );
            }

            let (sender, track) = match stream.track(kind) {
                Some(track) => {
                    let local = local_sample_track(track, &stream.id);
                    let sender = self
                        .peer_connection
                        .add_track(Arc::clone(&local) as Arc<dyn TrackLocal + Send + Sync>)
                        .await
                        .with_context(|| format!("Failed to add {:?} track '{}'", kind, track.id))?;
                    (sender, Some(local))
                }
                None => {
                    let transceiver = self
                        .peer_connection
                        .add_transceiver_from_kind(
                            codec_type(kind),
                            Some(RTCRtpTransceiverInit {
                                direction: RTCRtpTransceiverDirection::Sendrecv,
                                send_encodings: vec![],
                            }),
                        )
                        .await
                        .with_context(|| format!("Failed to reserve {:?} sender", kind))?;
                    debug!("Reserved {:?} sender for stream '{}'", kind, stream.id);
                    (transceiver.sender().await, None)
                }
            };

            // RTCP has to be read for the interceptors to run.
            let rtcp_sender = Arc::clone(&sender);
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while let Ok((_, _)) = rtcp_sender.read(&mut rtcp_buf).await {}
            });

            outbound.insert(
                kind,
                OutboundTrack {
                    sender,
                    stream_id: stream.id.clone(),
                    track,
                },
            );
        }

        Ok(())
    }

    async fn replace_track(&self, kind: MediaKind, track: Option<&MediaTrack>) -> Result<()> {
        let mut outbound = self.outbound.lock().await;
        let Some(slot) = outbound.get_mut(&kind) else {
            bail!("no outbound {:?} sender, local media not attached", kind);
        };

        let local = track.map(|t| local_sample_track(t, &slot.stream_id));
        slot.sender
            .replace_track(
                local
                    .clone()
                    .map(|l| l as Arc<dyn TrackLocal + Send + Sync>),
            )
            .await?;
        slot.track = local;

        match track {
            Some(track) => info!("Replaced outbound {:?} track with '{}'", kind, track.id),
            None => info!("Stopped sending {:?}", kind),
        }
        Ok(())
    }

    async fn stats(&self) -> Result<QualitySample> {
        let report = self.peer_connection.get_stats().await;
        let mut sample = QualitySample {
            timestamp_ms: self.created_at.elapsed().as_secs_f64() * 1000.0,
            ..Default::default()
        };

        let mut video = VideoCounters::default();
        for stat in report.reports.values() {
            match stat {
                StatsReportType::InboundRTP(inbound) if inbound.kind == "video" => {
                    video.inbound_bytes += counter(inbound.bytes_received);
                }
                StatsReportType::RemoteInboundRTP(remote) if remote.kind == "video" => {
                    video.remote_packets_received += counter(remote.packets_received);
                    video.remote_packets_lost += remote.packets_lost;
                }
                StatsReportType::CandidatePair(pair) if pair.nominated => {
                    sample.rtt_seconds = Some(pair.current_round_trip_time);
                }
                _ => {}
            }
        }
        video.apply(&mut sample);

        Ok(sample)
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Builds a fresh [`WebRtcTransport`] per call attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebRtcTransportFactory;

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = WebRtcTransport::new(config.clone(), events).await?;
        Ok(Arc::new(transport))
    }
}
