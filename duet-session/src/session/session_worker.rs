use crate::negotiation::{NegotiationError, Negotiator, RestartOutcome};
use crate::quality::{TelemetrySink, Watchdog, emit_detached};
use crate::session::{SessionCommand, SessionSnapshot};
use crate::signaling::{Relay, RelaySubscription};
use crate::transport::TransportEvent;
use bytes::Bytes;
use duet_core::{
    ConnectionState, MediaHandle, MediaTrack, NegotiationState, SignalMessage, TelemetryRecord,
    TransportState,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Everything one call attempt owns. Runs as a single task, so every event
/// is handled to completion before the next one is looked at.
pub(crate) struct SessionWorker {
    pub(crate) session_id: Uuid,
    pub(crate) negotiator: Negotiator,
    pub(crate) relay: Arc<dyn Relay>,
    pub(crate) subscription: RelaySubscription,
    pub(crate) watchdog: Watchdog,
    pub(crate) telemetry: Arc<dyn TelemetrySink>,
    pub(crate) snapshot: Arc<watch::Sender<SessionSnapshot>>,
    pub(crate) command_rx: mpsc::Receiver<SessionCommand>,
    pub(crate) transport_rx: mpsc::Receiver<TransportEvent>,
    pub(crate) local_stream: MediaHandle,
    pub(crate) transport_state: TransportState,
    pub(crate) remote_stream: Option<MediaHandle>,
}

impl SessionWorker {
    pub(crate) async fn run(mut self) {
        info!(
            "Session {} started on channel '{}'",
            self.session_id,
            self.subscription.channel()
        );

        let result = self.negotiator.on_channel_ready().await;
        self.dispatch(result).await;

        let period = self.watchdog.config().interval();
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::ReplaceTracks(stream)) => self.replace_tracks(stream).await,
                        Some(SessionCommand::Stop) => break,
                        None => {
                            info!("Command channel closed. Stopping session.");
                            break;
                        }
                    }
                }

                payload = self.subscription.recv() => {
                    match payload {
                        Some(p) => self.handle_payload(p).await,
                        None => {
                            warn!("Relay channel closed unexpectedly");
                            break;
                        }
                    }
                }

                Some(evt) = self.transport_rx.recv() => self.handle_transport_event(evt).await,

                _ = ticker.tick() => self.sample_quality().await,
            }
        }

        drop(ticker);
        self.teardown().await;
    }

    async fn handle_payload(&mut self, payload: Bytes) {
        let msg = match duet_core::decode(&payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Dropping malformed signal message: {}", e);
                return;
            }
        };

        let result = self.negotiator.on_message(msg).await;
        self.dispatch(result).await;
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::LocalCandidate(candidate) => {
                if let Some(msg) = self.negotiator.on_local_candidate(candidate) {
                    self.publish(msg).await;
                }
            }

            TransportEvent::StateChanged(state) => {
                debug!("Transport state: {}", state.as_str());
                self.transport_state = state;
                self.negotiator.on_transport_state_change(state);

                if matches!(state, TransportState::Failed | TransportState::Closed) {
                    self.remote_stream = None;
                }
            }

            TransportEvent::RemoteTrack { stream_id, track } => {
                self.add_remote_track(stream_id, track);
            }
        }

        self.publish_snapshot();
    }

    fn add_remote_track(&mut self, stream_id: String, track: MediaTrack) {
        match &mut self.remote_stream {
            None => {
                info!("Remote stream '{}' available", stream_id);
                self.remote_stream = Some(MediaHandle::new(stream_id, vec![track]));
            }
            Some(stream) if stream.id == stream_id => {
                if !stream.tracks.contains(&track) {
                    stream.tracks.push(track);
                }
            }
            Some(stream) => {
                warn!(
                    "Ignoring track of unexpected remote stream '{}' (current '{}')",
                    stream_id, stream.id
                );
            }
        }
    }

    async fn sample_quality(&mut self) {
        if self.negotiator.state().is_terminal() {
            return;
        }

        let sample = match self.negotiator.transport().stats().await {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Failed to read transport stats: {:#}", e);
                return;
            }
        };

        let armed = matches!(
            self.negotiator.state(),
            NegotiationState::Connected | NegotiationState::Recovering
        );
        let record = self.watchdog.evaluate(sample, self.transport_state, armed);

        emit_detached(
            Arc::clone(&self.telemetry),
            TelemetryRecord::from_quality(
                self.session_id,
                self.negotiator.user_id().clone(),
                &record,
            ),
        );

        if !record.watchdog_triggered {
            return;
        }

        info!(
            "Quality watchdog triggered ({} kbps, {}% loss, transport {}), restarting ICE",
            record.bitrate_kbps,
            record.packet_loss_pct,
            record.transport_state.as_str()
        );
        match self.negotiator.restart().await {
            RestartOutcome::Offered(msg) => self.publish(msg).await,
            outcome => debug!("ICE restart not offered: {:?}", outcome),
        }
    }

    /// `local_stream` tracks what the senders actually carry, so a kind whose
    /// replacement failed is diffed again on the next swap.
    async fn replace_tracks(&mut self, stream: MediaHandle) {
        let mut applied = self.local_stream.clone();
        applied.id = stream.id.clone();

        for (kind, track) in self.local_stream.track_changes(&stream) {
            match self.negotiator.transport().replace_track(kind, track).await {
                Ok(()) => applied.set_track(kind, track.cloned()),
                Err(e) => warn!("Failed to replace {:?} track: {:#}", kind, e),
            }
        }
        self.local_stream = applied;
    }

    async fn dispatch(&mut self, result: Result<Vec<SignalMessage>, NegotiationError>) {
        match result {
            Ok(messages) => {
                for msg in messages {
                    self.publish(msg).await;
                }
            }
            Err(e) => error!("Session {} failed: {}", self.session_id, e),
        }
        self.publish_snapshot();
    }

    async fn publish(&self, msg: SignalMessage) {
        let payload = match duet_core::encode(&msg) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode '{}' message: {}", msg.signal.kind(), e);
                return;
            }
        };

        let channel = self.subscription.channel();
        if let Err(e) = self.relay.publish(channel, payload).await {
            warn!("Failed to publish '{}' message: {}", msg.signal.kind(), e);
        }
    }

    fn publish_snapshot(&self) {
        let next = SessionSnapshot {
            remote_stream: self.remote_stream.clone(),
            connection_state: ConnectionState::derive(
                self.negotiator.state(),
                self.transport_state.is_connected(),
            ),
            error: self.negotiator.failure().map(str::to_owned),
        };

        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    async fn teardown(&mut self) {
        self.negotiator.close().await;
        self.relay.unsubscribe(&self.subscription).await;
        self.negotiator.discard_candidates();
        self.watchdog.reset();
        self.remote_stream = None;
        self.snapshot.send_replace(SessionSnapshot::closed());

        info!("Session {} closed", self.session_id);
    }
}
