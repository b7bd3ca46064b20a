use crate::negotiation::Negotiator;
use crate::quality::{TelemetrySink, TracingTelemetrySink, Watchdog};
use crate::session::session_worker::SessionWorker;
use crate::session::{
    InertReason, SessionCommand, SessionConfig, SessionError, SessionOptions, SessionSnapshot,
};
use crate::signaling::Relay;
use crate::transport::{PeerTransport, TransportFactory, WebRtcTransportFactory};
use duet_core::{MediaHandle, TransportState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { session_id: Uuid },
    /// Preconditions are not met; nothing was subscribed or spawned.
    Inert(InertReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Started { session_id: Uuid },
    Stopped,
    TracksReplaced,
    Unchanged,
    Inert(InertReason),
}

struct RunningSession {
    session_id: Uuid,
    options: SessionOptions,
    command_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

/// Owns at most one call attempt at a time and exposes its state.
///
/// Dropping the controller aborts a running session without the orderly
/// teardown; call [`SessionController::stop`] to close the transport and
/// leave the relay channel.
pub struct SessionController {
    config: SessionConfig,
    relay: Arc<dyn Relay>,
    factory: Arc<dyn TransportFactory>,
    telemetry: Arc<dyn TelemetrySink>,
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
    running: Option<RunningSession>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        relay: Arc<dyn Relay>,
        factory: Arc<dyn TransportFactory>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());

        Self {
            config,
            relay,
            factory,
            telemetry,
            snapshot: Arc::new(snapshot),
            running: None,
        }
    }

    /// Controller over webrtc transports that logs telemetry.
    pub fn with_webrtc(config: SessionConfig, relay: Arc<dyn Relay>) -> Self {
        Self::new(
            config,
            relay,
            Arc::new(WebRtcTransportFactory),
            Arc::new(TracingTelemetrySink),
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.live().map(|r| r.session_id)
    }

    /// False once the session task has ended, including when it ended on its
    /// own because the relay closed the channel.
    pub fn is_running(&self) -> bool {
        self.live().is_some()
    }

    fn live(&self) -> Option<&RunningSession> {
        self.running.as_ref().filter(|r| !r.task.is_finished())
    }

    /// Forgets a session whose task already ended. Its teardown has run.
    fn reap_finished(&mut self) {
        if let Some(running) = self.running.take_if(|r| r.task.is_finished()) {
            warn!("Session {} ended without a stop request", running.session_id);
        }
    }

    pub async fn start(&mut self, options: SessionOptions) -> Result<StartOutcome, SessionError> {
        self.reap_finished();
        if self.running.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        if let Err(reason) = options.preconditions() {
            info!("Session stays inert: {}", reason);
            return Ok(StartOutcome::Inert(reason));
        }
        let (Some(room_id), Some(local_stream)) = (&options.room_id, &options.local_stream) else {
            return Ok(StartOutcome::Inert(InertReason::MissingRoom));
        };

        let channel = room_id.channel_name(&self.config.namespace);
        let (transport_tx, transport_rx) = mpsc::channel(256);

        let transport = self
            .factory
            .create(&self.config.transport, transport_tx)
            .await
            .map_err(SessionError::Transport)?;

        if let Err(e) = transport.attach_local_media(local_stream).await {
            close_quietly(transport.as_ref()).await;
            return Err(SessionError::Transport(e));
        }

        let subscription = match self.relay.subscribe(&channel).await {
            Ok(subscription) => subscription,
            Err(e) => {
                close_quietly(transport.as_ref()).await;
                return Err(e.into());
            }
        };

        let session_id = Uuid::new_v4();
        let (command_tx, command_rx) = mpsc::channel(16);

        self.snapshot.send_replace(SessionSnapshot::default());

        let worker = SessionWorker {
            session_id,
            negotiator: Negotiator::new(options.participant(), transport),
            relay: Arc::clone(&self.relay),
            subscription,
            watchdog: Watchdog::new(self.config.watchdog),
            telemetry: Arc::clone(&self.telemetry),
            snapshot: Arc::clone(&self.snapshot),
            command_rx,
            transport_rx,
            local_stream: local_stream.clone(),
            transport_state: TransportState::New,
            remote_stream: None,
        };
        let task = tokio::spawn(worker.run());

        info!(
            "Started session {} for {} in '{}'",
            session_id, options.user_id, channel
        );
        self.running = Some(RunningSession {
            session_id,
            options,
            command_tx,
            task,
        });

        Ok(StartOutcome::Started { session_id })
    }

    /// Single teardown path. Waits for the session task to close the
    /// transport and leave the channel, then resets the exposed state.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.command_tx.send(SessionCommand::Stop).await;
            if let Err(e) = running.task.await {
                warn!("Session {} task ended abnormally: {}", running.session_id, e);
            }
        }

        self.snapshot.send_replace(SessionSnapshot::closed());
    }

    /// Brings the controller in line with `options`: starts when the
    /// preconditions become true, stops when they become false, and swaps
    /// outbound tracks when only the local stream changed.
    pub async fn reconcile(
        &mut self,
        options: SessionOptions,
    ) -> Result<Reconciled, SessionError> {
        self.reap_finished();
        let Some(running) = &mut self.running else {
            return Ok(match self.start(options).await? {
                StartOutcome::Started { session_id } => Reconciled::Started { session_id },
                StartOutcome::Inert(reason) => Reconciled::Inert(reason),
            });
        };

        if options.preconditions().is_err() {
            self.stop().await;
            return Ok(Reconciled::Stopped);
        }

        if !running.options.same_call(&options) {
            self.stop().await;
            return Ok(match self.start(options).await? {
                StartOutcome::Started { session_id } => Reconciled::Started { session_id },
                StartOutcome::Inert(reason) => Reconciled::Inert(reason),
            });
        }

        if running.options.local_stream == options.local_stream {
            return Ok(Reconciled::Unchanged);
        }

        let Some(stream) = options.local_stream.clone() else {
            return Ok(Reconciled::Unchanged);
        };
        running.options = options;
        replace_tracks(&running.command_tx, stream).await;

        Ok(Reconciled::TracksReplaced)
    }
}

/// Closes a transport that never made it into a session.
async fn close_quietly(transport: &dyn PeerTransport) {
    if let Err(e) = transport.close().await {
        warn!("Error while closing transport: {:#}", e);
    }
}

async fn replace_tracks(command_tx: &mpsc::Sender<SessionCommand>, stream: MediaHandle) {
    if command_tx
        .send(SessionCommand::ReplaceTracks(stream))
        .await
        .is_err()
    {
        warn!("Session task is gone, track replacement dropped");
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.task.abort();
        }
    }
}
