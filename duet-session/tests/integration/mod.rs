pub mod session_tests;

use std::sync::Arc;
use tracing::Level;

use duet_core::{IceCandidate, MediaHandle, MediaTrack, Participant, Role};
use duet_session::{MemoryRelay, Negotiator, SessionConfig, SessionController, SessionOptions};

use crate::utils::{MockTransport, MockTransportFactory, RecordingTelemetrySink};

pub const ROOM: &str = "42";
pub const CHANNEL: &str = "vc:42";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn local_stream(id: &str) -> MediaHandle {
    MediaHandle::new(
        id,
        vec![
            MediaTrack::audio(format!("{id}-mic")),
            MediaTrack::video(format!("{id}-cam")),
        ],
    )
}

pub fn options(user_id: &str, is_initiator: bool) -> SessionOptions {
    SessionOptions::new(user_id)
        .with_room(ROOM)
        .with_initiator(is_initiator)
        .with_enabled(true)
        .with_local_stream(local_stream(user_id))
}

pub fn candidate(n: u32) -> IceCandidate {
    IceCandidate::new(format!(
        "candidate:{n} 1 udp 2122260223 192.168.1.{n} 5{n:04} typ host"
    ))
    .with_mid("0", 0)
}

pub fn create_negotiator(user_id: &str, role: Role) -> (Negotiator, MockTransport) {
    let transport = MockTransport::new(user_id);
    let negotiator = Negotiator::new(
        Participant::new(user_id, role),
        Arc::new(transport.clone()),
    );
    (negotiator, transport)
}

pub fn create_controller(
    relay: &MemoryRelay,
    label: &str,
) -> (SessionController, MockTransportFactory, RecordingTelemetrySink) {
    let factory = MockTransportFactory::new(label);
    let telemetry = RecordingTelemetrySink::new();

    let controller = SessionController::new(
        SessionConfig::default(),
        Arc::new(relay.clone()),
        Arc::new(factory.clone()),
        Arc::new(telemetry.clone()),
    );

    (controller, factory, telemetry)
}
