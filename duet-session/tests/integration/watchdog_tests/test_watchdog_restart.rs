use duet_core::{ConnectionState, QualitySample, TransportState};
use duet_session::{MemoryRelay, TransportEvent};
use std::time::Duration;
use tokio::time::Instant;

use crate::integration::{CHANNEL, create_controller, init_tracing, options};
use crate::utils::{RelayPeer, TransportCall, offer_sdp, wait_for_snapshot};

fn sample(timestamp_ms: f64, bytes_received: u64) -> QualitySample {
    QualitySample {
        timestamp_ms,
        bytes_received,
        packets_received: bytes_received / 1000,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_and_low_bitrate_restart_once() {
    init_tracing();

    let relay = MemoryRelay::new();
    let mut bob = RelayPeer::join(&relay, CHANNEL, "bob").await.unwrap();
    let (mut alice, factory, telemetry) = create_controller(&relay, "a");
    let mut rx = alice.subscribe();

    let started_at = Instant::now();
    alice.start(options("alice", true)).await.unwrap();
    let transport = factory.last().await;

    bob.recv_kind("offer").await.unwrap();
    bob.send_answer("v=0 bob answer").await.unwrap();
    transport.set_stats(sample(5_000.0, 0)).await;
    transport
        .emit(TransportEvent::StateChanged(TransportState::Connected))
        .await;
    wait_for_snapshot(&mut rx, |s| {
        s.connection_state == ConnectionState::Connected
    })
    .await
    .unwrap();

    // First tick: no previous sample, healthy transport.
    tokio::time::sleep_until(started_at + Duration::from_millis(5_500)).await;
    assert!(telemetry.wait_for_records(1, 1000).await);
    assert!(!telemetry.records().await[0].watchdog_triggered);

    // 25600 bytes over 5 s is 40 kbps.
    transport.set_stats(sample(10_000.0, 25_600)).await;
    transport
        .emit(TransportEvent::StateChanged(TransportState::Disconnected))
        .await;
    wait_for_snapshot(&mut rx, |s| {
        s.connection_state == ConnectionState::Connecting
    })
    .await
    .unwrap();

    tokio::time::sleep_until(started_at + Duration::from_millis(10_500)).await;
    assert!(telemetry.wait_for_records(2, 1000).await);

    let record = &telemetry.records().await[1];
    assert_eq!(record.bitrate_kbps, 40);
    assert_eq!(record.connection_state, TransportState::Disconnected);
    assert!(record.watchdog_triggered);

    assert_eq!(
        transport
            .count(|c| matches!(c, TransportCall::CreateRestartOffer))
            .await,
        1
    );
    let restart = bob
        .recv_matching(|m| offer_sdp(m).is_some_and(|(_, restart)| restart), 1000)
        .await
        .unwrap();
    assert_eq!(offer_sdp(&restart).unwrap().0, transport.restart_offer_sdp(1));

    let snapshot = alice.snapshot();
    assert_ne!(snapshot.connection_state, ConnectionState::Failed);
    assert!(snapshot.error.is_none());

    alice.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_disarmed_before_connect() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (mut alice, factory, telemetry) = create_controller(&relay, "a");

    alice.start(options("alice", true)).await.unwrap();
    let transport = factory.last().await;
    transport.set_stats(sample(5_000.0, 0)).await;
    transport
        .emit(TransportEvent::StateChanged(TransportState::Disconnected))
        .await;

    // Nobody answers; two ticks pass while awaiting the answer.
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    assert!(telemetry.wait_for_records(2, 1000).await);
    assert!(
        telemetry
            .records()
            .await
            .iter()
            .all(|r| !r.watchdog_triggered)
    );
    assert_eq!(
        transport
            .count(|c| matches!(c, TransportCall::CreateRestartOffer))
            .await,
        0
    );

    alice.stop().await;
}
