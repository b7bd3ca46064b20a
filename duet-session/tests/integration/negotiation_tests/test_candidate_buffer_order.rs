use duet_core::{NegotiationState, Role, SessionDescription, SignalMessage, UserId};

use crate::integration::{candidate, create_negotiator, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_early_candidates_applied_in_order_after_answer() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    let bob = UserId::new("bob");

    let out = alice.on_channel_ready().await.unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(alice.state(), NegotiationState::AwaitingAnswer);

    for n in 1..=3 {
        alice
            .on_message(SignalMessage::ice(bob.clone(), candidate(n)))
            .await
            .unwrap();
    }

    assert_eq!(alice.buffered_candidates(), 3);
    assert!(transport.applied_candidates().await.is_empty());

    alice
        .on_message(SignalMessage::answer(
            bob.clone(),
            SessionDescription::answer("v=0 bob answer"),
        ))
        .await
        .unwrap();

    let calls = transport.calls().await;
    assert_eq!(
        calls[1..],
        [
            TransportCall::SetRemoteDescription(SessionDescription::answer("v=0 bob answer")),
            TransportCall::AddIceCandidate(candidate(1)),
            TransportCall::AddIceCandidate(candidate(2)),
            TransportCall::AddIceCandidate(candidate(3)),
        ]
    );
    assert_eq!(alice.buffered_candidates(), 0);
    assert_eq!(alice.state(), NegotiationState::Connected);
}

#[tokio::test]
async fn test_late_candidates_applied_immediately() {
    init_tracing();

    let (mut bob, transport) = create_negotiator("bob", Role::Responder);
    let alice = UserId::new("alice");
    bob.on_channel_ready().await.unwrap();

    bob.on_message(SignalMessage::ice(alice.clone(), candidate(1)))
        .await
        .unwrap();
    bob.on_message(SignalMessage::offer(
        alice.clone(),
        SessionDescription::offer("v=0 alice offer"),
    ))
    .await
    .unwrap();
    bob.on_message(SignalMessage::ice(alice.clone(), candidate(2)))
        .await
        .unwrap();

    assert_eq!(
        transport.applied_candidates().await,
        vec![candidate(1).candidate, candidate(2).candidate]
    );
    assert_eq!(bob.buffered_candidates(), 0);
}

#[tokio::test]
async fn test_rejected_candidate_is_dropped_not_fatal() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    let bob = UserId::new("bob");
    transport.reject_candidate(&candidate(2).candidate).await;

    alice.on_channel_ready().await.unwrap();
    for n in 1..=3 {
        alice
            .on_message(SignalMessage::ice(bob.clone(), candidate(n)))
            .await
            .unwrap();
    }
    alice
        .on_message(SignalMessage::answer(
            bob,
            SessionDescription::answer("v=0 answer"),
        ))
        .await
        .unwrap();

    assert_eq!(
        transport.applied_candidates().await,
        vec![candidate(1).candidate, candidate(3).candidate]
    );
    assert_eq!(alice.state(), NegotiationState::Connected);
    assert!(alice.failure().is_none());
}
