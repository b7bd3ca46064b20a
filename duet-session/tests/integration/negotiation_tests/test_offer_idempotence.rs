use duet_core::{NegotiationState, Role, SessionDescription, Signal, SignalMessage, UserId};

use crate::integration::{create_negotiator, init_tracing};
use crate::utils::TransportCall;

#[tokio::test]
async fn test_second_offer_is_ignored() {
    init_tracing();

    let (mut bob, transport) = create_negotiator("bob", Role::Responder);
    let alice = UserId::new("alice");
    bob.on_channel_ready().await.unwrap();

    let first = bob
        .on_message(SignalMessage::offer(
            alice.clone(),
            SessionDescription::offer("v=0 first"),
        ))
        .await
        .unwrap();
    assert_eq!(first.len(), 1);
    assert!(matches!(first[0].signal, Signal::Answer(_)));
    assert_eq!(bob.state(), NegotiationState::Connected);

    let second = bob
        .on_message(SignalMessage::offer(
            alice.clone(),
            SessionDescription::offer("v=0 second"),
        ))
        .await
        .unwrap();

    assert!(second.is_empty(), "No second answer may be sent");
    assert_eq!(bob.state(), NegotiationState::Connected);
    assert_eq!(
        transport.remote_descriptions().await,
        vec![SessionDescription::offer("v=0 first")]
    );
    assert_eq!(
        transport
            .count(|c| matches!(c, TransportCall::CreateAnswer))
            .await,
        1
    );
}

#[tokio::test]
async fn test_initiator_ignores_competing_offer() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    alice.on_channel_ready().await.unwrap();

    let out = alice
        .on_message(SignalMessage::offer(
            UserId::new("bob"),
            SessionDescription::offer("v=0 glare"),
        ))
        .await
        .unwrap();

    assert!(out.is_empty());
    assert_eq!(alice.state(), NegotiationState::AwaitingAnswer);
    assert!(transport.remote_descriptions().await.is_empty());
}

#[tokio::test]
async fn test_stale_answer_is_ignored() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    let bob = UserId::new("bob");
    alice.on_channel_ready().await.unwrap();

    alice
        .on_message(SignalMessage::answer(
            bob.clone(),
            SessionDescription::answer("v=0 a1"),
        ))
        .await
        .unwrap();
    alice
        .on_message(SignalMessage::answer(
            bob,
            SessionDescription::answer("v=0 a2"),
        ))
        .await
        .unwrap();

    assert_eq!(
        transport.remote_descriptions().await,
        vec![SessionDescription::answer("v=0 a1")]
    );
    assert_eq!(alice.connected_entries(), 1);
}
