use duet_core::{
    NegotiationState, Role, SessionDescription, SignalMessage, TransportState, UserId,
};
use duet_session::NegotiationError;

use crate::integration::{candidate, create_negotiator, init_tracing};

#[tokio::test]
async fn test_rejected_remote_offer_fails_attempt() {
    init_tracing();

    let (mut bob, transport) = create_negotiator("bob", Role::Responder);
    transport.fail_set_remote_description().await;
    bob.on_channel_ready().await.unwrap();

    let result = bob
        .on_message(SignalMessage::offer(
            UserId::new("alice"),
            SessionDescription::offer("v=0 broken"),
        ))
        .await;

    assert!(matches!(result, Err(NegotiationError::RemoteDescription(_))));
    assert_eq!(bob.state(), NegotiationState::Failed);
    assert!(bob.failure().is_some());
}

#[tokio::test]
async fn test_answer_creation_failure_fails_attempt() {
    init_tracing();

    let (mut bob, transport) = create_negotiator("bob", Role::Responder);
    transport.fail_create_answer().await;
    bob.on_channel_ready().await.unwrap();

    let result = bob
        .on_message(SignalMessage::offer(
            UserId::new("alice"),
            SessionDescription::offer("v=0 offer"),
        ))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, NegotiationError::CreateAnswer(_)));
    assert_eq!(bob.failure(), Some(err.user_message()));
    assert_eq!(bob.state(), NegotiationState::Failed);
}

#[tokio::test]
async fn test_offer_creation_failure_fails_attempt() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    transport.fail_create_offer().await;

    let result = alice.on_channel_ready().await;

    assert!(matches!(result, Err(NegotiationError::CreateOffer(_))));
    assert_eq!(alice.state(), NegotiationState::Failed);
}

#[tokio::test]
async fn test_failed_is_terminal() {
    init_tracing();

    let (mut alice, transport) = create_negotiator("alice", Role::Initiator);
    let bob = UserId::new("bob");
    alice.on_channel_ready().await.unwrap();

    alice.on_transport_state_change(TransportState::Failed);
    assert_eq!(alice.state(), NegotiationState::Failed);
    assert!(alice.failure().is_some());

    let calls_before = transport.calls().await;
    alice
        .on_message(SignalMessage::answer(
            bob.clone(),
            SessionDescription::answer("v=0 late"),
        ))
        .await
        .unwrap();
    alice
        .on_message(SignalMessage::ice(bob, candidate(1)))
        .await
        .unwrap();

    assert_eq!(transport.calls().await, calls_before);
    assert_eq!(alice.buffered_candidates(), 0);
    assert_eq!(
        alice.on_transport_state_change(TransportState::Connected),
        NegotiationState::Failed
    );
    assert!(alice.on_local_candidate(candidate(9)).is_none());
}
