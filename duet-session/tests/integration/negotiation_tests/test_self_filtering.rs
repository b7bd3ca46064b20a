use duet_core::{NegotiationState, Role, SessionDescription, SignalMessage, UserId};

use crate::integration::{candidate, create_negotiator, init_tracing};

#[tokio::test]
async fn test_own_messages_are_ignored() {
    init_tracing();

    let (mut responder, transport) = create_negotiator("bob", Role::Responder);
    responder.on_channel_ready().await.unwrap();
    let calls_before = transport.calls().await;

    let me = UserId::new("bob");
    let own = vec![
        SignalMessage::offer(me.clone(), SessionDescription::offer("v=0 own")),
        SignalMessage::answer(me.clone(), SessionDescription::answer("v=0 own")),
        SignalMessage::ice(me.clone(), candidate(1)),
        SignalMessage::ready(me.clone()),
    ];

    for msg in own {
        let out = responder.on_message(msg).await.unwrap();
        assert!(out.is_empty(), "Own message must produce no output");
    }

    assert_eq!(responder.state(), NegotiationState::AwaitingRemoteOffer);
    assert_eq!(responder.buffered_candidates(), 0);
    assert!(!responder.has_remote_description());
    assert_eq!(transport.calls().await, calls_before);
}

#[tokio::test]
async fn test_own_ready_does_not_trigger_reoffer() {
    init_tracing();

    let (mut initiator, transport) = create_negotiator("alice", Role::Initiator);
    initiator.on_channel_ready().await.unwrap();

    let out = initiator
        .on_message(SignalMessage::ready(UserId::new("alice")))
        .await
        .unwrap();

    assert!(out.is_empty());
    assert_eq!(initiator.state(), NegotiationState::AwaitingAnswer);
    assert_eq!(transport.calls().await.len(), 1);
}
