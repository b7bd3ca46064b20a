use duet_core::ConnectionState;
use duet_session::{
    RelayError, SessionConfig, SessionController, SessionError, TracingTelemetrySink,
};
use std::sync::Arc;

use crate::integration::{init_tracing, options};
use crate::utils::{MockTransportFactory, TransportCall, UnavailableRelay};

#[tokio::test]
async fn test_subscribe_failure_closes_transport() {
    init_tracing();

    let factory = MockTransportFactory::new("a").with_failing_close();
    let mut controller = SessionController::new(
        SessionConfig::default(),
        Arc::new(UnavailableRelay),
        Arc::new(factory.clone()),
        Arc::new(TracingTelemetrySink),
    );

    let err = controller.start(options("alice", true)).await.unwrap_err();

    // A transport that also fails to close does not mask the relay error.
    assert!(matches!(
        err,
        SessionError::Relay(RelayError::Subscribe { .. })
    ));
    assert!(!controller.is_running());
    assert_eq!(
        controller.snapshot().connection_state,
        ConnectionState::New
    );
    assert_eq!(
        factory.last().await.calls().await.last(),
        Some(&TransportCall::Close)
    );
}
