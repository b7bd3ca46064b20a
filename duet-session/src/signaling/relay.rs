use crate::signaling::RelayError;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Broadcast channel that carries encoded negotiation messages between the
/// two participants of a room.
///
/// Delivery is best effort and unordered across publishers. Every
/// subscriber, the publisher's own subscription included, receives every
/// payload published to the channel after it subscribed.
#[async_trait]
pub trait Relay: Send + Sync + 'static {
    async fn subscribe(&self, channel: &str) -> Result<RelaySubscription, RelayError>;

    async fn publish(&self, channel: &str, payload: Bytes) -> Result<(), RelayError>;

    /// Removes the subscription. Unknown subscriptions are ignored.
    async fn unsubscribe(&self, subscription: &RelaySubscription);
}

/// Receiving end of a channel subscription.
#[derive(Debug)]
pub struct RelaySubscription {
    channel: String,
    id: Uuid,
    rx: mpsc::UnboundedReceiver<Bytes>,
}

impl RelaySubscription {
    pub fn new(channel: impl Into<String>, rx: mpsc::UnboundedReceiver<Bytes>) -> Self {
        Self {
            channel: channel.into(),
            id: Uuid::new_v4(),
            rx,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next payload, or `None` once the relay drops the channel.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Next payload if one is already queued.
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}
