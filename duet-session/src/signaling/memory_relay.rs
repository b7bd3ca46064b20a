use crate::signaling::{Relay, RelayError, RelaySubscription};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

type Subscribers = HashMap<Uuid, mpsc::UnboundedSender<Bytes>>;

/// In-process [`Relay`]. Clones share the same channels, so two sessions in
/// one process can talk through it.
#[derive(Clone, Default)]
pub struct MemoryRelay {
    channels: Arc<DashMap<String, Subscribers>>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Drops every subscription on `channel`, as a relay shutting the channel
    /// down would. Subscribers see their stream end.
    pub fn close_channel(&self, channel: &str) {
        if let Some((_, subscribers)) = self.channels.remove(channel) {
            debug!(
                "Closed channel '{}' with {} subscriber(s)",
                channel,
                subscribers.len()
            );
        }
    }
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn subscribe(&self, channel: &str) -> Result<RelaySubscription, RelayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = RelaySubscription::new(channel, rx);

        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(subscription.id(), tx);

        debug!("Subscribed {} to channel '{}'", subscription.id(), channel);
        Ok(subscription)
    }

    async fn publish(&self, channel: &str, payload: Bytes) -> Result<(), RelayError> {
        let Some(mut subscribers) = self.channels.get_mut(channel) else {
            debug!("No subscribers on channel '{}', payload dropped", channel);
            return Ok(());
        };

        subscribers.retain(|id, tx| {
            let alive = tx.send(payload.clone()).is_ok();
            if !alive {
                warn!("Dropping dead subscriber {} on channel '{}'", id, channel);
            }
            alive
        });

        Ok(())
    }

    async fn unsubscribe(&self, subscription: &RelaySubscription) {
        let channel = subscription.channel();

        if let Some(mut subscribers) = self.channels.get_mut(channel) {
            subscribers.remove(&subscription.id());
        }
        self.channels
            .remove_if(channel, |_, subscribers| subscribers.is_empty());

        debug!("Unsubscribed {} from channel '{}'", subscription.id(), channel);
    }
}
