//! Cross-view event bus
//!
//! A broadcast channel of typed [`DataTopic`]s. Action handlers publish
//! after a successful mutation; the engine forwards received topics back
//! into the message loop as `Message::DataChanged`, where each view
//! decides whether to refresh now or mark itself stale.

use tokio::sync::broadcast;

use admiral_core::prelude::*;
use admiral_core::DataTopic;

const BUS_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DataTopic>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a topic. Having no subscribers is not an error.
    pub fn publish(&self, topic: DataTopic) {
        if self.tx.send(topic).is_err() {
            debug!("no subscribers for {topic:?}");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DataTopic> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(DataTopic::Credentials);

        assert_eq!(a.recv().await.unwrap(), DataTopic::Credentials);
        assert_eq!(b.recv().await.unwrap(), DataTopic::Credentials);
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new();
        bus.publish(DataTopic::Images);
    }
}
