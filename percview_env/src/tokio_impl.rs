//! In-process topic transport backed by tokio channels.

use crate::error::EnvError;
use crate::transport::DetectionTransport;
use crate::types::DetectionArray;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Publishing end of a channel topic. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    topic: Arc<str>,
    tx: mpsc::Sender<DetectionArray>,
}

impl ChannelPublisher {
    /// Publishes a message, waiting for capacity if the topic is full.
    pub async fn publish(&self, array: DetectionArray) -> Result<(), EnvError> {
        self.tx
            .send(array)
            .await
            .map_err(|_| EnvError::closed(self.topic.as_ref()))
    }

    /// Publishes a raw JSON payload.
    ///
    /// Payloads that fail to decode are delivered as an empty array.
    pub async fn publish_json(&self, payload: &[u8]) -> Result<(), EnvError> {
        let array = DetectionArray::from_json(payload).unwrap_or_default();
        self.publish(array).await
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Subscribing end of a channel topic.
pub struct ChannelTransport {
    topic: Arc<str>,

    /// Receiver behind a tokio mutex so `recv` can take `&self`
    rx: Mutex<mpsc::Receiver<DetectionArray>>,
}

impl ChannelTransport {
    /// Creates a connected publisher/transport pair for `topic`.
    pub fn pair(topic: &str, capacity: usize) -> (ChannelPublisher, ChannelTransport) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let topic: Arc<str> = Arc::from(topic);

        (
            ChannelPublisher {
                topic: Arc::clone(&topic),
                tx,
            },
            ChannelTransport {
                topic,
                rx: Mutex::new(rx),
            },
        )
    }
}

#[async_trait]
impl DetectionTransport for ChannelTransport {
    async fn recv(&self) -> Option<DetectionArray> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }

    fn topic(&self) -> &str {
        &self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_then_recv() {
        let (publisher, transport) = ChannelTransport::pair("/perception/obstacles", 4);
        publisher
            .publish(DetectionArray::new(1, 0.1, vec![]))
            .await
            .unwrap();

        let received = transport.recv().await.unwrap();
        assert_eq!(received.frame_id, 1);
        assert_eq!(transport.topic(), "/perception/obstacles");
    }

    #[tokio::test]
    async fn test_malformed_json_becomes_empty_array() {
        let (publisher, transport) = ChannelTransport::pair("t", 4);
        publisher.publish_json(b"not json").await.unwrap();

        let received = transport.recv().await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_recv_none_after_publishers_dropped() {
        let (publisher, transport) = ChannelTransport::pair("t", 1);
        drop(publisher);
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_fails_when_transport_dropped() {
        let (publisher, transport) = ChannelTransport::pair("t", 1);
        drop(transport);

        let err = publisher.publish(DetectionArray::default()).await.unwrap_err();
        assert!(matches!(err, EnvError::TopicClosed(ref t) if t == "t"));
    }
}
