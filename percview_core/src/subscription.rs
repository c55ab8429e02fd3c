//! Topic subscription: transport → detection buffer.
//!
//! A single task owns the receiving side of the transport and is the only
//! writer to the buffer. Each message replaces the buffer whole; nothing is
//! filtered or transformed here. The task also counts the messages it takes
//! off the topic, which is not the same as buffer replacements when a host
//! writes to the buffer directly.

use crate::buffer::DetectionBuffer;
use crate::visualizer::VisualizeError;
use percview_env::DetectionTransport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle to a running subscription task. Dropping it stops the task.
#[derive(Debug)]
pub struct SubscriptionHandle {
    topic: String,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// True once the transport has closed or the task was stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops receiving. Messages already in the buffer stay there.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Waits for the task to end (transport closed or stopped).
    pub async fn join(mut self) {
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                debug!(topic = %self.topic, "subscription task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the subscription task on the current tokio runtime.
///
/// `received` is bumped once per message, before the buffer swap, so a reader
/// that sees the new buffer also sees the count that includes it.
pub fn spawn_subscription<T>(
    transport: T,
    buffer: Arc<DetectionBuffer>,
    received: Arc<AtomicU64>,
) -> Result<SubscriptionHandle, VisualizeError>
where
    T: DetectionTransport,
{
    let runtime = Handle::try_current().map_err(|_| VisualizeError::NoRuntime)?;
    let topic = transport.topic().to_string();

    info!(topic = %topic, "subscribing to detection topic");

    let task_topic = topic.clone();
    let task = runtime.spawn(async move {
        while let Some(array) = transport.recv().await {
            let count = array.detections.len();
            received.fetch_add(1, Ordering::Release);
            let generation = buffer.replace(array.detections);
            debug!(
                topic = %task_topic,
                frame_id = array.frame_id,
                detections = count,
                generation,
                "detection buffer replaced"
            );
        }
        info!(topic = %task_topic, "detection topic closed");
    });

    Ok(SubscriptionHandle { topic, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use percview_env::{ChannelTransport, Detection, DetectionArray, GeoPosition};

    fn array(frame_id: u64, labels: &[&str]) -> DetectionArray {
        let detections = labels
            .iter()
            .map(|l| Detection::new(*l, GeoPosition::default(), 0.0, Vector3::repeat(1.0)))
            .collect();
        DetectionArray::new(frame_id, frame_id as f64 * 0.1, detections)
    }

    #[tokio::test]
    async fn test_messages_replace_buffer() {
        let (publisher, transport) = ChannelTransport::pair("/perception/obstacles", 8);
        let buffer = DetectionBuffer::shared();
        let received = Arc::new(AtomicU64::new(0));
        let handle =
            spawn_subscription(transport, Arc::clone(&buffer), Arc::clone(&received)).unwrap();
        assert_eq!(handle.topic(), "/perception/obstacles");

        publisher.publish(array(1, &["Car", "Car", "Car"])).await.unwrap();
        publisher.publish(array(2, &["Pedestrian"])).await.unwrap();
        drop(publisher);
        handle.join().await;

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.detections[0].label, "Pedestrian");
        assert_eq!(received.load(Ordering::Acquire), 2);
    }

    #[tokio::test]
    async fn test_direct_replace_is_not_a_received_message() {
        let (publisher, transport) = ChannelTransport::pair("t", 8);
        let buffer = DetectionBuffer::shared();
        let received = Arc::new(AtomicU64::new(0));
        let handle =
            spawn_subscription(transport, Arc::clone(&buffer), Arc::clone(&received)).unwrap();

        buffer.replace(Vec::new());
        buffer.replace(Vec::new());
        publisher.publish(array(1, &["Car"])).await.unwrap();
        drop(publisher);
        handle.join().await;

        assert_eq!(buffer.generation(), 3);
        assert_eq!(received.load(Ordering::Acquire), 1);
    }

    #[tokio::test]
    async fn test_empty_message_clears_buffer() {
        let (publisher, transport) = ChannelTransport::pair("t", 8);
        let buffer = DetectionBuffer::shared();
        let handle =
            spawn_subscription(transport, Arc::clone(&buffer), Arc::default()).unwrap();

        publisher.publish(array(1, &["Car"])).await.unwrap();
        publisher.publish_json(b"{ not valid").await.unwrap();
        drop(publisher);
        handle.join().await;

        assert!(buffer.is_empty());
        assert_eq!(buffer.generation(), 2);
    }

    #[tokio::test]
    async fn test_stop_ends_task() {
        let (_publisher, transport) = ChannelTransport::pair("t", 8);
        let handle =
            spawn_subscription(transport, DetectionBuffer::shared(), Arc::default()).unwrap();

        handle.stop();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(handle.is_finished());
    }

    #[test]
    fn test_requires_runtime() {
        let (_publisher, transport) = ChannelTransport::pair("t", 1);
        let err =
            spawn_subscription(transport, DetectionBuffer::shared(), Arc::default()).unwrap_err();
        assert!(matches!(err, VisualizeError::NoRuntime));
    }
}
