//! Inbound topic abstraction for detection messages.

use async_trait::async_trait;
use crate::types::DetectionArray;

/// Source of `DetectionArray` messages on a named topic.
///
/// # Implementations
///
/// - **In-process**: `ChannelTransport` (tokio mpsc)
/// - **Bridge**: any middleware subscriber that can decode the topic
///
/// # Message Flow
///
/// ```text
/// Perception                 Transport                 Overlay
///   |                           |                          |
///   |-- publish(array) -------->|                          |
///   |                           |------------------------->|-- recv() -> array
///   |                           |                          |-- buffer.replace()
/// ```
///
/// Malformed payloads are the transport's problem: it either drops them or
/// hands over an empty array. The overlay never sees a decode error.
#[async_trait]
pub trait DetectionTransport: Send + Sync + 'static {
    /// Receives the next message.
    ///
    /// # Returns
    /// * `Some(array)` - A message arrived
    /// * `None` - The topic was closed (shutdown)
    async fn recv(&self) -> Option<DetectionArray>;

    /// Name of the topic this transport is subscribed to.
    fn topic(&self) -> &str;
}
