//! Error types for the PercView environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The topic channel has no receiver (subscriber dropped or shut down)
    #[error("Topic closed: {0}")]
    TopicClosed(String),

    /// Message serialization/deserialization failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reading a configuration or origin file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Creates a topic-closed error.
    pub fn closed(topic: impl Into<String>) -> Self {
        Self::TopicClosed(topic.into())
    }
}
