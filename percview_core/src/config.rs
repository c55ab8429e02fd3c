//! Visualizer configuration.

use percview_env::EnvError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a perception overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Detection topic to subscribe to
    pub topic: String,

    /// Queue depth between transport and subscription task
    pub channel_capacity: usize,

    /// Frame rate the host drives `on_visualize` at (default: 30)
    pub tick_rate_hz: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            topic: "/apollo/perception/obstacles".to_string(),
            channel_capacity: 16,
            tick_rate_hz: 30,
        }
    }
}

impl VisualizerConfig {
    /// Loads a JSON config file. Missing fields take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Frame period in seconds.
    pub fn frame_period(&self) -> f64 {
        1.0 / self.tick_rate_hz.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = VisualizerConfig::default();
        assert_eq!(config.topic, "/apollo/perception/obstacles");
        assert_eq!(config.tick_rate_hz, 30);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: VisualizerConfig =
            serde_json::from_str(r#"{ "topic": "/sim/obstacles" }"#).unwrap();
        assert_eq!(config.topic, "/sim/obstacles");
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = VisualizerConfig::load("/nonexistent/percview.json").unwrap_err();
        assert!(matches!(err, EnvError::Io(_)));
    }

    #[test]
    fn test_load_bad_json_is_serialization_error() {
        let mut path = std::env::temp_dir();
        path.push(format!("percview_config_{}.json", std::process::id()));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"{ topic: ")
            .unwrap();

        let err = VisualizerConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, EnvError::SerializationError(_)));
    }

    #[test]
    fn test_frame_period_guards_zero_rate() {
        let config = VisualizerConfig {
            tick_rate_hz: 0,
            ..Default::default()
        };
        assert_eq!(config.frame_period(), 1.0);
    }
}
