//! PercView Core - Perception Overlay for Simulated Driving Stacks
//!
//! Turns geo-referenced perception detections into color-coded wireframe
//! boxes, once per rendered frame:
//! 1. **Buffering**: the latest detection message replaces the previous one whole
//! 2. **Classification**: semantic label → display color, total over all labels
//! 3. **Pose Composition**: northing/easting/altitude + heading → scene transform
//!
//! A frame with detections but no map origin is skipped as a whole and
//! reported once; the next frame tries again.

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod metrics;
pub mod peak;
pub mod pose;
pub mod renderer;
pub mod slot;
pub mod subscription;
pub mod visualizer;

#[cfg(feature = "visualization")]
pub mod visualization;

// Re-export key types for convenience
pub use buffer::{BufferSnapshot, DetectionBuffer};
pub use classifier::{classify, DetectionClass};
pub use config::VisualizerConfig;
pub use metrics::VisualizerMetrics;
pub use peak::PeakTracker;
pub use pose::{compose_pose, BoxPose};
pub use renderer::{RecordingRenderer, TracingRenderer};
pub use slot::OriginSlot;
pub use subscription::{spawn_subscription, SubscriptionHandle};
pub use visualizer::{PerceptionVisualizer, VisualizeError};
