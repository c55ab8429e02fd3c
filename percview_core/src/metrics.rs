//! PercView Diagnostics
//! ====================
//!
//! Read-only measurements a telemetry collector can poll from a running
//! overlay. None of these feed back into rendering.

use serde::{Deserialize, Serialize};

/// Per-frame counters kept by the visualizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounters {
    pub frames_rendered: u64,
    pub frames_aborted: u64,
    pub boxes_drawn: u64,
}

/// Snapshot of the overlay's diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizerMetrics {
    /// Peak detection count across all frames (`None` before the first frame)
    pub peak_tracked: Option<usize>,

    /// Frames that completed (including frames with nothing to draw)
    pub frames_rendered: u64,

    /// Frames skipped because the map origin was missing
    pub frames_aborted: u64,

    /// Total wireframe boxes handed to the renderer
    pub boxes_drawn: u64,

    /// Detection messages received on the topic
    pub messages_received: u64,
}

impl VisualizerMetrics {
    pub fn from_parts(
        peak_tracked: Option<usize>,
        counters: FrameCounters,
        messages_received: u64,
    ) -> Self {
        Self {
            peak_tracked,
            frames_rendered: counters.frames_rendered,
            frames_aborted: counters.frames_aborted,
            boxes_drawn: counters.boxes_drawn,
            messages_received,
        }
    }
}
