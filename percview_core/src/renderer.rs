//! Built-in overlay renderers that need no graphics backend.

use percview_env::{OverlayRenderer, WireframeBox};
use std::collections::VecDeque;
use tracing::trace;

/// Keeps every drawn box in memory, grouped by frame.
///
/// Used by the exporter and by tests. With a history limit, the oldest
/// frames are dropped first.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: VecDeque<Vec<WireframeBox>>,
    pending: Vec<WireframeBox>,
    history: Option<usize>,
    total_draws: u64,
}

impl RecordingRenderer {
    /// Creates a renderer that keeps all frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer that keeps only the last `frames` frames.
    pub fn with_history(frames: usize) -> Self {
        Self {
            history: Some(frames.max(1)),
            ..Default::default()
        }
    }

    /// Completed frames, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &[WireframeBox]> {
        self.frames.iter().map(Vec::as_slice)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn last_frame(&self) -> Option<&[WireframeBox]> {
        self.frames.back().map(Vec::as_slice)
    }

    /// Every draw call ever made, including ones evicted from history.
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }
}

impl OverlayRenderer for RecordingRenderer {
    fn draw(&mut self, shape: &WireframeBox) {
        self.total_draws += 1;
        self.pending.push(shape.clone());
    }

    fn end_frame(&mut self) {
        self.frames.push_back(std::mem::take(&mut self.pending));
        if let Some(limit) = self.history {
            while self.frames.len() > limit {
                self.frames.pop_front();
            }
        }
    }
}

/// Writes each box to the `tracing` log at TRACE level.
///
/// The simulator mirrors every frame into one of these when no viewer is
/// attached, so `RUST_LOG=trace` shows what would have been drawn.
#[derive(Debug, Default)]
pub struct TracingRenderer {
    draws: u64,
}

impl TracingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl OverlayRenderer for TracingRenderer {
    fn draw(&mut self, shape: &WireframeBox) {
        self.draws += 1;
        let center = shape.center();
        trace!(
            label = %shape.label,
            color = %shape.color,
            x = center.x,
            y = center.y,
            z = center.z,
            "wireframe box"
        );
    }
}
