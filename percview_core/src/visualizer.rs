//! Frame orchestration for the perception overlay.
//!
//! Each frame:
//! 1. Snapshot the detection buffer and fold its length into the peak tracker
//! 2. For each detection, in arrival order: classify → compose pose → draw
//! 3. If there is something to draw but no map origin, abort the whole frame
//!    and report it once
//!
//! Nothing carries over between frames except the peak tracker and the
//! diagnostic counters.

use crate::buffer::DetectionBuffer;
use crate::classifier::classify;
use crate::config::VisualizerConfig;
use crate::metrics::{FrameCounters, VisualizerMetrics};
use crate::peak::PeakTracker;
use crate::pose::compose_pose;
use crate::slot::OriginSlot;
use crate::subscription::{spawn_subscription, SubscriptionHandle};
use nalgebra::Vector3;
use percview_env::{Detection, DetectionTransport, OriginResolver, OverlayRenderer, WireframeBox};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

/// Reasons a frame or setup step did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisualizeError {
    #[error(
        "Fail to visualize perception detections due to missing map origin ({pending} skipped)"
    )]
    MissingOrigin { pending: usize },

    #[error("No tokio runtime available to run the subscription")]
    NoRuntime,
}

/// Perception overlay: draws one labeled wireframe box per buffered detection.
///
/// The renderer and the origin slot are injected; the visualizer owns the
/// buffer and hands a clone of it to the subscription task.
pub struct PerceptionVisualizer<R: OverlayRenderer> {
    config: VisualizerConfig,
    renderer: R,
    origin: OriginSlot,
    buffer: Arc<DetectionBuffer>,
    peak: PeakTracker,
    counters: FrameCounters,
    received: Arc<AtomicU64>,
    subscription: Option<SubscriptionHandle>,
}

impl<R: OverlayRenderer> PerceptionVisualizer<R> {
    /// Creates a visualizer with an empty buffer.
    pub fn new(config: VisualizerConfig, renderer: R, origin: OriginSlot) -> Self {
        Self {
            config,
            renderer,
            origin,
            buffer: DetectionBuffer::shared(),
            peak: PeakTracker::new(),
            counters: FrameCounters::default(),
            received: Arc::default(),
            subscription: None,
        }
    }

    /// Starts receiving detections from `transport` into this visualizer's buffer.
    ///
    /// Replaces any previous subscription. Must be called inside a tokio runtime.
    pub fn subscribe<T: DetectionTransport>(&mut self, transport: T) -> Result<(), VisualizeError> {
        if transport.topic() != self.config.topic {
            warn!(
                expected = %self.config.topic,
                actual = %transport.topic(),
                "transport topic differs from configured topic"
            );
        }

        if let Some(previous) = self.subscription.take() {
            previous.stop();
        }
        self.subscription = Some(spawn_subscription(
            transport,
            Arc::clone(&self.buffer),
            Arc::clone(&self.received),
        )?);
        Ok(())
    }

    /// Renders one frame from `detections` against `origin`.
    ///
    /// Returns the number of boxes drawn. A missing origin with pending
    /// detections draws nothing, logs once, and returns `MissingOrigin`.
    pub fn render_frame(
        &mut self,
        detections: &[Detection],
        origin: Option<&dyn OriginResolver>,
    ) -> Result<usize, VisualizeError> {
        let peak = self.peak.update(detections.len());
        trace!(detections = detections.len(), peak, "frame start");

        let mut drawn = 0;
        for detection in detections {
            let color = classify(&detection.label);

            let Some(origin) = origin else {
                let err = VisualizeError::MissingOrigin {
                    pending: detections.len() - drawn,
                };
                error!("{}", err);
                self.counters.frames_aborted += 1;
                return Err(err);
            };

            let pose = compose_pose(detection, origin);
            self.renderer.draw(&WireframeBox {
                transform: pose.transform,
                local_offset: Vector3::zeros(),
                extents: pose.extents,
                color,
                label: detection.display_label(),
            });
            drawn += 1;
        }

        self.renderer.end_frame();
        self.counters.frames_rendered += 1;
        self.counters.boxes_drawn += drawn as u64;
        Ok(drawn)
    }

    /// Per-frame entry point for the host: reads the buffer and the origin
    /// slot once each, then renders. Never fails; returns boxes drawn.
    pub fn on_visualize(&mut self) -> usize {
        let snapshot = self.buffer.snapshot();
        let origin = self.origin.get();
        self.render_frame(&snapshot.detections, origin.as_deref())
            .unwrap_or(0)
    }

    /// Host notification that the overlay was shown or hidden.
    pub fn on_visualize_toggle(&mut self, state: bool) {
        trace!(state, "overlay toggled");
    }

    /// Peak detection count over all frames since (re)initialization.
    pub fn peak_tracked(&self) -> Option<usize> {
        self.peak.peak()
    }

    pub fn metrics(&self) -> VisualizerMetrics {
        VisualizerMetrics::from_parts(
            self.peak.peak(),
            self.counters,
            self.received.load(Ordering::Acquire),
        )
    }

    /// Clears the peak tracker and counters. The buffer and subscription stay.
    pub fn reinitialize(&mut self) {
        debug!("visualizer reinitialized");
        self.peak.reset();
        self.counters = FrameCounters::default();
    }

    /// Stops the subscription, if any.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            info!(topic = %subscription.topic(), "unsubscribing");
            subscription.stop();
        }
    }

    pub fn buffer(&self) -> &Arc<DetectionBuffer> {
        &self.buffer
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|s| !s.is_finished())
    }
}
