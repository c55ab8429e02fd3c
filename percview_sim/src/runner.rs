//! Scenario runner: feed → topic → overlay, one frame per tick.
//!
//! Every tick publishes one message, waits until the subscription has swapped
//! it into the buffer, then renders a frame. After each frame the runner
//! checks what the overlay did against what was published:
//! - frames with an origin draw exactly one box per detection
//! - frames without an origin (and something to draw) abort and draw nothing
//! - the peak tracker equals the largest message seen so far

use crate::exporter::{ExportedBox, SimExport, SimFrame};
use crate::feed::PerceptionFeed;
use crate::scenarios::ScenarioId;
use percview_core::{
    DetectionBuffer, OriginSlot, PerceptionVisualizer, RecordingRenderer, VisualizeError,
    VisualizerConfig, VisualizerMetrics,
};
use percview_env::{
    ChannelTransport, EnvError, GeoPosition, MapOrigin, OriginResolver, OverlayRenderer,
    WireframeBox,
};
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long to wait for the subscription to pick up a published message.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors that stop a run outright (as opposed to failed checks).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    #[error("Visualizer error: {0}")]
    Visualize(#[from] VisualizeError),

    #[error("Message for frame {0} was never delivered to the buffer")]
    Stalled(u64),
}

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub scenario: ScenarioId,
    pub seed: u64,
    pub duration_secs: f64,
    pub visualizer: VisualizerConfig,
    pub origin: MapOrigin,

    /// Frames with no map origin; defaults to the scenario's own window
    pub dropout: Option<Range<u64>>,

    /// Sleep one frame period between ticks
    pub realtime: bool,

    /// Keep per-frame box data for export
    pub export: bool,
}

impl RunConfig {
    pub fn new(scenario: ScenarioId, seed: u64) -> Self {
        Self {
            scenario,
            seed,
            duration_secs: 5.0,
            visualizer: VisualizerConfig::default(),
            origin: MapOrigin::new(4_140_000.0, 587_000.0),
            dropout: scenario.origin_dropout(),
            realtime: false,
            export: false,
        }
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn total_frames(&self) -> u64 {
        (self.duration_secs * self.visualizer.tick_rate_hz as f64).max(0.0) as u64
    }
}

/// Result of a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub scenario: ScenarioId,
    pub seed: u64,
    pub passed: bool,
    pub total_frames: u64,
    pub metrics: VisualizerMetrics,
    pub failure_reason: Option<String>,
    pub export: Option<SimExport>,
}

/// Renderer used by the harness: records the last frame for checks and
/// export, and optionally mirrors every call to a second renderer.
pub struct HarnessRenderer {
    recorder: RecordingRenderer,
    mirror: Option<Box<dyn OverlayRenderer>>,
}

impl HarnessRenderer {
    pub fn new(mirror: Option<Box<dyn OverlayRenderer>>) -> Self {
        Self {
            recorder: RecordingRenderer::with_history(1),
            mirror,
        }
    }

    pub fn last_frame(&self) -> Option<&[WireframeBox]> {
        self.recorder.last_frame()
    }
}

impl OverlayRenderer for HarnessRenderer {
    fn draw(&mut self, shape: &WireframeBox) {
        self.recorder.draw(shape);
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.draw(shape);
        }
    }

    fn end_frame(&mut self) {
        self.recorder.end_frame();
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.end_frame();
        }
    }
}

async fn wait_for_delivery(
    buffer: &DetectionBuffer,
    generation: u64,
    frame: u64,
) -> Result<(), SimError> {
    let delivered = async {
        while buffer.generation() < generation {
            tokio::task::yield_now().await;
        }
    };
    tokio::time::timeout(DELIVERY_TIMEOUT, delivered)
        .await
        .map_err(|_| SimError::Stalled(frame))
}

/// Runs one scenario to completion.
pub async fn run_scenario(
    config: RunConfig,
    mirror: Option<Box<dyn OverlayRenderer>>,
) -> Result<ScenarioResult, SimError> {
    let scenario = config.scenario;
    let total_frames = config.total_frames();
    let dt = config.visualizer.frame_period();
    let origin: Arc<dyn OriginResolver> = Arc::new(config.origin.clone());

    let (publisher, transport) =
        ChannelTransport::pair(&config.visualizer.topic, config.visualizer.channel_capacity);
    let slot = OriginSlot::empty();
    slot.set(Arc::clone(&origin));

    let mut viz = PerceptionVisualizer::new(
        config.visualizer.clone(),
        HarnessRenderer::new(mirror),
        slot.clone(),
    );
    viz.subscribe(transport)?;

    let anchor = GeoPosition::new(
        config.origin.origin_northing,
        config.origin.origin_easting,
        config.origin.altitude_offset,
    );
    let mut feed = PerceptionFeed::new(scenario, config.seed, anchor);
    let mut export = config.export.then(|| SimExport::new(scenario.name(), config.seed));

    info!(
        scenario = scenario.name(),
        seed = config.seed,
        frames = total_frames,
        "starting run"
    );

    let mut failure: Option<String> = None;
    let mut running_max = 0usize;

    for frame in 0..total_frames {
        let array = feed.next_array(dt);
        let time_sec = array.timestamp;
        let published = array.len();
        publisher.publish(array).await?;
        wait_for_delivery(viz.buffer(), frame + 1, frame).await?;

        let in_dropout = config.dropout.as_ref().is_some_and(|w| w.contains(&frame));
        if in_dropout {
            slot.clear();
        } else if !slot.is_set() {
            debug!(frame, "map origin restored");
            slot.set(Arc::clone(&origin));
        }

        let aborted_before = viz.metrics().frames_aborted;
        let drawn = viz.on_visualize();
        let aborted = viz.metrics().frames_aborted > aborted_before;
        running_max = running_max.max(published);

        if failure.is_none() {
            failure = check_frame(
                frame,
                published,
                drawn,
                aborted,
                in_dropout,
                running_max,
                viz.peak_tracked(),
            );
            if let Some(reason) = &failure {
                warn!(frame, "{}", reason);
            }
        }

        if let Some(export) = export.as_mut() {
            let boxes = if aborted {
                Vec::new()
            } else {
                viz.renderer()
                    .last_frame()
                    .map(|f| f.iter().map(ExportedBox::from).collect())
                    .unwrap_or_default()
            };
            export.add_frame(SimFrame {
                frame,
                time_sec,
                detections: published,
                aborted,
                boxes,
            });
        }

        if frame % 30 == 0 {
            debug!(
                "  t={:.1}s | detections={} | drawn={} | peak={:?}",
                time_sec,
                published,
                drawn,
                viz.peak_tracked()
            );
        }

        if config.realtime {
            tokio::time::sleep(Duration::from_secs_f64(dt)).await;
        }
    }

    drop(publisher);
    viz.shutdown();

    let metrics = viz.metrics();
    if let Some(export) = export.as_mut() {
        export.finalize(metrics.clone(), total_frames as f64 * dt);
    }

    Ok(ScenarioResult {
        scenario,
        seed: config.seed,
        passed: failure.is_none(),
        total_frames,
        metrics,
        failure_reason: failure,
        export,
    })
}

fn check_frame(
    frame: u64,
    published: usize,
    drawn: usize,
    aborted: bool,
    in_dropout: bool,
    running_max: usize,
    peak: Option<usize>,
) -> Option<String> {
    if aborted && drawn != 0 {
        return Some(format!("frame {}: aborted but drew {} boxes", frame, drawn));
    }
    if !aborted && drawn != published {
        return Some(format!("frame {}: drew {} of {} detections", frame, drawn, published));
    }
    if in_dropout && published > 0 && !aborted {
        return Some(format!("frame {}: rendered without a map origin", frame));
    }
    if !in_dropout && aborted {
        return Some(format!("frame {}: aborted with a map origin present", frame));
    }
    if peak != Some(running_max) {
        return Some(format!(
            "frame {}: peak {:?} but largest message was {}",
            frame, peak, running_max
        ));
    }
    None
}
