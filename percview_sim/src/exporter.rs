//! JSON exporter for offline inspection of overlay runs.
//!
//! Records what was actually handed to the renderer each frame.

use percview_core::pose::yaw_degrees;
use percview_core::VisualizerMetrics;
use percview_env::WireframeBox;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// A single rendered (or aborted) frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    pub frame: u64,

    /// Simulation time in seconds
    pub time_sec: f64,

    /// Detections in the buffer when the frame ran
    pub detections: usize,

    /// True if the frame was skipped for lack of a map origin
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub aborted: bool,

    pub boxes: Vec<ExportedBox>,
}

/// A drawn wireframe box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedBox {
    pub label: String,
    pub color: String,
    pub center: [f64; 3],
    pub yaw_degrees: f64,
    pub extents: [f64; 3],
}

impl From<&WireframeBox> for ExportedBox {
    fn from(shape: &WireframeBox) -> Self {
        let center = shape.center();
        Self {
            label: shape.label.clone(),
            color: shape.color.to_string(),
            center: [center.x, center.y, center.z],
            yaw_degrees: yaw_degrees(&shape.transform.rotation),
            extents: [shape.extents.x, shape.extents.y, shape.extents.z],
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Overlay diagnostics at the end of the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<VisualizerMetrics>,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            metrics: None,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.frames.push(frame);
    }

    /// Finalizes the export. `duration_sec` is the full run length, which is
    /// one frame period past the last frame's start time.
    pub fn finalize(&mut self, metrics: VisualizerMetrics, duration_sec: f64) {
        self.metrics = Some(metrics);
        self.duration_sec = duration_sec;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
    use percview_env::Rgba;

    #[test]
    fn test_exported_box_from_wireframe() {
        let shape = WireframeBox {
            transform: Isometry3::from_parts(
                Translation3::new(1.0, 2.0, 3.0),
                UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 45f64.to_radians()),
            ),
            local_offset: Vector3::zeros(),
            extents: Vector3::new(4.0, 2.0, 2.0),
            color: Rgba::CYAN,
            label: "Bicycle #4".into(),
        };

        let exported = ExportedBox::from(&shape);
        assert_eq!(exported.center, [1.0, 2.0, 3.0]);
        assert_eq!(exported.color, "#00ffffff");
        assert!((exported.yaw_degrees - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_covers_last_frame() {
        let mut export = SimExport::new("intersection", 1);
        for frame in 0..3 {
            export.add_frame(SimFrame {
                frame,
                time_sec: frame as f64 * 0.5,
                detections: 0,
                aborted: false,
                boxes: vec![],
            });
        }
        export.finalize(VisualizerMetrics::default(), 1.5);

        assert_eq!(export.frames.last().map(|f| f.time_sec), Some(1.0));
        assert_eq!(export.duration_sec, 1.5);
        assert!(export.metrics.is_some());
    }

    #[test]
    fn test_aborted_flag_omitted_when_false() {
        let frame = SimFrame {
            frame: 0,
            time_sec: 0.0,
            detections: 0,
            aborted: false,
            boxes: vec![],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert!(json.get("aborted").is_none());
    }
}
