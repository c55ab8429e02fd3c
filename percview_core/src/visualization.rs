//! Rerun.io overlay renderer
//!
//! Logs each frame's detections as one batch of wireframe boxes under
//! `world/detections`, on a `frame` sequence timeline.
//!
//! Enable with the `visualization` feature flag.

use percview_env::{OverlayRenderer, WireframeBox};
use rerun::{RecordingStream, RecordingStreamBuilder};
use tracing::warn;

/// Rerun-backed overlay renderer.
pub struct RerunRenderer {
    rec: RecordingStream,
    frame: i64,
    centers: Vec<[f32; 3]>,
    half_sizes: Vec<[f32; 3]>,
    quaternions: Vec<rerun::Quaternion>,
    colors: Vec<[u8; 4]>,
    labels: Vec<String>,
}

impl RerunRenderer {
    /// Create a renderer that spawns the Rerun viewer
    pub fn new(app_id: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let rec = RecordingStreamBuilder::new(app_id).spawn()?;
        Self::from_stream(rec)
    }

    fn from_stream(rec: RecordingStream) -> Result<Self, Box<dyn std::error::Error>> {
        // Scene frame is Y-up, altitude on +Y
        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Y_UP())?;

        Ok(Self {
            rec,
            frame: 0,
            centers: Vec::new(),
            half_sizes: Vec::new(),
            quaternions: Vec::new(),
            colors: Vec::new(),
            labels: Vec::new(),
        })
    }

    fn flush(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.rec.set_time_sequence("frame", self.frame);
        self.rec.log(
            "world/detections",
            &rerun::Boxes3D::from_centers_and_half_sizes(
                self.centers.drain(..),
                self.half_sizes.drain(..),
            )
            .with_quaternions(self.quaternions.drain(..))
            .with_colors(self.colors.drain(..))
            .with_labels(self.labels.drain(..))
            .with_fill_mode(rerun::FillMode::MajorWireframe),
        )?;
        Ok(())
    }
}

impl OverlayRenderer for RerunRenderer {
    fn draw(&mut self, shape: &WireframeBox) {
        let center = shape.center();
        let half = shape.half_extents();
        let q = shape.transform.rotation;

        self.centers.push([center.x as f32, center.y as f32, center.z as f32]);
        self.half_sizes.push([half.x as f32, half.y as f32, half.z as f32]);
        self.quaternions.push(rerun::Quaternion::from_xyzw([
            q.i as f32, q.j as f32, q.k as f32, q.w as f32,
        ]));
        self.colors.push(shape.color.to_array());
        self.labels.push(shape.label.clone());
    }

    fn end_frame(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to log detections to Rerun: {:?}", e);
        }
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires Rerun viewer
    fn test_renderer_creation() {
        let renderer = RerunRenderer::new("percview_test");
        assert!(renderer.is_ok());
    }
}
