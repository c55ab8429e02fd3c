//! Overlay drawing abstraction.

use crate::types::Rgba;
use nalgebra::{Isometry3, Point3, Vector3};

/// A single wireframe box request.
///
/// `transform` places the box frame in the scene; `local_offset` shifts the
/// box center inside that frame; `extents` are full edge lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeBox {
    pub transform: Isometry3<f64>,
    pub local_offset: Vector3<f64>,
    pub extents: Vector3<f64>,
    pub color: Rgba,
    pub label: String,
}

impl WireframeBox {
    /// Box center in scene coordinates.
    pub fn center(&self) -> Point3<f64> {
        self.transform * Point3::from(self.local_offset)
    }

    pub fn half_extents(&self) -> Vector3<f64> {
        self.extents * 0.5
    }
}

/// Draws wireframe boxes into whatever the host uses as a debug overlay.
///
/// Drawing is fire-and-forget: the caller never inspects the outcome, so
/// implementations report their own failures (log and move on).
pub trait OverlayRenderer {
    fn draw(&mut self, shape: &WireframeBox);

    /// Called once after the last box of a frame has been drawn.
    fn end_frame(&mut self) {}
}

impl<R: OverlayRenderer + ?Sized> OverlayRenderer for Box<R> {
    fn draw(&mut self, shape: &WireframeBox) {
        (**self).draw(shape)
    }

    fn end_frame(&mut self) {
        (**self).end_frame()
    }
}
