//! Wire types for the perception topic.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geodetic position of a detection in projected map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Meters north in the map projection
    pub northing: f64,

    /// Meters east in the map projection
    pub easting: f64,

    /// Meters above the map datum
    pub altitude: f64,
}

impl GeoPosition {
    pub fn new(northing: f64, easting: f64, altitude: f64) -> Self {
        Self {
            northing,
            easting,
            altitude,
        }
    }
}

/// One perceived object reported by the upstream perception stack.
///
/// Detections are immutable once received; the overlay never edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Semantic class tag ("Car", "Pedestrian", ...). Open-ended.
    pub label: String,

    /// Geodetic position of the box center
    pub gps: GeoPosition,

    /// Heading in degrees, relative to the map frame
    pub heading: f64,

    /// Box extents [x, y, z] in meters
    pub scale: Vector3<f64>,

    /// Upstream track id, if the producer assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,

    /// Upstream confidence, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Detection {
    /// Creates a detection without id or score.
    pub fn new(
        label: impl Into<String>,
        gps: GeoPosition,
        heading: f64,
        scale: Vector3<f64>,
    ) -> Self {
        Self {
            label: label.into(),
            gps,
            heading,
            scale,
            id: None,
            score: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// Text shown next to the box: label, plus track id when known.
    pub fn display_label(&self) -> String {
        match self.id {
            Some(id) => format!("{} #{}", self.label, id),
            None => self.label.clone(),
        }
    }
}

/// A full message on the detection topic.
///
/// An empty `detections` list is a valid message and clears the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionArray {
    /// Producer frame counter
    #[serde(default)]
    pub frame_id: u64,

    /// Producer timestamp in seconds
    #[serde(default)]
    pub timestamp: f64,

    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl DetectionArray {
    pub fn new(frame_id: u64, timestamp: f64, detections: Vec<Detection>) -> Self {
        Self {
            frame_id,
            timestamp,
            detections,
        }
    }

    /// Parses a JSON-encoded message.
    pub fn from_json(data: &[u8]) -> Result<Self, crate::EnvError> {
        Ok(serde_json::from_slice(data)?)
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// 8-bit RGBA display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const GREEN: Rgba = Rgba::from_rgb(0, 255, 0);
    /// Matches the host engine's "yellow" (1.0, 0.92, 0.016)
    pub const YELLOW: Rgba = Rgba::from_rgb(255, 235, 4);
    pub const CYAN: Rgba = Rgba::from_rgb(0, 255, 255);
    pub const MAGENTA: Rgba = Rgba::from_rgb(255, 0, 255);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn to_array(self) -> [u8; 4] {
        self.0
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_array_from_json() {
        let json = br#"{
            "frame_id": 7,
            "timestamp": 1.25,
            "detections": [
                {
                    "label": "Car",
                    "gps": { "northing": 4140000.5, "easting": 587000.25, "altitude": 12.0 },
                    "heading": 45.0,
                    "scale": [4.5, 1.8, 1.6],
                    "id": 3
                }
            ]
        }"#;

        let array = DetectionArray::from_json(json).unwrap();
        assert_eq!(array.frame_id, 7);
        assert_eq!(array.len(), 1);
        assert_eq!(array.detections[0].label, "Car");
        assert_eq!(array.detections[0].id, Some(3));
        assert_eq!(array.detections[0].score, None);
        assert_eq!(array.detections[0].scale, Vector3::new(4.5, 1.8, 1.6));
    }

    #[test]
    fn test_missing_detections_is_empty_message() {
        let array = DetectionArray::from_json(b"{}").unwrap();
        assert!(array.is_empty());
    }

    #[test]
    fn test_display_label() {
        let d = Detection::new("Pedestrian", GeoPosition::default(), 0.0, Vector3::zeros());
        assert_eq!(d.display_label(), "Pedestrian");
        assert_eq!(d.with_id(12).display_label(), "Pedestrian #12");
    }

    #[test]
    fn test_rgba_display() {
        assert_eq!(Rgba::MAGENTA.to_string(), "#ff00ffff");
    }

    #[test]
    fn test_display_colors_are_opaque() {
        for color in [Rgba::GREEN, Rgba::YELLOW, Rgba::CYAN, Rgba::MAGENTA] {
            assert_eq!(color.to_array()[3], 255);
        }
        assert_eq!(Rgba::YELLOW.to_array(), [255, 235, 4, 255]);
    }
}
