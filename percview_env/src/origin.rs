//! Map origin abstraction: geodetic → visualization frame.

use crate::error::EnvError;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolves projected geodetic coordinates into the local visualization frame.
///
/// The visualization frame is Y-up: the map plane is X/Z and altitude is Y.
///
/// # Implementations
///
/// - **Reference**: `MapOrigin` - fixed origin with grid convergence angle
/// - **Host**: whatever the simulator scene exposes as its map origin
///
/// The resolver itself may be missing at any time; callers hold it as an
/// `Option` and must check before placing anything.
pub trait OriginResolver: Send + Sync {
    /// Converts (northing, easting) into local (x, z) in meters.
    fn geodetic_to_local(&self, northing: f64, easting: f64) -> (f64, f64);

    /// Altitude of the visualization frame's Y=0 plane above the map datum.
    fn altitude_offset(&self) -> f64;

    /// Orientation of the map origin in the visualization frame.
    ///
    /// Only its yaw (rotation about Y) is used when placing detections.
    fn frame_rotation(&self) -> UnitQuaternion<f64>;
}

/// Reference origin: a fixed northing/easting anchor in a Y-up scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOrigin {
    /// Northing of the scene origin
    pub origin_northing: f64,

    /// Easting of the scene origin
    pub origin_easting: f64,

    /// Grid convergence angle in degrees (projection north vs. scene +Z)
    pub angle: f64,

    /// Altitude of the scene's Y=0 plane
    pub altitude_offset: f64,

    /// Yaw of the origin object itself, in degrees
    pub yaw: f64,
}

impl Default for MapOrigin {
    fn default() -> Self {
        Self {
            origin_northing: 0.0,
            origin_easting: 0.0,
            angle: 0.0,
            altitude_offset: 0.0,
            yaw: 0.0,
        }
    }
}

impl MapOrigin {
    pub fn new(origin_northing: f64, origin_easting: f64) -> Self {
        Self {
            origin_northing,
            origin_easting,
            ..Default::default()
        }
    }

    pub fn with_altitude_offset(mut self, altitude_offset: f64) -> Self {
        self.altitude_offset = altitude_offset;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    /// Loads an origin from a JSON file. Missing fields take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EnvError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl OriginResolver for MapOrigin {
    fn geodetic_to_local(&self, northing: f64, easting: f64) -> (f64, f64) {
        let offset = Vector3::new(
            easting - self.origin_easting,
            0.0,
            northing - self.origin_northing,
        );

        // Undo grid convergence so projection north lines up with scene +Z
        let convergence =
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), (-self.angle).to_radians());
        let local = convergence * offset;

        (local.x, local.z)
    }

    fn altitude_offset(&self) -> f64 {
        self.altitude_offset
    }

    fn frame_rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_offset_without_convergence() {
        let origin = MapOrigin::new(100.0, 50.0);
        let (x, z) = origin.geodetic_to_local(110.0, 55.0);

        assert_relative_eq!(x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(z, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convergence_rotates_about_vertical() {
        // 90° convergence swings projection north (+Z) onto -X
        let origin = MapOrigin::new(0.0, 0.0).with_angle(90.0);
        let (x, z) = origin.geodetic_to_local(10.0, 0.0);

        assert_relative_eq!(x, -10.0, epsilon = 1e-9);
        assert_relative_eq!(z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_rotation_is_pure_yaw() {
        let origin = MapOrigin::default().with_yaw(30.0);
        let rotation = origin.frame_rotation();

        let axis = rotation.axis().unwrap();
        assert_relative_eq!(axis.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(rotation.angle(), 30f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn test_load_fills_defaults() {
        let mut file = std::env::temp_dir();
        file.push(format!("percview_origin_{}.json", std::process::id()));
        {
            let mut f = std::fs::File::create(&file).unwrap();
            f.write_all(br#"{ "origin_northing": 4140000.0, "altitude_offset": -3.5 }"#)
                .unwrap();
        }

        let origin = MapOrigin::load(&file).unwrap();
        std::fs::remove_file(&file).ok();

        assert_relative_eq!(origin.origin_northing, 4140000.0);
        assert_relative_eq!(origin.origin_easting, 0.0);
        assert_relative_eq!(origin.altitude_offset, -3.5);
    }
}
