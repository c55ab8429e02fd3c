//! Pose composition: geodetic detection → rigid transform in the scene.
//!
//! The scene is Y-up. Position comes from the origin's northing/easting
//! projection plus `altitude - altitude_offset`; rotation is yaw-only
//! (`heading + origin yaw`) about +Y. Detections are assumed upright, so
//! pitch and roll are always zero. Extents pass through untouched.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use percview_env::{Detection, OriginResolver};

/// Where and how large to draw one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxPose {
    pub transform: Isometry3<f64>,

    /// Composed yaw in degrees (heading + origin yaw), not normalised
    pub yaw_degrees: f64,

    /// Full box extents, copied from the detection's scale
    pub extents: Vector3<f64>,
}

impl BoxPose {
    pub fn position(&self) -> Vector3<f64> {
        self.transform.translation.vector
    }
}

/// Yaw of `rotation` about +Y, in degrees.
///
/// Taken from where the rotation sends the scene's forward axis (+Z), so any
/// pitch or roll in the origin is ignored rather than leaking into the yaw.
pub fn yaw_degrees(rotation: &UnitQuaternion<f64>) -> f64 {
    let forward = rotation * Vector3::z();
    forward.x.atan2(forward.z).to_degrees()
}

/// Composes the scene transform for `detection` relative to `origin`.
pub fn compose_pose<O>(detection: &Detection, origin: &O) -> BoxPose
where
    O: OriginResolver + ?Sized,
{
    let (x, z) = origin.geodetic_to_local(detection.gps.northing, detection.gps.easting);
    let y = detection.gps.altitude - origin.altitude_offset();

    let yaw = detection.heading + yaw_degrees(&origin.frame_rotation());
    let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw.to_radians());

    BoxPose {
        transform: Isometry3::from_parts(Translation3::new(x, y, z), rotation),
        yaw_degrees: yaw,
        extents: detection.scale,
    }
}
