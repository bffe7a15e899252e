//! # Localisation types
//!
//! The pose of the vehicle (and of every point on the reference path) in the map frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A position and attitude in the map frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Pose {
    /// The position in the map frame
    pub position_m: Vector3<f64>,

    /// The attitude in the map frame. This is a quaternion that will rotate an object from the
    /// map frame into the body frame.
    pub attitude_q: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    /// Build a pose from a planar position and heading.
    pub fn from_xy_yaw(x_m: f64, y_m: f64, yaw_rad: f64) -> Self {
        Self::from_xyz_yaw(x_m, y_m, 0.0, yaw_rad)
    }

    /// Build a pose from a 3D position and heading, with zero roll and pitch.
    pub fn from_xyz_yaw(x_m: f64, y_m: f64, z_m: f64, yaw_rad: f64) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, z_m),
            attitude_q: UnitQuaternion::from_euler_angles(0.0, 0.0, yaw_rad),
        }
    }

    /// Return the heading (angle to the positive X axis) in radians, in the range [-pi, pi].
    pub fn get_heading(&self) -> f64 {
        self.attitude_q.euler_angles().2
    }

    /// The position projected onto the XY plane.
    pub fn position2(&self) -> Vector2<f64> {
        self.position_m.xy()
    }

    /// Euclidean distance between the two poses in the XY plane.
    pub fn planar_dist(&self, other: &Pose) -> f64 {
        (self.position2() - other.position2()).norm()
    }

    /// Euclidean distance between the two poses in 3D.
    pub fn dist(&self, other: &Pose) -> f64 {
        (self.position_m - other.position_m).norm()
    }
}
