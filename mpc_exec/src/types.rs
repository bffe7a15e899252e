//! # State types
//!
//! Plain value types exchanged with the optimizer: the kinematic vehicle state, the control
//! input, and the obstacle models.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::loc::Pose;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Position of ghost obstacles in every axis. Far outside any reachable workspace.
pub const GHOST_POSITION_M: f64 = 20_000.0;

/// Edge length of the box used as the shape of ghost obstacles.
pub const GHOST_BOX_SIZE_M: f64 = 0.1;

/// Default (sentinel) ellipsoid center in each axis.
pub const SENTINEL_ELLIPSOID_CENTER_M: f64 = 1000.0;

/// Default (sentinel) ellipsoid semi-axis length.
pub const SENTINEL_ELLIPSOID_AXIS_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic state of the vehicle, as used by the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// X position
    pub x: f64,

    /// Y position
    pub y: f64,

    /// Z position
    pub z: f64,

    /// Heading angle
    pub psi: f64,

    /// Linear velocity
    pub v: f64,
}

/// Control input computed by the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// Acceleration command
    pub acc: f64,

    /// Front steering angle command
    pub df: f64,
}

/// Elliptical obstacle model used in the optimizer's obstacle cost.
///
/// The default value is a small, static ellipsoid far away from the workspace which has no
/// effect on the cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub center: Vector2<f64>,

    /// Semi-axis lengths, both strictly positive.
    pub axes: Vector2<f64>,

    pub is_dynamic: bool,

    pub heading: f64,

    /// Bearing from the ellipsoid center to the robot, relative to `heading`, in [-pi, pi].
    pub heading_to_robot_angle: f64,
}

/// Geometric primitive types an obstacle shape may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Dimensions are `[x, y, z]` edge lengths.
    Box,

    /// Dimensions are `[radius]`.
    Sphere,

    /// Dimensions are `[height, radius]`.
    Cylinder,
}

/// Shape of a tracked obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleShape {
    pub kind: ShapeKind,
    pub dimensions: Vec<f64>,
}

/// An obstacle as reported by the tracker, or a ghost used to pad the obstacle set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRecord {
    pub pose: Pose,

    pub shape: ObstacleShape,

    pub is_dynamic: bool,

    /// True if this record is padding rather than a real obstacle.
    #[serde(default)]
    pub is_ghost: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleState {
    /// Build a state from a pose, with the given velocity.
    pub fn from_pose(pose: &Pose, v: f64) -> Self {
        Self {
            x: pose.position_m.x,
            y: pose.position_m.y,
            z: pose.position_m.z,
            psi: pose.get_heading(),
            v,
        }
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self {
            center: Vector2::new(SENTINEL_ELLIPSOID_CENTER_M, SENTINEL_ELLIPSOID_CENTER_M),
            axes: Vector2::new(SENTINEL_ELLIPSOID_AXIS_M, SENTINEL_ELLIPSOID_AXIS_M),
            is_dynamic: false,
            heading: 0.0,
            heading_to_robot_angle: 0.0,
        }
    }
}

impl Ellipsoid {
    /// Build the ellipsoid enclosing the planar footprint of an obstacle.
    ///
    /// Ghost obstacles map onto the default sentinel ellipsoid. Missing or non-positive
    /// dimensions fall back to the sentinel axis length.
    pub fn from_obstacle(obstacle: &ObstacleRecord, robot_pose: &Pose) -> Self {
        if obstacle.is_ghost {
            return Self::default();
        }

        let center = obstacle.pose.position2();
        let heading = obstacle.pose.get_heading();
        let to_robot = robot_pose.position2() - center;

        Self {
            center,
            axes: obstacle.shape.planar_semi_axes(),
            is_dynamic: obstacle.is_dynamic,
            heading,
            heading_to_robot_angle: wrap_pi(to_robot.y.atan2(to_robot.x) - heading),
        }
    }
}

impl ObstacleShape {
    /// The box used as the shape of ghost obstacles.
    pub fn ghost_box() -> Self {
        Self {
            kind: ShapeKind::Box,
            dimensions: vec![GHOST_BOX_SIZE_M; 3],
        }
    }

    /// Semi-axes of the footprint of this shape in its own XY plane.
    pub fn planar_semi_axes(&self) -> Vector2<f64> {
        let dim = |i: usize| match self.dimensions.get(i) {
            Some(&d) if d > 0.0 && d.is_finite() => Some(d),
            _ => None,
        };

        let (a, b) = match self.kind {
            ShapeKind::Box => (dim(0).map(|d| 0.5 * d), dim(1).map(|d| 0.5 * d)),
            ShapeKind::Sphere => (dim(0), dim(0)),
            ShapeKind::Cylinder => (dim(1), dim(1)),
        };

        Vector2::new(
            a.unwrap_or(SENTINEL_ELLIPSOID_AXIS_M),
            b.unwrap_or(SENTINEL_ELLIPSOID_AXIS_M),
        )
    }
}

impl ObstacleRecord {
    /// A ghost obstacle: far away, minimal box shape, static.
    pub fn ghost() -> Self {
        Self {
            pose: Pose::from_xyz_yaw(GHOST_POSITION_M, GHOST_POSITION_M, GHOST_POSITION_M, 0.0),
            shape: ObstacleShape::ghost_box(),
            is_dynamic: false,
            is_ghost: true,
        }
    }
}
