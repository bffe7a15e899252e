//! # Planar curves
//!
//! Curves joining two planar poses, sampled into a fixed number of states. The reference
//! interpolator uses these to turn a pair of anchors into the horizon's reference states.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod reeds_shepp;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::loc::Pose;
use util::maths::{get_ang_dist, wrap_pi};

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use reeds_shepp::ReedsSheppCurve;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose in the plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CurvePose {
    pub x: f64,
    pub y: f64,

    /// Heading in `(-pi, pi]`.
    pub yaw: f64,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A curve family which can join any two planar poses.
pub trait PlanarCurve {
    /// Sample `count` poses uniformly in curve parameter, the `j`th pose being at fraction
    /// `j / (count - 1)` of the curve from `start` to `goal`.
    ///
    /// A count of 1 gives only `start`, a count of 0 gives nothing.
    fn interpolate(&self, start: &CurvePose, goal: &CurvePose, count: usize) -> Vec<CurvePose>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CurvePose {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self {
            x,
            y,
            yaw: wrap_pi(yaw),
        }
    }

    /// Project a pose onto the plane.
    pub fn from_pose(pose: &Pose) -> Self {
        Self::new(pose.position_m.x, pose.position_m.y, pose.get_heading())
    }
}

/// Sample poses on the straight blend between `start` and `goal`.
///
/// Positions are blended linearly and the heading turns through the shortest angle. This
/// does not respect any turning radius and is only used when no proper curve can be found.
pub fn blend_linear(start: &CurvePose, goal: &CurvePose, count: usize) -> Vec<CurvePose> {
    match count {
        0 => Vec::new(),
        1 => vec![*start],
        _ => {
            let dyaw = get_ang_dist(start.yaw, goal.yaw);

            (0..count)
                .map(|j| {
                    let frac = j as f64 / (count - 1) as f64;
                    CurvePose::new(
                        start.x + frac * (goal.x - start.x),
                        start.y + frac * (goal.y - start.y),
                        start.yaw + frac * dyaw,
                    )
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_blend_linear() {
        let start = CurvePose::new(0.0, 0.0, 3.0);
        let goal = CurvePose::new(4.0, -2.0, -3.0);

        let poses = blend_linear(&start, &goal, 5);
        assert_eq!(poses.len(), 5);
        assert_eq!((poses[0].x, poses[0].y), (0.0, 0.0));
        assert!((poses[0].yaw - 3.0).abs() < 1e-12);
        assert!((poses[4].x - 4.0).abs() < 1e-12);
        assert!((poses[4].y + 2.0).abs() < 1e-12);
        assert!(get_ang_dist(poses[4].yaw, -3.0).abs() < 1e-12);

        // Shortest way round passes through pi, not through 0
        assert!(poses[2].yaw.abs() > 3.0);
        assert!((poses[2].x - 2.0).abs() < 1e-12);

        assert_eq!(blend_linear(&start, &goal, 1), vec![start]);
        assert!(blend_linear(&start, &goal, 0).is_empty());
    }
}
