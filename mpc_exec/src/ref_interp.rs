//! # Reference interpolator
//!
//! Turns the current horizon window into exactly `horizon_len` reference states for the
//! optimizer, by joining two anchor poses with a curvature bounded curve and sampling it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use crate::{
    curve::{CurvePose, PlanarCurve, ReedsSheppCurve},
    horizon::HorizonWindow,
    loc::Pose,
    path::{PathError, ReferencePath},
    types::VehicleState,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Builds the fixed length reference trajectory for each cycle.
#[derive(Debug, Clone)]
pub struct ReferenceInterpolator<C = ReedsSheppCurve> {
    curve: C,

    /// Number of states to produce
    horizon_len: usize,

    /// Speed given to every reference state
    ///
    /// Units: meters/second
    ref_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C: PlanarCurve> ReferenceInterpolator<C> {
    pub fn new(curve: C, horizon_len: usize, ref_speed_ms: f64) -> Self {
        Self {
            curve,
            horizon_len,
            ref_speed_ms,
        }
    }

    pub fn horizon_len(&self) -> usize {
        self.horizon_len
    }

    /// Pick the two anchors of the reference curve.
    ///
    /// If the window is shorter than the horizon the vehicle's own pose is the better start,
    /// otherwise the nearest path pose is used. The goal is always the window's local goal.
    pub fn anchors(
        &self,
        path: &ReferencePath,
        current: &Pose,
        window: &HorizonWindow,
    ) -> Result<(Pose, Pose), PathError> {
        if path.get_num_points() < 2 {
            return Err(PathError::InsufficientPath(path.get_num_points()));
        }

        let start = if window.gap() < self.horizon_len {
            *current
        } else {
            *path
                .get(window.nearest_index)
                .ok_or(PathError::InsufficientPath(path.get_num_points()))?
        };

        let goal = *path
            .get(window.local_goal_index)
            .ok_or(PathError::InsufficientPath(path.get_num_points()))?;

        Ok((start, goal))
    }

    /// Compute the reference states for this cycle.
    ///
    /// The output always holds exactly `horizon_len` states, all at the reference speed and
    /// zero height.
    pub fn interpolate(
        &self,
        path: &ReferencePath,
        current: &Pose,
        window: &HorizonWindow,
    ) -> Result<Vec<VehicleState>, PathError> {
        let (start, goal) = self.anchors(path, current, window)?;

        trace!(
            "Interpolating {} states from {:?} to {:?}",
            self.horizon_len,
            start.position_m.as_slice(),
            goal.position_m.as_slice()
        );

        Ok(self
            .curve
            .interpolate(
                &CurvePose::from_pose(&start),
                &CurvePose::from_pose(&goal),
                self.horizon_len,
            )
            .into_iter()
            .map(|p| VehicleState {
                x: p.x,
                y: p.y,
                z: 0.0,
                psi: p.yaw,
                v: self.ref_speed_ms,
            })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::straight_path;

    fn interpolator(horizon_len: usize) -> ReferenceInterpolator {
        ReferenceInterpolator::new(ReedsSheppCurve::new(1.0), horizon_len, 2.5)
    }

    #[test]
    fn test_straight_reference() {
        let path = straight_path(11, 1.0, 0.0);
        let current = Pose::default();
        let window = HorizonWindow::from_distance(&path, &current, 5.0).unwrap();

        let states = interpolator(6).interpolate(&path, &current, &window).unwrap();

        assert_eq!(states.len(), 6);
        for (j, s) in states.iter().enumerate() {
            assert!((s.x - j as f64).abs() < 1e-9);
            assert!(s.y.abs() < 1e-9);
            assert_eq!(s.z, 0.0);
            assert_eq!(s.v, 2.5);
        }
    }

    #[test]
    fn test_output_length() {
        let path: ReferencePath = vec![
            Pose::from_xy_yaw(0.0, 0.0, 0.0),
            Pose::from_xy_yaw(1.0, 0.5, 0.4),
            Pose::from_xy_yaw(2.0, 1.5, 0.9),
            Pose::from_xy_yaw(2.5, 3.0, 1.4),
        ]
        .into();
        let current = Pose::from_xy_yaw(0.1, -0.2, 0.1);

        for n in 2..20 {
            let window = HorizonWindow::from_distance(&path, &current, 2.0).unwrap();
            let states = interpolator(n).interpolate(&path, &current, &window).unwrap();
            assert_eq!(states.len(), n);
        }
    }

    #[test]
    fn test_anchor_selection() {
        let path = straight_path(30, 1.0, 0.0);
        let current = Pose::from_xy_yaw(2.2, 0.3, 0.0);

        // Short window, start from the vehicle
        let window = HorizonWindow::from_waypoints(&path, &current, 5).unwrap();
        let (start, goal) = interpolator(10).anchors(&path, &current, &window).unwrap();
        assert_eq!(start, current);
        assert_eq!(goal.position_m.x, 7.0);

        // Long window, start from the path
        let window = HorizonWindow::from_waypoints(&path, &current, 12).unwrap();
        let (start, goal) = interpolator(10).anchors(&path, &current, &window).unwrap();
        assert_eq!(start.position_m.x, 2.0);
        assert_eq!(start.position_m.y, 0.0);
        assert_eq!(goal.position_m.x, 14.0);
    }

    #[test]
    fn test_last_state_reaches_goal() {
        let path: ReferencePath = vec![
            Pose::from_xy_yaw(0.0, 0.0, 0.0),
            Pose::from_xy_yaw(3.0, 2.0, 1.2),
        ]
        .into();
        let current = Pose::default();
        let window = HorizonWindow::from_waypoints(&path, &current, 1).unwrap();

        let states = interpolator(8).interpolate(&path, &current, &window).unwrap();
        let last = states[7];
        assert!((last.x - 3.0).abs() < 1e-6);
        assert!((last.y - 2.0).abs() < 1e-6);
        assert!((last.psi - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_single_state() {
        // At the end of the path the window is empty, so the vehicle pose is the only anchor
        let path = straight_path(11, 1.0, 0.0);
        let current = Pose::from_xy_yaw(10.0, 0.2, 0.0);
        let window = HorizonWindow::from_distance(&path, &current, 5.0).unwrap();
        assert_eq!(window.gap(), 0);

        let states = interpolator(1).interpolate(&path, &current, &window).unwrap();
        assert_eq!(states.len(), 1);
        assert!((states[0].y - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_path() {
        let path = straight_path(1, 1.0, 0.0);
        let current = Pose::default();
        let window = HorizonWindow::from_distance(&path, &current, 5.0).unwrap();

        assert_eq!(
            interpolator(10).interpolate(&path, &current, &window),
            Err(PathError::InsufficientPath(1))
        );
    }
}
