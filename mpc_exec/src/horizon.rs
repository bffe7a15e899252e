//! # Horizon window planning
//!
//! Selects the window of the reference path the controller works on during one cycle: from
//! the pose nearest to the vehicle up to a local goal some distance (or number of waypoints)
//! further along the path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::Serialize;

use crate::{
    loc::Pose,
    path::{PathError, ReferencePath},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The local window of the reference path for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizonWindow {
    /// Index of the path pose closest to the vehicle.
    pub nearest_index: usize,

    /// Index of the local goal, always in `nearest_index..path.len()`.
    pub local_goal_index: usize,

    /// Average distance between path poses, defined as the path length divided by the number
    /// of poses. Zero when planning by waypoint count.
    ///
    /// Units: meters
    pub spacing_m: f64,

    /// Number of waypoints between the nearest pose and the local goal before clamping to
    /// the end of the path.
    pub lookahead_points: usize,

    /// True if the window could not be sized from the path and collapsed onto the final
    /// pose instead.
    pub degenerate: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HorizonWindow {
    /// Plan the window from a lookahead distance along the path.
    ///
    /// The distance is converted into a number of waypoints using the average spacing of the
    /// path. If the spacing is not positive (a single pose, or all poses coincident) the local
    /// goal collapses onto the last pose of the path.
    pub fn from_distance(
        path: &ReferencePath,
        current: &Pose,
        look_ahead_distance_m: f64,
    ) -> Result<Self, PathError> {
        let nearest_index = path.nearest_state_index(current)?;
        let last_index = path.get_num_points() - 1;

        let spacing_m = path.get_length() / path.get_num_points() as f64;

        if !(spacing_m > 0.0 && spacing_m.is_finite()) || !(look_ahead_distance_m >= 0.0) {
            warn!(
                "Degenerate horizon window (spacing {} m, lookahead {} m), using the final \
                 path pose as the local goal",
                spacing_m, look_ahead_distance_m
            );

            return Ok(Self {
                nearest_index,
                local_goal_index: last_index,
                spacing_m,
                lookahead_points: last_index - nearest_index,
                degenerate: true,
            });
        }

        // Float to int casts saturate, so a huge ratio just runs to the end of the path
        let lookahead_points = (look_ahead_distance_m / spacing_m).floor() as usize;

        Ok(Self {
            spacing_m,
            ..Self::from_points(nearest_index, lookahead_points, last_index)
        })
    }

    /// Plan the window from a fixed number of lookahead waypoints.
    pub fn from_waypoints(
        path: &ReferencePath,
        current: &Pose,
        look_ahead_waypoints: usize,
    ) -> Result<Self, PathError> {
        let nearest_index = path.nearest_state_index(current)?;

        Ok(Self::from_points(
            nearest_index,
            look_ahead_waypoints,
            path.get_num_points() - 1,
        ))
    }

    /// Number of path poses covered by the window, including both ends.
    pub fn num_points(&self) -> usize {
        self.local_goal_index - self.nearest_index + 1
    }

    /// Number of waypoints between the nearest pose and the local goal.
    pub fn gap(&self) -> usize {
        self.local_goal_index - self.nearest_index
    }

    fn from_points(nearest_index: usize, lookahead_points: usize, last_index: usize) -> Self {
        Self {
            nearest_index,
            local_goal_index: nearest_index.saturating_add(lookahead_points).min(last_index),
            spacing_m: 0.0,
            lookahead_points,
            degenerate: false,
        }
    }
}
