//! # Obstacle set normalisation
//!
//! The optimizer's obstacle cost has a fixed number of terms, so the tracked obstacles are
//! padded with ghosts or cut down to the nearest ones every cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use ordered_float::OrderedFloat;

use crate::{loc::Pose, types::ObstacleRecord};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Produce exactly `max_obstacles` records from the tracked `obstacles`.
///
/// - Fewer obstacles than required: all of them, in their original order, followed by
///   ghosts.
/// - At least as many as required: the nearest `max_obstacles` to `pose` in the XY plane,
///   nearest first. Obstacles at equal distances keep their original order.
///
/// The input is not modified.
pub fn normalize_obstacles(
    obstacles: &[ObstacleRecord],
    pose: &Pose,
    max_obstacles: usize,
) -> Vec<ObstacleRecord> {
    if obstacles.len() < max_obstacles {
        trace!(
            "Padding {} obstacles with {} ghosts",
            obstacles.len(),
            max_obstacles - obstacles.len()
        );

        return obstacles
            .iter()
            .cloned()
            .chain(std::iter::repeat_with(ObstacleRecord::ghost))
            .take(max_obstacles)
            .collect();
    }

    let mut by_dist: Vec<(OrderedFloat<f64>, &ObstacleRecord)> = obstacles
        .iter()
        .map(|o| (OrderedFloat(o.pose.planar_dist(pose)), o))
        .collect();

    // Stable, so ties stay in tracker order
    by_dist.sort_by_key(|(d, _)| *d);

    trace!(
        "Keeping the nearest {} of {} obstacles",
        max_obstacles,
        obstacles.len()
    );

    by_dist
        .into_iter()
        .take(max_obstacles)
        .map(|(_, o)| o.clone())
        .collect()
}
