//! # Reference path
//!
//! The global reference path produced by an external planner, and the nearest state lookup on
//! it. The path is read-only to everything in this crate except the row alignment merge,
//! which takes it by mutable reference.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::loc::Pose;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single timestamped pose on the reference path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathPose {
    /// Time associated with this pose by the planner.
    ///
    /// Units: seconds
    #[serde(default)]
    pub stamp_s: f64,

    pub pose: Pose,
}

/// An ordered sequence of poses progressing along the route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencePath {
    pub poses: Vec<PathPose>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("The reference path is empty")]
    InvalidPath,

    #[error("The reference path needs at least 2 poses, found {0}")]
    InsufficientPath(usize),

    #[error("Path slice {start}..={end} is outside of a path with {len} poses")]
    SliceOutOfRange { start: usize, end: usize, len: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathPose {
    pub fn new(stamp_s: f64, pose: Pose) -> Self {
        Self { stamp_s, pose }
    }
}

impl From<Vec<Pose>> for ReferencePath {
    /// Build a path from untimed poses, stamping them with their index.
    fn from(poses: Vec<Pose>) -> Self {
        Self {
            poses: poses
                .into_iter()
                .enumerate()
                .map(|(i, pose)| PathPose::new(i as f64, pose))
                .collect(),
        }
    }
}

impl ReferencePath {
    pub fn new(poses: Vec<PathPose>) -> Self {
        Self { poses }
    }

    /// Get the number of poses in the path
    pub fn get_num_points(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Get the pose at the given index, if it exists.
    pub fn get(&self, index: usize) -> Option<&Pose> {
        self.poses.get(index).map(|p| &p.pose)
    }

    /// Return the length of the path in meters, defined as the sum of the (3D) distances
    /// between consecutive poses.
    ///
    /// Paths with fewer than two poses have zero length.
    pub fn get_length(&self) -> f64 {
        self.poses
            .windows(2)
            .map(|w| w[1].pose.dist(&w[0].pose))
            .sum()
    }

    /// Find the index of the pose closest to `current` in the XY plane.
    ///
    /// Ties resolve to the lowest index. An empty path gives `PathError::InvalidPath`.
    pub fn nearest_state_index(&self, current: &Pose) -> Result<usize, PathError> {
        let mut closest_index = None;
        let mut closest_dist_m = std::f64::INFINITY;

        for (i, path_pose) in self.poses.iter().enumerate() {
            let dist_m = path_pose.pose.planar_dist(current);

            if dist_m < closest_dist_m {
                closest_dist_m = dist_m;
                closest_index = Some(i);
            }
        }

        match closest_index {
            Some(i) => Ok(i),
            // Either the path is empty or every distance was NaN, in both cases there is no
            // usable pose to localise against.
            None => Err(PathError::InvalidPath),
        }
    }

    /// Get the inclusive slice of poses between `start` and `end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<&[PathPose], PathError> {
        if start > end || end >= self.poses.len() {
            return Err(PathError::SliceOutOfRange {
                start,
                end,
                len: self.poses.len(),
            });
        }

        Ok(&self.poses[start..=end])
    }

    /// Overwrite the poses starting at `start` with `segment`.
    ///
    /// The segment must fit entirely within the path.
    pub fn splice(&mut self, start: usize, segment: &[PathPose]) -> Result<(), PathError> {
        let end = start + segment.len();
        if segment.is_empty() || end > self.poses.len() {
            return Err(PathError::SliceOutOfRange {
                start,
                end: end.saturating_sub(1),
                len: self.poses.len(),
            });
        }

        self.poses[start..end].copy_from_slice(segment);

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Straight path along +X with the given number of poses, spaced `sep_m` apart.
    pub(crate) fn straight_path(num_points: usize, sep_m: f64, yaw_rad: f64) -> ReferencePath {
        (0..num_points)
            .map(|i| Pose::from_xy_yaw(i as f64 * sep_m, 0.0, yaw_rad))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_nearest_empty() {
        let path = ReferencePath::default();
        assert_eq!(
            path.nearest_state_index(&Pose::default()),
            Err(PathError::InvalidPath)
        );
    }

    #[test]
    fn test_nearest_is_minimal() {
        let path: ReferencePath = vec![
            Pose::from_xy_yaw(5.0, 5.0, 0.0),
            Pose::from_xy_yaw(1.0, -2.0, 0.0),
            Pose::from_xy_yaw(-3.0, 0.5, 0.0),
            Pose::from_xy_yaw(0.9, 1.1, 0.0),
            Pose::from_xy_yaw(4.0, -4.0, 0.0),
        ]
        .into();

        for &(x, y) in &[(0.0, 0.0), (4.5, 4.0), (-2.0, 0.0), (3.0, -3.5), (1.0, 1.0)] {
            let current = Pose::from_xy_yaw(x, y, 0.0);
            let i = path.nearest_state_index(&current).unwrap();
            let d_i = path.poses[i].pose.planar_dist(&current);

            for (j, p) in path.poses.iter().enumerate() {
                let d_j = p.pose.planar_dist(&current);
                assert!(d_i <= d_j);
                if d_i == d_j {
                    assert!(i <= j);
                }
            }
        }
    }

    #[test]
    fn test_nearest_tie_takes_first() {
        let path: ReferencePath = vec![
            Pose::from_xy_yaw(-1.0, 0.0, 0.0),
            Pose::from_xy_yaw(1.0, 0.0, 0.0),
            Pose::from_xy_yaw(0.0, 1.0, 0.0),
        ]
        .into();

        assert_eq!(path.nearest_state_index(&Pose::default()), Ok(0));
    }

    #[test]
    fn test_nearest_ignores_height() {
        let path: ReferencePath = vec![
            Pose::from_xyz_yaw(0.0, 0.0, 10.0, 0.0),
            Pose::from_xyz_yaw(0.5, 0.0, 0.0, 0.0),
        ]
        .into();

        assert_eq!(path.nearest_state_index(&Pose::default()), Ok(0));
    }

    #[test]
    fn test_length() {
        assert_eq!(straight_path(11, 1.0, 0.0).get_length(), 10.0);
        assert_eq!(straight_path(1, 1.0, 0.0).get_length(), 0.0);
        assert_eq!(ReferencePath::default().get_length(), 0.0);
    }

    #[test]
    fn test_slice_and_splice() {
        let mut path = straight_path(6, 1.0, 0.0);

        assert_eq!(path.slice(1, 3).unwrap().len(), 3);
        assert!(path.slice(3, 1).is_err());
        assert!(path.slice(2, 6).is_err());

        let replacement = vec![PathPose::new(0.0, Pose::from_xy_yaw(9.0, 9.0, 0.0)); 2];
        path.splice(4, &replacement).unwrap();
        assert_eq!(path.poses[4].pose.position_m.x, 9.0);
        assert_eq!(path.poses[5].pose.position_m.x, 9.0);
        assert_eq!(path.poses[3].pose.position_m.x, 3.0);

        assert!(path.splice(5, &replacement).is_err());
        assert!(path.splice(0, &[]).is_err());
    }
}
