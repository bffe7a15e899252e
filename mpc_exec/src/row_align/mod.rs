//! # Row alignment
//!
//! When following crop rows (or lanes) the global path can be offset from the row actually
//! seen by the vehicle. If the upcoming path segment runs along the X axis, the corrector
//! crops the live point cloud around the segment and moves the segment onto the centroid of
//! what it finds, in Y and Z.
//!
//! The corrector never edits the path itself. It returns a [`CorrectedSegment`] which the
//! owner of the path may merge back with [`CorrectedSegment::apply_to`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cloud;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{
    horizon::HorizonWindow,
    loc::Pose,
    path::{PathError, PathPose, ReferencePath},
    types::VehicleState,
};
use util::maths::rem_pi;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use cloud::{CropBox, PointCloud, VecCloud};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the row alignment corrector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowAlignParams {
    /// Run the corrector on every cycle a point cloud is available
    pub enabled: bool,

    /// Number of path poses past the nearest one making up the corrected segment
    pub look_ahead_waypoints: usize,

    /// Lateral growth of the crop box on each side
    ///
    /// Units: meters
    pub inflate_y_m: f64,

    /// Vertical growth of the crop box on each side
    ///
    /// Units: meters
    pub inflate_z_m: f64,

    /// Largest angle between a segment pose's heading and the X axis (in either direction)
    /// for the segment to count as being in a row
    ///
    /// Units: radians
    pub heading_tolerance_rad: f64,
}

/// Recenters the upcoming path segment on the live point cloud.
#[derive(Debug, Clone)]
pub struct RowAlignmentCorrector {
    params: RowAlignParams,
}

/// A recentred path segment, ready to be merged into the path it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectedSegment {
    /// Index in the path of the first pose of the segment
    pub start_index: usize,

    /// The corrected poses, in path order
    pub poses: Vec<PathPose>,

    /// The corrected poses as states, for visualisation
    pub states: Vec<VehicleState>,

    /// The part of the cloud used to find the centroid
    pub cropped: VecCloud,

    pub centroid: Point3<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The result of one correction attempt.
///
/// Only `Corrected` carries a change, the other variants mean the path should be left as it
/// is for this cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowAlignOutcome {
    Corrected(CorrectedSegment),

    /// A pose of the segment is not along the X axis, so the segment is not in a row.
    Misaligned { index: usize, heading_rad: f64 },

    /// No usable centroid, usually because the crop box was empty.
    NoCentroid { num_cropped: usize },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RowAlignParams {
    fn default() -> Self {
        Self {
            enabled: false,
            look_ahead_waypoints: 10,
            inflate_y_m: 0.3,
            inflate_z_m: 0.3,
            heading_tolerance_rad: 0.4,
        }
    }
}

impl RowAlignmentCorrector {
    pub fn new(params: RowAlignParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RowAlignParams {
        &self.params
    }

    /// Attempt to recentre the path segment ahead of `current` on the given cloud.
    ///
    /// Fails only if the path is empty.
    pub fn correct<C: PointCloud>(
        &self,
        current: &Pose,
        path: &ReferencePath,
        cloud: &C,
    ) -> Result<RowAlignOutcome, PathError> {
        let window =
            HorizonWindow::from_waypoints(path, current, self.params.look_ahead_waypoints)?;
        let segment = path.slice(window.nearest_index, window.local_goal_index)?;

        info!(
            "Row alignment on path poses {} to {}",
            window.nearest_index, window.local_goal_index
        );

        // Heading along +X or -X, the row may be driven either way
        for (i, path_pose) in segment.iter().enumerate() {
            let heading_rad = path_pose.pose.get_heading();

            if rem_pi(heading_rad).abs() > self.params.heading_tolerance_rad {
                info!(
                    "Path pose {} (heading {:.3} rad) is not in a row, no correction",
                    window.nearest_index + i,
                    heading_rad
                );
                return Ok(RowAlignOutcome::Misaligned {
                    index: window.nearest_index + i,
                    heading_rad,
                });
            }
        }

        let bounds = CropBox::enclosing(
            segment.iter().map(|p| Point3::from(p.pose.position_m)),
            Vector3::new(0.0, self.params.inflate_y_m, self.params.inflate_z_m),
        )
        .ok_or(PathError::InvalidPath)?;

        let cropped = cloud.crop_box(&bounds);

        info!(
            "Cropped {} of {} cloud points",
            cropped.num_points(),
            cloud.num_points()
        );

        let centroid = match cropped.centroid() {
            Some(c) if c.coords.iter().all(|v| v.is_finite()) => c,
            _ => {
                info!("No centroid in the cropped cloud, no correction");
                return Ok(RowAlignOutcome::NoCentroid {
                    num_cropped: cropped.num_points(),
                });
            }
        };

        let poses: Vec<PathPose> = segment
            .iter()
            .map(|p| {
                let mut p = *p;
                p.pose.position_m.y = centroid.y;
                p.pose.position_m.z = centroid.z;
                p
            })
            .collect();

        let states = poses
            .iter()
            .map(|p| VehicleState::from_pose(&p.pose, 0.0))
            .collect();

        Ok(RowAlignOutcome::Corrected(CorrectedSegment {
            start_index: window.nearest_index,
            poses,
            states,
            cropped,
            centroid,
        }))
    }
}

impl RowAlignOutcome {
    pub fn segment(&self) -> Option<&CorrectedSegment> {
        match self {
            RowAlignOutcome::Corrected(s) => Some(s),
            _ => None,
        }
    }
}

impl CorrectedSegment {
    /// Merge the segment back into `path`.
    pub fn apply_to(&self, path: &mut ReferencePath) -> Result<(), PathError> {
        path.splice(self.start_index, &self.poses)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::test::straight_path;

    /// Grid of points around a row centred on `(y, z)`, along X from -2 to 40.
    fn row_cloud(y: f64, z: f64) -> VecCloud {
        let mut points = Vec::new();
        for i in -20..=400 {
            let x = i as f64 * 0.1;
            for &dy in &[-0.1, 0.1] {
                for &dz in &[-0.05, 0.05] {
                    points.push(Point3::new(x, y + dy, z + dz));
                }
            }
        }
        points.into()
    }

    fn corrector() -> RowAlignmentCorrector {
        RowAlignmentCorrector::new(RowAlignParams::default())
    }

    #[test]
    fn test_aligned_segment_is_corrected() {
        let mut path = straight_path(30, 1.0, 0.0);
        let current = Pose::from_xy_yaw(2.1, 0.0, 0.0);
        let cloud = row_cloud(0.15, 0.05);

        let outcome = corrector().correct(&current, &path, &cloud).unwrap();
        let segment = outcome.segment().unwrap();

        assert_eq!(segment.start_index, 2);
        assert_eq!(segment.poses.len(), 11);
        assert_eq!(segment.states.len(), 11);
        assert!((segment.centroid.y - 0.15).abs() < 1e-9);
        assert!((segment.centroid.z - 0.05).abs() < 1e-9);

        segment.apply_to(&mut path).unwrap();

        for (i, p) in path.poses.iter().enumerate() {
            assert_eq!(p.pose.position_m.x, i as f64);
            if (2..=12).contains(&i) {
                assert_eq!(p.pose.position_m.y, segment.centroid.y);
                assert_eq!(p.pose.position_m.z, segment.centroid.z);
            } else {
                assert_eq!(p.pose.position_m.y, 0.0);
                assert_eq!(p.pose.position_m.z, 0.0);
            }
        }
    }

    #[test]
    fn test_misaligned_segment_aborts() {
        let mut poses: Vec<Pose> = (0..30)
            .map(|i| Pose::from_xy_yaw(i as f64, 0.0, 0.0))
            .collect();
        poses[5] = Pose::from_xy_yaw(5.0, 0.0, 1.2);
        let path: ReferencePath = poses.into();
        let before = path.clone();

        let outcome = corrector()
            .correct(&Pose::default(), &path, &row_cloud(0.2, 0.0))
            .unwrap();

        match outcome {
            RowAlignOutcome::Misaligned { index, heading_rad } => {
                assert_eq!(index, 5);
                assert!((heading_rad - 1.2).abs() < 1e-9);
            }
            o => panic!("Expected a misaligned outcome, got {:?}", o),
        }
        assert_eq!(path, before);
    }

    #[test]
    fn test_correction_is_idempotent() {
        let cloud = row_cloud(0.5, 0.0);
        let current = Pose::from_xy_yaw(0.0, 0.5, 0.0);

        let mut path: ReferencePath = (0..20)
            .map(|i| Pose::from_xy_yaw(i as f64, 0.5, 0.0))
            .collect::<Vec<_>>()
            .into();

        for _ in 0..2 {
            let before = path.clone();
            let outcome = corrector().correct(&current, &path, &cloud).unwrap();
            let segment = outcome.segment().unwrap();

            for (corrected, original) in segment.poses.iter().zip(before.poses.iter()) {
                assert!((corrected.pose.position_m.y - original.pose.position_m.y).abs() < 1e-9);
                assert!((corrected.pose.position_m.z - original.pose.position_m.z).abs() < 1e-9);
            }

            segment.apply_to(&mut path).unwrap();
        }
    }

    #[test]
    fn test_empty_crop_has_no_centroid() {
        let path = straight_path(30, 1.0, 0.0);
        let cloud = row_cloud(5.0, 0.0);

        assert_eq!(
            corrector().correct(&Pose::default(), &path, &cloud),
            Ok(RowAlignOutcome::NoCentroid { num_cropped: 0 })
        );
    }

    #[test]
    fn test_reverse_row() {
        let path: ReferencePath = (0..30)
            .map(|i| Pose::from_xy_yaw(30.0 - i as f64, 0.0, std::f64::consts::PI))
            .collect::<Vec<_>>()
            .into();
        let current = Pose::from_xy_yaw(30.0, 0.0, std::f64::consts::PI);

        let outcome = corrector()
            .correct(&current, &path, &row_cloud(-0.1, 0.0))
            .unwrap();
        let segment = outcome.segment().unwrap();

        assert_eq!(segment.start_index, 0);
        assert!((segment.centroid.y + 0.1).abs() < 1e-9);
        assert!(segment.poses.iter().all(|p| p.pose.position_m.y == segment.centroid.y));
    }

    #[test]
    fn test_reverse_row_tolerance() {
        let reverse_path = |yaw_rad: f64| -> ReferencePath {
            (0..30)
                .map(|i| Pose::from_xy_yaw(30.0 - i as f64, 0.0, yaw_rad))
                .collect::<Vec<_>>()
                .into()
        };
        let cloud = row_cloud(-0.1, 0.0);

        // 0.24 rad off -X
        let path = reverse_path(2.9);
        let outcome = corrector()
            .correct(&Pose::from_xy_yaw(30.0, 0.0, 2.9), &path, &cloud)
            .unwrap();
        assert!(outcome.segment().is_some());

        // 0.44 rad off -X
        let path = reverse_path(2.7);
        let outcome = corrector()
            .correct(&Pose::from_xy_yaw(30.0, 0.0, 2.7), &path, &cloud)
            .unwrap();
        match outcome {
            RowAlignOutcome::Misaligned { index, heading_rad } => {
                assert_eq!(index, 0);
                assert!((heading_rad - 2.7).abs() < 1e-9);
            }
            o => panic!("Expected a misaligned segment, got {:?}", o),
        }

        // Same on the other side of -X
        let path = reverse_path(-2.9);
        let outcome = corrector()
            .correct(&Pose::from_xy_yaw(30.0, 0.0, -2.9), &path, &cloud)
            .unwrap();
        assert!(outcome.segment().is_some());
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(
            corrector().correct(
                &Pose::default(),
                &ReferencePath::default(),
                &VecCloud::default()
            ),
            Err(PathError::InvalidPath)
        );
    }
}
