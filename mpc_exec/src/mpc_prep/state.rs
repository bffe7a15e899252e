//! Implementations for the MpcPrep state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, log, trace, Level};
use serde::{Deserialize, Serialize};

// Internal
use super::{MpcPrepError, Params};
use crate::{
    curve::ReedsSheppCurve,
    horizon::HorizonWindow,
    loc::Pose,
    obstacles::normalize_obstacles,
    path::ReferencePath,
    ref_interp::ReferenceInterpolator,
    row_align::{CorrectedSegment, RowAlignOutcome, RowAlignmentCorrector, VecCloud},
    types::{Ellipsoid, ObstacleRecord, VehicleState},
    viz::{Rgba, TrajMarkers, NS_READJUSTED_SEGMENT, NS_REF_STATES},
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// MPC input preparation module state
#[derive(Debug, Clone)]
pub struct MpcPrep {
    params: Params,

    interpolator: ReferenceInterpolator<ReedsSheppCurve>,

    corrector: RowAlignmentCorrector,
}

/// Input data to MpcPrep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputData {
    /// Current pose of the vehicle
    pub pose: Pose,

    /// The global path. Row alignment corrections are merged into this path.
    pub path: ReferencePath,

    /// Obstacles reported by the tracker on this cycle
    #[serde(default)]
    pub obstacles: Vec<ObstacleRecord>,

    /// Latest point cloud, if there is one
    #[serde(default)]
    pub cloud: Option<VecCloud>,
}

/// Inputs to the optimizer for this cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputData {
    /// Exactly `horizon_len` reference states
    pub ref_states: Vec<VehicleState>,

    /// Exactly `max_obstacles` obstacles, ghosts included
    pub obstacles: Vec<ObstacleRecord>,

    /// Ellipsoid for each entry of `obstacles`
    pub ellipsoids: Vec<Ellipsoid>,

    /// The segment merged into the path by row alignment, if any
    pub corrected_segment: Option<CorrectedSegment>,

    /// Markers for the reference states and the corrected segment
    pub markers: Vec<TrajMarkers>,
}

/// Status report for MpcPrep processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusReport {
    pub nearest_index: usize,

    pub local_goal_index: usize,

    /// The window could not be sized from the path and was clamped to the end of the path
    pub degenerate_window: bool,

    /// Number of obstacles from the tracker, before padding or truncation
    pub num_tracked_obstacles: usize,

    pub row_align: RowAlignStatus,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Summary of the row alignment step for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RowAlignStatus {
    /// Disabled, or no cloud this cycle
    NotRun,
    Corrected { start_index: usize, num_poses: usize },
    Misaligned { index: usize, heading_rad: f64 },
    NoCentroid,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for RowAlignStatus {
    fn default() -> Self {
        RowAlignStatus::NotRun
    }
}

impl Default for MpcPrep {
    fn default() -> Self {
        Self::build(Params::default())
    }
}

impl State for MpcPrep {
    type InitData = &'static str;
    type InitError = MpcPrepError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = MpcPrepError;

    /// Initialise the MpcPrep module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(MpcPrepError::ParamLoadError)?;

        *self = Self::with_params(params)?;

        Ok(())
    }

    /// Prepare the optimizer inputs for this cycle.
    ///
    /// Only an empty or single pose path is an error, in which case the caller should keep
    /// its previous reference.
    fn proc(
        &mut self,
        input_data: &mut Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut output = OutputData::default();
        let mut report = StatusReport::default();

        // ---- HORIZON ----

        let window = HorizonWindow::from_distance(
            &input_data.path,
            &input_data.pose,
            self.params.prep.global_plan_look_ahead_distance_m,
        )
        .map_err(MpcPrepError::PathError)?;

        report.nearest_index = window.nearest_index;
        report.local_goal_index = window.local_goal_index;
        report.degenerate_window = window.degenerate;

        log!(
            self.detail_level(),
            "Horizon window {} to {} (spacing {:.3} m)",
            window.nearest_index,
            window.local_goal_index,
            window.spacing_m
        );

        // ---- REFERENCE ----

        output.ref_states = self
            .interpolator
            .interpolate(&input_data.path, &input_data.pose, &window)
            .map_err(MpcPrepError::PathError)?;

        output.markers.push(TrajMarkers::from_states(
            &output.ref_states,
            Rgba::BLUE,
            NS_REF_STATES,
        ));

        // ---- OBSTACLES ----

        report.num_tracked_obstacles = input_data.obstacles.len();

        output.obstacles = normalize_obstacles(
            &input_data.obstacles,
            &input_data.pose,
            self.params.mpc.max_obstacles,
        );
        output.ellipsoids = output
            .obstacles
            .iter()
            .map(|o| Ellipsoid::from_obstacle(o, &input_data.pose))
            .collect();

        log!(
            self.detail_level(),
            "{} tracked obstacles normalised to {}",
            report.num_tracked_obstacles,
            output.obstacles.len()
        );

        // ---- ROW ALIGNMENT ----

        if self.params.row_align.enabled {
            match input_data.cloud {
                Some(ref cloud) => {
                    let outcome = self
                        .corrector
                        .correct(&input_data.pose, &input_data.path, cloud)
                        .map_err(MpcPrepError::PathError)?;

                    report.row_align = match outcome {
                        RowAlignOutcome::Corrected(segment) => {
                            segment
                                .apply_to(&mut input_data.path)
                                .map_err(MpcPrepError::PathError)?;

                            info!(
                                "Merged {} row aligned poses into the path",
                                segment.poses.len()
                            );

                            output.markers.push(TrajMarkers::from_states(
                                &segment.states,
                                Rgba::YELLOW,
                                NS_READJUSTED_SEGMENT,
                            ));

                            let status = RowAlignStatus::Corrected {
                                start_index: segment.start_index,
                                num_poses: segment.poses.len(),
                            };
                            output.corrected_segment = Some(segment);
                            status
                        }
                        RowAlignOutcome::Misaligned { index, heading_rad } => {
                            RowAlignStatus::Misaligned { index, heading_rad }
                        }
                        RowAlignOutcome::NoCentroid { .. } => RowAlignStatus::NoCentroid,
                    };
                }
                None => trace!("Row alignment enabled but there is no cloud this cycle"),
            }
        }

        if self.params.mpc.debug_mode {
            debug!("MpcPrep status: {:?}", report);
        }

        Ok((output, report))
    }
}

impl MpcPrep {
    /// Create the module from already loaded parameters.
    pub fn with_params(params: Params) -> Result<Self, MpcPrepError> {
        params.validate().map_err(MpcPrepError::InvalidParams)?;

        Ok(Self::build(params))
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn build(params: Params) -> Self {
        Self {
            interpolator: ReferenceInterpolator::new(
                ReedsSheppCurve::new(params.prep.turning_radius_m),
                params.mpc.horizon_len,
                params.mpc.v_max_ms,
            ),
            corrector: RowAlignmentCorrector::new(params.row_align.clone()),
            params,
        }
    }

    /// Level of the per cycle logs, raised to debug in debug mode.
    fn detail_level(&self) -> Level {
        match self.params.mpc.debug_mode {
            true => Level::Debug,
            false => Level::Trace,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{path::test::straight_path, types::GHOST_POSITION_M};
    use nalgebra::Point3;

    fn params() -> Params {
        let mut params = Params::default();
        params.mpc.horizon_len = 6;
        params.mpc.v_max_ms = 1.5;
        params.mpc.max_obstacles = 3;
        params.prep.global_plan_look_ahead_distance_m = 5.0;
        params
    }

    #[test]
    fn test_proc_straight_path() {
        let mut prep = MpcPrep::with_params(params()).unwrap();
        let mut input = InputData {
            pose: Pose::default(),
            path: straight_path(11, 1.0, 0.0),
            obstacles: Vec::new(),
            cloud: None,
        };

        let (output, report) = prep.proc(&mut input).unwrap();

        assert_eq!(report.nearest_index, 0);
        assert_eq!(report.local_goal_index, 5);
        assert!(!report.degenerate_window);
        assert_eq!(report.row_align, RowAlignStatus::NotRun);

        assert_eq!(output.ref_states.len(), 6);
        assert!(output.ref_states.iter().all(|s| s.v == 1.5));
        assert!((output.ref_states[5].x - 5.0).abs() < 1e-9);

        assert_eq!(output.obstacles.len(), 3);
        assert!(output.obstacles.iter().all(|o| o.is_ghost));
        assert!(output
            .obstacles
            .iter()
            .all(|o| o.pose.position_m.x == GHOST_POSITION_M));
        assert_eq!(output.ellipsoids, vec![Ellipsoid::default(); 3]);

        assert!(output.corrected_segment.is_none());
        assert_eq!(output.markers.len(), 1);
        assert_eq!(output.markers[0].ns, NS_REF_STATES);
    }

    #[test]
    fn test_proc_row_alignment() {
        let mut params = params();
        params.row_align.enabled = true;
        let mut prep = MpcPrep::with_params(params).unwrap();

        let cloud: VecCloud = (0..200)
            .flat_map(|i| {
                let x = i as f64 * 0.1;
                vec![Point3::new(x, 0.1, 0.0), Point3::new(x, 0.3, 0.0)]
            })
            .collect::<Vec<_>>()
            .into();

        let mut input = InputData {
            pose: Pose::default(),
            path: straight_path(20, 1.0, 0.0),
            obstacles: Vec::new(),
            cloud: Some(cloud),
        };

        let (output, report) = prep.proc(&mut input).unwrap();

        assert_eq!(
            report.row_align,
            RowAlignStatus::Corrected {
                start_index: 0,
                num_poses: 11
            }
        );
        assert!(output.corrected_segment.is_some());
        assert_eq!(output.markers.len(), 2);

        // The corrected segment was merged into the path
        for (i, p) in input.path.poses.iter().enumerate() {
            if i <= 10 {
                assert!((p.pose.position_m.y - 0.2).abs() < 1e-9);
            } else {
                assert_eq!(p.pose.position_m.y, 0.0);
            }
        }
    }

    #[test]
    fn test_proc_empty_path() {
        let mut prep = MpcPrep::with_params(params()).unwrap();
        let mut input = InputData::default();

        assert!(matches!(
            prep.proc(&mut input),
            Err(MpcPrepError::PathError(crate::path::PathError::InvalidPath))
        ));
    }

    #[test]
    fn test_invalid_params() {
        let mut params = params();
        params.mpc.horizon_len = 0;

        assert!(matches!(
            MpcPrep::with_params(params),
            Err(MpcPrepError::InvalidParams(_))
        ));
    }
}
