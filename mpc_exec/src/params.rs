//! Controller parameters
//!
//! The parameters shared between the input preparation and the optimizer. These are loaded
//! once and are immutable for the duration of a control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the MPC problem.
///
/// Missing fields in a parameter file take the values of `MpcParams::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MpcParams {
    // ---- HORIZON ----
    /// Number of timesteps in the horizon (N).
    pub horizon_len: usize,

    /// Discretisation time between timesteps, also the control cycle period.
    ///
    /// Units: seconds
    pub dt_s: f64,

    // ---- GEOMETRY ----
    /// Distance from the centre of gravity to the front axle.
    ///
    /// Units: meters
    pub l_f_m: f64,

    /// Distance from the centre of gravity to the rear axle.
    ///
    /// Units: meters
    pub l_r_m: f64,

    // ---- BOUNDS ----
    /// Units: meters/second
    pub v_min_ms: f64,
    /// Units: meters/second
    pub v_max_ms: f64,

    /// Units: meters/second^2
    pub a_min_mss: f64,
    /// Units: meters/second^2
    pub a_max_mss: f64,

    /// Front steer angle bounds.
    ///
    /// Units: radians
    pub df_min_rad: f64,
    /// Units: radians
    pub df_max_rad: f64,

    /// Jerk bounds.
    ///
    /// Units: meters/second^3
    pub a_dot_min_msss: f64,
    /// Units: meters/second^3
    pub a_dot_max_msss: f64,

    /// Front steer angle rate bounds.
    ///
    /// Units: radians/second
    pub df_dot_min_rads: f64,
    /// Units: radians/second
    pub df_dot_max_rads: f64,

    // ---- COST ----
    /// Weights on x, y, psi and v.
    pub q: Vec<f64>,

    /// Weights on jerk and steer rate.
    pub r: Vec<f64>,

    // ---- OBSTACLES ----
    /// Number of obstacles the optimizer considers (N_obs).
    pub max_obstacles: usize,

    /// Units: meters
    pub robot_radius_m: f64,

    pub obstacle_cost: f64,

    // ---- FLAGS ----
    pub full_ackerman: bool,

    /// Enables per-cycle diagnostic output.
    pub debug_mode: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("The horizon length must be greater than zero")]
    ZeroHorizon,

    #[error("The discretisation time must be positive, found {0}")]
    NonPositiveDt(f64),

    #[error("Axle distances must not be negative, found L_F = {0}, L_R = {1}")]
    NegativeAxleDistance(f64, f64),

    #[error("Bound pair {name} is not ordered: min = {min}, max = {max}")]
    UnorderedBounds {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("The maximum number of obstacles must be greater than zero")]
    ZeroMaxObstacles,

    #[error("The robot radius must be positive, found {0}")]
    NonPositiveRobotRadius(f64),

    #[error("The turning radius must be positive, found {0}")]
    NonPositiveTurningRadius(f64),

    #[error("The look ahead distance must not be negative, found {0}")]
    NegativeLookAhead(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MpcParams {
    fn default() -> Self {
        Self {
            horizon_len: 10,
            dt_s: 0.1,
            l_f_m: 0.65,
            l_r_m: 0.65,
            v_min_ms: -10.0,
            v_max_ms: 10.0,
            a_min_mss: -1.0,
            a_max_mss: 1.0,
            df_min_rad: -0.5,
            df_max_rad: 0.5,
            a_dot_min_msss: -1.0,
            a_dot_max_msss: 1.0,
            df_dot_min_rads: -0.5,
            df_dot_max_rads: 0.5,
            q: vec![100.0, 100.0, 10.0, 0.1],
            r: vec![10.0, 10.0],
            max_obstacles: 1,
            robot_radius_m: 0.5,
            obstacle_cost: 1.0,
            full_ackerman: false,
            debug_mode: true,
        }
    }
}

impl MpcParams {
    /// Check the invariants the preparation stage relies on.
    ///
    /// The lengths of `q` and `r` are owned by the optimizer and are not checked here.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.horizon_len == 0 {
            return Err(ParamsError::ZeroHorizon);
        }
        // Written this way round so that NaN is rejected too
        if !(self.dt_s > 0.0) {
            return Err(ParamsError::NonPositiveDt(self.dt_s));
        }
        if self.l_f_m < 0.0 || self.l_r_m < 0.0 {
            return Err(ParamsError::NegativeAxleDistance(self.l_f_m, self.l_r_m));
        }

        let pairs = [
            ("V", self.v_min_ms, self.v_max_ms),
            ("A", self.a_min_mss, self.a_max_mss),
            ("DF", self.df_min_rad, self.df_max_rad),
            ("A_DOT", self.a_dot_min_msss, self.a_dot_max_msss),
            ("DF_DOT", self.df_dot_min_rads, self.df_dot_max_rads),
        ];
        for &(name, min, max) in pairs.iter() {
            if !(min <= max) {
                return Err(ParamsError::UnorderedBounds { name, min, max });
            }
        }

        if self.max_obstacles == 0 {
            return Err(ParamsError::ZeroMaxObstacles);
        }
        if !(self.robot_radius_m > 0.0) {
            return Err(ParamsError::NonPositiveRobotRadius(self.robot_radius_m));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(MpcParams::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate() {
        let mut p = MpcParams::default();
        p.horizon_len = 0;
        assert_eq!(p.validate(), Err(ParamsError::ZeroHorizon));

        let mut p = MpcParams::default();
        p.dt_s = 0.0;
        assert_eq!(p.validate(), Err(ParamsError::NonPositiveDt(0.0)));

        let mut p = MpcParams::default();
        p.df_min_rad = 0.6;
        assert_eq!(
            p.validate(),
            Err(ParamsError::UnorderedBounds {
                name: "DF",
                min: 0.6,
                max: 0.5
            })
        );

        let mut p = MpcParams::default();
        p.max_obstacles = 0;
        assert_eq!(p.validate(), Err(ParamsError::ZeroMaxObstacles));
    }

    #[test]
    fn test_partial_file() {
        let p: MpcParams = util::params::from_str(
            "horizon_len = 20\n\
             v_max_ms = 1.5\n\
             max_obstacles = 4\n",
        )
        .unwrap();

        assert_eq!(p.horizon_len, 20);
        assert_eq!(p.v_max_ms, 1.5);
        assert_eq!(p.max_obstacles, 4);
        assert_eq!(p.dt_s, 0.1);
        assert_eq!(p.q, vec![100.0, 100.0, 10.0, 0.1]);
    }
}
