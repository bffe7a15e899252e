//! Parameters structure for MpcPrep

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    params::{MpcParams, ParamsError},
    row_align::RowAlignParams,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the MPC input preparation, as found in `mpc_exec.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Controller parameters shared with the optimizer
    pub mpc: MpcParams,

    pub prep: PrepParams,

    pub row_align: RowAlignParams,
}

/// Parameters specific to the reference preparation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepParams {
    /// Distance along the global path from the nearest pose to the local goal.
    ///
    /// Units: meters
    pub global_plan_look_ahead_distance_m: f64,

    /// Turning radius of the reference curve.
    ///
    /// Units: meters
    pub turning_radius_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PrepParams {
    fn default() -> Self {
        Self {
            global_plan_look_ahead_distance_m: 2.5,
            turning_radius_m: 1.0,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.mpc.validate()?;

        if !(self.prep.turning_radius_m > 0.0) {
            return Err(ParamsError::NonPositiveTurningRadius(
                self.prep.turning_radius_m,
            ));
        }
        if !(self.prep.global_plan_look_ahead_distance_m >= 0.0) {
            return Err(ParamsError::NegativeLookAhead(
                self.prep.global_plan_look_ahead_distance_m,
            ));
        }

        Ok(())
    }
}
