//! # MPC input preparation module
//!
//! Runs once per control cycle, turning the latest pose, global path, tracked obstacles and
//! (optionally) point cloud into the fixed size inputs of the optimizer:
//!
//! 1. Plan the horizon window on the global path.
//! 2. Interpolate the reference states over the window.
//! 3. Normalise the obstacle set and build the obstacle ellipsoids.
//! 4. If row alignment is enabled and a cloud is available, recentre the upcoming path
//!    segment on the cloud and merge it into the path for the next cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use crate::{params::ParamsError, path::PathError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MpcPrep operation.
#[derive(Debug, thiserror::Error)]
pub enum MpcPrepError {
    #[error("Could not load the MpcPrep parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid MpcPrep parameters: {0}")]
    InvalidParams(ParamsError),

    #[error("Cannot build the reference for this cycle: {0}")]
    PathError(PathError),
}
