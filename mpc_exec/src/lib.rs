//! # MPC library.
//!
//! Preparation of the inputs of a model predictive controller for a car-like vehicle: the
//! reference trajectory over the horizon, the fixed size obstacle set, and row alignment of the
//! global path. This library allows the executable and benchmarks in the workspace to access
//! items defined inside the MPC crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Planar curves joining two poses, used to build the reference
pub mod curve;

/// Horizon window planning - picks the part of the path the controller works on this cycle
pub mod horizon;

/// Command limits - clamps velocities and control inputs into the configured bounds
pub mod limits;

/// Localisation types - the pose of the vehicle
pub mod loc;

/// MPC input preparation module - runs the whole preparation pipeline each cycle
pub mod mpc_prep;

/// Obstacle set normalisation - pads or truncates the tracked obstacles to a fixed count
pub mod obstacles;

/// Controller parameters shared with the optimizer
pub mod params;

/// The global reference path and nearest state lookup
pub mod path;

/// Reference interpolation - builds the fixed length reference trajectory
pub mod ref_interp;

/// Row alignment - recentres the path on crop rows seen in the point cloud
pub mod row_align;

/// State types exchanged with the optimizer
pub mod types;

/// Visualisation markers
pub mod viz;
