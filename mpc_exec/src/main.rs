//! # MPC input preparation executable
//!
//! Runs the MPC input preparation against a recorded or generated scenario, in place of the
//! optimizer and vehicle.
//!
//! Usage: `mpc_exec [scenario.json]`
//!
//! The scenario holds the initial pose, the global path, the tracked obstacles and optionally a
//! point cloud (see `mpc_lib::mpc_prep::InputData`). If no scenario is given a straight path
//! along the X axis is used.
//!
//! Each cycle the preparation is run, its markers are saved into the session, and the simulated
//! vehicle is moved onto the second reference state. Execution stops once the vehicle reaches
//! the end of the path or after `MAX_NUM_CYCLES`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use log::{debug, info, warn};
use std::{
    env, fs, thread,
    time::{Duration, Instant},
};

// Internal
use mpc_lib::{
    limits::{clamp_control_input, regulate_max_speed},
    loc::Pose,
    mpc_prep::{InputData, MpcPrep, RowAlignStatus},
    params::MpcParams,
    path::ReferencePath,
    types::{ControlInput, VehicleState},
    viz::{TrajMarkers, VizSink},
};
use util::{
    host,
    logger::{logger_init, LevelFilter, LogLevels},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of cycles to run before giving up on reaching the goal.
const MAX_NUM_CYCLES: u64 = 2000;

/// Distance from the final path pose at which the goal counts as reached.
const GOAL_TOLERANCE_M: f64 = 0.1;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Visualisation sink saving every marker set as JSON in the session directory.
struct SessionVizSink<'a> {
    session: &'a Session,
    cycle: u64,
}

/// Simulated vehicle following the reference exactly.
struct SimVehicle {
    pose: Pose,
    v_ms: f64,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("mpc_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger. Per cycle detail is logged at DEBUG in debug mode and at TRACE
    // otherwise, so only debug mode puts it on the console.
    let log_levels = LogLevels::new(LevelFilter::Info, LevelFilter::Trace)
        .with_console_target("mpc_lib", LevelFilter::Debug)
        .with_console_target("mpc_exec", LevelFilter::Debug);
    logger_init(&log_levels, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("MPC Input Preparation Executable\n");
    info!("Running on: {}", host::platform());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    let mut mpc_prep = MpcPrep::default();
    mpc_prep
        .init("mpc_exec.toml", &session)
        .wrap_err("Failed to initialise MpcPrep")?;
    info!("MpcPrep init complete");

    let cycle_period_s = mpc_prep.params().mpc.dt_s;

    // ---- LOAD SCENARIO ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut input = match args.len() {
        1 => {
            info!("No scenario provided, using a straight path\n");
            straight_scenario()
        }
        2 => {
            info!("Loading scenario from \"{}\"", &args[1]);
            let scenario_str = fs::read_to_string(&args[1])
                .wrap_err_with(|| format!("Could not read scenario {}", &args[1]))?;
            serde_json::from_str::<InputData>(&scenario_str).wrap_err("Could not parse scenario")?
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    info!(
        "Scenario has {} path poses, {} obstacles and {}\n",
        input.path.get_num_points(),
        input.obstacles.len(),
        match input.cloud {
            Some(ref c) => format!("a cloud of {} points", c.points.len()),
            None => String::from("no cloud"),
        }
    );

    session.save("scenario.json", input.clone());

    let mut vehicle = SimVehicle {
        pose: input.pose,
        v_ms: 0.0,
    };
    let mut viz = SessionVizSink {
        session: &session,
        cycle: 0,
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut num_cycles = 0u64;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        input.pose = vehicle.pose;

        // ---- PREPARATION ----

        // Without a reference there is nothing to follow, so errors end the run
        let (output, report) = mpc_prep
            .proc(&mut input)
            .wrap_err("Error during MpcPrep processing")?;

        match report.row_align {
            RowAlignStatus::Misaligned { index, heading_rad } => debug!(
                "Path pose {} is out of row (heading {:.3} rad)",
                index, heading_rad
            ),
            RowAlignStatus::NoCentroid => warn!("Row alignment found no cloud points"),
            _ => (),
        }

        if let Some(ref segment) = output.corrected_segment {
            session.save(
                format!("row_align/cloud_{:05}.json", num_cycles),
                segment.cropped.clone(),
            );
        }

        for markers in output.markers.iter() {
            viz.publish(markers);
        }
        viz.cycle += 1;

        // ---- SIMULATED VEHICLE ----

        match output.ref_states.get(1).or_else(|| output.ref_states.first()) {
            Some(target) => vehicle.step(target, &mpc_prep.params().mpc),
            None => warn!("No reference states produced"),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period_s
            ),
        }

        // Increment cycle counter
        num_cycles += 1;

        let last_index = input.path.get_num_points().saturating_sub(1);
        let at_goal = report.local_goal_index == last_index
            && input
                .path
                .get(last_index)
                .map(|p| p.planar_dist(&vehicle.pose) < GOAL_TOLERANCE_M)
                .unwrap_or(true);

        if at_goal {
            info!("End of path reached after {} cycles, exiting", num_cycles);
            break;
        }

        if num_cycles >= MAX_NUM_CYCLES {
            warn!("Cycle limit ({}) reached before the end of the path", MAX_NUM_CYCLES);
            break;
        }
    }

    session.save("final_path.json", input.path);

    session.exit();

    Ok(())
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Straight path of 20 m along +X, starting slightly off the path.
fn straight_scenario() -> InputData {
    let path: ReferencePath = (0..=40)
        .map(|i| Pose::from_xy_yaw(i as f64 * 0.5, 0.0, 0.0))
        .collect::<Vec<_>>()
        .into();

    InputData {
        pose: Pose::from_xy_yaw(0.0, 0.3, 0.1),
        path,
        obstacles: Vec::new(),
        cloud: None,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> VizSink for SessionVizSink<'a> {
    fn publish(&mut self, markers: &TrajMarkers) {
        self.session.save(
            format!("viz/{}/{:05}.json", markers.ns, self.cycle),
            markers.clone(),
        );
    }
}

impl SimVehicle {
    /// Move onto the target state, with the speed change limited by the acceleration bounds.
    fn step(&mut self, target: &VehicleState, params: &MpcParams) {
        let cmd = clamp_control_input(
            &ControlInput {
                acc: (target.v - self.v_ms) / params.dt_s,
                df: 0.0,
            },
            params,
        );

        self.v_ms = regulate_max_speed(self.v_ms + cmd.acc * params.dt_s, params);
        self.pose = Pose::from_xy_yaw(target.x, target.y, target.psi);
    }
}
