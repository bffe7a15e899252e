//! # Command limits
//!
//! Clamping of commands into the bounds given in the controller parameters.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::{params::MpcParams, types::ControlInput};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp a linear velocity into `[v_min_ms, v_max_ms]`.
pub fn regulate_max_speed(v_ms: f64, params: &MpcParams) -> f64 {
    clamp(v_ms, params.v_min_ms, params.v_max_ms)
}

/// Clamp an optimizer output into the acceleration and steering angle bounds.
pub fn clamp_control_input(input: &ControlInput, params: &MpcParams) -> ControlInput {
    ControlInput {
        acc: clamp(input.acc, params.a_min_mss, params.a_max_mss),
        df: clamp(input.df, params.df_min_rad, params.df_max_rad),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_regulate_max_speed() {
        let params = MpcParams::default();

        assert_eq!(regulate_max_speed(25.0, &params), params.v_max_ms);
        assert_eq!(regulate_max_speed(-25.0, &params), params.v_min_ms);

        for &v in &[-10.0, -3.3, 0.0, 1.5, 10.0] {
            assert_eq!(regulate_max_speed(v, &params), v);
        }
    }

    #[test]
    fn test_clamp_control_input() {
        let params = MpcParams::default();

        let clamped = clamp_control_input(&ControlInput { acc: 3.0, df: -2.0 }, &params);
        assert_eq!(clamped.acc, params.a_max_mss);
        assert_eq!(clamped.df, params.df_min_rad);

        let input = ControlInput { acc: -0.2, df: 0.1 };
        assert_eq!(clamp_control_input(&input, &params), input);
    }
}
