//! # Visualisation
//!
//! Marker sets describing reference trajectories, for whatever renders them. Rendering and
//! transport are up to the [`VizSink`] implementation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::Serialize;

use crate::{loc::Pose, types::VehicleState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Height given to markers of states with no height.
pub const DEFAULT_MARKER_HEIGHT_M: f64 = 1.3;

/// Namespace of the markers showing the interpolated reference states.
pub const NS_REF_STATES: &str = "interpolated_ref_states";

/// Namespace of the markers showing the row aligned path segment.
pub const NS_READJUSTED_SEGMENT: &str = "readjusted_segment";

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which can display marker sets.
pub trait VizSink {
    fn publish(&mut self, markers: &TrajMarkers);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// An arrow at a state, pointing along its heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub id: usize,
    pub pose: Pose,

    /// Arrow length, width and height
    pub scale: Vector3<f64>,
}

/// A set of markers sharing a namespace and a colour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajMarkers {
    pub ns: String,
    pub color: Rgba,
    pub markers: Vec<Marker>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rgba {
    pub const BLUE: Rgba = Rgba::opaque(0.0, 0.0, 1.0);
    pub const YELLOW: Rgba = Rgba::opaque(1.0, 1.0, 0.0);

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl TrajMarkers {
    /// One arrow per state, numbered in order.
    pub fn from_states(states: &[VehicleState], color: Rgba, ns: &str) -> Self {
        let markers = states
            .iter()
            .enumerate()
            .map(|(id, s)| {
                let z = if s.z == 0.0 {
                    DEFAULT_MARKER_HEIGHT_M
                } else {
                    s.z
                };

                Marker {
                    id,
                    pose: Pose::from_xyz_yaw(s.x, s.y, z, s.psi),
                    scale: Vector3::new(0.25, 0.1, 0.1),
                }
            })
            .collect();

        Self {
            ns: ns.to_string(),
            color,
            markers,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_markers_from_states() {
        let states = vec![
            VehicleState {
                x: 1.0,
                y: 2.0,
                z: 0.0,
                psi: 0.5,
                v: 1.0,
            },
            VehicleState {
                x: 3.0,
                y: 4.0,
                z: 0.4,
                psi: -0.5,
                v: 1.0,
            },
        ];

        let markers = TrajMarkers::from_states(&states, Rgba::YELLOW, NS_READJUSTED_SEGMENT);

        assert_eq!(markers.ns, "readjusted_segment");
        assert_eq!(markers.color, Rgba::opaque(1.0, 1.0, 0.0));
        assert_eq!(markers.markers.len(), 2);

        assert_eq!(markers.markers[0].id, 0);
        assert_eq!(markers.markers[0].pose.position_m.z, 1.3);
        assert!((markers.markers[0].pose.get_heading() - 0.5).abs() < 1e-9);
        assert_eq!(markers.markers[1].id, 1);
        assert_eq!(markers.markers[1].pose.position_m.z, 0.4);
        assert_eq!(markers.markers[1].scale, Vector3::new(0.25, 0.1, 0.1));
    }
}
