//! # Reeds-Shepp curves
//!
//! Shortest paths for a car-like vehicle with a bounded turning radius which may drive both
//! forwards and in reverse. Each path is a word of at most five segments, each of which is a
//! left arc, a right arc or a straight line.
//!
//! The word formulas work in a normalised frame where the start pose is at the origin facing
//! along +X and the turning radius is 1. Every word is tried under the time flip and
//! reflection symmetries, and the shortest candidate whose endpoint actually reaches the goal
//! is kept.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use log::warn;

use super::{blend_linear, CurvePose, PlanarCurve};
use util::maths::get_ang_dist;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the sign checks in the word formulas.
const ZERO: f64 = 10.0 * std::f64::EPSILON;

/// Maximum error between a word's endpoint and the goal, in normalised units.
const ENDPOINT_TOL: f64 = 1e-6;

/// Segment types of each word, indexed by the word number used in the candidate search.
const PATH_TYPES: [[Segment; 5]; 18] = {
    use Segment::*;
    [
        [Left, Right, Left, Nop, Nop],
        [Right, Left, Right, Nop, Nop],
        [Left, Right, Left, Right, Nop],
        [Right, Left, Right, Left, Nop],
        [Left, Right, Straight, Left, Nop],
        [Right, Left, Straight, Right, Nop],
        [Left, Straight, Right, Left, Nop],
        [Right, Straight, Left, Right, Nop],
        [Left, Right, Straight, Right, Nop],
        [Right, Left, Straight, Left, Nop],
        [Right, Straight, Right, Left, Nop],
        [Left, Straight, Left, Right, Nop],
        [Left, Straight, Right, Nop, Nop],
        [Right, Straight, Left, Nop, Nop],
        [Left, Straight, Left, Nop, Nop],
        [Right, Straight, Right, Nop, Nop],
        [Left, Right, Straight, Left, Right],
        [Right, Left, Straight, Right, Left],
    ]
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Reeds-Shepp curve family with a fixed turning radius.
#[derive(Debug, Clone, Copy)]
pub struct ReedsSheppCurve {
    turning_radius_m: f64,
}

/// A single Reeds-Shepp word in normalised units.
///
/// Negative segment lengths are driven in reverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReedsSheppPath {
    types: [Segment; 5],
    lengths: [f64; 5],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Nop,
    Left,
    Straight,
    Right,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReedsSheppCurve {
    /// Create a new curve family. The radius must be strictly positive.
    pub fn new(turning_radius_m: f64) -> Self {
        Self { turning_radius_m }
    }

    pub fn turning_radius_m(&self) -> f64 {
        self.turning_radius_m
    }

    /// Find the shortest word joining `start` to `goal`.
    ///
    /// Returns `None` if no candidate reaches the goal, which only happens for non-finite
    /// inputs or a non-positive turning radius.
    pub fn shortest_path(&self, start: &CurvePose, goal: &CurvePose) -> Option<ReedsSheppPath> {
        if !(self.turning_radius_m > 0.0) {
            return None;
        }

        // Goal in the start's frame, normalised by the turning radius
        let dx = goal.x - start.x;
        let dy = goal.y - start.y;
        let (s, c) = start.yaw.sin_cos();
        let x = (c * dx + s * dy) / self.turning_radius_m;
        let y = (-s * dx + c * dy) / self.turning_radius_m;
        let phi = goal.yaw - start.yaw;

        let mut best: Option<ReedsSheppPath> = None;

        for candidate in candidates(x, y, phi) {
            if !candidate.reaches(x, y, phi) {
                continue;
            }

            let shorter = match &best {
                Some(b) => candidate.length() < b.length(),
                None => true,
            };

            if shorter {
                best = Some(candidate);
            }
        }

        best
    }

    /// Length of the shortest path between the two poses, in meters.
    pub fn distance(&self, start: &CurvePose, goal: &CurvePose) -> Option<f64> {
        self.shortest_path(start, goal)
            .map(|p| p.length() * self.turning_radius_m)
    }

    /// Get the pose at fraction `frac` (in `[0, 1]`) along `path`, which starts at `start`.
    pub fn sample(&self, start: &CurvePose, path: &ReedsSheppPath, frac: f64) -> CurvePose {
        let (x, y, yaw) = path.integrate(start.yaw, frac * path.length());

        CurvePose::new(
            x * self.turning_radius_m + start.x,
            y * self.turning_radius_m + start.y,
            yaw,
        )
    }
}

impl PlanarCurve for ReedsSheppCurve {
    fn interpolate(&self, start: &CurvePose, goal: &CurvePose, count: usize) -> Vec<CurvePose> {
        if count < 2 {
            return blend_linear(start, goal, count);
        }

        match self.shortest_path(start, goal) {
            Some(path) => (0..count)
                .map(|j| self.sample(start, &path, j as f64 / (count - 1) as f64))
                .collect(),
            None => {
                warn!(
                    "No Reeds-Shepp path from {:?} to {:?} (radius {} m), blending linearly",
                    start, goal, self.turning_radius_m
                );
                blend_linear(start, goal, count)
            }
        }
    }
}

impl ReedsSheppPath {
    fn new(word: usize, lengths: [f64; 5]) -> Self {
        Self {
            types: PATH_TYPES[word],
            lengths,
        }
    }

    /// Time flipped version of this word, driving every segment the other way.
    fn flipped(mut self) -> Self {
        for l in self.lengths.iter_mut() {
            *l = -*l;
        }
        self
    }

    /// Total length in normalised units.
    pub fn length(&self) -> f64 {
        self.lengths.iter().map(|l| l.abs()).sum()
    }

    /// Number of segments which are driven in reverse, ignoring vanishingly short ones.
    pub fn num_reverse_segments(&self) -> usize {
        self.types
            .iter()
            .zip(self.lengths.iter())
            .filter(|(t, l)| **t != Segment::Nop && **l < -ZERO)
            .count()
    }

    /// Drive `dist` along the word from the origin with the given initial yaw, returning the
    /// position (normalised units) and yaw reached.
    fn integrate(&self, start_yaw: f64, dist: f64) -> (f64, f64, f64) {
        let mut seg = dist;
        let (mut x, mut y, mut yaw) = (0.0, 0.0, start_yaw);

        for (kind, &length) in self.types.iter().zip(self.lengths.iter()) {
            if !(seg > 0.0) {
                break;
            }

            let v = if length < 0.0 {
                let v = (-seg).max(length);
                seg += v;
                v
            } else {
                let v = seg.min(length);
                seg -= v;
                v
            };

            match kind {
                Segment::Left => {
                    x += (yaw + v).sin() - yaw.sin();
                    y += -(yaw + v).cos() + yaw.cos();
                    yaw += v;
                }
                Segment::Right => {
                    x += -(yaw - v).sin() + yaw.sin();
                    y += (yaw - v).cos() - yaw.cos();
                    yaw -= v;
                }
                Segment::Straight => {
                    x += v * yaw.cos();
                    y += v * yaw.sin();
                }
                Segment::Nop => (),
            }
        }

        (x, y, yaw)
    }

    /// Check the word's endpoint against the normalised goal.
    fn reaches(&self, x: f64, y: f64, phi: f64) -> bool {
        let (ex, ey, eyaw) = self.integrate(0.0, self.length());

        (ex - x).abs() < ENDPOINT_TOL
            && (ey - y).abs() < ENDPOINT_TOL
            && get_ang_dist(eyaw, phi).abs() < ENDPOINT_TOL
    }
}

// ---------------------------------------------------------------------------
// CANDIDATE SEARCH
// ---------------------------------------------------------------------------

type Word = fn(f64, f64, f64) -> Option<(f64, f64, f64)>;

/// Collect every word family's candidates for the normalised goal `(x, y, phi)`.
fn candidates(x: f64, y: f64, phi: f64) -> Vec<ReedsSheppPath> {
    let mut paths = Vec::new();

    // Goal seen from the end pose, used by the families which are solved backwards
    let (sp, cp) = phi.sin_cos();
    let xb = x * cp + y * sp;
    let yb = x * sp - y * cp;

    // CSC
    push_symmetric(&mut paths, (x, y, phi), lp_sp_lp, (14, 15), |t, u, v| {
        [t, u, v, 0.0, 0.0]
    });
    push_symmetric(&mut paths, (x, y, phi), lp_sp_rp, (12, 13), |t, u, v| {
        [t, u, v, 0.0, 0.0]
    });

    // CCC
    push_symmetric(&mut paths, (x, y, phi), lp_rm_l, (0, 1), |t, u, v| {
        [t, u, v, 0.0, 0.0]
    });
    push_symmetric(&mut paths, (xb, yb, phi), lp_rm_l, (0, 1), |t, u, v| {
        [v, u, t, 0.0, 0.0]
    });

    // CCCC
    push_symmetric(&mut paths, (x, y, phi), lp_rup_lum_rm, (2, 3), |t, u, v| {
        [t, u, -u, v, 0.0]
    });
    push_symmetric(&mut paths, (x, y, phi), lp_rum_lum_rp, (2, 3), |t, u, v| {
        [t, u, u, v, 0.0]
    });

    // CCSC
    push_symmetric(&mut paths, (x, y, phi), lp_rm_sm_lm, (4, 5), |t, u, v| {
        [t, -FRAC_PI_2, u, v, 0.0]
    });
    push_symmetric(&mut paths, (x, y, phi), lp_rm_sm_rm, (8, 9), |t, u, v| {
        [t, -FRAC_PI_2, u, v, 0.0]
    });
    push_symmetric(&mut paths, (xb, yb, phi), lp_rm_sm_lm, (6, 7), |t, u, v| {
        [v, u, -FRAC_PI_2, t, 0.0]
    });
    push_symmetric(&mut paths, (xb, yb, phi), lp_rm_sm_rm, (10, 11), |t, u, v| {
        [v, u, -FRAC_PI_2, t, 0.0]
    });

    // CCSCC
    push_symmetric(&mut paths, (x, y, phi), lp_rm_s_lm_rp, (16, 17), |t, u, v| {
        [t, -FRAC_PI_2, u, -FRAC_PI_2, v]
    });

    paths
}

/// Try `word` on the goal and on its time flipped and reflected images.
///
/// `words` gives the word number for the plain and the reflected candidates, `lengths` maps
/// the word's solution onto segment lengths.
fn push_symmetric<L>(
    paths: &mut Vec<ReedsSheppPath>,
    (x, y, phi): (f64, f64, f64),
    word: Word,
    words: (usize, usize),
    lengths: L,
) where
    L: Fn(f64, f64, f64) -> [f64; 5],
{
    if let Some((t, u, v)) = word(x, y, phi) {
        paths.push(ReedsSheppPath::new(words.0, lengths(t, u, v)));
    }
    if let Some((t, u, v)) = word(-x, y, -phi) {
        paths.push(ReedsSheppPath::new(words.0, lengths(t, u, v)).flipped());
    }
    if let Some((t, u, v)) = word(x, -y, -phi) {
        paths.push(ReedsSheppPath::new(words.1, lengths(t, u, v)));
    }
    if let Some((t, u, v)) = word(-x, -y, phi) {
        paths.push(ReedsSheppPath::new(words.1, lengths(t, u, v)).flipped());
    }
}

// ---------------------------------------------------------------------------
// WORD FORMULAS
// ---------------------------------------------------------------------------

/// Wrap an angle into `[-pi, pi]`, keeping the sign of exact multiples of pi.
fn mod2pi(x: f64) -> f64 {
    let v = x % TAU;

    if v < -PI {
        v + TAU
    } else if v > PI {
        v - TAU
    } else {
        v
    }
}

fn polar(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

fn tau_omega(u: f64, v: f64, xi: f64, eta: f64, phi: f64) -> (f64, f64) {
    let delta = mod2pi(u - v);
    let a = u.sin() - delta.sin();
    let b = u.cos() - delta.cos() - 1.0;

    let t1 = (eta * a - xi * b).atan2(xi * a + eta * b);
    let t2 = 2.0 * (delta.cos() - v.cos() - u.cos()) + 3.0;

    let tau = if t2 < 0.0 { mod2pi(t1 + PI) } else { mod2pi(t1) };
    let omega = mod2pi(tau - u + v - phi);

    (tau, omega)
}

fn lp_sp_lp(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u, t) = polar(x - phi.sin(), y - 1.0 + phi.cos());

    if t >= -ZERO {
        let v = mod2pi(phi - t);
        if v >= -ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_sp_rp(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, t1) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u1 = u1 * u1;

    if u1 >= 4.0 {
        let u = (u1 - 4.0).sqrt();
        let theta = 2f64.atan2(u);
        let t = mod2pi(t1 + theta);
        let v = mod2pi(t - phi);

        if t >= -ZERO && v >= -ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_rm_l(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());

    if u1 <= 4.0 {
        let u = -2.0 * (0.25 * u1).asin();
        let t = mod2pi(theta + 0.5 * u + PI);
        let v = mod2pi(phi - t + u);

        if t >= -ZERO && u <= ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_rup_lum_rm(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = 0.25 * (2.0 + xi.hypot(eta));

    if rho <= 1.0 {
        let u = rho.acos();
        let (t, v) = tau_omega(u, -u, xi, eta, phi);

        if t >= -ZERO && v <= ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_rum_lum_rp(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let rho = (20.0 - xi * xi - eta * eta) / 16.0;

    if (0.0..=1.0).contains(&rho) {
        let u = -rho.acos();
        if u >= -FRAC_PI_2 {
            let (t, v) = tau_omega(u, u, xi, eta, phi);

            if t >= -ZERO && v >= -ZERO {
                return Some((t, u, v));
            }
        }
    }

    None
}

fn lp_rm_sm_lm(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (rho, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());

    if rho >= 2.0 {
        let r = (rho * rho - 4.0).sqrt();
        let u = 2.0 - r;
        let t = mod2pi(theta + r.atan2(-2.0));
        let v = mod2pi(phi - FRAC_PI_2 - t);

        if t >= -ZERO && u <= ZERO && v <= ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_rm_sm_rm(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, theta) = polar(-eta, xi);

    if rho >= 2.0 {
        let t = theta;
        let u = 2.0 - rho;
        let v = mod2pi(t + FRAC_PI_2 - phi);

        if t >= -ZERO && u <= ZERO && v <= ZERO {
            return Some((t, u, v));
        }
    }

    None
}

fn lp_rm_s_lm_rp(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let xi = x + phi.sin();
    let eta = y - 1.0 - phi.cos();
    let (rho, _) = polar(xi, eta);

    if rho >= 2.0 {
        let u = 4.0 - (rho * rho - 4.0).sqrt();
        if u <= ZERO {
            let t = mod2pi(((4.0 - u) * xi - 2.0 * eta).atan2(-2.0 * xi + (u - 4.0) * eta));
            let v = mod2pi(t - phi);

            if t >= -ZERO && v >= -ZERO {
                return Some((t, u, v));
            }
        }
    }

    None
}
