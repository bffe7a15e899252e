//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Restrict a value to the closed range `[min, max]`.
///
/// `min` must not be greater than `max`. NaN values are passed through unchanged.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range `(-pi, pi]`.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);
    let tau_t = pi_t + pi_t;

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    // rem_euclid maps +pi onto -pi, keep the upper bound instead
    if wrapped <= -pi_t {
        pi_t
    } else {
        wrapped
    }
}

/// Reduce an angle modulo pi into the range `[-pi/2, pi/2]`.
///
/// Headings pointing along the same line (e.g. `0` and `pi`) map to the same value, so the
/// magnitude of the result is the angle between the heading and the X axis regardless of the
/// direction of travel.
pub fn rem_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);

    angle - pi_t * (angle / pi_t).round()
}

/// Get the signed shortest angular distance from `a` to `b`.
///
/// Adding the result to `a` gives an angle equivalent to `b`. Inputs may be in any range.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::zero);

    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    } else {
        d
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.3, -1.0, 1.0), 0.3);
        assert_eq!(clamp(0.3, 0.3, 0.3), 0.3);
    }

    #[test]
    fn test_get_ang_dist() {
        assert_eq!(get_ang_dist(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist(TAU, 0f64), 0f64);
        assert_eq!(get_ang_dist(1f64, TAU), -1f64);
        assert_eq!(get_ang_dist(0f64, TAU - 1f64), -1f64);
        assert!(close(get_ang_dist(-3.0, 3.0), 6.0 - TAU));
    }

    #[test]
    fn test_wrap_pi() {
        assert!(close(wrap_pi(0.0), 0.0));
        assert!(close(wrap_pi(PI), PI));
        assert!(close(wrap_pi(-PI), PI));
        assert!(close(wrap_pi(TAU + 0.5), 0.5));
        assert!(close(wrap_pi(-TAU - 0.5), -0.5));
        assert!(close(wrap_pi(3.0 * PI / 2.0), -PI / 2.0));
    }

    #[test]
    fn test_rem_pi() {
        assert!(close(rem_pi(0.1), 0.1));
        assert!(close(rem_pi(PI - 0.1), -0.1));
        assert!(close(rem_pi(-PI + 0.1), 0.1));
        assert!(close(rem_pi(1.2), 1.2));
        assert!(close(rem_pi(TAU + 0.2), 0.2));
    }
}
