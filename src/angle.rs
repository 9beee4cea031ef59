//! Angle utilities shared by the describer and the K-VLD filter.

use std::f32::consts::{PI, TAU};

/// Wraps an angle into the range [0, 2π).
#[inline]
pub fn wrap_two_pi(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Direction of the vector `(dx, dy)` in [0, 2π).
///
/// Returns `None` for the zero vector, whose direction is undefined.
#[inline]
pub fn angle_from(dx: f32, dy: f32) -> Option<f32> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    Some(wrap_two_pi(dy.atan2(dx)))
}

/// Smallest unsigned difference between two directed angles, in [0, π].
#[inline]
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Distance between two bins of a circular histogram with `bins` entries.
#[inline]
pub fn circular_bin_distance(a: usize, b: usize, bins: usize) -> usize {
    let d = a.abs_diff(b) % bins;
    d.min(bins - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn wrap_two_pi_basic() {
        assert!(approx_eq(wrap_two_pi(0.5), 0.5));
        assert!(approx_eq(wrap_two_pi(-std::f32::consts::FRAC_PI_2), 1.5 * PI));
        assert!(approx_eq(wrap_two_pi(TAU), 0.0));
        assert!(approx_eq(wrap_two_pi(5.0 * PI), PI));
    }

    #[test]
    fn angle_from_quadrants() {
        assert!(approx_eq(angle_from(1.0, 0.0).unwrap(), 0.0));
        assert!(approx_eq(angle_from(0.0, 1.0).unwrap(), PI / 2.0));
        assert!(approx_eq(angle_from(-1.0, 0.0).unwrap(), PI));
        assert!(approx_eq(angle_from(0.0, -1.0).unwrap(), 1.5 * PI));
        assert!(angle_from(0.0, 0.0).is_none());
    }

    #[test]
    fn angular_difference_handles_wrap() {
        assert!(approx_eq(angular_difference(0.1, TAU - 0.1), 0.2));
        assert!(approx_eq(angular_difference(0.0, PI), PI));
        assert!(approx_eq(angular_difference(1.0, 2.5), angular_difference(2.5, 1.0)));
    }

    #[test]
    fn circular_bins_wrap() {
        assert_eq!(circular_bin_distance(0, 23, 24), 1);
        assert_eq!(circular_bin_distance(3, 15, 24), 12);
        assert_eq!(circular_bin_distance(5, 5, 24), 0);
    }
}
