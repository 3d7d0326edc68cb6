use std::f64::consts::{PI, TAU};

use super::{CoordinateTransform, InvertibleTransform};

/// `(r, θ)` to `(x, y)`.
///
/// The inverse returns `θ` normalized into `[0, 2π)` and maps the origin to
/// `(0, 0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolarToCartesian;

impl CoordinateTransform<2, 2> for PolarToCartesian {
    #[inline]
    fn apply(&self, [r, theta]: [f64; 2]) -> [f64; 2] {
        let (sin, cos) = theta.sin_cos();
        [r * cos, r * sin]
    }
}

impl InvertibleTransform<2, 2> for PolarToCartesian {
    #[inline]
    fn apply_inverse(&self, [x, y]: [f64; 2]) -> [f64; 2] {
        let r = x.hypot(y);
        if r == 0.0 {
            return [0.0, 0.0];
        }
        let s = (y / r).clamp(-1.0, 1.0).asin();
        let mut theta = if x >= 0.0 { s } else { PI - s };
        if theta < 0.0 {
            theta += TAU;
        }
        if theta >= TAU {
            theta -= TAU;
        }
        [r, theta]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::test_utils::{angle_diff, seeded};
    use rand::Rng;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-12;

    #[test]
    fn forward_table() {
        let cases = [
            ([10.0, 0.0], [10.0, 0.0]),
            ([10.0, FRAC_PI_2], [0.0, 10.0]),
            ([10.0, PI], [-10.0, 0.0]),
            ([10.0, 3.0 * FRAC_PI_2], [0.0, -10.0]),
            ([10.0, TAU], [10.0, 0.0]),
            ([-10.0, 0.0], [-10.0, 0.0]),
            ([-10.0, -3.0 * PI], [10.0, 0.0]),
            ([0.0, 1.234], [0.0, 0.0]),
        ];
        for (src, expected) in cases {
            let got = PolarToCartesian.apply(src);
            assert_abs_diff_eq!(got[0], expected[0], epsilon = EPS);
            assert_abs_diff_eq!(got[1], expected[1], epsilon = EPS);
        }
    }

    #[test]
    fn inverse_table() {
        let cases = [
            ([10.0, 0.0], [10.0, 0.0]),
            ([0.0, 10.0], [10.0, FRAC_PI_2]),
            ([-10.0, 0.0], [10.0, PI]),
            ([0.0, -10.0], [10.0, 3.0 * FRAC_PI_2]),
            ([0.0, 0.0], [0.0, 0.0]),
        ];
        for (src, expected) in cases {
            let got = PolarToCartesian.apply_inverse(src);
            assert_abs_diff_eq!(got[0], expected[0], epsilon = EPS);
            assert_abs_diff_eq!(got[1], expected[1], epsilon = EPS);
        }
    }

    #[test]
    fn inverse_angle_stays_in_range() {
        for k in 0..64 {
            let theta = k as f64 * TAU / 64.0;
            let [r, back] = PolarToCartesian.apply_inverse(PolarToCartesian.apply([3.0, theta]));
            assert_abs_diff_eq!(r, 3.0, epsilon = EPS);
            assert!((0.0..TAU).contains(&back));
            assert_abs_diff_eq!(back, theta, epsilon = 1e-9);
        }
    }

    #[test]
    fn random_round_trip() {
        let mut rng = seeded(101);
        for _ in 0..10_000 {
            let r = rng.gen_range(0.1..100.0);
            let theta = rng.gen_range(-4.0 * PI..4.0 * PI);
            let [r_back, theta_back] =
                PolarToCartesian.apply_inverse(PolarToCartesian.apply([r, theta]));
            assert_abs_diff_eq!(r_back, r, epsilon = 1e-9);
            assert_abs_diff_eq!(angle_diff(theta_back, theta), 0.0, epsilon = 1e-7);
        }
    }

    #[test]
    fn angles_beyond_full_turn_wrap() {
        let eps = 1e-3;
        let cases = [
            (TAU + eps, eps),
            (5.0 * FRAC_PI_2, FRAC_PI_2),
            (-FRAC_PI_2, 3.0 * FRAC_PI_2),
        ];
        for (theta, expected) in cases {
            let [r, back] = PolarToCartesian.apply_inverse(PolarToCartesian.apply([7.0, theta]));
            assert_abs_diff_eq!(r, 7.0, epsilon = EPS);
            assert_abs_diff_eq!(back, expected, epsilon = 1e-9);
        }
    }
}
