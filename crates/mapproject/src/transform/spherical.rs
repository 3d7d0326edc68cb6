use std::f64::consts::{FRAC_PI_2, PI};

use super::{CoordinateTransform, InvertibleTransform};

/// `(r, polar, azimuth)` to `(x, y, z)`.
///
/// Polar angle is measured from `+z`, azimuth in the xy-plane from `+x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SphericalToCartesian;

impl CoordinateTransform<3, 3> for SphericalToCartesian {
    #[inline]
    fn apply(&self, [r, polar, azimuth]: [f64; 3]) -> [f64; 3] {
        let (sp, cp) = polar.sin_cos();
        let (sa, ca) = azimuth.sin_cos();
        [r * sp * ca, r * sp * sa, r * cp]
    }
}

impl InvertibleTransform<3, 3> for SphericalToCartesian {
    /// Azimuth is returned in `(-π, π]`; the origin maps to `(0, 0, 0)`.
    #[inline]
    fn apply_inverse(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let r = (x * x + y * y + z * z).sqrt();
        if r == 0.0 {
            return [0.0, 0.0, 0.0];
        }
        [r, (z / r).clamp(-1.0, 1.0).acos(), y.atan2(x)]
    }
}

/// `(r, latitude, longitude)` to `(x, y, z)`.
///
/// Spherical coordinates with the polar angle shifted by `π/2` and the
/// azimuth by `π`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeographicToCartesian;

impl CoordinateTransform<3, 3> for GeographicToCartesian {
    #[inline]
    fn apply(&self, [r, lat, lon]: [f64; 3]) -> [f64; 3] {
        SphericalToCartesian.apply([r, lat + FRAC_PI_2, lon + PI])
    }
}

impl InvertibleTransform<3, 3> for GeographicToCartesian {
    /// Longitude is wrapped into `[-π, π]`.
    #[inline]
    fn apply_inverse(&self, target: [f64; 3]) -> [f64; 3] {
        let [r, polar, azimuth] = SphericalToCartesian.apply_inverse(target);
        let mut lon = azimuth - PI;
        if lon < -PI {
            lon += 2.0 * PI;
        }
        [r, polar - FRAC_PI_2, lon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::test_utils::{angle_diff, seeded};
    use rand::Rng;
    use std::f64::consts::{FRAC_PI_4, TAU};

    const EPS: f64 = 1e-12;

    fn assert_close(got: [f64; 3], expected: [f64; 3]) {
        for d in 0..3 {
            assert_abs_diff_eq!(got[d], expected[d], epsilon = EPS);
        }
    }

    #[test]
    fn forward_table() {
        let diag = 5.0 * FRAC_PI_4.cos();
        let cases = [
            ([5.0, 0.0, 0.0], [0.0, 0.0, 5.0]),
            ([5.0, PI, 0.0], [0.0, 0.0, -5.0]),
            ([5.0, FRAC_PI_2, 0.0], [5.0, 0.0, 0.0]),
            ([5.0, FRAC_PI_2, FRAC_PI_2], [0.0, 5.0, 0.0]),
            ([5.0, FRAC_PI_2, PI], [-5.0, 0.0, 0.0]),
            ([5.0, FRAC_PI_4, FRAC_PI_4], [2.5, 2.5, diag]),
        ];
        for (src, expected) in cases {
            assert_close(SphericalToCartesian.apply(src), expected);
        }
    }

    #[test]
    fn inverse_table() {
        let diag = 5.0 * FRAC_PI_4.cos();
        assert_close(
            SphericalToCartesian.apply_inverse([2.5, 2.5, diag]),
            [5.0, FRAC_PI_4, FRAC_PI_4],
        );
        assert_close(SphericalToCartesian.apply_inverse([0.0, 0.0, -5.0]), [5.0, PI, 0.0]);
        assert_close(SphericalToCartesian.apply_inverse([0.0, 5.0, 0.0]), [5.0, FRAC_PI_2, FRAC_PI_2]);
        assert_close(SphericalToCartesian.apply_inverse([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn round_trip_away_from_poles() {
        for i in 1..8 {
            for j in -7..8 {
                let src = [2.0 + i as f64, i as f64 * PI / 8.0, j as f64 * PI / 8.0];
                let back = SphericalToCartesian.apply_inverse(SphericalToCartesian.apply(src));
                assert_close(back, src);
            }
        }
    }

    #[test]
    fn geographic_equator_and_poles() {
        // (lat 0, lon 0) lies on the equator facing -x.
        assert_close(GeographicToCartesian.apply([3.0, 0.0, 0.0]), [-3.0, 0.0, 0.0]);
        // lat -π/2 is the +z pole.
        assert_close(GeographicToCartesian.apply([3.0, -FRAC_PI_2, 1.0]), [0.0, 0.0, 3.0]);

        let src = [4.0, 0.3, 0.7];
        let back = GeographicToCartesian.apply_inverse(GeographicToCartesian.apply(src));
        assert_close(back, src);
    }

    #[test]
    fn random_spherical_round_trip() {
        let mut rng = seeded(303);
        for _ in 0..10_000 {
            let src = [
                rng.gen_range(0.5..500.0),
                rng.gen_range(0.01..PI - 0.01),
                rng.gen_range(-3.0 * PI..3.0 * PI),
            ];
            let back = SphericalToCartesian.apply_inverse(SphericalToCartesian.apply(src));
            assert_abs_diff_eq!(back[0], src[0], epsilon = 1e-9);
            assert_abs_diff_eq!(back[1], src[1], epsilon = 1e-9);
            assert_abs_diff_eq!(angle_diff(back[2], src[2]), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn random_geographic_round_trip() {
        let mut rng = seeded(404);
        for _ in 0..10_000 {
            let src = [
                rng.gen_range(0.5..500.0),
                rng.gen_range(-FRAC_PI_2 + 0.01..FRAC_PI_2 - 0.01),
                rng.gen_range(-3.0 * PI..3.0 * PI),
            ];
            let back = GeographicToCartesian.apply_inverse(GeographicToCartesian.apply(src));
            assert_abs_diff_eq!(back[0], src[0], epsilon = 1e-9);
            assert_abs_diff_eq!(back[1], src[1], epsilon = 1e-9);
            assert!((-PI..=PI).contains(&back[2]));
            assert_abs_diff_eq!(angle_diff(back[2], src[2]), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn longitudes_beyond_full_turn_wrap() {
        let eps = 1e-3;
        for (lon, expected) in [
            (TAU + eps, eps),
            (5.0 * FRAC_PI_2, FRAC_PI_2),
            (-FRAC_PI_2, -FRAC_PI_2),
        ] {
            let p = GeographicToCartesian.apply([2.0, 0.4, lon]);
            let back = GeographicToCartesian.apply_inverse(p);
            assert_abs_diff_eq!(back[1], 0.4, epsilon = EPS);
            assert_abs_diff_eq!(back[2], expected, epsilon = 1e-9);
        }
        for (azimuth, expected) in [
            (TAU + eps, eps),
            (5.0 * FRAC_PI_2, FRAC_PI_2),
            (-FRAC_PI_2, -FRAC_PI_2),
        ] {
            let p = SphericalToCartesian.apply([2.0, 1.0, azimuth]);
            let back = SphericalToCartesian.apply_inverse(p);
            assert_abs_diff_eq!(back[2], expected, epsilon = 1e-9);
        }
    }
}
