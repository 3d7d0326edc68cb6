//! Sphere geometry for the grid-based projections.
//!
//! [`SphereGeometry`] carries the projection centre, the tilt of the pole
//! axis, the zero-meridian offset and a working radius. It converts angular
//! coordinates into integer voxel positions and measures how many voxels a
//! latitude ring covers, which fixes the resolution of the legacy
//! Plate-Carrée map.

use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::{Rotation3, Vector3};

use crate::transform::{CoordinateTransform, SphericalToCartesian};

/// Azimuth increment used to enumerate a latitude ring.
pub const RING_STEP_RADIANS: f64 = 1.0e-5;

/// Centre, orientation, and working radius of a projection sphere.
///
/// Origins are given in host convention: `x`/`y` are voxel columns/rows,
/// `z` is a 1-based slice number. Internally the origin is kept in 0-based
/// volume coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    origin: Vector3<f64>,
    radius: f64,
    pole_axis_lon: f64,
    pole_axis_lat: f64,
    zero_meridian: f64,
    tilt: Rotation3<f64>,
}

impl Default for SphereGeometry {
    fn default() -> Self {
        Self {
            origin: Vector3::zeros(),
            radius: 0.0,
            pole_axis_lon: 0.0,
            pole_axis_lat: 0.0,
            zero_meridian: 0.0,
            tilt: Rotation3::identity(),
        }
    }
}

impl SphereGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the centre from host coordinates (1-based slice number).
    pub fn set_origin(&mut self, origin: [f64; 3]) {
        self.origin = Vector3::new(origin[0], origin[1], origin[2] - 1.0);
    }

    /// Centre in host coordinates (1-based slice number).
    pub fn origin(&self) -> [f64; 3] {
        [self.origin.x, self.origin.y, self.origin.z + 1.0]
    }

    /// Centre in 0-based volume coordinates.
    pub fn volume_origin(&self) -> [f64; 3] {
        [self.origin.x, self.origin.y, self.origin.z]
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Longitude of the tilted pole axis, radians.
    pub fn set_pole_axis_lon_angle(&mut self, radians: f64) {
        self.pole_axis_lon = radians;
        self.update_tilt();
    }

    pub fn pole_axis_lon_angle(&self) -> f64 {
        self.pole_axis_lon
    }

    /// Latitude (inclination) of the tilted pole axis, radians.
    pub fn set_pole_axis_lat_angle(&mut self, radians: f64) {
        self.pole_axis_lat = radians;
        self.update_tilt();
    }

    pub fn pole_axis_lat_angle(&self) -> f64 {
        self.pole_axis_lat
    }

    /// Longitude offset of the zero meridian, radians.
    pub fn set_zero_meridian(&mut self, radians: f64) {
        self.zero_meridian = radians;
        self.update_tilt();
    }

    pub fn zero_meridian(&self) -> f64 {
        self.zero_meridian
    }

    fn update_tilt(&mut self) {
        self.tilt = Rotation3::from_axis_angle(&Vector3::z_axis(), self.pole_axis_lon)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), self.pole_axis_lat)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.zero_meridian);
    }

    /// Continuous volume position of `(lon, lat)` at `radius`.
    ///
    /// `lat` is the polar angle from the pole, `lon` the azimuth. With
    /// `apply_tilt == false` only the translation to the origin is applied.
    pub fn cartesian(&self, lon: f64, lat: f64, radius: f64, apply_tilt: bool) -> [f64; 3] {
        let local = Vector3::from(SphericalToCartesian.apply([radius, lat, lon]));
        let placed = if apply_tilt {
            self.tilt * local + self.origin
        } else {
            local + self.origin
        };
        [placed.x, placed.y, placed.z]
    }

    /// [`SphereGeometry::cartesian`] rounded to the nearest voxel.
    pub fn cartesian_grid(&self, lon: f64, lat: f64, radius: f64, apply_tilt: bool) -> [i64; 3] {
        self.cartesian(lon, lat, radius, apply_tilt)
            .map(|c| c.round() as i64)
    }

    /// Distinct voxels on the ring at polar angle `lat` of the working
    /// radius, in enumeration order. Evaluated without tilt.
    pub fn voxels_at_polar_angle(&self, lat: f64, step: f64) -> Vec<[i64; 3]> {
        let mut seen = HashSet::new();
        let mut ring = Vec::new();
        let n = ring_samples(step);
        for k in 0..n {
            let p = self.cartesian_grid(k as f64 * step, lat, self.radius, false);
            if seen.insert(p) {
                ring.push(p);
            }
        }
        ring
    }

    /// Number of distinct voxels on the equator of the working radius.
    pub fn voxel_count_at_equator(&self) -> usize {
        self.voxels_at_polar_angle(FRAC_PI_2, RING_STEP_RADIANS).len()
    }

    /// Every distinct voxel on the sphere surface of the working radius.
    /// Evaluated without tilt.
    pub fn surface_voxels(&self) -> HashSet<[i64; 3]> {
        let equator = self.voxel_count_at_equator().max(1);
        let step = TAU / equator as f64 * 0.75;
        let n_lat = (PI / step).floor() as usize + 1;
        let n_lon = ring_samples(step);
        let mut surface = HashSet::new();
        for i in 0..n_lat {
            let lat = i as f64 * step;
            for k in 0..n_lon {
                surface.insert(self.cartesian_grid(k as f64 * step, lat, self.radius, false));
            }
        }
        surface
    }
}

fn ring_samples(step: f64) -> usize {
    if step.is_finite() && step > 0.0 {
        (TAU / step).ceil() as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_uses_one_based_slices() {
        let mut s = SphereGeometry::new();
        s.set_origin([10.0, 20.0, 5.0]);
        assert_eq!(s.origin(), [10.0, 20.0, 5.0]);
        assert_eq!(s.volume_origin(), [10.0, 20.0, 4.0]);
        assert_eq!(s.cartesian_grid(0.0, 0.0, 0.0, true), [10, 20, 4]);
    }

    #[test]
    fn unit_ring_has_eight_voxels() {
        let mut s = SphereGeometry::new();
        s.set_radius(1.0);
        assert_eq!(s.voxel_count_at_equator(), 8);
        assert_eq!(s.voxels_at_polar_angle(0.0, 0.01), vec![[0, 0, 1]]);
    }

    #[test]
    fn equator_count_scales_with_radius() {
        let mut s = SphereGeometry::new();
        s.set_radius(10.0);
        let n = s.voxel_count_at_equator();
        assert!((76..=84).contains(&n), "unexpected ring size {}", n);
    }

    #[test]
    fn tilt_moves_the_pole() {
        let mut s = SphereGeometry::new();
        s.set_origin([0.0, 0.0, 1.0]);
        s.set_pole_axis_lat_angle(FRAC_PI_2);
        // Ry(π/2) turns +z into +x.
        let p = s.cartesian(0.0, 0.0, 5.0, true);
        assert_abs_diff_eq!(p[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[2], 0.0, epsilon = 1e-12);
        assert_eq!(s.cartesian_grid(0.0, 0.0, 5.0, false), [0, 0, 5]);

        s.set_pole_axis_lon_angle(FRAC_PI_2);
        let p = s.cartesian(0.0, 0.0, 5.0, true);
        assert_abs_diff_eq!(p[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_meridian_rotates_about_pole() {
        let mut s = SphereGeometry::new();
        s.set_origin([0.0, 0.0, 1.0]);
        s.set_zero_meridian(FRAC_PI_2);
        let p = s.cartesian(0.0, FRAC_PI_2, 3.0, true);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn surface_covers_poles_and_equator() {
        let mut s = SphereGeometry::new();
        s.set_origin([20.0, 20.0, 21.0]);
        s.set_radius(6.0);
        let surface = s.surface_voxels();
        assert!(surface.contains(&[20, 20, 26]));
        assert!(surface.contains(&[26, 20, 20]));
        for p in &surface {
            let d = ((p[0] - 20) as f64).hypot((p[1] - 20) as f64).hypot((p[2] - 20) as f64);
            assert!((d - 6.0).abs() <= 1.0, "voxel {:?} at distance {}", p, d);
        }
    }
}
