//! Synthetic volumes shared by unit tests.

use std::f64::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::volume::Volume;

/// Voxels whose centre lies at distance `[inner, outer]` from `center` get
/// `value`; everything else is zero.
pub(crate) fn sphere_shell(
    dims: [usize; 3],
    center: [f64; 3],
    inner: f64,
    outer: f64,
    value: f32,
) -> Volume<f32> {
    let mut v = Volume::new(dims[0], dims[1], dims[2]);
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let dx = x as f64 - center[0];
                let dy = y as f64 - center[1];
                let dz = z as f64 - center[2];
                let r = (dx * dx + dy * dy + dz * dz).sqrt();
                if r >= inner && r <= outer {
                    v.set(x, y, z, value);
                }
            }
        }
    }
    v
}

/// Solid ball of `value`.
pub(crate) fn filled_ball(dims: [usize; 3], center: [f64; 3], radius: f64, value: f32) -> Volume<f32> {
    sphere_shell(dims, center, 0.0, radius, value)
}

/// Intensity equals the slice index.
pub(crate) fn ramp_z(dims: [usize; 3]) -> Volume<f32> {
    let mut v = Volume::new(dims[0], dims[1], dims[2]);
    for z in 0..dims[2] {
        v.slice_mut(z).fill(z as f32);
    }
    v
}

/// Uniform noise in `[0, amplitude)` from a fixed seed.
pub(crate) fn noise(dims: [usize; 3], amplitude: f32, seed: u64) -> Volume<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v = Volume::new(dims[0], dims[1], dims[2]);
    for s in v.as_mut_slice() {
        *s = rng.gen::<f32>() * amplitude;
    }
    v
}

/// Difference `a - b` wrapped into `(-π, π]`.
pub(crate) fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Deterministic generator for randomized round trips.
pub(crate) fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
