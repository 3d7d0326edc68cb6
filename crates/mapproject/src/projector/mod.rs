//! Intensity projection along rays.
//!
//! [`LineIntensityProjector`] walks a continuous [`Ray`] through an
//! interpolated volume and folds the samples with a binary reduction.
//! [`GridIntensityProjector`] is the integer-lattice variant used by the
//! legacy Plate-Carrée projection.

mod grid_line;
mod ray;

pub use grid_line::{GridIntensityProjector, GridLine, GridStatistic};
pub use ray::{Ray, RayError, RayPoints};

use serde::{Deserialize, Serialize};

use crate::volume::{Interpolation, Volume, VolumeSampler};

/// Binary fold applied to the samples of one ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Largest sample.
    #[default]
    Max,
    /// Smallest sample.
    Min,
}

impl Reduction {
    /// Fold `next` into the accumulator.
    #[inline]
    pub fn combine(self, next: f32, acc: f32) -> f32 {
        match self {
            Self::Max => next.max(acc),
            Self::Min => next.min(acc),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

impl std::str::FromStr for Reduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" | "maximum" => Ok(Self::Max),
            "min" | "minimum" => Ok(Self::Min),
            other => Err(format!("unknown reduction '{}'", other)),
        }
    }
}

/// Reduces interpolated samples along a ray.
///
/// Samples before the ray first enters the volume are skipped. Once inside,
/// the walk stops at the first sample that leaves the volume again, so only
/// the first contiguous in-volume run contributes.
#[derive(Debug, Clone, Copy)]
pub struct LineIntensityProjector<'a> {
    sampler: VolumeSampler<'a>,
    ray: Option<Ray>,
}

impl<'a> LineIntensityProjector<'a> {
    pub fn new(volume: &'a Volume<f32>, interpolation: Interpolation) -> Self {
        Self::from_sampler(VolumeSampler::new(volume, interpolation))
    }

    pub fn from_sampler(sampler: VolumeSampler<'a>) -> Self {
        Self {
            sampler,
            ray: None,
        }
    }

    pub fn sampler(&self) -> VolumeSampler<'a> {
        self.sampler
    }

    /// Configure the ray from `start` to `end`.
    pub fn set(&mut self, start: [f64; 3], end: [f64; 3]) -> Result<(), RayError> {
        self.ray = Some(Ray::between(start, end)?);
        Ok(())
    }

    /// Configure an explicit ray.
    pub fn set_ray(&mut self, ray: Ray) {
        self.ray = Some(ray);
    }

    /// Currently configured ray, if any.
    pub fn ray(&self) -> Option<&Ray> {
        self.ray.as_ref()
    }

    /// Steps of the configured ray; `0` when none is set.
    pub fn n_steps(&self) -> usize {
        self.ray.map(|r| r.n_steps()).unwrap_or(0)
    }

    /// Reduce the configured ray. `None` when no ray is set or no sample
    /// lies inside the volume.
    pub fn compute(&self, reduction: Reduction) -> Option<f32> {
        self.compute_with(|next, acc| reduction.combine(next, acc))
    }

    /// Reduce the configured ray with an arbitrary fold `op(next, acc)`.
    pub fn compute_with(&self, op: impl Fn(f32, f32) -> f32) -> Option<f32> {
        let ray = self.ray.as_ref()?;
        self.project(ray, op)
    }

    /// Reduce `ray` without touching the configured state.
    pub fn project(&self, ray: &Ray, op: impl Fn(f32, f32) -> f32) -> Option<f32> {
        let mut points = ray.points();
        let mut acc = loop {
            let p = points.next()?;
            if let Some(v) = self.sampler.sample_checked(p) {
                break v;
            }
        };
        for p in points {
            match self.sampler.sample_checked(p) {
                Some(v) => acc = op(v, acc),
                None => break,
            }
        }
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_x(n: usize) -> Volume<f32> {
        let mut v = Volume::new(n, 3, 3);
        for z in 0..3 {
            for y in 0..3 {
                for x in 0..n {
                    v.set(x, y, z, x as f32);
                }
            }
        }
        v
    }

    #[test]
    fn max_and_min_along_axis() {
        let v = ramp_x(10);
        let mut p = LineIntensityProjector::new(&v, Interpolation::Linear);
        p.set([1.0, 1.0, 1.0], [7.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.n_steps(), 6);
        assert_eq!(p.compute(Reduction::Max), Some(7.0));
        assert_eq!(p.compute(Reduction::Min), Some(1.0));
        assert_eq!(p.compute_with(|next, acc| next + acc), Some(28.0));
    }

    #[test]
    fn unset_projector_yields_none() {
        let v = ramp_x(4);
        let p = LineIntensityProjector::new(&v, Interpolation::Nearest);
        assert_eq!(p.n_steps(), 0);
        assert_eq!(p.compute(Reduction::Max), None);
    }

    #[test]
    fn leading_outside_samples_are_skipped() {
        let v = ramp_x(10);
        let mut p = LineIntensityProjector::new(&v, Interpolation::Linear);
        p.set([-3.0, 1.0, 1.0], [2.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.compute(Reduction::Min), Some(0.0));
        assert_eq!(p.compute(Reduction::Max), Some(2.0));
    }

    #[test]
    fn walk_stops_at_first_exit() {
        let v = ramp_x(10);
        let mut p = LineIntensityProjector::new(&v, Interpolation::Linear);
        p.set([7.0, 1.0, 1.0], [12.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.compute(Reduction::Max), Some(9.0));
    }

    #[test]
    fn ray_entirely_outside_yields_none() {
        let v = ramp_x(10);
        let mut p = LineIntensityProjector::new(&v, Interpolation::Linear);
        p.set([20.0, 1.0, 1.0], [30.0, 1.0, 1.0]).unwrap();
        assert_eq!(p.compute(Reduction::Max), None);
        p.set([1.0, 5.0, 1.0], [8.0, 5.0, 1.0]).unwrap();
        assert_eq!(p.compute(Reduction::Max), None);
    }

    #[test]
    fn degenerate_ray_reads_one_sample() {
        let v = ramp_x(10);
        let mut p = LineIntensityProjector::new(&v, Interpolation::Linear);
        p.set([4.5, 1.0, 1.0], [4.5, 1.0, 1.0]).unwrap();
        assert_eq!(p.compute(Reduction::Max), Some(4.5));
    }

    #[test]
    fn reduction_parses() {
        assert_eq!("MAX".parse::<Reduction>(), Ok(Reduction::Max));
        assert!("mean".parse::<Reduction>().is_err());
    }
}
