//! Continuous-position sampling of a [`Volume<f32>`].

use serde::{Deserialize, Serialize};

use super::Volume;

/// Lanczos window radius (taps per side).
const LANCZOS_RADIUS: i64 = 3;

/// Interpolation scheme used when reading a volume at non-integer positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Value of the closest voxel.
    Nearest,
    /// Trilinear blend of the 8 surrounding voxels.
    #[default]
    Linear,
    /// Separable Lanczos-3 windowed sinc.
    Lanczos,
}

impl Interpolation {
    /// Stable lowercase name, also used in output labels.
    pub fn name(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Lanczos => "lanczos",
        }
    }
}

impl std::fmt::Display for Interpolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Interpolation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "nearest-neighbor" | "nearestneighbor" => Ok(Self::Nearest),
            "linear" | "nlinear" | "trilinear" => Ok(Self::Linear),
            "lanczos" => Ok(Self::Lanczos),
            other => Err(format!("unknown interpolation '{}'", other)),
        }
    }
}

/// Read-only interpolating view over a volume.
///
/// A position is inside the volume when every coordinate lies in
/// `[0, dim - 1]`. Interpolation stencils that reach past the grid edge read
/// zero for the missing neighbours.
#[derive(Debug, Clone, Copy)]
pub struct VolumeSampler<'a> {
    volume: &'a Volume<f32>,
    interpolation: Interpolation,
}

impl<'a> VolumeSampler<'a> {
    pub fn new(volume: &'a Volume<f32>, interpolation: Interpolation) -> Self {
        Self {
            volume,
            interpolation,
        }
    }

    /// Underlying volume.
    pub fn volume(&self) -> &'a Volume<f32> {
        self.volume
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Whether `p` lies inside the sampled domain.
    #[inline]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        self.volume.contains(p)
    }

    /// Interpolated value at `p`, or `None` when `p` is outside the volume
    /// or not finite.
    #[inline]
    pub fn sample_checked(&self, p: [f64; 3]) -> Option<f32> {
        if !self.volume.contains(p) {
            return None;
        }
        Some(self.sample_unchecked(p))
    }

    /// Interpolated value at `p`, reading zero outside the volume.
    #[inline]
    pub fn sample_or_zero(&self, p: [f64; 3]) -> f32 {
        if p.iter().any(|c| !c.is_finite()) {
            return 0.0;
        }
        self.sample_unchecked(p)
    }

    fn sample_unchecked(&self, p: [f64; 3]) -> f32 {
        match self.interpolation {
            Interpolation::Nearest => self.voxel_or_zero(p.map(|c| c.round() as i64)),
            Interpolation::Linear => self.trilinear(p),
            Interpolation::Lanczos => self.lanczos(p),
        }
    }

    #[inline]
    fn voxel_or_zero(&self, p: [i64; 3]) -> f32 {
        self.volume.get_signed(p).unwrap_or(0.0)
    }

    fn trilinear(&self, p: [f64; 3]) -> f32 {
        let base = p.map(|c| c.floor());
        let frac = [p[0] - base[0], p[1] - base[1], p[2] - base[2]];
        let [x0, y0, z0] = base.map(|c| c as i64);

        let mut acc = 0.0f64;
        for (dz, wz) in [(0, 1.0 - frac[2]), (1, frac[2])] {
            if wz == 0.0 {
                continue;
            }
            for (dy, wy) in [(0, 1.0 - frac[1]), (1, frac[1])] {
                if wy == 0.0 {
                    continue;
                }
                for (dx, wx) in [(0, 1.0 - frac[0]), (1, frac[0])] {
                    if wx == 0.0 {
                        continue;
                    }
                    let v = self.voxel_or_zero([x0 + dx, y0 + dy, z0 + dz]);
                    acc += wx * wy * wz * v as f64;
                }
            }
        }
        acc as f32
    }

    fn lanczos(&self, p: [f64; 3]) -> f32 {
        let taps = (2 * LANCZOS_RADIUS) as usize;
        let mut weights = [[0.0f64; 6]; 3];
        let mut first = [0i64; 3];
        for d in 0..3 {
            let base = p[d].floor() as i64;
            first[d] = base - LANCZOS_RADIUS + 1;
            for (k, w) in weights[d].iter_mut().enumerate().take(taps) {
                *w = lanczos_kernel(p[d] - (first[d] + k as i64) as f64);
            }
        }
        let norm: f64 = weights.iter().map(|w| w.iter().sum::<f64>()).product();
        if norm == 0.0 {
            return 0.0;
        }

        let mut acc = 0.0f64;
        for (kz, &wz) in weights[2].iter().enumerate() {
            if wz == 0.0 {
                continue;
            }
            for (ky, &wy) in weights[1].iter().enumerate() {
                if wy == 0.0 {
                    continue;
                }
                for (kx, &wx) in weights[0].iter().enumerate() {
                    if wx == 0.0 {
                        continue;
                    }
                    let v = self.voxel_or_zero([
                        first[0] + kx as i64,
                        first[1] + ky as i64,
                        first[2] + kz as i64,
                    ]);
                    acc += wx * wy * wz * v as f64;
                }
            }
        }
        (acc / norm) as f32
    }
}

fn lanczos_kernel(x: f64) -> f64 {
    let a = LANCZOS_RADIUS as f64;
    if x == 0.0 {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }
    let px = std::f64::consts::PI * x;
    a * px.sin() * (px / a).sin() / (px * px)
}
