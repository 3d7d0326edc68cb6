//! Difference-of-Gaussians band-pass filter for volumes.

use image::{ImageBuffer, Luma};
use imageproc::filter::separable_filter;
use serde::{Deserialize, Serialize};

use crate::projection::ConfigError;
use crate::volume::{Volume, VoxelSize};

type Plane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Errors from [`difference_of_gaussians`] and [`gaussian_blur_3d`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    Config(ConfigError),
    /// A z-slice could not be viewed as a 2D image.
    Plane { width: usize, height: usize },
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{}", e),
            Self::Plane { width, height } => {
                write!(f, "cannot filter a {}x{} slice as an image", width, height)
            }
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Plane { .. } => None,
        }
    }
}

impl From<ConfigError> for FilterError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Parameters of [`difference_of_gaussians`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DogConfig {
    /// Sigma of the positive (fine) Gaussian, in voxels of the smallest side.
    pub sigma1: f64,
    /// Sigma of the subtracted (coarse) Gaussian.
    pub sigma2: f64,
    /// Scale sigmas per axis by the voxel anisotropy.
    pub anisotropic: bool,
}

impl Default for DogConfig {
    fn default() -> Self {
        Self {
            sigma1: 2.0,
            sigma2: 4.0,
            anisotropic: true,
        }
    }
}

impl DogConfig {
    /// Checks the per-axis sigmas that will actually reach the kernels.
    pub fn validate(&self, voxel: VoxelSize) -> Result<(), ConfigError> {
        if self.anisotropic && !voxel.is_valid() {
            return Err(ConfigError::VoxelSize(voxel.as_array()));
        }
        for sigma in [self.sigma1, self.sigma2] {
            check_sigma(sigma)?;
            for axis_sigma in self.axis_sigmas(sigma, voxel) {
                check_sigma(axis_sigma)?;
            }
        }
        Ok(())
    }

    /// Per-axis sigmas `σ / anisotropy_i` (or `σ` on every axis).
    pub fn axis_sigmas(&self, sigma: f64, voxel: VoxelSize) -> [f64; 3] {
        if self.anisotropic {
            voxel.anisotropy().map(|a| sigma / a)
        } else {
            [sigma; 3]
        }
    }
}

/// A sigma must stay positive after narrowing to the `f32` kernels.
fn check_sigma(sigma: f64) -> Result<(), ConfigError> {
    if sigma.is_finite() && sigma > 0.0 && (sigma as f32) > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Sigma(sigma))
    }
}

/// `blur(σ1) − blur(σ2)`.
pub fn difference_of_gaussians(
    volume: &Volume<f32>,
    config: &DogConfig,
    voxel: VoxelSize,
) -> Result<Volume<f32>, FilterError> {
    config.validate(voxel)?;
    let s1 = config.axis_sigmas(config.sigma1, voxel);
    let s2 = config.axis_sigmas(config.sigma2, voxel);
    tracing::debug!(?s1, ?s2, "difference of gaussians");

    let mut out = gaussian_blur_3d(volume, s1)?;
    let coarse = gaussian_blur_3d(volume, s2)?;
    for (o, c) in out.as_mut_slice().iter_mut().zip(coarse.as_slice()) {
        *o -= c;
    }
    Ok(out)
}

/// Separable Gaussian blur with one sigma per axis `[x, y, z]`.
///
/// Each slice is filtered in-plane, then every column is filtered along z.
/// Borders repeat the edge voxel.
pub fn gaussian_blur_3d(volume: &Volume<f32>, sigma: [f64; 3]) -> Result<Volume<f32>, FilterError> {
    for s in sigma {
        check_sigma(s)?;
    }
    let [w, h, d] = volume.dims();
    let mut out = volume.clone();
    if volume.is_empty() {
        return Ok(out);
    }

    let kx = to_f32(&gaussian_kernel(sigma[0]));
    let ky = to_f32(&gaussian_kernel(sigma[1]));
    for z in 0..d {
        let plane = plane_image(w, h, volume.slice(z).to_vec())?;
        let blurred = separable_filter(&plane, &kx, &ky);
        out.slice_mut(z).copy_from_slice(blurred.as_raw());
    }

    if d > 1 {
        blur_along_z(&mut out, sigma[2]);
    }
    Ok(out)
}

fn plane_image(width: usize, height: usize, data: Vec<f32>) -> Result<Plane, FilterError> {
    let err = FilterError::Plane { width, height };
    let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(err);
    };
    ImageBuffer::from_raw(w, h, data).ok_or(err)
}

/// Normalised kernel of radius `ceil(3σ)` (at least 1).
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil().max(1.0) as usize;
    let mut k: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let t = i as f64 - radius as f64;
            (-0.5 * t * t / (sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for v in &mut k {
        *v /= sum;
    }
    k
}

fn to_f32(kernel: &[f64]) -> Vec<f32> {
    kernel.iter().map(|&v| v as f32).collect()
}

fn blur_along_z(volume: &mut Volume<f32>, sigma: f64) {
    let [w, h, d] = volume.dims();
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as i64;
    let plane = w * h;
    let mut column = vec![0.0f32; d];
    let data = volume.as_mut_slice();
    for i in 0..plane {
        for (z, c) in column.iter_mut().enumerate() {
            *c = data[z * plane + i];
        }
        for z in 0..d {
            let mut acc = 0.0f64;
            for (k, &wk) in kernel.iter().enumerate() {
                // clamp-to-edge
                let zz = (z as i64 + k as i64 - radius).clamp(0, d as i64 - 1) as usize;
                acc += wk * column[zz] as f64;
            }
            data[z * plane + i] = acc as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{filled_ball, noise};
    use approx::assert_abs_diff_eq;

    fn impulse(dims: [usize; 3], at: [usize; 3]) -> Volume<f32> {
        let mut v = Volume::new(dims[0], dims[1], dims[2]);
        v.set(at[0], at[1], at[2], 1000.0);
        v
    }

    #[test]
    fn constant_volume_has_zero_response() {
        let v = Volume::from_vec([12, 12, 6], vec![50.0f32; 12 * 12 * 6]).unwrap();
        let out = difference_of_gaussians(&v, &DogConfig::default(), VoxelSize::default()).unwrap();
        for &x in out.as_slice() {
            assert_abs_diff_eq!(x, 0.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn blob_centre_responds_positively() {
        let v = filled_ball([25, 25, 25], [12.0, 12.0, 12.0], 3.0, 100.0);
        let cfg = DogConfig {
            sigma1: 1.0,
            sigma2: 3.0,
            anisotropic: false,
        };
        let out = difference_of_gaussians(&v, &cfg, VoxelSize::default()).unwrap();
        let centre = out.get(12, 12, 12).unwrap();
        let far = out.get(0, 0, 0).unwrap();
        assert!(centre > 10.0, "centre response {}", centre);
        assert!(centre > far);
    }

    #[test]
    fn anisotropy_scales_sigmas() {
        let cfg = DogConfig::default();
        let s = cfg.axis_sigmas(2.0, VoxelSize::new(0.5, 0.5, 2.0));
        assert_eq!(s, [2.0, 2.0, 0.5]);
        let iso = DogConfig {
            anisotropic: false,
            ..cfg
        };
        assert_eq!(iso.axis_sigmas(2.0, VoxelSize::new(0.5, 0.5, 2.0)), [2.0; 3]);
    }

    #[test]
    fn in_plane_blur_honours_each_axis_sigma() {
        let v = impulse([41, 41, 1], [20, 20, 0]);
        let cfg = DogConfig::default();
        // y voxels twice as long: y sigma halves
        let sigma = cfg.axis_sigmas(2.0, VoxelSize::new(1.0, 2.0, 1.0));
        assert_eq!(sigma, [2.0, 1.0, 2.0]);

        let out = gaussian_blur_3d(&v, sigma).unwrap();
        let along_x = out.get(23, 20, 0).unwrap();
        let along_y = out.get(20, 23, 0).unwrap();
        assert!(along_x > along_y, "x {} vs y {}", along_x, along_y);

        let total: f32 = out.as_slice().iter().sum();
        assert_abs_diff_eq!(total, 1000.0, epsilon = 0.5);
    }

    #[test]
    fn isotropic_in_plane_blur_is_symmetric() {
        let v = impulse([31, 31, 1], [15, 15, 0]);
        let out = gaussian_blur_3d(&v, [1.5; 3]).unwrap();
        assert_abs_diff_eq!(
            out.get(18, 15, 0).unwrap(),
            out.get(15, 18, 0).unwrap(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn z_blur_preserves_mean() {
        let v = noise([4, 4, 16], 10.0, 7);
        let sum_before: f64 = v.as_slice().iter().map(|&x| x as f64).sum();
        let mut blurred = v.clone();
        blur_along_z(&mut blurred, 0.6);
        let sum_after: f64 = blurred.as_slice().iter().map(|&x| x as f64).sum();
        // clamped borders redistribute a little mass at the ends
        assert!((sum_before - sum_after).abs() / sum_before < 0.05);
    }

    #[test]
    fn rejects_non_positive_sigma() {
        let v = Volume::new(4, 4, 1);
        let cfg = DogConfig {
            sigma1: 0.0,
            ..DogConfig::default()
        };
        assert_eq!(
            difference_of_gaussians(&v, &cfg, VoxelSize::default()),
            Err(FilterError::Config(ConfigError::Sigma(0.0)))
        );
    }

    #[test]
    fn rejects_sigma_that_vanishes_in_single_precision() {
        let cfg = DogConfig {
            sigma1: 1e-60,
            ..DogConfig::default()
        };
        assert_eq!(
            cfg.validate(VoxelSize::default()),
            Err(ConfigError::Sigma(1e-60))
        );
        let v = Volume::new(8, 8, 2);
        assert!(difference_of_gaussians(&v, &cfg, VoxelSize::default()).is_err());
    }

    #[test]
    fn blur_rejects_zero_sigma_instead_of_panicking() {
        let v = impulse([8, 8, 3], [4, 4, 1]);
        assert_eq!(
            gaussian_blur_3d(&v, [0.0; 3]),
            Err(FilterError::Config(ConfigError::Sigma(0.0)))
        );
        assert!(gaussian_blur_3d(&v, [1.0, f64::NAN, 1.0]).is_err());
    }

    #[test]
    fn unrepresentable_slices_are_errors() {
        assert_eq!(
            plane_image(4, 4, vec![0.0; 3]),
            Err(FilterError::Plane { width: 4, height: 4 })
        );
        assert!(plane_image(usize::MAX, 1, Vec::new()).is_err());
    }
}
