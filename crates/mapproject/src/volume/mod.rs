//! Dense voxel volumes and interpolating samplers.
//!
//! A [`Volume`] stores a scalar grid with `x` varying fastest, then `y`, then
//! `z`. A 2D image is a volume with depth 1. Sampling and I/O helpers live in
//! the submodules.

mod io;
mod sampler;

pub use io::{list_slice_files, load_slice_dir, load_slice_stack, save_slice_stack, save_u16_stack};
pub use sampler::{Interpolation, VolumeSampler};

use serde::{Deserialize, Serialize};

/// Errors raised while building, loading, or storing volumes.
#[derive(Debug)]
pub enum VolumeError {
    /// Flat data length does not match the requested dimensions.
    DataLength {
        /// Number of voxels implied by the dimensions.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
    /// The voxel buffer could not be allocated.
    Allocation {
        /// Number of voxels requested.
        voxels: usize,
    },
    /// The voxel count of `dims` does not fit in `usize`.
    TooLarge { dims: [usize; 3] },
    /// A slice stack contained no images.
    EmptyStack,
    /// A slice differs in size from the first slice of the stack.
    SliceSize {
        /// Zero-based index of the offending slice.
        index: usize,
        /// Size of the first slice `[width, height]`.
        expected: [u32; 2],
        /// Size of the offending slice.
        got: [u32; 2],
    },
    /// Filesystem error.
    Io(std::io::Error),
    /// Image decode/encode error.
    Image(image::ImageError),
}

impl std::fmt::Display for VolumeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataLength { expected, got } => {
                write!(f, "volume data length mismatch: expected {}, got {}", expected, got)
            }
            Self::Allocation { voxels } => {
                write!(f, "failed to allocate a volume of {} voxels", voxels)
            }
            Self::TooLarge { dims } => {
                write!(f, "volume dimensions {:?} overflow the voxel count", dims)
            }
            Self::EmptyStack => write!(f, "slice stack is empty"),
            Self::SliceSize {
                index,
                expected,
                got,
            } => write!(
                f,
                "slice {} is {}x{}, expected {}x{}",
                index, got[0], got[1], expected[0], expected[1]
            ),
            Self::Io(e) => write!(f, "i/o error: {}", e),
            Self::Image(e) => write!(f, "image error: {}", e),
        }
    }
}

impl std::error::Error for VolumeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VolumeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for VolumeError {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

/// Physical size of one voxel along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelSize {
    /// Voxel width.
    pub x: f64,
    /// Voxel height.
    pub y: f64,
    /// Slice thickness.
    pub z: f64,
}

impl Default for VoxelSize {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        }
    }
}

impl VoxelSize {
    /// Construct from per-axis sizes.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Sizes as an array `[x, y, z]`.
    pub fn as_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// `true` when every size is finite and strictly positive.
    pub fn is_valid(self) -> bool {
        self.as_array().iter().all(|s| s.is_finite() && *s > 0.0)
    }

    /// Per-axis sampling anisotropy relative to the smallest voxel side.
    pub fn anisotropy(self) -> [f64; 3] {
        let sizes = self.as_array();
        let smallest = sizes.iter().copied().fold(f64::INFINITY, f64::min);
        sizes.map(|s| s / smallest)
    }
}

/// Dense 3D scalar grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T> {
    dims: [usize; 3],
    data: Vec<T>,
}

/// `width · height · depth`, or `None` on overflow.
fn voxel_count(dims: [usize; 3]) -> Option<usize> {
    dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}

impl<T: Copy + Default> Volume<T> {
    /// Create a volume filled with `T::default()`.
    ///
    /// Panics if the voxel count overflows or the allocation fails; use
    /// [`Volume::try_new`] for large grids.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        let dims = [width, height, depth];
        let Some(n) = voxel_count(dims) else {
            panic!("volume dimensions {:?} overflow the voxel count", dims);
        };
        Self {
            dims: [width, height, depth],
            data: vec![T::default(); n],
        }
    }

    /// Create a default-filled volume, reporting allocation failure instead of aborting.
    pub fn try_new(dims: [usize; 3]) -> Result<Self, VolumeError> {
        let voxels = voxel_count(dims).ok_or(VolumeError::TooLarge { dims })?;
        let mut data = Vec::new();
        data.try_reserve_exact(voxels)
            .map_err(|_| VolumeError::Allocation { voxels })?;
        data.resize(voxels, T::default());
        Ok(Self { dims, data })
    }
}

impl<T: Copy> Volume<T> {
    /// Wrap a flat buffer (`x` fastest) as a volume.
    pub fn from_vec(dims: [usize; 3], data: Vec<T>) -> Result<Self, VolumeError> {
        let expected = voxel_count(dims).ok_or(VolumeError::TooLarge { dims })?;
        if data.len() != expected {
            return Err(VolumeError::DataLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    /// Dimensions `[width, height, depth]`.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims[0]
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims[1]
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.dims[2]
    }

    /// Total number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if any dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of voxel `(x, y, z)`. Does not check bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.dims[1] + y) * self.dims[0] + x
    }

    /// Voxel value, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<T> {
        if x < self.dims[0] && y < self.dims[1] && z < self.dims[2] {
            Some(self.data[self.index(x, y, z)])
        } else {
            None
        }
    }

    /// Voxel value at signed grid coordinates, or `None` outside the grid.
    #[inline]
    pub fn get_signed(&self, p: [i64; 3]) -> Option<T> {
        if p.iter().any(|&c| c < 0) {
            return None;
        }
        self.get(p[0] as usize, p[1] as usize, p[2] as usize)
    }

    /// Overwrite voxel `(x, y, z)`. Returns `false` if outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) -> bool {
        if x < self.dims[0] && y < self.dims[1] && z < self.dims[2] {
            let idx = self.index(x, y, z);
            self.data[idx] = value;
            true
        } else {
            false
        }
    }

    /// Flat voxel buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat voxel buffer.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the volume and return the flat buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// One z-slice as a flat `width * height` buffer.
    pub fn slice(&self, z: usize) -> &[T] {
        let n = self.dims[0] * self.dims[1];
        &self.data[z * n..(z + 1) * n]
    }

    /// Mutable z-slice.
    pub fn slice_mut(&mut self, z: usize) -> &mut [T] {
        let n = self.dims[0] * self.dims[1];
        &mut self.data[z * n..(z + 1) * n]
    }

    /// Apply `f` to every voxel, producing a volume of the same shape.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Volume<U> {
        Volume {
            dims: self.dims,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// `true` when the continuous position lies inside `[0, dim - 1]` on every axis.
    #[inline]
    pub fn contains(&self, p: [f64; 3]) -> bool {
        (0..3).all(|d| p[d] >= 0.0 && p[d] <= (self.dims[d] as f64 - 1.0))
    }
}

impl Volume<f32> {
    /// Smallest and largest voxel value, or `None` for an empty volume.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut it = self.data.iter().copied();
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Round and saturate every voxel into the 16-bit range.
    pub fn to_u16(&self) -> Volume<u16> {
        self.map(|v| {
            if v.is_finite() {
                v.round().clamp(0.0, u16::MAX as f32) as u16
            } else {
                0
            }
        })
    }
}

impl Volume<u16> {
    /// Widen to `f32` samples.
    pub fn to_f32(&self) -> Volume<f32> {
        self.map(f32::from)
    }
}
