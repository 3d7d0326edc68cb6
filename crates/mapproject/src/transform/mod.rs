//! Coordinate transforms between curvilinear systems and Cartesian space.
//!
//! Every transform maps a fixed-dimension *source* point to a fixed-dimension
//! *target* point. Invertible transforms additionally map target back to
//! source. Dimensions are carried in the type as const generics, so most
//! mismatches are compile errors; the slice-based entry points check them at
//! runtime and return [`TransformError::DimensionMismatch`].

mod cylindrical;
mod elliptic;
mod interval;
mod polar;
mod positionable;
mod spherical;

pub use cylindrical::CylindricalToCartesian;
pub use elliptic::{EllipticCylindricalToCartesian, EllipticToCartesian};
pub use interval::{
    AzimuthalEquidistantToCartesian, AzimuthalEquidistantToSpherical, CylindricalGridToCartesian,
    CylindricalGridToCylindrical, EquirectangularToCartesian, EquirectangularToSpherical,
    GridInterval, RadialShell,
};
pub use polar::PolarToCartesian;
pub use positionable::{Axis, PositionableTransform};
pub use spherical::{GeographicToCartesian, SphericalToCartesian};

use nalgebra::{Point, Vector3};

/// Transform errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Buffer length does not match the transform's source or target dimension.
    DimensionMismatch {
        /// Dimension required by the transform.
        expected: usize,
        /// Length of the supplied buffer.
        got: usize,
    },
    /// The transform has no inverse.
    UnsupportedInverse(&'static str),
    /// Axis index outside `0..3`.
    InvalidAxis(usize),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "dimension mismatch: expected {}, got {}", expected, got)
            }
            Self::UnsupportedInverse(name) => write!(f, "{} has no inverse", name),
            Self::InvalidAxis(axis) => write!(f, "invalid axis index {}", axis),
        }
    }
}

impl std::error::Error for TransformError {}

/// Anything that can report a continuous `N`-dimensional position.
pub trait RealLocalizable<const N: usize> {
    fn real_position(&self) -> [f64; N];
}

macro_rules! localizable_array {
    ($($t:ty),*) => {
        $(
            impl<const N: usize> RealLocalizable<N> for [$t; N] {
                #[inline]
                fn real_position(&self) -> [f64; N] {
                    self.map(|c| c as f64)
                }
            }
        )*
    };
}

localizable_array!(f64, f32, i32, i64, usize);

impl<const N: usize> RealLocalizable<N> for Point<f64, N> {
    fn real_position(&self) -> [f64; N] {
        std::array::from_fn(|i| self[i])
    }
}

impl RealLocalizable<3> for Vector3<f64> {
    fn real_position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

fn check_len(expected: usize, got: usize) -> Result<(), TransformError> {
    if expected == got {
        Ok(())
    } else {
        Err(TransformError::DimensionMismatch { expected, got })
    }
}

/// Forward mapping from an `S`-dimensional source to a `T`-dimensional target.
pub trait CoordinateTransform<const S: usize, const T: usize> {
    /// Map a single point.
    fn apply(&self, source: [f64; S]) -> [f64; T];

    /// Single-precision convenience; computes in `f64`.
    fn apply_f32(&self, source: [f32; S]) -> [f32; T] {
        self.apply(source.map(f64::from)).map(|v| v as f32)
    }

    /// Map a point held in a runtime-sized buffer into `target`.
    fn apply_slice(&self, source: &[f64], target: &mut [f64]) -> Result<(), TransformError> {
        check_len(S, source.len())?;
        check_len(T, target.len())?;
        let src: [f64; S] = std::array::from_fn(|i| source[i]);
        target.copy_from_slice(&self.apply(src));
        Ok(())
    }

    /// Map any positioned value.
    fn apply_point<L: RealLocalizable<S>>(&self, source: &L) -> Point<f64, T> {
        Point::from(self.apply(source.real_position()))
    }

    /// Source dimension.
    fn source_dim(&self) -> usize {
        S
    }

    /// Target dimension.
    fn target_dim(&self) -> usize {
        T
    }
}

/// A transform whose inverse maps target points back to source points.
pub trait InvertibleTransform<const S: usize, const T: usize>: CoordinateTransform<S, T> {
    fn apply_inverse(&self, target: [f64; T]) -> [f64; S];

    fn apply_inverse_f32(&self, target: [f32; T]) -> [f32; S] {
        self.apply_inverse(target.map(f64::from)).map(|v| v as f32)
    }

    fn apply_inverse_slice(&self, target: &[f64], source: &mut [f64]) -> Result<(), TransformError> {
        check_len(T, target.len())?;
        check_len(S, source.len())?;
        let tgt: [f64; T] = std::array::from_fn(|i| target[i]);
        source.copy_from_slice(&self.apply_inverse(tgt));
        Ok(())
    }

    fn apply_inverse_point<L: RealLocalizable<T>>(&self, target: &L) -> Point<f64, S> {
        Point::from(self.apply_inverse(target.real_position()))
    }
}

/// Identity map in any dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityTransform;

impl<const N: usize> CoordinateTransform<N, N> for IdentityTransform {
    #[inline]
    fn apply(&self, source: [f64; N]) -> [f64; N] {
        source
    }
}

impl<const N: usize> InvertibleTransform<N, N> for IdentityTransform {
    #[inline]
    fn apply_inverse(&self, target: [f64; N]) -> [f64; N] {
        target
    }
}
