//! mapproject — unroll curved layers of 3D volumes into flat maps.
//!
//! A projection centres a sphere (or cylinder) in a volume, casts rays
//! between an inner and an outer radius, and reduces the samples on each ray
//! into one map pixel. The building blocks are:
//!
//! 1. **Volume** – dense voxel grids with nearest, trilinear, and Lanczos
//!    sampling plus slice-stack I/O.
//! 2. **Transform** – polar, spherical, geographic, cylindrical, elliptic,
//!    and bounded map-grid coordinate transforms, placed in the volume by a
//!    [`PositionableTransform`].
//! 3. **Projector** – ray walks that reduce interpolated samples
//!    ([`LineIntensityProjector`]) or raw voxels on integer lines
//!    ([`GridIntensityProjector`]).
//! 4. **Projection** – Plate-Carrée, cylindrical, and azimuthal-equidistant
//!    maps, direct grid resampling, and the voxel-line Plate-Carrée over a
//!    tilted [`SphereGeometry`].
//! 5. **Analysis** – label centroids and a difference-of-Gaussians filter.
//!
//! # Public API
//! - [`MapProjector`] and [`MapProjectConfig`] as the primary entry points
//! - the transform traits [`CoordinateTransform`] / [`InvertibleTransform`]
//! - free functions in [`projection`] for progress/cancellation control

mod api;
mod centers;
mod filter;
pub mod projection;
mod projector;
mod sphere;
pub mod transform;
pub mod volume;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::MapProjector;
pub use centers::{
    center_table, find_label_centers, render_centers, CenterRow, CenterTableOptions, LabelCenter,
};
pub use filter::{difference_of_gaussians, gaussian_blur_3d, DogConfig, FilterError};
pub use projection::{
    project, project_legacy_plate_carree, resample, ConfigError, LegacyPlateCarreeConfig,
    MapProjectConfig, ProjectionError, ProjectionKind, ProjectionOutput, ProjectionParams,
    ProgressObserver, RunHooks,
};
pub use projector::{
    GridIntensityProjector, GridLine, GridStatistic, LineIntensityProjector, Ray, RayError,
    Reduction,
};
pub use sphere::SphereGeometry;
pub use transform::{
    Axis, CoordinateTransform, InvertibleTransform, PositionableTransform, TransformError,
};
pub use volume::{Interpolation, Volume, VolumeError, VolumeSampler, VoxelSize};
