//! Bounded grid transforms: discrete output-map voxels to native coordinates.
//!
//! Each transform owns the dimensions of the map grid it describes. Grid `z`
//! indexes radius layers from the outer radius inwards; grid `x`/`y` are the
//! planar map coordinates.

use std::f64::consts::{PI, TAU};

use super::{
    CoordinateTransform, CylindricalToCartesian, InvertibleTransform, PolarToCartesian,
    SphericalToCartesian,
};

/// A finite grid starting at the origin.
pub trait GridInterval {
    /// Grid dimensions `[width, height, depth]`.
    fn dimensions(&self) -> [usize; 3];

    /// Smallest grid coordinate on every axis.
    fn min(&self) -> [i64; 3] {
        [0; 3]
    }

    /// Largest grid coordinate on every axis.
    fn max(&self) -> [i64; 3] {
        self.dimensions().map(|d| d as i64 - 1)
    }

    /// Total number of grid voxels.
    fn num_voxels(&self) -> usize {
        self.dimensions().iter().product()
    }
}

/// Radial extent of a shell and the layer that defines map resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialShell {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Fraction of the radius interval, from the inner radius, that places
    /// the standard radius.
    pub std_radius_offset: f64,
    pub scale: f64,
}

impl RadialShell {
    pub fn new(inner_radius: f64, outer_radius: f64, std_radius_offset: f64, scale: f64) -> Self {
        Self {
            inner_radius,
            outer_radius,
            std_radius_offset,
            scale,
        }
    }

    /// Number of radius layers covered, counting both ends.
    pub fn radius_interval(&self) -> f64 {
        self.outer_radius - self.inner_radius + 1.0
    }

    /// Radius at which one map pixel spans one voxel (at scale 1).
    pub fn std_radius(&self) -> f64 {
        self.inner_radius + self.std_radius_offset * self.radius_interval()
    }

    fn depth(&self) -> usize {
        grid_len(self.scale * self.radius_interval())
    }

    /// Radius of grid layer `z` in a grid of `depth` layers.
    #[inline]
    fn radius_at(&self, z: f64, depth: usize) -> f64 {
        self.outer_radius - z * self.radius_interval() / depth as f64
    }
}

fn grid_len(extent: f64) -> usize {
    if extent.is_finite() {
        (extent.round() as usize).max(1)
    } else {
        1
    }
}

// ── Equirectangular ────────────────────────────────────────────────────────

/// Plate-Carrée grid to `(r, polar, azimuth)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquirectangularToSpherical {
    shell: RadialShell,
    dims: [usize; 3],
}

impl EquirectangularToSpherical {
    pub fn new(shell: RadialShell) -> Self {
        let width = grid_len(shell.scale * TAU * shell.std_radius());
        let height = grid_len(width as f64 / 2.0);
        Self {
            shell,
            dims: [width, height, shell.depth()],
        }
    }

    pub fn shell(&self) -> &RadialShell {
        &self.shell
    }
}

impl GridInterval for EquirectangularToSpherical {
    fn dimensions(&self) -> [usize; 3] {
        self.dims
    }
}

impl CoordinateTransform<3, 3> for EquirectangularToSpherical {
    #[inline]
    fn apply(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        [
            self.shell.radius_at(z, self.dims[2]),
            y * PI / self.dims[1] as f64,
            x * TAU / self.dims[0] as f64,
        ]
    }
}

/// Plate-Carrée grid to Cartesian offsets from the sphere centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquirectangularToCartesian {
    grid: EquirectangularToSpherical,
}

impl EquirectangularToCartesian {
    pub fn new(shell: RadialShell) -> Self {
        Self {
            grid: EquirectangularToSpherical::new(shell),
        }
    }
}

impl GridInterval for EquirectangularToCartesian {
    fn dimensions(&self) -> [usize; 3] {
        self.grid.dims
    }
}

impl CoordinateTransform<3, 3> for EquirectangularToCartesian {
    #[inline]
    fn apply(&self, source: [f64; 3]) -> [f64; 3] {
        SphericalToCartesian.apply(self.grid.apply(source))
    }
}

// ── Azimuthal equidistant ──────────────────────────────────────────────────

/// Azimuthal-equidistant grid to `(r, polar, azimuth)`.
///
/// The pole sits at the grid centre; the grid corner maps to polar angle `π`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistantToSpherical {
    shell: RadialShell,
    dims: [usize; 3],
    max_planar_radius: f64,
}

impl AzimuthalEquidistantToSpherical {
    pub fn new(shell: RadialShell) -> Self {
        let side = grid_len(shell.scale * shell.std_radius() * PI);
        let half = 0.5 * side as f64;
        let [max_planar_radius, _] = PolarToCartesian.apply_inverse([half, half]);
        Self {
            shell,
            dims: [side, side, shell.depth()],
            max_planar_radius,
        }
    }

    pub fn max_planar_radius(&self) -> f64 {
        self.max_planar_radius
    }
}

impl GridInterval for AzimuthalEquidistantToSpherical {
    fn dimensions(&self) -> [usize; 3] {
        self.dims
    }
}

impl CoordinateTransform<3, 3> for AzimuthalEquidistantToSpherical {
    #[inline]
    fn apply(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let planar = [
            x - 0.5 * self.dims[0] as f64,
            y - 0.5 * self.dims[1] as f64,
        ];
        let [planar_r, planar_theta] = PolarToCartesian.apply_inverse(planar);
        [
            self.shell.radius_at(z, self.dims[2]),
            planar_r / self.max_planar_radius * PI,
            planar_theta,
        ]
    }
}

/// Azimuthal-equidistant grid to Cartesian offsets from the sphere centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistantToCartesian {
    grid: AzimuthalEquidistantToSpherical,
}

impl AzimuthalEquidistantToCartesian {
    pub fn new(shell: RadialShell) -> Self {
        Self {
            grid: AzimuthalEquidistantToSpherical::new(shell),
        }
    }
}

impl GridInterval for AzimuthalEquidistantToCartesian {
    fn dimensions(&self) -> [usize; 3] {
        self.grid.dims
    }
}

impl CoordinateTransform<3, 3> for AzimuthalEquidistantToCartesian {
    #[inline]
    fn apply(&self, source: [f64; 3]) -> [f64; 3] {
        SphericalToCartesian.apply(self.grid.apply(source))
    }
}

// ── Cylindrical ────────────────────────────────────────────────────────────

/// Cylinder-unrolling grid to `(r, θ, h)`.
///
/// Grid `x` runs along the cylinder axis, centred on the origin; grid `y`
/// runs around the circumference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylindricalGridToCylindrical {
    shell: RadialShell,
    cylinder_height: f64,
    dims: [usize; 3],
}

impl CylindricalGridToCylindrical {
    pub fn new(cylinder_height: f64, shell: RadialShell) -> Self {
        let width = grid_len(shell.scale * cylinder_height);
        let height = grid_len(shell.scale * TAU * shell.std_radius());
        Self {
            shell,
            cylinder_height,
            dims: [width, height, shell.depth()],
        }
    }

    pub fn cylinder_height(&self) -> f64 {
        self.cylinder_height
    }
}

impl GridInterval for CylindricalGridToCylindrical {
    fn dimensions(&self) -> [usize; 3] {
        self.dims
    }
}

impl CoordinateTransform<3, 3> for CylindricalGridToCylindrical {
    #[inline]
    fn apply(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        [
            self.shell.radius_at(z, self.dims[2]),
            y * TAU / self.dims[1] as f64,
            x * self.cylinder_height / self.dims[0] as f64 - 0.5 * self.cylinder_height,
        ]
    }
}

/// Cylinder-unrolling grid to Cartesian offsets from the cylinder centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylindricalGridToCartesian {
    grid: CylindricalGridToCylindrical,
}

impl CylindricalGridToCartesian {
    pub fn new(cylinder_height: f64, shell: RadialShell) -> Self {
        Self {
            grid: CylindricalGridToCylindrical::new(cylinder_height, shell),
        }
    }
}

impl GridInterval for CylindricalGridToCartesian {
    fn dimensions(&self) -> [usize; 3] {
        self.grid.dims
    }
}

impl CoordinateTransform<3, 3> for CylindricalGridToCartesian {
    #[inline]
    fn apply(&self, source: [f64; 3]) -> [f64; 3] {
        CylindricalToCartesian.apply(self.grid.apply(source))
    }
}
