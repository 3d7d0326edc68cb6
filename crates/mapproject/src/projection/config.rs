//! Projection configuration, validation, and the parameter record.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::projector::Reduction;
use crate::transform::{
    AzimuthalEquidistantToCartesian, CylindricalGridToCartesian, EquirectangularToCartesian,
    GridInterval, RadialShell,
};
use crate::volume::Interpolation;

/// Default cylinder length along its axis, in voxels.
pub const DEFAULT_CYLINDER_HEIGHT: f64 = 512.0;

fn default_cylinder_height() -> f64 {
    DEFAULT_CYLINDER_HEIGHT
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Plane position outside `(0, 1]`.
    PlanePosition(f64),
    /// Scale not strictly positive.
    Scale(f64),
    /// Fewer than one layer.
    Layers(usize),
    /// Radii not satisfying `0 <= inner < outer`.
    Radii { inner: f64, outer: f64 },
    /// Cylinder height not strictly positive.
    CylinderHeight(f64),
    /// A voxel side not strictly positive.
    VoxelSize([f64; 3]),
    /// Gaussian sigma not strictly positive.
    Sigma(f64),
    /// A named parameter is NaN or infinite.
    NonFinite(&'static str),
    /// Derived output grid has a zero-length axis.
    EmptyOutput([usize; 3]),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlanePosition(v) => write!(f, "plane position must be in (0, 1], got {}", v),
            Self::Scale(v) => write!(f, "scale must be greater than 0, got {}", v),
            Self::Layers(v) => write!(f, "number of layers must be at least 1, got {}", v),
            Self::Radii { inner, outer } => write!(
                f,
                "radii must satisfy 0 <= inner < outer, got inner={} outer={}",
                inner, outer
            ),
            Self::CylinderHeight(v) => write!(f, "cylinder height must be greater than 0, got {}", v),
            Self::VoxelSize(v) => write!(f, "voxel size must be positive, got {:?}", v),
            Self::Sigma(v) => write!(f, "sigma must be greater than 0, got {}", v),
            Self::NonFinite(name) => write!(f, "{} must be finite", name),
            Self::EmptyOutput(d) => write!(f, "output grid {}x{}x{} is empty", d[0], d[1], d[2]),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Map projection family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Equirectangular map of the sphere.
    PlateCarree,
    /// Cylinder unrolled around its axis.
    Cylindrical {
        /// Cylinder length along its axis, in voxels.
        #[serde(default = "default_cylinder_height")]
        height: f64,
    },
    /// Azimuthal-equidistant map centred on the pole.
    AzimuthalEquidistant,
}

impl Default for ProjectionKind {
    fn default() -> Self {
        Self::PlateCarree
    }
}

impl ProjectionKind {
    /// Cylindrical projection with the default height.
    pub fn cylindrical() -> Self {
        Self::Cylindrical {
            height: DEFAULT_CYLINDER_HEIGHT,
        }
    }

    /// Name used in labels and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlateCarree => "PlateCarree",
            Self::Cylindrical { .. } => "Cylindrical",
            Self::AzimuthalEquidistant => "AzimuthalEquidistant",
        }
    }

    pub fn cylinder_height(&self) -> Option<f64> {
        match self {
            Self::Cylindrical { height } => Some(*height),
            _ => None,
        }
    }
}

/// Parameters of a map projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapProjectConfig {
    pub projection: ProjectionKind,
    /// Projection centre in volume coordinates `[x, y, z]`.
    pub center: [f64; 3],
    /// Rotations about X, Y, and the pole axis (Z), radians.
    pub rotation: [f64; 3],
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Fraction of `outer - inner` above the inner radius that fixes map resolution.
    pub plane_position: f64,
    /// Output pixels per voxel at the standard radius.
    pub scale: f64,
    /// Number of concentric output layers.
    pub layers: usize,
    pub interpolation: Interpolation,
    pub reduction: Reduction,
}

impl Default for MapProjectConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::PlateCarree,
            center: [600.0, 600.0, 425.0],
            rotation: [0.0; 3],
            inner_radius: 200.0,
            outer_radius: 425.0,
            plane_position: 0.7,
            scale: 1.0,
            layers: 1,
            interpolation: Interpolation::Linear,
            reduction: Reduction::Max,
        }
    }
}

impl MapProjectConfig {
    /// Load a config from JSON; missing fields take their defaults.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    /// Pretty JSON representation.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Radius whose circumference defines the map resolution.
    pub fn std_radius(&self) -> f64 {
        self.inner_radius + self.plane_position * (self.outer_radius - self.inner_radius)
    }

    /// Radial thickness of one output layer.
    pub fn layer_interval(&self) -> f64 {
        (self.outer_radius - self.inner_radius) / self.layers.max(1) as f64
    }

    /// `[inner, outer]` radii sampled by layer `z`, counted from the outside.
    pub fn layer_radii(&self, z: usize) -> [f64; 2] {
        let interval = self.layer_interval();
        let outer = self.outer_radius - z as f64 * interval;
        [outer - interval, outer]
    }

    /// Output grid `[width, height, layers]` of the ray projection.
    pub fn output_dims(&self) -> [usize; 3] {
        let std = self.std_radius();
        let (w, h) = match self.projection {
            ProjectionKind::PlateCarree => {
                let w = round_len(self.scale * TAU * std);
                (w, round_len(w as f64 / 2.0))
            }
            ProjectionKind::Cylindrical { height } => (
                round_len(self.scale * height),
                round_len(self.scale * TAU * std),
            ),
            ProjectionKind::AzimuthalEquidistant => {
                let side = round_len(self.scale * PI * std);
                (side, side)
            }
        };
        [w, h, self.layers]
    }

    /// Radial shell handed to the grid-interval transforms.
    pub fn shell(&self) -> RadialShell {
        RadialShell::new(
            self.inner_radius,
            self.outer_radius,
            self.plane_position,
            self.scale,
        )
    }

    /// Output grid of the direct resampling path.
    pub fn resample_dims(&self) -> [usize; 3] {
        let shell = self.shell();
        match self.projection {
            ProjectionKind::PlateCarree => EquirectangularToCartesian::new(shell).dimensions(),
            ProjectionKind::Cylindrical { height } => {
                CylindricalGridToCartesian::new(height, shell).dimensions()
            }
            ProjectionKind::AzimuthalEquidistant => {
                AzimuthalEquidistantToCartesian::new(shell).dimensions()
            }
        }
    }

    /// Check every parameter before any work is done.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.center.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite("center"));
        }
        if self.rotation.iter().any(|c| !c.is_finite()) {
            return Err(ConfigError::NonFinite("rotation"));
        }
        if !(self.plane_position > 0.0 && self.plane_position <= 1.0) {
            return Err(ConfigError::PlanePosition(self.plane_position));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Scale(self.scale));
        }
        if self.layers < 1 {
            return Err(ConfigError::Layers(self.layers));
        }
        let (inner, outer) = (self.inner_radius, self.outer_radius);
        if !(inner.is_finite() && outer.is_finite() && inner >= 0.0 && inner < outer) {
            return Err(ConfigError::Radii { inner, outer });
        }
        if let ProjectionKind::Cylindrical { height } = self.projection {
            if !(height.is_finite() && height > 0.0) {
                return Err(ConfigError::CylinderHeight(height));
            }
        }
        Ok(())
    }

    /// Structured record of this configuration for an output of `dims`.
    pub fn params(&self, dims: [usize; 3]) -> ProjectionParams {
        ProjectionParams {
            projection: self.projection.name().to_string(),
            center: self.center,
            rotation: self.rotation,
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius,
            plane_position: self.plane_position,
            std_radius: self.std_radius(),
            scale: self.scale,
            layers: self.layers,
            interpolation: self.interpolation,
            reduction: self.reduction,
            cylinder_height: self.projection.cylinder_height(),
            dims,
        }
    }
}

fn round_len(extent: f64) -> usize {
    if extent.is_finite() && extent > 0.0 {
        extent.round() as usize
    } else {
        0
    }
}

/// Every parameter that shaped a projection output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    pub projection: String,
    pub center: [f64; 3],
    pub rotation: [f64; 3],
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub plane_position: f64,
    pub std_radius: f64,
    pub scale: f64,
    pub layers: usize,
    pub interpolation: Interpolation,
    pub reduction: Reduction,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cylinder_height: Option<f64>,
    /// Output grid `[width, height, depth]`.
    pub dims: [usize; 3],
}

impl ProjectionParams {
    /// Descriptive suffix encoding the parameters, e.g.
    /// `-PlateCarree-cx600.00-cy600.00-cz425.00-rx0.00-...-n1`.
    pub fn label(&self) -> String {
        format!(
            "-{}-cx{:.2}-cy{:.2}-cz{:.2}-rx{:.2}-ry{:.2}-rs{:.2}-ri{:.2}-ro{:.2}-sr{:.2}-sc{:.2}-n{}",
            self.projection,
            self.center[0],
            self.center[1],
            self.center[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2],
            self.inner_radius,
            self.outer_radius,
            self.plane_position,
            self.scale,
            self.layers
        )
    }

    /// Insert [`ProjectionParams::label`] into `title` before its extension.
    pub fn decorate_title(&self, title: &str) -> String {
        let label = self.label();
        match title.rfind('.') {
            Some(dot) if dot > 0 => format!("{}{}{}", &title[..dot], label, &title[dot..]),
            _ => format!("{}{}", title, label),
        }
    }
}
