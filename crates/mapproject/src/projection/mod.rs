//! Map projections of a volume onto planar grids.
//!
//! Three runners share one configuration type:
//!
//! - [`project`] casts a ray per output voxel between two radii and reduces
//!   the samples (max or min).
//! - [`resample`] reads the volume once per output voxel at the position the
//!   grid transform assigns to it.
//! - [`project_legacy_plate_carree`] walks integer voxel lines on a tilted
//!   [`SphereGeometry`](crate::SphereGeometry).
//!
//! All runners validate their configuration before allocating, report
//! progress per outer-loop index, and honour a cancellation flag.

mod config;
mod legacy;
mod progress;
mod resample;
mod run;

pub use config::{
    ConfigError, MapProjectConfig, ProjectionKind, ProjectionParams, DEFAULT_CYLINDER_HEIGHT,
};
pub use legacy::{project_legacy_plate_carree, LegacyPlateCarreeConfig};
pub use progress::{NoProgress, ProgressObserver, RunHooks, TracingProgress};
pub use resample::resample;
pub use run::project;

use crate::transform::{Axis, PositionableTransform};
use crate::volume::{Volume, VolumeError};

/// Reasons a projection run produced no output.
#[derive(Debug)]
pub enum ProjectionError {
    /// Invalid configuration; nothing was computed.
    Config(ConfigError),
    /// The output grid could not be allocated.
    Allocation {
        /// Requested voxel count.
        voxels: usize,
    },
    /// The cancellation flag was raised.
    Cancelled,
    /// The input volume has no voxels.
    EmptyVolume,
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::Allocation { voxels } => {
                write!(f, "cannot allocate output grid of {} voxels", voxels)
            }
            Self::Cancelled => write!(f, "projection cancelled"),
            Self::EmptyVolume => write!(f, "input volume is empty"),
        }
    }
}

impl std::error::Error for ProjectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for ProjectionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Result of a projection run.
#[derive(Debug, Clone)]
pub struct ProjectionOutput {
    /// Output grid; depth equals the number of layers.
    pub volume: Volume<f32>,
    /// Parameters that produced `volume`.
    pub params: ProjectionParams,
    /// Output voxels that received no sample and were left at zero.
    pub unsampled: usize,
}

impl ProjectionOutput {
    /// Descriptive suffix for titles and file names.
    pub fn label(&self) -> String {
        self.params.label()
    }
}

fn allocate_output(dims: [usize; 3]) -> Result<Volume<f32>, ProjectionError> {
    if dims.iter().any(|&d| d == 0) {
        return Err(ConfigError::EmptyOutput(dims).into());
    }
    Volume::try_new(dims).map_err(|e| match e {
        VolumeError::Allocation { voxels } => ProjectionError::Allocation { voxels },
        _ => ProjectionError::Allocation { voxels: usize::MAX },
    })
}

/// Wrap `transform` with the configured centre and rotations.
fn positioned<Tr>(transform: Tr, config: &MapProjectConfig) -> PositionableTransform<Tr> {
    let mut placed = PositionableTransform::new(transform);
    placed.set_position(config.center);
    for (axis, angle) in Axis::ALL.into_iter().zip(config.rotation) {
        placed.rotate(axis, angle);
    }
    placed
}

fn check_input(volume: &Volume<f32>) -> Result<(), ProjectionError> {
    if volume.is_empty() {
        Err(ProjectionError::EmptyVolume)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_output_is_a_config_error() {
        let err = allocate_output([0, 4, 1]).unwrap_err();
        assert!(matches!(err, ProjectionError::Config(ConfigError::EmptyOutput(_))));
    }

    #[test]
    fn oversized_output_reports_allocation_failure() {
        let err = allocate_output([usize::MAX / 2, 4, 1]).unwrap_err();
        assert!(matches!(err, ProjectionError::Allocation { .. }));
    }

    #[test]
    fn positioned_uses_center_and_rotation() {
        use crate::transform::{CoordinateTransform, IdentityTransform};
        let cfg = MapProjectConfig {
            center: [1.0, 2.0, 3.0],
            rotation: [0.0, 0.0, std::f64::consts::PI],
            ..MapProjectConfig::default()
        };
        let t = positioned(IdentityTransform, &cfg);
        let p = t.apply([1.0, 0.0, 0.0]);
        assert!((p[0] - 0.0).abs() < 1e-12);
        assert!((p[1] - 2.0).abs() < 1e-12);
        assert!((p[2] - 3.0).abs() < 1e-12);
    }
}
