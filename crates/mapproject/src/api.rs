//! High-level projection API.
//!
//! [`MapProjector`] is the primary entry point. It wraps a
//! [`MapProjectConfig`] and runs the ray projection or the direct
//! resampling over any number of volumes.

use std::path::Path;

use crate::projection::{
    self, MapProjectConfig, ProjectionError, ProjectionKind, ProjectionOutput, RunHooks,
};
use crate::volume::Volume;

/// Primary projection interface.
///
/// Create once, project many volumes.
///
/// # Examples
///
/// ```no_run
/// use mapproject::{MapProjectConfig, MapProjector, ProjectionKind, Volume};
///
/// let projector = MapProjector::with_config(MapProjectConfig {
///     projection: ProjectionKind::AzimuthalEquidistant,
///     center: [64.0, 64.0, 64.0],
///     inner_radius: 20.0,
///     outer_radius: 40.0,
///     ..MapProjectConfig::default()
/// });
/// let volume = Volume::<f32>::new(128, 128, 128);
/// let map = projector.project(&volume).unwrap();
/// println!("{}x{} map {}", map.volume.width(), map.volume.height(), map.label());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapProjector {
    config: MapProjectConfig,
}

impl MapProjector {
    /// Projector for `kind` with every other parameter at its default.
    pub fn new(kind: ProjectionKind) -> Self {
        Self::with_config(MapProjectConfig {
            projection: kind,
            ..MapProjectConfig::default()
        })
    }

    /// Projector with full control over the configuration.
    pub fn with_config(config: MapProjectConfig) -> Self {
        Self { config }
    }

    /// Load a JSON config and create a projector in one step.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_config(MapProjectConfig::from_json_file(path)?))
    }

    pub fn config(&self) -> &MapProjectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MapProjectConfig {
        &mut self.config
    }

    /// Ray-reduce `volume` onto the configured map.
    pub fn project(&self, volume: &Volume<f32>) -> Result<ProjectionOutput, ProjectionError> {
        projection::project(volume, &self.config, RunHooks::default())
    }

    /// [`MapProjector::project`] with progress reporting and cancellation.
    pub fn project_with_hooks(
        &self,
        volume: &Volume<f32>,
        hooks: RunHooks<'_>,
    ) -> Result<ProjectionOutput, ProjectionError> {
        projection::project(volume, &self.config, hooks)
    }

    /// Sample `volume` once per voxel of the configured map grid.
    pub fn resample(&self, volume: &Volume<f32>) -> Result<ProjectionOutput, ProjectionError> {
        projection::resample(volume, &self.config, RunHooks::default())
    }

    pub fn resample_with_hooks(
        &self,
        volume: &Volume<f32>,
        hooks: RunHooks<'_>,
    ) -> Result<ProjectionOutput, ProjectionError> {
        projection::resample(volume, &self.config, hooks)
    }
}
