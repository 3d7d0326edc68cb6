use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::{allocate_output, check_input, ConfigError, ProjectionError, RunHooks};
use crate::projector::{GridIntensityProjector, GridStatistic};
use crate::sphere::SphereGeometry;
use crate::volume::Volume;

/// Parameters of the voxel-line Plate-Carrée projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyPlateCarreeConfig {
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Fraction of `outer - inner` above the inner radius whose equator
    /// fixes the map width.
    pub plane_position: f64,
    pub scale: f64,
    pub statistic: GridStatistic,
}

impl Default for LegacyPlateCarreeConfig {
    fn default() -> Self {
        Self {
            inner_radius: 200.0,
            outer_radius: 425.0,
            plane_position: 0.7,
            scale: 1.0,
            statistic: GridStatistic::Max,
        }
    }
}

impl LegacyPlateCarreeConfig {
    pub fn plane_radius(&self) -> f64 {
        self.inner_radius + self.plane_position * (self.outer_radius - self.inner_radius)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.plane_position > 0.0 && self.plane_position <= 1.0) {
            return Err(ConfigError::PlanePosition(self.plane_position));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Scale(self.scale));
        }
        let (inner, outer) = (self.inner_radius, self.outer_radius);
        if !(inner.is_finite() && outer.is_finite() && inner >= 0.0 && inner < outer) {
            return Err(ConfigError::Radii { inner, outer });
        }
        Ok(())
    }

    /// Descriptive suffix for titles and file names.
    pub fn label(&self, sphere: &SphereGeometry) -> String {
        let [ox, oy, oz] = sphere.origin();
        format!(
            "-PlateCarreeGrid-ox{:.2}-oy{:.2}-oz{:.2}-plon{:.2}-plat{:.2}-zm{:.2}-ri{:.2}-ro{:.2}-sr{:.2}-sc{:.2}-{}",
            ox,
            oy,
            oz,
            sphere.pole_axis_lon_angle(),
            sphere.pole_axis_lat_angle(),
            sphere.zero_meridian(),
            self.inner_radius,
            self.outer_radius,
            self.plane_position,
            self.scale,
            self.statistic.name()
        )
    }
}

/// Plate-Carrée map sampled along integer voxel lines of a tilted sphere.
///
/// The map is `round(scale · n)` pixels wide, where `n` is the number of
/// voxels on the equator at the plane radius, and half as high. Pixel
/// `(x, y)` spans `lon = 2π·x/(width-1)` and `lat = π·y/(height-1)`; its value
/// is the statistic over the voxels between the inner and outer radius.
/// `sphere` is left untouched; the plane radius is applied to a copy.
pub fn project_legacy_plate_carree(
    volume: &Volume<f32>,
    sphere: &SphereGeometry,
    config: &LegacyPlateCarreeConfig,
    hooks: RunHooks<'_>,
) -> Result<Volume<f32>, ProjectionError> {
    config.validate()?;
    check_input(volume)?;

    let mut geometry = sphere.clone();
    geometry.set_radius(config.plane_radius());
    let equator = geometry.voxel_count_at_equator();
    let width = (config.scale * equator as f64).round() as usize;
    let height = (width as f64 / 2.0).round() as usize;
    let mut output = allocate_output([width, height, 1])?;
    tracing::info!(
        width,
        height,
        equator_voxels = equator,
        plane_radius = config.plane_radius(),
        statistic = config.statistic.name(),
        "projecting voxel-line plate carree"
    );

    let lon_step = if width > 1 { TAU / (width - 1) as f64 } else { 0.0 };
    let lat_step = if height > 1 { PI / (height - 1) as f64 } else { 0.0 };
    let projector = GridIntensityProjector::new(volume);
    for x in 0..width {
        if hooks.is_cancelled() {
            return Err(ProjectionError::Cancelled);
        }
        let lon = lon_step * x as f64;
        for y in 0..height {
            let lat = lat_step * y as f64;
            let inner = geometry.cartesian_grid(lon, lat, config.inner_radius, true);
            let outer = geometry.cartesian_grid(lon, lat, config.outer_radius, true);
            if let Some(v) = projector.compute(inner, outer, config.statistic) {
                output.set(x, y, 0, v);
            }
        }
        hooks.report(x + 1, width);
    }
    Ok(output)
}
