use std::f64::consts::{PI, TAU};

use super::{
    allocate_output, check_input, positioned, MapProjectConfig, ProjectionError, ProjectionKind,
    ProjectionOutput, RunHooks,
};
use crate::projector::{LineIntensityProjector, Ray, Reduction};
use crate::transform::{
    CoordinateTransform, CylindricalToCartesian, InvertibleTransform, PolarToCartesian,
    SphericalToCartesian,
};
use crate::volume::Volume;

/// Ray-reduce `volume` onto the map grid described by `config`.
///
/// Each output voxel `(x, y, z)` casts a ray from the inner to the outer
/// radius of layer `z` along the direction its map coordinate assigns, and
/// stores the reduction of the samples. Voxels whose ray never enters the
/// volume stay zero.
pub fn project(
    volume: &Volume<f32>,
    config: &MapProjectConfig,
    hooks: RunHooks<'_>,
) -> Result<ProjectionOutput, ProjectionError> {
    config.validate()?;
    check_input(volume)?;

    let dims = config.output_dims();
    let mut output = allocate_output(dims)?;
    let projector = LineIntensityProjector::new(volume, config.interpolation);
    let [w, h, _] = dims;
    let (wf, hf) = (w as f64, h as f64);

    tracing::info!(
        projection = config.projection.name(),
        width = dims[0],
        height = dims[1],
        layers = dims[2],
        "projecting volume {}x{}x{}",
        volume.width(),
        volume.height(),
        volume.depth()
    );
    tracing::debug!(
        std_radius = config.std_radius(),
        layer_interval = config.layer_interval(),
        "projection geometry"
    );

    let unsampled = match config.projection {
        ProjectionKind::PlateCarree => {
            let transform = positioned(SphericalToCartesian, config);
            sweep(&mut output, config, &projector, hooks, |radius, x, y| {
                transform.apply([radius, PI * y as f64 / hf, TAU * x as f64 / wf])
            })?
        }
        ProjectionKind::Cylindrical { height } => {
            let transform = positioned(CylindricalToCartesian, config);
            sweep(&mut output, config, &projector, hooks, |radius, x, y| {
                let along = height * x as f64 / wf - 0.5 * height;
                transform.apply([radius, TAU * y as f64 / hf, along])
            })?
        }
        ProjectionKind::AzimuthalEquidistant => {
            let transform = positioned(SphericalToCartesian, config);
            let centre = [0.5 * wf, 0.5 * hf];
            let [max_planar_radius, _] = PolarToCartesian.apply_inverse(centre);
            sweep(&mut output, config, &projector, hooks, |radius, x, y| {
                let [planar_r, planar_theta] =
                    PolarToCartesian.apply_inverse([x as f64 - centre[0], y as f64 - centre[1]]);
                transform.apply([radius, planar_r / max_planar_radius * PI, planar_theta])
            })?
        }
    };

    if unsampled == output.len() {
        tracing::warn!("no ray intersected the volume; check centre and radii");
    } else {
        tracing::debug!(unsampled, "rays without samples");
    }

    Ok(ProjectionOutput {
        params: config.params(dims),
        volume: output,
        unsampled,
    })
}

/// Fill `output` column by column. `endpoint(radius, x, y)` gives the volume
/// position of map pixel `(x, y)` at `radius`.
fn sweep(
    output: &mut Volume<f32>,
    config: &MapProjectConfig,
    projector: &LineIntensityProjector<'_>,
    hooks: RunHooks<'_>,
    endpoint: impl Fn(f64, usize, usize) -> [f64; 3],
) -> Result<usize, ProjectionError> {
    let [w, h, d] = output.dims();
    let reduction: Reduction = config.reduction;
    let layers: Vec<[f64; 2]> = (0..d).map(|z| config.layer_radii(z)).collect();
    let mut unsampled = 0usize;

    for x in 0..w {
        if hooks.is_cancelled() {
            tracing::info!(column = x, "projection cancelled");
            return Err(ProjectionError::Cancelled);
        }
        for y in 0..h {
            for (z, &[inner, outer]) in layers.iter().enumerate() {
                let value = Ray::between(endpoint(inner, x, y), endpoint(outer, x, y))
                    .ok()
                    .and_then(|ray| projector.project(&ray, |next, acc| reduction.combine(next, acc)));
                match value {
                    Some(v) => {
                        output.set(x, y, z, v);
                    }
                    None => unsampled += 1,
                }
            }
        }
        hooks.report(x + 1, w);
    }
    Ok(unsampled)
}
