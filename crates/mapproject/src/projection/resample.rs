use super::{
    allocate_output, check_input, positioned, MapProjectConfig, ProjectionError, ProjectionKind,
    ProjectionOutput, RunHooks,
};
use crate::transform::{
    AzimuthalEquidistantToCartesian, CoordinateTransform, CylindricalGridToCartesian,
    EquirectangularToCartesian, GridInterval, PositionableTransform,
};
use crate::volume::{Volume, VolumeSampler};

/// Resample `volume` directly onto the map grid of `config`.
///
/// Unlike [`project`](super::project) there is no ray: every output voxel
/// reads one interpolated sample at the position its grid transform
/// assigns. Grid `z` runs over the radius interval `outer - inner + 1` at
/// `scale` layers per voxel, outermost first; `config.layers` is not used.
/// Positions outside the volume read zero.
pub fn resample(
    volume: &Volume<f32>,
    config: &MapProjectConfig,
    hooks: RunHooks<'_>,
) -> Result<ProjectionOutput, ProjectionError> {
    config.validate()?;
    check_input(volume)?;

    let shell = config.shell();
    let sampler = VolumeSampler::new(volume, config.interpolation);
    match config.projection {
        ProjectionKind::PlateCarree => resample_grid(
            positioned(EquirectangularToCartesian::new(shell), config),
            sampler,
            config,
            hooks,
        ),
        ProjectionKind::Cylindrical { height } => resample_grid(
            positioned(CylindricalGridToCartesian::new(height, shell), config),
            sampler,
            config,
            hooks,
        ),
        ProjectionKind::AzimuthalEquidistant => resample_grid(
            positioned(AzimuthalEquidistantToCartesian::new(shell), config),
            sampler,
            config,
            hooks,
        ),
    }
}

fn resample_grid<Tr>(
    transform: PositionableTransform<Tr>,
    sampler: VolumeSampler<'_>,
    config: &MapProjectConfig,
    hooks: RunHooks<'_>,
) -> Result<ProjectionOutput, ProjectionError>
where
    Tr: CoordinateTransform<3, 3> + GridInterval,
{
    let dims = transform.inner().dimensions();
    let mut output = allocate_output(dims)?;
    let [w, h, d] = dims;
    tracing::info!(
        projection = config.projection.name(),
        width = w,
        height = h,
        depth = d,
        voxels = transform.inner().num_voxels(),
        "resampling onto map grid"
    );

    let mut unsampled = 0usize;
    for z in 0..d {
        if hooks.is_cancelled() {
            tracing::info!(layer = z, "resampling cancelled");
            return Err(ProjectionError::Cancelled);
        }
        for y in 0..h {
            for x in 0..w {
                let p = transform.apply([x as f64, y as f64, z as f64]);
                if !sampler.contains(p) {
                    unsampled += 1;
                }
                output.set(x, y, z, sampler.sample_or_zero(p));
            }
        }
        hooks.report(z + 1, d);
    }
    tracing::debug!(unsampled, "grid voxels outside the volume");

    Ok(ProjectionOutput {
        params: config.params(dims),
        volume: output,
        unsampled,
    })
}
