use mapproject::volume::save_slice_stack;
use mapproject::{MapProjectConfig, MapProjector, ProjectionKind, Volume};
use std::error::Error;
use std::path::PathBuf;

/// Sphere of radius `radius` with a bright band around its equator.
fn banded_sphere(side: usize, radius: f64) -> Volume<f32> {
    let mut volume = Volume::new(side, side, side);
    let c = (side as f64 - 1.0) / 2.0;
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let (dx, dy, dz) = (x as f64 - c, y as f64 - c, z as f64 - c);
                let r = (dx * dx + dy * dy + dz * dz).sqrt();
                if (r - radius).abs() <= 1.5 {
                    let value = if dz.abs() < 0.2 * radius { 4000.0 } else { 1000.0 };
                    volume.set(x, y, z, value);
                }
            }
        }
    }
    volume
}

fn main() -> Result<(), Box<dyn Error>> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("mapproject-shell"));

    let volume = banded_sphere(96, 30.0);
    let c = 47.5;

    for kind in [
        ProjectionKind::PlateCarree,
        ProjectionKind::Cylindrical { height: 80.0 },
        ProjectionKind::AzimuthalEquidistant,
    ] {
        let projector = MapProjector::with_config(MapProjectConfig {
            projection: kind,
            center: [c, c, c],
            inner_radius: 26.0,
            outer_radius: 34.0,
            plane_position: 0.5,
            ..MapProjectConfig::default()
        });
        let map = projector.project(&volume)?;
        let [w, h, _] = map.volume.dims();
        let name = map.params.decorate_title("shell.png");
        save_slice_stack(&map.volume, &out_dir, name.trim_end_matches(".png"))?;
        println!(
            "{:<22} {}x{} map, {} unsampled -> {}",
            kind.name(),
            w,
            h,
            map.unsampled,
            out_dir.display()
        );
    }
    Ok(())
}
