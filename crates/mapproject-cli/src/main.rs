//! mapproject CLI — unroll curved layers of slice-stack volumes into maps.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use mapproject::projection::TracingProgress;
use mapproject::volume::{load_slice_dir, save_slice_stack, save_u16_stack};
use mapproject::{
    center_table, difference_of_gaussians, find_label_centers, project_legacy_plate_carree,
    render_centers, CenterTableOptions, DogConfig, GridStatistic, Interpolation,
    LegacyPlateCarreeConfig, MapProjectConfig, MapProjector, ProjectionKind, ProjectionOutput,
    Reduction, RunHooks, SphereGeometry, VoxelSize,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "mapproject")]
#[command(about = "Unroll spherical and cylindrical layers of 3D volumes into flat maps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum Commands {
    /// Ray-reduce a volume between two radii onto a map.
    Project(CliProjectArgs),

    /// Sample a volume once per voxel of the map grid.
    Resample(CliProjectArgs),

    /// Plate-Carrée map along integer voxel lines of a tilted sphere.
    LegacyPlateCarree(CliLegacyArgs),

    /// Centroids of labelled regions.
    Centers(CliCentersArgs),

    /// Difference-of-Gaussians band-pass filter.
    Dog(CliDogArgs),

    /// Print the effective projection config as JSON.
    PrintConfig(CliConfigArgs),
}

// ── projection flags ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProjectionArg {
    PlateCarree,
    Cylindrical,
    AzimuthalEquidistant,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InterpolationArg {
    Nearest,
    Linear,
    Lanczos,
}

impl From<InterpolationArg> for Interpolation {
    fn from(v: InterpolationArg) -> Self {
        match v {
            InterpolationArg::Nearest => Interpolation::Nearest,
            InterpolationArg::Linear => Interpolation::Linear,
            InterpolationArg::Lanczos => Interpolation::Lanczos,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReductionArg {
    Max,
    Min,
}

impl From<ReductionArg> for Reduction {
    fn from(v: ReductionArg) -> Self {
        match v {
            ReductionArg::Max => Reduction::Max,
            ReductionArg::Min => Reduction::Min,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatisticArg {
    Max,
    Min,
    Mean,
}

impl From<StatisticArg> for GridStatistic {
    fn from(v: StatisticArg) -> Self {
        match v {
            StatisticArg::Max => GridStatistic::Max,
            StatisticArg::Min => GridStatistic::Min,
            StatisticArg::Mean => GridStatistic::Mean,
        }
    }
}

/// Every `MapProjectConfig` field as an optional override.
#[derive(Debug, Clone, Args)]
struct CliConfigArgs {
    /// JSON config file; explicit flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map projection.
    #[arg(long, value_enum)]
    projection: Option<ProjectionArg>,

    /// Cylinder height in voxels (cylindrical projection only).
    #[arg(long)]
    cylinder_height: Option<f64>,

    /// Projection centre `x y z` in voxel coordinates.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    center: Option<Vec<f64>>,

    /// Rotations about X, Y, and the pole axis, in radians.
    #[arg(long, num_args = 3, value_names = ["RX", "RY", "RZ"], allow_negative_numbers = true)]
    rotation: Option<Vec<f64>>,

    #[arg(long)]
    inner_radius: Option<f64>,

    #[arg(long)]
    outer_radius: Option<f64>,

    /// Fraction of the shell thickness that fixes map resolution, in (0, 1].
    #[arg(long)]
    plane_position: Option<f64>,

    /// Output pixels per voxel at the standard radius.
    #[arg(long)]
    scale: Option<f64>,

    /// Number of concentric output layers.
    #[arg(long)]
    layers: Option<usize>,

    #[arg(long, value_enum)]
    interpolation: Option<InterpolationArg>,

    #[arg(long, value_enum)]
    reduction: Option<ReductionArg>,
}

impl CliConfigArgs {
    fn to_config(&self) -> CliResult<MapProjectConfig> {
        let mut cfg = match &self.config {
            Some(path) => MapProjectConfig::from_json_file(path)?,
            None => MapProjectConfig::default(),
        };

        if let Some(kind) = self.projection {
            cfg.projection = match kind {
                ProjectionArg::PlateCarree => ProjectionKind::PlateCarree,
                ProjectionArg::Cylindrical => ProjectionKind::cylindrical(),
                ProjectionArg::AzimuthalEquidistant => ProjectionKind::AzimuthalEquidistant,
            };
        }
        if let Some(h) = self.cylinder_height {
            match &mut cfg.projection {
                ProjectionKind::Cylindrical { height } => *height = h,
                other => {
                    tracing::warn!(
                        projection = other.name(),
                        "--cylinder-height ignored for a non-cylindrical projection"
                    );
                }
            }
        }
        if let Some(c) = &self.center {
            cfg.center = triple(c, "--center")?;
        }
        if let Some(r) = &self.rotation {
            cfg.rotation = triple(r, "--rotation")?;
        }
        if let Some(v) = self.inner_radius {
            cfg.inner_radius = v;
        }
        if let Some(v) = self.outer_radius {
            cfg.outer_radius = v;
        }
        if let Some(v) = self.plane_position {
            cfg.plane_position = v;
        }
        if let Some(v) = self.scale {
            cfg.scale = v;
        }
        if let Some(v) = self.layers {
            cfg.layers = v;
        }
        if let Some(v) = self.interpolation {
            cfg.interpolation = v.into();
        }
        if let Some(v) = self.reduction {
            cfg.reduction = v.into();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn triple(values: &[f64], flag: &str) -> CliResult<[f64; 3]> {
    match values {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(format!("{} expects 3 values, got {}", flag, values.len()).into()),
    }
}

#[derive(Debug, Clone, Args)]
struct CliProjectArgs {
    /// Directory of 2D slice images, one per z, sorted by file name.
    #[arg(long)]
    input: PathBuf,

    /// Output directory for 16-bit PNG slices and the JSON sidecar.
    #[arg(long)]
    out: PathBuf,

    /// Base name of the output; the parameter label is appended.
    #[arg(long, default_value = "map")]
    title: String,

    #[command(flatten)]
    config: CliConfigArgs,
}

#[derive(Debug, Clone, Args)]
struct CliLegacyArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value = "map")]
    title: String,

    /// Sphere origin `x y slice` (slice numbers start at 1).
    #[arg(long, required = true, num_args = 3, value_names = ["X", "Y", "SLICE"])]
    origin: Vec<f64>,

    /// Longitude of the pole axis, degrees.
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pole_lon_deg: f64,

    /// Latitude of the pole axis, degrees.
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pole_lat_deg: f64,

    /// Zero-meridian rotation, degrees.
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    zero_meridian_deg: f64,

    #[arg(long, default_value = "200.0")]
    inner_radius: f64,

    #[arg(long, default_value = "425.0")]
    outer_radius: f64,

    #[arg(long, default_value = "0.7")]
    plane_position: f64,

    #[arg(long, default_value = "1.0")]
    scale: f64,

    #[arg(long, value_enum, default_value_t = StatisticArg::Max)]
    statistic: StatisticArg,
}

#[derive(Debug, Clone, Args)]
struct CliCentersArgs {
    /// Directory of label slices (8- or 16-bit).
    #[arg(long)]
    input: PathBuf,

    /// Path to write the centroid table (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Round centroids to the nearest voxel.
    #[arg(long)]
    round: bool,

    /// Report physical positions using this voxel size `x y z`.
    #[arg(long, num_args = 3, value_names = ["VX", "VY", "VZ"])]
    voxel_size: Option<Vec<f64>>,

    /// Also render each centroid as a labelled cube into this directory.
    #[arg(long)]
    render: Option<PathBuf>,

    /// Half side of the rendered cubes, in voxels.
    #[arg(long, default_value = "1")]
    render_radius: usize,
}

#[derive(Debug, Clone, Args)]
struct CliDogArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value = "2.0")]
    sigma1: f64,

    #[arg(long, default_value = "4.0")]
    sigma2: f64,

    /// Use the same sigma on every axis regardless of voxel size.
    #[arg(long)]
    isotropic: bool,

    /// Voxel size `x y z` used for anisotropic sigmas.
    #[arg(long, num_args = 3, value_names = ["VX", "VY", "VZ"])]
    voxel_size: Option<Vec<f64>>,

    /// Added to the response before saving; negative values clip to zero.
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    offset: f32,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Project(args) => run_projection(&args, false),
        Commands::Resample(args) => run_projection(&args, true),
        Commands::LegacyPlateCarree(args) => run_legacy(&args),
        Commands::Centers(args) => run_centers(&args),
        Commands::Dog(args) => run_dog(&args),
        Commands::PrintConfig(args) => run_print_config(&args),
    }
}

fn run_projection(args: &CliProjectArgs, resample: bool) -> CliResult<()> {
    let config = args.config.to_config()?;
    tracing::info!(
        "Loading slices from {} ({} projection)",
        args.input.display(),
        config.projection.name()
    );
    let volume = load_slice_dir(&args.input)?;

    let projector = MapProjector::with_config(config);
    let progress = TracingProgress {
        task: if resample { "resample" } else { "project" },
    };
    let hooks = RunHooks::with_progress(&progress);
    let output = if resample {
        projector.resample_with_hooks(&volume, hooks)?
    } else {
        projector.project_with_hooks(&volume, hooks)?
    };

    write_projection(&output, &args.out, &args.title)
}

fn write_projection(output: &ProjectionOutput, dir: &Path, title: &str) -> CliResult<()> {
    let name = output.params.decorate_title(title);
    let slices = save_slice_stack(&output.volume, dir, &name)?;

    let sidecar = serde_json::json!({
        "params": output.params,
        "unsampled": output.unsampled,
        "slices": slices,
    });
    let json_path = dir.join(format!("{}.json", name));
    std::fs::write(&json_path, serde_json::to_string_pretty(&sidecar)?)?;

    let [w, h, d] = output.volume.dims();
    tracing::info!(
        "Wrote {}x{}x{} map to {} ({} unsampled voxels)",
        w,
        h,
        d,
        dir.display(),
        output.unsampled
    );
    Ok(())
}

fn run_legacy(args: &CliLegacyArgs) -> CliResult<()> {
    let mut sphere = SphereGeometry::new();
    sphere.set_origin(triple(&args.origin, "--origin")?);
    sphere.set_pole_axis_lon_angle(args.pole_lon_deg.to_radians());
    sphere.set_pole_axis_lat_angle(args.pole_lat_deg.to_radians());
    sphere.set_zero_meridian(args.zero_meridian_deg.to_radians());

    let config = LegacyPlateCarreeConfig {
        inner_radius: args.inner_radius,
        outer_radius: args.outer_radius,
        plane_position: args.plane_position,
        scale: args.scale,
        statistic: args.statistic.into(),
    };
    config.validate()?;

    let volume = load_slice_dir(&args.input)?;
    let progress = TracingProgress {
        task: "legacy-plate-carree",
    };
    let map = project_legacy_plate_carree(
        &volume,
        &sphere,
        &config,
        RunHooks::with_progress(&progress),
    )?;

    let name = format!("{}{}", args.title, config.label(&sphere));
    save_slice_stack(&map, &args.out, &name)?;
    let sidecar = serde_json::json!({
        "config": config,
        "origin": sphere.origin(),
        "pole_axis_lon_angle": sphere.pole_axis_lon_angle(),
        "pole_axis_lat_angle": sphere.pole_axis_lat_angle(),
        "zero_meridian": sphere.zero_meridian(),
        "dims": map.dims(),
    });
    std::fs::write(
        args.out.join(format!("{}.json", name)),
        serde_json::to_string_pretty(&sidecar)?,
    )?;
    tracing::info!("Wrote {}x{} map to {}", map.width(), map.height(), args.out.display());
    Ok(())
}

fn run_centers(args: &CliCentersArgs) -> CliResult<()> {
    let labels = load_slice_dir(&args.input)?.to_u16();
    let centers = find_label_centers(&labels);
    tracing::info!("Found {} labels", centers.len());

    let voxel_size = match &args.voxel_size {
        Some(v) => {
            let [x, y, z] = triple(v, "--voxel-size")?;
            Some(VoxelSize::new(x, y, z))
        }
        None => None,
    };
    let rows = center_table(
        &centers,
        CenterTableOptions {
            round: args.round,
            voxel_size,
        },
    );
    std::fs::write(&args.out, serde_json::to_string_pretty(&rows)?)?;
    tracing::info!("Centroid table written to {}", args.out.display());

    if let Some(dir) = &args.render {
        let rendered = render_centers(&centers, labels.dims(), args.render_radius);
        save_u16_stack(&rendered, dir, "centers")?;
        tracing::info!("Rendered centres written to {}", dir.display());
    }
    Ok(())
}

fn run_dog(args: &CliDogArgs) -> CliResult<()> {
    let voxel = match &args.voxel_size {
        Some(v) => {
            let [x, y, z] = triple(v, "--voxel-size")?;
            VoxelSize::new(x, y, z)
        }
        None => VoxelSize::default(),
    };
    let config = DogConfig {
        sigma1: args.sigma1,
        sigma2: args.sigma2,
        anisotropic: !args.isotropic,
    };

    let volume = load_slice_dir(&args.input)?;
    let mut filtered = difference_of_gaussians(&volume, &config, voxel)?;
    if args.offset != 0.0 {
        for v in filtered.as_mut_slice() {
            *v += args.offset;
        }
    }
    if let Some((lo, hi)) = filtered.min_max() {
        tracing::debug!(lo, hi, "DoG response range");
    }
    save_slice_stack(&filtered, &args.out, "dog")?;
    tracing::info!("Filtered stack written to {}", args.out.display());
    Ok(())
}

fn run_print_config(args: &CliConfigArgs) -> CliResult<()> {
    let config = args.to_config()?;
    println!("{}", config.to_json_string()?);
    Ok(())
}
