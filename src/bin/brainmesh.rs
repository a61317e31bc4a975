//! brainmesh CLI: NIfTI probability map to STL surface.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brainmesh_core::nifti_io::{read_nifti_file, save_nifti_to_file};
use brainmesh_core::surface::{marching_cubes, save_stl, StlFormat};
use brainmesh_core::{preprocess_with, PipelineConfig, PipelineResult};

#[derive(Parser)]
#[command(name = "brainmesh")]
#[command(version, about = "Brain-structure surfaces from NIfTI probability maps")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Pipeline parameters shared by subcommands; flags override the config file.
#[derive(Args)]
struct PipelineArgs {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gaussian smoothing sigma in voxels.
    #[arg(long)]
    sigma: Option<f64>,

    /// Threshold applied after smoothing.
    #[arg(long)]
    cutoff: Option<f64>,
}

impl PipelineArgs {
    fn resolve(&self) -> PipelineResult<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(sigma) = self.sigma {
            config.preprocess.sigma = sigma;
        }
        if let Some(cutoff) = self.cutoff {
            config.preprocess.cutoff = cutoff;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a surface and write it as STL.
    Mesh {
        /// Input NIfTI file (.nii or .nii.gz).
        input: PathBuf,

        /// Output STL path.
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Isovalue for marching cubes.
        #[arg(long)]
        level: Option<f64>,

        /// Write ASCII instead of binary STL.
        #[arg(long)]
        ascii: bool,
    },

    /// Print volume dimensions and value range.
    Info {
        /// Input NIfTI file.
        input: PathBuf,
    },

    /// Write the thresholded mask as NIfTI.
    Mask {
        /// Input NIfTI file.
        input: PathBuf,

        /// Output path (.nii or .nii.gz).
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

fn run_mesh(
    input: &Path,
    output: &Path,
    pipeline: &PipelineArgs,
    level: Option<f64>,
    ascii: bool,
) -> PipelineResult<()> {
    let mut config = pipeline.resolve()?;
    if let Some(level) = level {
        config.extract.level = level;
    }
    config.validate()?;

    let start = Instant::now();
    let image = brainmesh_core::load(input)?;
    let (nx, ny, nz) = image.dims();
    info!("Loaded {}x{}x{} volume in {:.2?}", nx, ny, nz, start.elapsed());

    let start = Instant::now();
    let mask = preprocess_with(&image, &config.preprocess)?;
    drop(image);
    info!(
        "Mask: {} foreground voxels (sigma={}, cutoff={}) in {:.2?}",
        mask.count_foreground(),
        config.preprocess.sigma,
        config.preprocess.cutoff,
        start.elapsed()
    );

    let start = Instant::now();
    let surface = marching_cubes(&mask, config.extract.level)?;
    let mesh = surface.to_mesh();
    info!(
        "Surface: {} vertices, {} faces, mean edge {:.3} voxels in {:.2?}",
        surface.num_vertices(),
        mesh.num_faces(),
        surface.mean_edge_length(),
        start.elapsed()
    );

    let format = if ascii { StlFormat::Ascii } else { StlFormat::Binary };
    save_stl(output, &mesh, format)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn run_info(input: &Path) -> PipelineResult<()> {
    let nifti = read_nifti_file(input)?;
    let (nx, ny, nz) = nifti.dims;
    let (vsx, vsy, vsz) = nifti.voxel_size;
    let image = nifti.into_image()?;
    let (min, max) = image.value_range();
    println!("Volume:     {}x{}x{}", nx, ny, nz);
    println!("Voxel size: {:.3}x{:.3}x{:.3} mm", vsx, vsy, vsz);
    println!("Range:      [{:.4}, {:.4}]", min, max);
    Ok(())
}

fn run_mask(input: &Path, output: &Path, pipeline: &PipelineArgs) -> PipelineResult<()> {
    let config = pipeline.resolve()?;
    config.validate()?;

    let nifti = read_nifti_file(input)?;
    let (voxel_size, affine) = (nifti.voxel_size, nifti.affine);
    let image = nifti.into_image()?;
    let mask = preprocess_with(&image, &config.preprocess)?;
    info!("Mask: {} foreground voxels", mask.count_foreground());

    save_nifti_to_file(output, &mask.to_f64(), mask.dims(), voxel_size, &affine)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Mesh { input, output, pipeline, level, ascii } => {
            run_mesh(input, output, pipeline, *level, *ascii)
        }
        Commands::Info { input } => run_info(input),
        Commands::Mask { input, output, pipeline } => run_mask(input, output, pipeline),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
