use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wavefield_common::SceneConfig;
use wavefield_kernel::{FieldSettings, ParticleField};
use wavefield_render::{DebugTextRenderer, RenderView, Renderer};
use wavefield_tools::{FieldInspector, FieldSummary, ParticleInfo};

#[derive(Parser)]
#[command(name = "wavefield-cli", about = "Headless tool for the wavefield particle demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a field and advance it a number of frames
    Simulate {
        /// Number of particles (defaults to the config value)
        #[arg(short, long)]
        count: Option<usize>,
        /// Number of frames to advance
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Frames per second used to derive elapsed time
        #[arg(long, default_value = "60")]
        fps: f64,
        /// RNG seed for a reproducible field
        #[arg(short, long)]
        seed: Option<u64>,
        /// Number of particles to list in the output
        #[arg(long, default_value = "8")]
        show: usize,
        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct SimulationReport {
    summary: FieldSummary,
    particles: Vec<ParticleInfo>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("wavefield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", wavefield_render::crate_info());
            println!("assets: {}", wavefield_assets::crate_info());
            println!("tools: {}", wavefield_tools::crate_info());
            println!(
                "default scene: {} particles, positions {:?}, colors {:?}",
                config.particle_count, config.position_range, config.color_range
            );
        }
        Commands::Simulate {
            count,
            frames,
            fps,
            seed,
            show,
            json,
        } => {
            anyhow::ensure!(fps > 0.0, "--fps must be positive, got {fps}");

            let mut config = config;
            if let Some(count) = count {
                config.particle_count = count;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            config.validate()?;

            let settings = FieldSettings::from(&config);
            tracing::debug!(?settings, frames, fps, "simulating");

            let mut field = ParticleField::generate(&settings);
            for frame in 0..frames {
                field.advance(frame as f64 / fps);
            }

            if json {
                let shown = show.min(field.buffer().count());
                let report = SimulationReport {
                    summary: FieldInspector::summary(&field),
                    particles: (0..shown)
                        .filter_map(|i| FieldInspector::inspect_particle(field.buffer(), i))
                        .collect(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", FieldInspector::summary(&field));
                let view = RenderView {
                    fov_degrees: config.camera.fov_degrees,
                    eye: glam::Vec3::new(0.0, 0.0, config.camera.distance),
                    ..RenderView::default()
                };
                let renderer = DebugTextRenderer::with_max_listed(show);
                print!("{}", renderer.render(field.buffer(), &view));
            }
        }
    }

    Ok(())
}
