use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ember_renderer::RenderConfig;
use log::LevelFilter;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in demo scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Field of small random spheres around three large ones
    RandomSpheres,
    /// Two checkered spheres
    TwoSpheres,
    /// Image-textured globe
    Earth,
    /// Sphere lit by a rectangle and a glowing sphere
    SimpleLight,
    /// Cornell box without light sampling
    CornellBox,
    /// Cornell box with smoke-filled blocks
    CornellSmoke,
    /// Cornell box with a mirror block and glass ball, lights importance sampled
    CornellLights,
    /// Everything at once
    FinalScene,
    /// Glass tank of water droplets
    WaterInBox,
    /// One triangle over a ground plane
    SingleTriangle,
    /// An OBJ mesh given with --mesh
    Mesh,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "Offline Monte Carlo path tracer")]
pub struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value = "cornell-lights")]
    pub scene: SceneKind,

    /// JSON render configuration; command line values take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<usize>,

    /// Image height in pixels (derived from the camera aspect ratio if omitted)
    #[arg(long)]
    pub height: Option<usize>,

    /// Number of samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounce depth
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Worker threads
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Seed for scene generation and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output PPM file
    #[arg(short, long, default_value = "image.ppm")]
    pub output: PathBuf,

    /// OBJ file for the mesh scene
    #[arg(long)]
    pub mesh: Option<PathBuf>,

    /// Particle positions (`x y z` per line) for the water scene
    #[arg(long)]
    pub particles: Option<PathBuf>,

    /// Image used by the earth and final scenes
    #[arg(long, default_value = "images/earthmap.jpg")]
    pub texture: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Args {
    /// Apply command line overrides on top of `base`.
    ///
    /// Without `--height` the height comes from the config file when one was
    /// given, otherwise from `width / aspect_ratio`.
    pub fn render_config(&self, base: RenderConfig, aspect_ratio: f64) -> RenderConfig {
        let width = self.width.unwrap_or(base.width);
        let height = match self.height {
            Some(height) => height,
            None if self.config.is_some() => base.height,
            None => ((width as f64 / aspect_ratio) as usize).max(1),
        };

        RenderConfig {
            width,
            height,
            samples_per_pixel: self.samples.unwrap_or(base.samples_per_pixel),
            max_depth: self.depth.unwrap_or(base.max_depth),
            num_threads: self.threads.unwrap_or(base.num_threads),
            seed: self.seed.unwrap_or(base.seed),
            ..base
        }
    }
}

/// Read a JSON render configuration, or the defaults if `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    Ok(config)
}
