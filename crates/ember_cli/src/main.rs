use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use ember_renderer::{RenderConfig, RenderOutput, Scene, Timings};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;
mod particles;
mod scenes;

use cli::{load_config, Args};

/// Render `scene`, drawing a progress bar from the shared pixel counter.
fn render_scene(scene: &Scene, config: &RenderConfig, show_progress: bool) -> Result<RenderOutput> {
    let progress = AtomicUsize::new(0);
    if !show_progress {
        return Ok(scene.render(config, &progress)?);
    }

    let bar = ProgressBar::new((config.width * config.height) as u64);
    bar.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ETA: {eta}")?);

    let result = thread::scope(|s| {
        let worker = s.spawn(|| scene.render(config, &progress));
        while !worker.is_finished() {
            bar.set_position(progress.load(Ordering::Relaxed) as u64);
            thread::sleep(Duration::from_millis(100));
        }
        worker.join()
    });
    bar.finish_and_clear();

    let output = result.map_err(|_| anyhow!("Render thread panicked"))??;
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    info!("Ember {}", env!("CARGO_PKG_VERSION"));

    let base = load_config(args.config.as_deref())?;
    let seed = args.seed.unwrap_or(base.seed);
    let mut timings = Timings::new();

    let watch = Timings::start("build_scene");
    let scene = scenes::build(&args, &mut StdRng::seed_from_u64(seed))?;
    watch.stop(&mut timings);

    let config = args.render_config(base, scene.camera_or_default().aspect_ratio());
    let output = render_scene(&scene, &config, !args.no_progress)?;
    timings.merge(&output.timings);

    let total = output.stats.accepted_samples + output.stats.rejected_samples;
    info!(
        "Finished: {} samples, {} rejected as outliers",
        total, output.stats.rejected_samples
    );

    timings
        .measure("write_image", || output.image.save_ppm(&args.output))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Wrote {}", args.output.display());

    timings.report();
    Ok(())
}
