//! Parallel pixel sampler.
//!
//! Rows are split into contiguous ranges, one per worker of a dedicated
//! rayon pool. Each range writes into its own slice of the frame buffer and
//! every row draws from a generator seeded by `(seed, row)`, so the image
//! does not depend on how many threads rendered it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use ember_math::Color;
use log::info;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::error::{RenderError, RenderResult};
use crate::hittable::{Hittable, Samplable};
use crate::integrator::ray_color;
use crate::sampling::gen_f64;
use crate::timing::Timings;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Worker threads in the render pool
    pub num_threads: usize,
    /// Base seed for the per-row generators
    pub seed: u64,
    /// Samples with any channel above this are discarded as fireflies
    pub firefly_threshold: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            samples_per_pixel: 100,
            max_depth: 50,
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            seed: 0,
            firefly_threshold: 1000.0,
        }
    }
}

impl RenderConfig {
    /// Check that the configuration describes a renderable image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.samples_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "samples_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.num_threads == 0 {
            return Err(RenderError::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }
        if self.firefly_threshold.is_nan() || self.firefly_threshold <= 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "firefly_threshold must be positive, got {}",
                self.firefly_threshold
            )));
        }
        Ok(())
    }
}

/// What the sampler looks at: the scene geometry, lights and camera.
#[derive(Clone, Copy)]
pub struct RenderView<'a> {
    pub world: &'a dyn Hittable,
    pub lights: Option<&'a dyn Samplable>,
    pub camera: &'a Camera,
    pub background: Color,
}

/// Sample counts for a pixel or a whole frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub accepted_samples: u64,
    pub rejected_samples: u64,
}

impl RenderStats {
    pub fn merge(self, other: Self) -> Self {
        Self {
            accepted_samples: self.accepted_samples + other.accepted_samples,
            rejected_samples: self.rejected_samples + other.rejected_samples,
        }
    }
}

/// Averaged pixel value and the sample counts behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelEstimate {
    pub color: Color,
    pub accepted: u32,
    pub rejected: u32,
}

/// A finished render.
pub struct RenderOutput {
    pub image: ImageBuffer,
    pub stats: RenderStats,
    pub timings: Timings,
}

/// Linear colors in PPM order: top row first, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Pixel at column `x` of output line `y` (line 0 is the top).
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    /// Quantized 8-bit RGB triples.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&c| color_to_rgb(c)).collect()
    }

    /// Write as ASCII PPM (`P3`).
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;
        for [r, g, b] in self.to_rgb8() {
            writeln!(out, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    /// Write a PPM file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB: sqrt gamma, clamp to
/// `[0, 0.999]`, scale by 256 and truncate.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let quantize = |c: f64| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Split `height` rows into `num_threads` contiguous ranges.
///
/// Leftover rows go to the first range. Returns a single range when
/// `num_threads` is 0.
pub fn partition_rows(height: usize, num_threads: usize) -> Vec<Range<usize>> {
    let n = num_threads.max(1);
    let base = height / n;
    let remainder = height % n;

    let mut ranges = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = if i == 0 { base + remainder } else { base };
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// True for a sample that must not enter the pixel average.
#[inline]
fn is_outlier(sample: Color, threshold: f64) -> bool {
    !sample.is_finite() || sample.max_element() > threshold
}

/// Generator for output line `line`.
fn row_rng(seed: u64, line: usize) -> StdRng {
    const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
    StdRng::seed_from_u64(seed ^ (line as u64).wrapping_add(1).wrapping_mul(GOLDEN))
}

/// Estimate one pixel. `row` counts from the bottom of the image.
pub fn render_pixel(
    view: &RenderView<'_>,
    config: &RenderConfig,
    col: usize,
    row: usize,
    rng: &mut dyn RngCore,
) -> PixelEstimate {
    let u_denom = config.width.saturating_sub(1).max(1) as f64;
    let v_denom = config.height.saturating_sub(1).max(1) as f64;

    let mut sum = Color::ZERO;
    let mut accepted = 0u32;
    let mut rejected = 0u32;

    for _ in 0..config.samples_per_pixel {
        let u = (col as f64 + gen_f64(rng)) / u_denom;
        let v = (row as f64 + gen_f64(rng)) / v_denom;
        let ray = view.camera.get_ray(u, v, rng);
        let sample = ray_color(
            &ray,
            view.background,
            view.world,
            view.lights,
            config.max_depth,
            rng,
        );

        if is_outlier(sample, config.firefly_threshold) {
            rejected += 1;
        } else {
            sum += sample;
            accepted += 1;
        }
    }

    let color = if accepted > 0 {
        sum / accepted as f64
    } else {
        Color::ZERO
    };

    PixelEstimate {
        color,
        accepted,
        rejected,
    }
}

/// Render the output lines in `lines` into `slice`.
fn render_rows(
    view: &RenderView<'_>,
    config: &RenderConfig,
    lines: Range<usize>,
    slice: &mut [Color],
    progress: &AtomicUsize,
) -> RenderStats {
    let width = config.width;
    let mut stats = RenderStats::default();

    for (i, line) in lines.enumerate() {
        let mut rng = row_rng(config.seed, line);
        let row = config.height - 1 - line;

        for col in 0..width {
            let estimate = render_pixel(view, config, col, row, &mut rng);
            slice[i * width + col] = estimate.color;
            stats.accepted_samples += estimate.accepted as u64;
            stats.rejected_samples += estimate.rejected as u64;
        }

        progress.fetch_add(width, Ordering::Relaxed);
    }

    stats
}

/// Render the scene to an image buffer.
pub fn render(view: &RenderView<'_>, config: &RenderConfig) -> RenderResult<RenderOutput> {
    let progress = AtomicUsize::new(0);
    render_with_progress(view, config, &progress)
}

/// Render the scene, adding completed pixels to `progress` as rows finish.
pub fn render_with_progress(
    view: &RenderView<'_>,
    config: &RenderConfig,
    progress: &AtomicUsize,
) -> RenderResult<RenderOutput> {
    config.validate()?;

    let (width, height) = (config.width, config.height);
    info!(
        "Rendering {}x{} at {} spp (max depth {}) on {} threads",
        width, height, config.samples_per_pixel, config.max_depth, config.num_threads
    );

    let mut timings = Timings::new();
    let watch = Timings::start("render");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build()?;

    let mut image = ImageBuffer::new(width, height);

    // Hand each row range its own disjoint slice of the buffer.
    let mut work = Vec::with_capacity(config.num_threads);
    let mut rest: &mut [Color] = &mut image.pixels;
    for lines in partition_rows(height, config.num_threads) {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(lines.len() * width);
        work.push((lines, head));
        rest = tail;
    }

    let stats = pool.install(|| {
        work.into_par_iter()
            .map(|(lines, slice)| render_rows(view, config, lines, slice, progress))
            .reduce(RenderStats::default, RenderStats::merge)
    });

    let elapsed = watch.stop(&mut timings);
    info!(
        "Render finished in {:.2}s: {} samples accepted, {} rejected",
        elapsed.as_secs_f64(),
        stats.accepted_samples,
        stats.rejected_samples
    );

    Ok(RenderOutput {
        image,
        stats,
        timings,
    })
}
