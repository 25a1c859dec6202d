//! Image loading for textures.
//!
//! Images are decoded once into linear RGB so the renderer can sample them
//! without touching the codec again.
//!
//! Texels go through the sRGB transfer curve rather than a plain `/ 255`
//! scale. The output is gamma encoded on write, so textures come back out close
//! to their stored brightness; renders are darker in the midtones than ones made
//! from raw-scaled texels.

use std::path::Path;

use ember_math::Color;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Pixel count {actual} does not match {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image in linear RGB, row-major, top row first.
#[derive(Clone, Debug)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageData {
    /// Create image data from raw linear pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Load and decode an image file (any format the `image` crate supports).
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::from_pixels(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-pixel lookup.
    ///
    /// `u` and `v` are clamped to [0, 1]; `v = 0` is the bottom row.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }

        let u = u.clamp(0.0, 1.0);
        let v = 1.0 - v.clamp(0.0, 1.0); // Flip V to image coordinates

        let i = ((u * self.width as f64) as u32).min(self.width - 1);
        let j = ((v * self.height as f64) as u32).min(self.height - 1);

        self.pixels[(j * self.width + i) as usize]
    }
}

/// Convert an sRGB byte to linear intensity (IEC 61966-2-1 curve).
fn srgb_to_linear(value: u8) -> f64 {
    let v = value as f64 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> ImageData {
        // Top row: red, green. Bottom row: blue, white.
        ImageData::from_pixels(
            2,
            2,
            vec![
                Color::new(1.0, 0.0, 0.0),
                Color::new(0.0, 1.0, 0.0),
                Color::new(0.0, 0.0, 1.0),
                Color::ONE,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sample_corners() {
        let img = two_by_two();

        assert_eq!(img.sample(0.0, 1.0), Color::new(1.0, 0.0, 0.0));
        assert_eq!(img.sample(1.0, 1.0), Color::new(0.0, 1.0, 0.0));
        assert_eq!(img.sample(0.0, 0.0), Color::new(0.0, 0.0, 1.0));
        assert_eq!(img.sample(1.0, 0.0), Color::ONE);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let img = two_by_two();
        assert_eq!(img.sample(-3.0, 7.0), img.sample(0.0, 1.0));
    }

    #[test]
    fn test_size_mismatch() {
        let result = ImageData::from_pixels(3, 3, vec![Color::ZERO; 4]);
        assert!(matches!(result, Err(TextureError::SizeMismatch { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ImageData::load("/no/such/image.png").is_err());
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear than the raw byte scale
        let mid = srgb_to_linear(128);
        assert!((mid - 0.2158).abs() < 1e-4);
        assert!(mid < 128.0 / 255.0);

        // Linear toe below the 0.04045 knee
        assert!((srgb_to_linear(10) - 10.0 / 255.0 / 12.92).abs() < 1e-12);
    }
}
