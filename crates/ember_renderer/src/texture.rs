//! Procedural and image textures.

use std::path::Path;
use std::sync::Arc;

use ember_core::ImageData;
use ember_math::{Color, Point3};

/// Returned by an image texture whose file could not be loaded.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// A color lookup over surface coordinates and world position.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

/// A constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.color
    }
}

/// 3D checker pattern alternating between two textures.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: f64,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            even,
            odd,
            frequency: 10.0,
        }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let f = self.frequency;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Texture backed by a decoded image.
///
/// A texture whose file failed to load renders as solid cyan so the
/// problem is visible in the output instead of aborting the render.
pub struct ImageTexture {
    image: Option<ImageData>,
}

impl ImageTexture {
    pub fn new(image: ImageData) -> Self {
        Self { image: Some(image) }
    }

    /// Load from disk, falling back to cyan on failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        match ImageData::load(path.as_ref()) {
            Ok(image) => Self::new(image),
            Err(e) => {
                log::warn!("{}; using fallback color", e);
                Self { image: None }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Point3) -> Color {
        match &self.image {
            Some(image) => image.sample(u, v),
            None => MISSING_TEXTURE_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::from_rgb(0.1, 0.2, 0.3);
        assert_eq!(tex.value(0.7, 0.1, Point3::splat(4.0)), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_checker_alternates() {
        let even = Color::new(0.2, 0.3, 0.1);
        let odd = Color::splat(0.9);
        let checker = CheckerTexture::from_colors(even, odd);

        // sin(0.5)^3 > 0
        assert_eq!(checker.value(0.0, 0.0, Point3::splat(0.05)), even);
        // sin(-0.5) * sin(0.5) * sin(0.5) < 0
        assert_eq!(checker.value(0.0, 0.0, Point3::new(-0.05, 0.05, 0.05)), odd);
    }

    #[test]
    fn test_image_texture_samples() {
        let image = ImageData::from_pixels(1, 1, vec![Color::new(0.25, 0.5, 0.75)]).unwrap();
        let tex = ImageTexture::new(image);
        assert!(tex.is_loaded());
        assert_eq!(tex.value(0.3, 0.3, Point3::ZERO), Color::new(0.25, 0.5, 0.75));
    }

    #[test]
    fn test_missing_image_falls_back_to_cyan() {
        let tex = ImageTexture::load("/definitely/not/here.jpg");
        assert!(!tex.is_loaded());
        assert_eq!(tex.value(0.5, 0.5, Point3::ZERO), Color::new(0.0, 1.0, 1.0));
    }
}
