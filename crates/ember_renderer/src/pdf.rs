//! Direction sampling distributions used for importance sampling.

use std::f64::consts::PI;

use ember_math::{Onb, Point3, Vec3};
use rand::RngCore;

use crate::hittable::Samplable;
use crate::sampling::{gen_f64, random_cosine_direction};

/// A probability density over directions (solid-angle measure).
pub trait Pdf {
    /// Density of generating `direction`.
    fn value(&self, direction: Vec3) -> f64;

    /// Draw a direction from the distribution.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere about a normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f64 {
        let cosine = direction.normalize().dot(self.uvw.w());
        if cosine <= 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(random_cosine_direction(rng))
    }
}

/// Directions from `origin` towards a samplable object.
pub struct HittablePdf<'a> {
    target: &'a dyn Samplable,
    origin: Point3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(target: &'a dyn Samplable, origin: Point3) -> Self {
        Self { target, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        self.target.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.target.random(self.origin, rng)
    }
}

/// Equal-weight mixture of one or more densities.
///
/// Built from a first component so the mixture is never empty.
pub struct MixturePdf<'a> {
    components: Vec<&'a dyn Pdf>,
}

impl<'a> MixturePdf<'a> {
    pub fn new(first: &'a dyn Pdf) -> Self {
        Self {
            components: vec![first],
        }
    }

    /// Add another component; all weights stay equal.
    pub fn with(mut self, pdf: &'a dyn Pdf) -> Self {
        self.components.push(pdf);
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f64 {
        let weight = 1.0 / self.components.len() as f64;
        self.components
            .iter()
            .map(|pdf| weight * pdf.value(direction))
            .sum()
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        let n = self.components.len();
        let index = ((gen_f64(rng) * n as f64) as usize).min(n - 1);
        self.components[index].generate(rng)
    }
}
