//! Material trait for surface scattering.

use std::sync::Arc;

use ember_math::{Color, Point3, Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::pdf::{CosinePdf, Pdf};
use crate::sampling::{gen_f64, random_in_unit_ball, random_unit_vector};
use crate::texture::{SolidColor, Texture};

/// Outcome of a successful scatter.
pub enum ScatterRecord {
    /// A single deterministic continuation ray; bypasses importance sampling.
    Specular { ray: Ray, attenuation: Color },
    /// Scattering described by a density the integrator can mix with light
    /// sampling.
    Diffuse {
        attenuation: Color,
        pdf: Box<dyn Pdf>,
    },
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord>;

    /// Light emitted at the hit point. Most materials are black.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord<'_>, _u: f64, _v: f64, _p: Point3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material.
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord<'_>,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::Diffuse {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            pdf: Box::new(CosinePdf::new(rec.normal)),
        })
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_ball(rng);

        // Fuzz can push the ray below the surface; treat that as absorbed.
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterRecord::Specular {
            ray: Ray::new(rec.p, direction, ray_in.time()),
            attenuation: self.albedo,
        })
    }
}

/// Dielectric (glass) material with an optional tint.
pub struct Dielectric {
    /// Index of refraction
    ir: f64,
    tint: Color,
}

impl Dielectric {
    /// Create a clear dielectric.
    ///
    /// - `ir`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ir: f64) -> Self {
        Self::tinted(ir, Color::ONE)
    }

    pub fn tinted(ir: f64, tint: Color) -> Self {
        Self { ir, tint }
    }

    /// Schlick's approximation for reflectance.
    pub fn reflectance(cosine: f64, ref_idx: f64) -> f64 {
        let r0 = ((1.0 - ref_idx) / (1.0 + ref_idx)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ir } else { self.ir };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let direction =
            if cannot_refract || Self::reflectance(cos_theta, refraction_ratio) > gen_f64(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, refraction_ratio)
            };

        Some(ScatterRecord::Specular {
            ray: Ray::new(rec.p, direction, ray_in.time()),
            attenuation: self.tint,
        })
    }
}

/// Diffuse light emitter. Emits from the front face only.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord<'_>,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord<'_>, u: f64, v: f64, p: Point3) -> Color {
        if rec.front_face {
            self.emit.value(u, v, p)
        } else {
            Color::ZERO
        }
    }
}

/// Phase function of a participating medium: scatters uniformly in all
/// directions.
///
/// The new direction is returned as a specular continuation, so medium
/// scattering is never importance sampled.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::Specular {
            ray: Ray::new(rec.p, random_unit_vector(rng), ray_in.time()),
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
