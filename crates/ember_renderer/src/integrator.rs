//! Recursive path tracing integrator with light importance sampling.

use ember_math::{Color, Interval, Ray};
use rand::RngCore;

use crate::hittable::{Hittable, Samplable};
use crate::material::ScatterRecord;
use crate::pdf::{HittablePdf, MixturePdf, Pdf};

/// Mixture densities below this are treated as no interaction.
const MIN_PDF: f64 = 1e-12;

/// Compute the color seen by a ray.
///
/// Diffuse bounces sample an equal mixture of the material's own density
/// and, when `lights` is given, directions towards the lights. Specular
/// bounces are followed directly.
pub fn ray_color(
    ray: &Ray,
    background: Color,
    world: &dyn Hittable,
    lights: Option<&dyn Samplable>,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(0.001, f64::INFINITY), rng) else {
        return background;
    };

    let emitted = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    let Some(scatter) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    match scatter {
        ScatterRecord::Specular {
            ray: specular,
            attenuation,
        } => {
            emitted
                + attenuation * ray_color(&specular, background, world, lights, depth - 1, rng)
        }

        ScatterRecord::Diffuse { attenuation, pdf } => {
            let light_pdf = lights.map(|target| HittablePdf::new(target, rec.p));
            let mut mixture = MixturePdf::new(pdf.as_ref());
            if let Some(light_pdf) = &light_pdf {
                mixture = mixture.with(light_pdf);
            }

            let direction = mixture.generate(rng);
            let pdf_value = mixture.value(direction);
            if pdf_value < MIN_PDF {
                return emitted;
            }
            let weight = pdf.value(direction) / pdf_value;

            let scattered = Ray::new(rec.p, direction, ray.time());
            emitted
                + attenuation
                    * ray_color(&scattered, background, world, lights, depth - 1, rng)
                    * weight
        }
    }
}
