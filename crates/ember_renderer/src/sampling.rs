//! Random sampling helpers shared by cameras, materials and PDFs.
//!
//! Every helper takes the generator explicitly so a render is reproducible
//! from its seed.

use ember_math::Vec3;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, UnitBall, UnitDisc, UnitSphere};
use std::f64::consts::PI;

/// Uniform f64 in [0, 1).
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen()
}

/// Uniform f64 in [min, max). Returns `min` for an empty range.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * gen_f64(rng)
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let [x, y, z]: [f64; 3] = UnitSphere.sample(rng);
    Vec3::new(x, y, z)
}

/// Uniformly distributed point inside the unit ball.
pub fn random_in_unit_ball(rng: &mut dyn RngCore) -> Vec3 {
    let [x, y, z]: [f64; 3] = UnitBall.sample(rng);
    Vec3::new(x, y, z)
}

/// Uniformly distributed point inside the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    let [x, y]: [f64; 2] = UnitDisc.sample(rng);
    Vec3::new(x, y, 0.0)
}

/// Cosine-weighted direction in the hemisphere around +Z.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);

    let phi = 2.0 * PI * r1;
    let sqrt_r2 = r2.sqrt();

    Vec3::new(phi.cos() * sqrt_r2, phi.sin() * sqrt_r2, (1.0 - r2).sqrt())
}

/// `1 - cos(theta_max)` for the cone subtended by a sphere of `radius`
/// seen from `distance_squared` away.
///
/// Written as `x / (1 + sqrt(1 - x))` with `x = r^2 / d^2`; the naive
/// `1 - sqrt(1 - x)` cancels catastrophically for small, distant spheres.
#[inline]
pub fn cone_one_minus_cos(radius: f64, distance_squared: f64) -> f64 {
    let x = (radius * radius / distance_squared).min(1.0);
    x / (1.0 + (1.0 - x).sqrt())
}

/// Direction around +Z uniformly distributed over the cone subtended by a
/// sphere of `radius` at `distance_squared`.
pub fn random_to_sphere(radius: f64, distance_squared: f64, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);

    let z = 1.0 - r2 * cone_one_minus_cos(radius, distance_squared);
    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).max(0.0).sqrt();

    Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
}
