//! Camera for ray generation.

use ember_math::{Point3, Ray, Vec3};
use rand::RngCore;

use crate::sampling::{gen_range, random_in_unit_disk};

/// Thin-lens camera with a shutter interval.
///
/// Configured with `with_*` builders; derived viewport vectors are
/// recomputed by every builder, so a camera is always ready to use.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64, // Vertical field of view in degrees
    aspect_ratio: f64,
    aperture: f64,
    focus_dist: f64,

    // Shutter
    time0: f64,
    time1: f64,

    // Cached computed values
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Camera at the origin looking down -Z with a 90 degree square view.
    pub fn new() -> Self {
        let mut camera = Self {
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 1.0,
            aperture: 0.0,
            focus_dist: 1.0,
            time0: 0.0,
            time1: 0.0,
            origin: Point3::ZERO,
            lower_left_corner: Point3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self.initialize();
        self
    }

    /// Set lens settings. An aperture of 0 is a pinhole.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self.initialize();
        self
    }

    /// Set the width / height ratio of the viewport.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.initialize();
        self
    }

    /// Open the shutter over `[time0, time1]` for motion blur.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Shutter interval as `(open, close)`.
    pub fn shutter(&self) -> (f64, f64) {
        (self.time0, self.time1)
    }

    fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        self.origin = self.look_from;
        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner = self.origin
            - self.horizontal / 2.0
            - self.vertical / 2.0
            - self.focus_dist * self.w;

        self.lens_radius = self.aperture / 2.0;
    }

    /// Ray through the viewport at `(s, t)`, both in [0, 1] from the
    /// lower-left corner.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let direction = self.lower_left_corner + s * self.horizontal + t * self.vertical
            - self.origin
            - offset;
        let time = gen_range(rng, self.time0, self.time1);

        Ray::new(self.origin + offset, direction, time)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_basis() {
        let camera = Camera::new().with_position(
            Point3::ZERO,
            Point3::new(0.0, 0.0, -1.0),
            Vec3::Y,
        );
        assert_eq!(camera.origin, Point3::ZERO);
        assert!((camera.w - Vec3::Z).length() < 1e-12);
        assert!((camera.u - Vec3::X).length() < 1e-12);
    }

    #[test]
    fn test_camera_center_ray() {
        let camera = Camera::new()
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = camera.get_ray(0.5, 0.5, &mut rng);
        assert_eq!(ray.origin(), Point3::ZERO);
        assert!((ray.direction().normalize() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_camera_corners() {
        // 90 degree fov: the viewport spans [-1, 1] at distance 1.
        let camera = Camera::new().with_aspect_ratio(2.0);
        let mut rng = StdRng::seed_from_u64(0);

        let lower_left = camera.get_ray(0.0, 0.0, &mut rng);
        assert!((lower_left.direction() - Vec3::new(-2.0, -1.0, -1.0)).length() < 1e-12);

        let upper_right = camera.get_ray(1.0, 1.0, &mut rng);
        assert!((upper_right.direction() - Vec3::new(2.0, 1.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_defocus_keeps_focus_plane() {
        let camera = Camera::new()
            .with_position(Point3::new(0.0, 0.0, 5.0), Point3::ZERO, Vec3::Y)
            .with_lens(40.0, 2.0, 5.0);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let ray = camera.get_ray(0.5, 0.5, &mut rng);
            // Every ray through the center passes through the focus point.
            let t = -ray.origin().z / ray.direction().z;
            assert!(ray.at(t).truncate().length() < 1e-9);
            assert!((ray.origin() - Point3::new(0.0, 0.0, 5.0)).length() <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_shutter_time() {
        let camera = Camera::new().with_shutter(0.25, 0.75);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let time = camera.get_ray(0.5, 0.5, &mut rng).time();
            assert!((0.25..0.75).contains(&time));
        }
        assert_eq!(camera.shutter(), (0.25, 0.75));
    }
}
