//! Scene container: everything a render needs, built once up front.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use ember_math::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bvh::BvhNode;
use crate::camera::Camera;
use crate::error::RenderResult;
use crate::hittable::{HittableList, Samplable, SamplableList};
use crate::renderer::{render_with_progress, RenderConfig, RenderOutput, RenderView};
use crate::timing::Timings;

/// Objects, camera, background and light-sampling targets.
///
/// `lights` only steers importance sampling; emitters must also be in
/// `objects` to be visible.
pub struct Scene {
    pub objects: HittableList,
    pub camera: Option<Camera>,
    pub background: Color,
    pub lights: Option<Arc<dyn Samplable>>,
}

impl Scene {
    /// A scene with a black background, no camera and no light targets.
    pub fn new(objects: HittableList) -> Self {
        Self {
            objects,
            camera: None,
            background: Color::ZERO,
            lights: None,
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    /// Sample towards `lights`. An empty list disables light sampling.
    pub fn with_lights(mut self, lights: SamplableList) -> Self {
        self.lights = if lights.is_empty() {
            None
        } else {
            Some(Arc::new(lights))
        };
        self
    }

    /// Camera to render with, falling back to the default camera.
    pub fn camera_or_default(&self) -> Camera {
        self.camera.clone().unwrap_or_default()
    }

    /// Build the acceleration structure over the scene's objects for the
    /// camera's shutter interval.
    pub fn build_bvh(&self, seed: u64) -> RenderResult<BvhNode> {
        let (time0, time1) = self.camera_or_default().shutter();
        let mut rng = StdRng::seed_from_u64(seed);
        BvhNode::from_list(&self.objects, time0, time1, &mut rng)
    }

    /// Build the BVH and render, reporting completed pixels to `progress`.
    pub fn render(
        &self,
        config: &RenderConfig,
        progress: &AtomicUsize,
    ) -> RenderResult<RenderOutput> {
        let mut timings = Timings::new();

        let watch = Timings::start("build_bvh");
        let world = self.build_bvh(config.seed)?;
        watch.stop(&mut timings);

        let camera = self.camera_or_default();
        let view = RenderView {
            world: &world,
            lights: self.lights.as_deref(),
            camera: &camera,
            background: self.background,
        };

        let mut output = render_with_progress(&view, config, progress)?;
        timings.merge(&output.timings);
        output.timings = timings;
        Ok(output)
    }
}
