//! Demo scene builders.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use ember_renderer::{
    triangle_mesh, BvhNode, Camera, CheckerTexture, Color, ConstantMedium, Cuboid, Dielectric,
    DiffuseLight, FlipFace, Hittable, HittableList, ImageTexture, Lambertian, Material, Metal,
    Point3, RotateY, SamplableList, Scene, Sphere, Translate, Triangle, Vec3, XyRect, XzRect,
    YzRect,
};
use log::info;
use rand::rngs::StdRng;
use rand::Rng;

use crate::cli::{Args, SceneKind};
use crate::particles::read_particles;

const SKY: Color = Color::new(0.7, 0.8, 1.0);

/// Box edge and droplet radius used by the water scene.
const WATER_BOX_SIZE: f64 = 800.0;
const WATER_PARTICLE_RADIUS: f64 = 16.0;

/// Build the scene selected on the command line.
pub fn build(args: &Args, rng: &mut StdRng) -> Result<Scene> {
    info!("Building scene {:?}", args.scene);

    let scene = match args.scene {
        SceneKind::RandomSpheres => random_spheres(rng),
        SceneKind::TwoSpheres => two_spheres(),
        SceneKind::Earth => earth(&args.texture),
        SceneKind::SimpleLight => simple_light(),
        SceneKind::CornellBox => cornell_box(),
        SceneKind::CornellSmoke => cornell_smoke(),
        SceneKind::CornellLights => cornell_lights(),
        SceneKind::FinalScene => final_scene(&args.texture, rng)?,
        SceneKind::WaterInBox => {
            let positions = match &args.particles {
                Some(path) => read_particles(path)?,
                None => vec![Point3::splat(0.5 * WATER_BOX_SIZE)],
            };
            water_in_box(WATER_BOX_SIZE, WATER_PARTICLE_RADIUS, &positions, rng)?
        }
        SceneKind::SingleTriangle => single_triangle(),
        SceneKind::Mesh => {
            let path = args
                .mesh
                .as_deref()
                .context("The mesh scene needs an OBJ file (--mesh <PATH>)")?;
            mesh_scene(path, rng)?
        }
    };

    info!("Scene has {} top-level objects", scene.objects.len());
    Ok(scene)
}

fn camera(look_from: Point3, look_at: Point3, vfov: f64, aspect_ratio: f64) -> Camera {
    Camera::new()
        .with_position(look_from, look_at, Vec3::Y)
        .with_lens(vfov, 0.0, 10.0)
        .with_aspect_ratio(aspect_ratio)
        .with_shutter(0.0, 1.0)
}

fn marble_camera() -> Camera {
    camera(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, 20.0, 16.0 / 9.0)
}

fn cornell_camera() -> Camera {
    camera(
        Point3::new(278.0, 278.0, -800.0),
        Point3::new(278.0, 278.0, 0.0),
        40.0,
        1.0,
    )
}

fn lambertian(color: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(color))
}

fn random_color(rng: &mut StdRng, min: f64, max: f64) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

/// Cuboid from the origin to `size`, turned about Y and then moved.
fn block(
    size: Vec3,
    angle: f64,
    offset: Vec3,
    material: Arc<dyn Material>,
) -> Arc<Translate<RotateY<Cuboid>>> {
    let cuboid = Arc::new(Cuboid::new(Point3::ZERO, size, material));
    Arc::new(Translate::new(Arc::new(RotateY::new(cuboid, angle)), offset))
}

/// Green, red and white walls of the 555 unit Cornell box.
fn cornell_walls(objects: &mut HittableList) -> Arc<dyn Material> {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    objects.add(Arc::new(YzRect::new(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    objects.add(Arc::new(YzRect::new(0.0, 555.0, 0.0, 555.0, 0.0, red)));
    objects.add(Arc::new(XzRect::new(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())));
    objects.add(Arc::new(XzRect::new(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    objects.add(Arc::new(XyRect::new(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    white
}

/// Ceiling light facing down into the box.
fn ceiling_light(x0: f64, x1: f64, z0: f64, z1: f64, y: f64, intensity: f64) -> Arc<XzRect> {
    let emit = Arc::new(DiffuseLight::from_color(Color::splat(intensity)));
    Arc::new(XzRect::new(x0, x1, z0, z1, y, emit))
}

pub fn random_spheres(rng: &mut StdRng) -> Scene {
    let mut objects: HittableList = HittableList::new();

    let checker = Arc::new(CheckerTexture::from_colors(
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    ));
    objects.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        Arc::new(Lambertian::new(checker)),
    )));

    for a in -11..11 {
        for b in -11..11 {
            let center = Point3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat = rng.gen::<f64>();
            if choose_mat < 0.8 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                let bounce = if rng.gen::<f64>() < 0.2 {
                    Vec3::new(0.0, rng.gen_range(0.0..0.5), 0.0)
                } else {
                    Vec3::ZERO
                };
                objects.add(Arc::new(Sphere::moving(
                    center,
                    center + bounce,
                    0.0,
                    1.0,
                    0.2,
                    lambertian(albedo),
                )));
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                let fuzz = rng.gen_range(0.0..0.5);
                objects.add(Arc::new(Sphere::new(
                    center,
                    0.2,
                    Arc::new(Metal::new(albedo, fuzz)),
                )));
            } else {
                objects.add(Arc::new(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))));
            }
        }
    }

    objects.add(Arc::new(Sphere::new(
        Point3::new(0.0, 1.0, 0.0),
        1.0,
        Arc::new(Dielectric::new(1.5)),
    )));
    objects.add(Arc::new(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    )));
    objects.add(Arc::new(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )));

    Scene::new(objects)
        .with_camera(marble_camera())
        .with_background(SKY)
}

pub fn two_spheres() -> Scene {
    let checker: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(
        CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::splat(0.9)),
    )));

    let mut objects: HittableList = HittableList::new();
    objects.add(Arc::new(Sphere::new(
        Point3::new(0.0, -10.0, 0.0),
        10.0,
        checker.clone(),
    )));
    objects.add(Arc::new(Sphere::new(Point3::new(0.0, 10.0, 0.0), 10.0, checker)));

    Scene::new(objects)
        .with_camera(marble_camera())
        .with_background(SKY)
}

pub fn earth(texture: &Path) -> Scene {
    let surface = Arc::new(Lambertian::new(Arc::new(ImageTexture::load(texture))));

    let mut objects: HittableList = HittableList::new();
    objects.add(Arc::new(Sphere::new(Point3::ZERO, 2.0, surface)));

    Scene::new(objects)
        .with_camera(marble_camera())
        .with_background(SKY)
}

pub fn simple_light() -> Scene {
    let gray = lambertian(Color::splat(0.5));
    let glow: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));

    let mut objects: HittableList = HittableList::new();
    objects.add(Arc::new(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        gray.clone(),
    )));
    objects.add(Arc::new(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, gray)));
    objects.add(Arc::new(YzRect::new(3.0, 5.0, 1.0, 3.0, -2.0, glow.clone())));
    objects.add(Arc::new(XyRect::new(3.0, 5.0, 1.0, 3.0, -2.0, glow.clone())));
    objects.add(Arc::new(Sphere::new(Point3::new(0.0, 6.5, 0.0), 1.0, glow)));

    let camera = camera(
        Point3::new(26.0, 3.0, 6.0),
        Point3::new(0.0, 2.0, 0.0),
        20.0,
        16.0 / 9.0,
    );
    Scene::new(objects).with_camera(camera)
}

pub fn cornell_box() -> Scene {
    let mut objects: HittableList = HittableList::new();
    let white = cornell_walls(&mut objects);

    let light = ceiling_light(213.0, 343.0, 227.0, 332.0, 554.0, 15.0);
    objects.add(Arc::new(FlipFace::new(light)));

    objects.add(block(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    ));
    objects.add(block(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    ));

    Scene::new(objects).with_camera(cornell_camera())
}

pub fn cornell_smoke() -> Scene {
    let mut objects: HittableList = HittableList::new();
    let white = cornell_walls(&mut objects);

    let light = ceiling_light(113.0, 443.0, 127.0, 432.0, 554.0, 7.0);
    objects.add(Arc::new(FlipFace::new(light)));

    let tall = block(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    );
    let short = block(
        Vec3::splat(165.0),
        -18.0,
        Vec3::new(130.0, 0.0, 65.0),
        white,
    );
    objects.add(Arc::new(ConstantMedium::from_color(tall, 0.01, Color::ZERO)));
    objects.add(Arc::new(ConstantMedium::from_color(short, 0.01, Color::ONE)));

    Scene::new(objects).with_camera(cornell_camera())
}

/// Cornell box with an aluminium block and a glass ball standing where the
/// short block would be; the ceiling light and the ball are importance sampled.
pub fn cornell_lights() -> Scene {
    let mut objects: HittableList = HittableList::new();
    cornell_walls(&mut objects);

    let light = ceiling_light(213.0, 343.0, 227.0, 332.0, 554.0, 15.0);
    objects.add(Arc::new(FlipFace::new(light.clone())));

    let aluminium: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.85, 0.88), 0.0));
    objects.add(block(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        aluminium,
    ));

    let glass = Arc::new(Sphere::new(
        Point3::new(190.0, 90.0, 190.0),
        90.0,
        Arc::new(Dielectric::new(1.5)),
    ));
    objects.add(glass.clone());

    let mut lights = SamplableList::new();
    lights.add(light);
    lights.add(glass);

    Scene::new(objects)
        .with_camera(cornell_camera())
        .with_lights(lights)
}

pub fn final_scene(texture: &Path, rng: &mut StdRng) -> Result<Scene> {
    let mut objects: HittableList = HittableList::new();

    let ground = lambertian(Color::new(0.48, 0.83, 0.53));
    let mut boxes: Vec<Arc<dyn Hittable>> = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            let w = 100.0;
            let x0 = -1000.0 + i as f64 * w;
            let z0 = -1000.0 + j as f64 * w;
            let y1 = rng.gen_range(1.0..101.0);
            boxes.push(Arc::new(Cuboid::new(
                Point3::new(x0, 0.0, z0),
                Point3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            )));
        }
    }
    objects.add(Arc::new(BvhNode::new(boxes, 0.0, 1.0, rng)?));

    let light = ceiling_light(123.0, 423.0, 147.0, 412.0, 554.0, 7.0);
    objects.add(Arc::new(FlipFace::new(light.clone())));

    let center = Point3::new(400.0, 400.0, 200.0);
    objects.add(Arc::new(Sphere::moving(
        center,
        center + Vec3::new(30.0, 0.0, 0.0),
        0.0,
        1.0,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    )));

    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    objects.add(Arc::new(Sphere::new(
        Point3::new(260.0, 150.0, 45.0),
        50.0,
        glass.clone(),
    )));
    objects.add(Arc::new(Sphere::new(
        Point3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 1.0)),
    )));

    let subsurface = Arc::new(Sphere::new(
        Point3::new(360.0, 150.0, 145.0),
        70.0,
        glass.clone(),
    ));
    objects.add(subsurface.clone());
    objects.add(Arc::new(ConstantMedium::from_color(
        subsurface,
        0.2,
        Color::new(0.2, 0.4, 0.9),
    )));
    let mist = Arc::new(Sphere::new(Point3::ZERO, 5000.0, glass));
    objects.add(Arc::new(ConstantMedium::from_color(mist, 0.0001, Color::ONE)));

    let globe = Arc::new(Lambertian::new(Arc::new(ImageTexture::load(texture))));
    objects.add(Arc::new(Sphere::new(
        Point3::new(400.0, 200.0, 400.0),
        100.0,
        globe,
    )));
    objects.add(Arc::new(Sphere::new(
        Point3::new(220.0, 280.0, 300.0),
        80.0,
        lambertian(Color::new(0.7, 0.1, 0.1)),
    )));

    let white = lambertian(Color::splat(0.73));
    let cluster: Vec<Arc<dyn Hittable>> = (0..1000)
        .map(|_| {
            Arc::new(Sphere::new(random_color(rng, 0.0, 165.0), 10.0, white.clone()))
                as Arc<dyn Hittable>
        })
        .collect();
    let cluster = Arc::new(BvhNode::new(cluster, 0.0, 1.0, rng)?);
    objects.add(Arc::new(Translate::new(
        Arc::new(RotateY::new(cluster, 15.0)),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    let mut lights = SamplableList::new();
    lights.add(light);

    let camera = camera(
        Point3::new(478.0, 278.0, -600.0),
        Point3::new(278.0, 278.0, 0.0),
        40.0,
        1.0,
    );
    Ok(Scene::new(objects).with_camera(camera).with_lights(lights))
}

/// Glass tank with one corner at the origin and the opposite one at
/// `(box_size, box_size, box_size)`, holding a water droplet per position.
pub fn water_in_box(
    box_size: f64,
    particle_radius: f64,
    positions: &[Point3],
    rng: &mut StdRng,
) -> Result<Scene> {
    let mut objects: HittableList = HittableList::new();

    let tank = Arc::new(Dielectric::tinted(1.0, Color::splat(0.97)));
    objects.add(Arc::new(Cuboid::new(Point3::ZERO, Point3::splat(box_size), tank)));

    let reach = 2.0 * box_size;
    objects.add(Arc::new(XzRect::new(
        -reach,
        reach,
        -reach,
        reach,
        -0.1,
        lambertian(Color::splat(0.7)),
    )));

    if !positions.is_empty() {
        let water: Arc<dyn Material> =
            Arc::new(Dielectric::tinted(1.3, Color::new(0.9, 0.9, 1.0)));
        let droplets: Vec<Arc<dyn Hittable>> = positions
            .iter()
            .map(|&p| Arc::new(Sphere::new(p, particle_radius, water.clone())) as Arc<dyn Hittable>)
            .collect();
        info!("Water scene with {} particles", droplets.len());
        objects.add(Arc::new(BvhNode::new(droplets, 0.0, 1.0, rng)?));
    }

    let camera = camera(
        Point3::new(-box_size, box_size, -box_size),
        Point3::new(-0.5 * box_size, 0.75 * box_size, -0.5 * box_size),
        60.0,
        1.0,
    );
    Ok(Scene::new(objects).with_camera(camera).with_background(SKY))
}

pub fn single_triangle() -> Scene {
    let mut objects: HittableList = HittableList::new();
    objects.add(Arc::new(Triangle::new(
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.5, 0.0),
        lambertian(Color::new(0.8, 0.2, 0.2)),
    )));
    objects.add(Arc::new(XzRect::new(
        -10.0,
        10.0,
        -10.0,
        10.0,
        -0.01,
        lambertian(Color::splat(0.5)),
    )));

    let camera = camera(
        Point3::new(0.0, 0.75, 4.0),
        Point3::new(0.0, 0.75, 0.0),
        40.0,
        1.0,
    );
    Scene::new(objects).with_camera(camera).with_background(SKY)
}

/// An OBJ mesh on a ground plane, framed from its bounding box and lit by
/// an overhead panel.
pub fn mesh_scene(path: &Path, rng: &mut StdRng) -> Result<Scene> {
    let mesh = triangle_mesh(path, lambertian(Color::splat(0.73)), rng)
        .with_context(|| format!("Failed to load mesh {}", path.display()))?;
    let Some(bounds) = mesh.bbox() else {
        bail!("Mesh {} has no triangles", path.display());
    };

    let center = 0.5 * (bounds.min() + bounds.max());
    let extent = (bounds.max() - bounds.min()).length();
    let floor = bounds.min().y;

    let mut objects: HittableList = HittableList::new();
    objects.add(Arc::new(mesh));
    objects.add(Arc::new(XzRect::new(
        center.x - 2.0 * extent,
        center.x + 2.0 * extent,
        center.z - 2.0 * extent,
        center.z + 2.0 * extent,
        floor,
        lambertian(Color::splat(0.5)),
    )));

    let half = 0.5 * extent;
    let light = ceiling_light(
        center.x - half,
        center.x + half,
        center.z - half,
        center.z + half,
        floor + 2.0 * extent,
        6.0,
    );
    objects.add(Arc::new(FlipFace::new(light.clone())));

    let mut lights = SamplableList::new();
    lights.add(light);

    let look_from = center + Vec3::new(0.0, 0.35, 1.0).normalize() * 1.6 * extent;
    Ok(Scene::new(objects)
        .with_camera(camera(look_from, center, 40.0, 1.0))
        .with_background(Color::splat(0.1))
        .with_lights(lights))
}
