//! Built-in scenes.
//!
//! Each scene carries its own default resolution and render settings, which
//! the settings file and command line can override before it is built.

use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use rand::RngCore;

use ember_core::{CheckerTexture, ImageTexture, NoiseTexture, Texture};
use ember_math::sampling::{gen_f64, gen_range, random_vec};
use ember_renderer::{
    AaRect, Background, BvhNode, Camera, Color, ConstantMedium, Cuboid, Dielectric, DiffuseLight,
    FlipFace, Heart, HittableList, Lambertian, Material, Metal, Point3, RenderConfig, RenderResult,
    RotateY, Scene, Sphere, Translate, Vec3,
};

/// Names accepted by `ember render --scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Field of small diffuse, metal and glass spheres, some in motion
    RandomSpheres,
    /// Two large checkered spheres
    TwoSpheres,
    /// Marble spheres textured with Perlin turbulence
    Perlin,
    /// A globe wrapped in an image texture
    Earth,
    /// Marble spheres lit by a single rectangular lamp
    SimpleLight,
    /// Cornell box with a rotated block and a glass sphere
    CornellBox,
    /// Cornell box with two blocks of smoke
    CornellSmoke,
    /// Everything at once: box field, media, motion blur, textures
    Final,
    /// Cluster of glowing spheres under a sky gradient
    Sky,
    /// Diffuse, hollow glass and metal spheres on a large ground sphere
    HollowGlass,
    /// Glowing field at night around a heart inside a glass ball
    Night,
}

/// Per-scene defaults applied before any override.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDefaults {
    pub width: u32,
    pub aspect_ratio: f64,
    pub config: RenderConfig,
}

/// External inputs some scenes read.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub earth_map: PathBuf,
}

impl Default for SceneAssets {
    fn default() -> Self {
        Self {
            earth_map: PathBuf::from("earthmap.jpg"),
        }
    }
}

impl SceneKind {
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }

    pub fn defaults(&self) -> SceneDefaults {
        let sky = RenderConfig::default().with_background(Background::Sky);
        let dark = RenderConfig::default();

        let (width, aspect_ratio, config) = match self {
            SceneKind::RandomSpheres => (400, 16.0 / 9.0, sky),
            SceneKind::TwoSpheres | SceneKind::Perlin | SceneKind::Earth => (400, 16.0 / 9.0, sky),
            SceneKind::SimpleLight => (400, 16.0 / 9.0, dark.with_samples(400)),
            SceneKind::CornellBox => (400, 1.0, dark.with_samples(1000)),
            SceneKind::CornellSmoke => (400, 1.0, dark.with_samples(400)),
            SceneKind::Final => (800, 1.0, dark.with_samples(1000)),
            SceneKind::Sky => (600, 1.0, sky.with_samples(500)),
            SceneKind::HollowGlass => (500, 16.0 / 9.0, sky),
            SceneKind::Night => (600, 1.0, dark.with_samples(300)),
        };

        SceneDefaults {
            width,
            aspect_ratio,
            config,
        }
    }

    /// Build the scene at the given width; the height follows the scene's
    /// aspect ratio.
    pub fn build(
        &self,
        width: u32,
        config: RenderConfig,
        assets: &SceneAssets,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Scene> {
        let aspect_ratio = self.defaults().aspect_ratio;
        let height = ((width as f64 / aspect_ratio) as u32).max(1);
        let camera = Camera::new().with_resolution(width, height).with_shutter(0.0, 1.0);

        log::debug!("Building scene '{}' at {}x{}", self.name(), width, height);

        match self {
            SceneKind::RandomSpheres => random_spheres(camera, config, rng),
            SceneKind::TwoSpheres => two_spheres(camera, config),
            SceneKind::Perlin => perlin_spheres(camera, config, rng),
            SceneKind::Earth => earth(camera, config, assets),
            SceneKind::SimpleLight => simple_light(camera, config, rng),
            SceneKind::CornellBox => cornell_box(camera, config, rng),
            SceneKind::CornellSmoke => cornell_smoke(camera, config, rng),
            SceneKind::Final => final_scene(camera, config, assets, rng),
            SceneKind::Sky => glowing_spheres(camera, config, rng),
            SceneKind::HollowGlass => hollow_glass(camera, config),
            SceneKind::Night => night(camera, config, rng),
        }
    }
}

fn lambertian(albedo: Color) -> Arc<dyn Material> {
    Arc::new(Lambertian::from_color(albedo))
}

fn textured(texture: impl Texture + 'static) -> Arc<dyn Material> {
    Arc::new(Lambertian::new(Arc::new(texture)))
}

fn light(emit: Color) -> Arc<dyn Material> {
    Arc::new(DiffuseLight::from_color(emit))
}

fn glass() -> Arc<dyn Material> {
    Arc::new(Dielectric::new(1.5))
}

/// Camera at (13, 2, 3) looking at the origin with a narrow field of view.
fn overview_camera(camera: Camera, aperture: f64, focus_dist: f64) -> Camera {
    let mut camera = camera
        .with_position(Point3::new(13.0, 2.0, 3.0), Point3::ZERO, Vec3::Y)
        .with_lens(20.0, aperture, focus_dist);
    camera.initialize();
    camera
}

fn random_spheres(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let mut objects = HittableList::new();
    objects.push(Sphere::new(
        Point3::new(0.0, -1000.0, 0.0),
        1000.0,
        lambertian(Color::splat(0.5)),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f64(rng);
            let center = Point3::new(a as f64 + 0.9 * gen_f64(rng), 0.2, b as f64 + 0.9 * gen_f64(rng));

            // Keep clear of the big metal sphere
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_vec(rng, 0.0, 1.0) * random_vec(rng, 0.0, 1.0);
                let center1 = center + Vec3::new(0.0, gen_range(rng, 0.0, 0.5), 0.0);
                objects.push(Sphere::moving(center, center1, 0.0, 1.0, 0.2, lambertian(albedo)));
            } else if choose_mat < 0.95 {
                let albedo = random_vec(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                objects.push(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz))));
            } else {
                objects.push(Sphere::new(center, 0.2, glass()));
            }
        }
    }

    objects.push(Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0, glass()));
    objects.push(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    objects.push(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, HittableList::new(), overview_camera(camera, 0.1, 10.0), config))
}

fn two_spheres(camera: Camera, config: RenderConfig) -> RenderResult<Scene> {
    let checker = textured(CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::splat(0.9)));

    let mut world = HittableList::new();
    world.push(Sphere::new(Point3::new(0.0, -10.0, 0.0), 10.0, checker.clone()));
    world.push(Sphere::new(Point3::new(0.0, 10.0, 0.0), 10.0, checker));

    Ok(Scene::new(world, HittableList::new(), overview_camera(camera, 0.0, 10.0), config))
}

fn marble_pair(rng: &mut dyn RngCore) -> HittableList {
    let marble = textured(NoiseTexture::new(4.0, rng));

    let mut objects = HittableList::new();
    objects.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    objects.push(Sphere::new(Point3::new(0.0, 2.0, 0.0), 2.0, marble));
    objects
}

fn perlin_spheres(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let world = marble_pair(rng);
    Ok(Scene::new(world, HittableList::new(), overview_camera(camera, 0.0, 10.0), config))
}

fn earth(camera: Camera, config: RenderConfig, assets: &SceneAssets) -> RenderResult<Scene> {
    let surface = textured(ImageTexture::open(&assets.earth_map));
    let globe = Sphere::new(Point3::ZERO, 2.0, surface);

    let mut world = HittableList::new();
    world.push(globe);

    Ok(Scene::new(world, HittableList::new(), overview_camera(camera, 0.0, 10.0), config))
}

fn simple_light(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let mut world = marble_pair(rng);
    let lamp = AaRect::xy(3.0, 5.0, 1.0, 3.0, -2.0, light(Color::splat(4.0)));
    world.push(lamp.clone());

    let mut lights = HittableList::new();
    lights.push(lamp);

    let mut camera = camera
        .with_position(Point3::new(26.0, 3.0, 6.0), Point3::new(0.0, 2.0, 0.0), Vec3::Y)
        .with_lens(20.0, 0.0, 10.0);
    camera.initialize();

    Ok(Scene::new(world, lights, camera, config))
}

/// The five walls of a 555-unit Cornell box, open towards -z.
fn cornell_walls() -> HittableList {
    let red = lambertian(Color::new(0.65, 0.05, 0.05));
    let white = lambertian(Color::splat(0.73));
    let green = lambertian(Color::new(0.12, 0.45, 0.15));

    let mut walls = HittableList::new();
    walls.push(FlipFace::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green)));
    walls.push(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red));
    walls.push(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone()));
    walls.push(FlipFace::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone())));
    walls.push(FlipFace::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white)));
    walls
}

fn cornell_camera(camera: Camera) -> Camera {
    let mut camera = camera
        .with_position(Point3::new(278.0, 278.0, -800.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0);
    camera.initialize();
    camera
}

/// Cuboid of the given size, turned about its corner and moved into place.
fn block(size: Vec3, degrees: f64, offset: Vec3, material: Arc<dyn Material>) -> Translate {
    let cuboid = Cuboid::new(Point3::ZERO, size, material);
    Translate::new(RotateY::new(cuboid, degrees), offset)
}

fn cornell_box(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let mut objects = cornell_walls();

    // Ceiling lamp faces down into the box
    let lamp = AaRect::xz(213.0, 343.0, 227.0, 332.0, 554.0, light(Color::splat(15.0)));
    objects.push(FlipFace::new(lamp.clone()));

    objects.push(block(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        lambertian(Color::splat(0.73)),
    ));

    let ball = Sphere::new(Point3::new(190.0, 90.0, 190.0), 90.0, glass());
    objects.push(ball.clone());

    // Sample the lamp and the glass ball directly
    let mut lights = HittableList::new();
    lights.push(lamp);
    lights.push(ball);

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, lights, cornell_camera(camera), config))
}

fn cornell_smoke(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let mut objects = cornell_walls();

    let lamp = AaRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light(Color::splat(7.0)));
    objects.push(FlipFace::new(lamp.clone()));

    let white = lambertian(Color::splat(0.73));
    let tall = block(
        Vec3::new(165.0, 330.0, 165.0),
        15.0,
        Vec3::new(265.0, 0.0, 295.0),
        white.clone(),
    );
    let short = block(Vec3::splat(165.0), -18.0, Vec3::new(130.0, 0.0, 65.0), white);

    objects.push(ConstantMedium::from_color(tall, 0.01, Color::ZERO));
    objects.push(ConstantMedium::from_color(short, 0.01, Color::ONE));

    let mut lights = HittableList::new();
    lights.push(lamp);

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, lights, cornell_camera(camera), config))
}

fn final_scene(
    camera: Camera,
    config: RenderConfig,
    assets: &SceneAssets,
    rng: &mut dyn RngCore,
) -> RenderResult<Scene> {
    let mut objects = HittableList::new();

    // Field of ground boxes with random heights
    let ground = lambertian(Color::new(0.48, 0.83, 0.53));
    let mut boxes = HittableList::new();
    const BOXES_PER_SIDE: usize = 20;
    for i in 0..BOXES_PER_SIDE {
        for j in 0..BOXES_PER_SIDE {
            let w = 100.0;
            let x0 = -1000.0 + i as f64 * w;
            let z0 = -1000.0 + j as f64 * w;
            let y1 = gen_range(rng, 1.0, 101.0);
            boxes.push(Cuboid::new(
                Point3::new(x0, 0.0, z0),
                Point3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
        }
    }
    objects.push(BvhNode::new(boxes.into_objects(), rng)?);

    let lamp = AaRect::xz(123.0, 423.0, 147.0, 412.0, 554.0, light(Color::splat(7.0)));
    objects.push(FlipFace::new(lamp.clone()));

    let center0 = Point3::new(400.0, 400.0, 200.0);
    let center1 = center0 + Vec3::new(30.0, 0.0, 0.0);
    objects.push(Sphere::moving(
        center0,
        center1,
        0.0,
        1.0,
        50.0,
        lambertian(Color::new(0.7, 0.3, 0.1)),
    ));

    objects.push(Sphere::new(Point3::new(260.0, 150.0, 45.0), 50.0, glass()));
    objects.push(Sphere::new(
        Point3::new(0.0, 150.0, 145.0),
        50.0,
        Arc::new(Metal::new(Color::new(0.8, 0.8, 0.9), 10.0)),
    ));

    // Glass shell filled with blue haze
    let shell = Sphere::new(Point3::new(360.0, 150.0, 145.0), 70.0, glass());
    objects.push(shell.clone());
    objects.push(ConstantMedium::from_color(shell, 0.2, Color::new(0.2, 0.4, 0.9)));

    // Thin fog over everything
    let haze = Sphere::new(Point3::ZERO, 5000.0, glass());
    objects.push(ConstantMedium::from_color(haze, 0.0001, Color::ONE));

    let surface = textured(ImageTexture::open(&assets.earth_map));
    objects.push(Sphere::new(Point3::new(400.0, 200.0, 400.0), 100.0, surface));

    let marble = textured(NoiseTexture::new(0.1, rng));
    objects.push(Sphere::new(Point3::new(220.0, 280.0, 300.0), 80.0, marble));

    // Cube of small white spheres
    let white = lambertian(Color::splat(0.73));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        cluster.push(Sphere::new(random_vec(rng, 0.0, 165.0), 10.0, white.clone()));
    }
    let cluster = BvhNode::new(cluster.into_objects(), rng)?;
    objects.push(Translate::new(RotateY::new(cluster, 15.0), Vec3::new(-100.0, 270.0, 395.0)));

    let mut lights = HittableList::new();
    lights.push(lamp);

    let mut camera = camera
        .with_position(Point3::new(478.0, 278.0, -600.0), Point3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_lens(40.0, 0.0, 10.0);
    camera.initialize();

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, lights, camera, config))
}

fn glowing_spheres(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let spacing = 1.0 / 0.6;
    let mut objects = HittableList::new();

    for a in -6..6 {
        for b in -6..6 {
            for c in -2..2 {
                let choose_mat = gen_f64(rng);
                let center = Point3::new(
                    a as f64 * spacing + 0.4 * gen_f64(rng),
                    b as f64 * spacing + 0.4 * gen_f64(rng),
                    c as f64 * spacing + 0.4 * gen_f64(rng),
                );

                if choose_mat < 0.9 {
                    let emit = random_vec(rng, 0.0, 1.0);
                    objects.push(Sphere::new(center, 0.2, light(emit)));
                } else if choose_mat < 0.95 {
                    let albedo = random_vec(rng, 0.5, 1.0);
                    let fuzz = gen_range(rng, 0.0, 0.5);
                    objects.push(Sphere::new(center, 0.3, Arc::new(Metal::new(albedo, fuzz))));
                } else {
                    objects.push(Sphere::new(center, 0.25, glass()));
                }
            }
        }
    }

    let look_from = Point3::new(13.0, 2.0, 3.0);
    let camera = overview_camera(camera, 0.05, look_from.length());

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, HittableList::new(), camera, config))
}

fn hollow_glass(camera: Camera, config: RenderConfig) -> RenderResult<Scene> {
    let ground = lambertian(Color::new(0.8, 0.8, 0.0));
    let center = lambertian(Color::new(0.1, 0.2, 0.5));
    let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.0));

    let mut world = HittableList::new();
    world.push(Sphere::new(Point3::new(0.0, -100.5, -1.0), 100.0, ground));
    world.push(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, center));
    // Negative radius carves a bubble out of the glass ball
    world.push(Sphere::new(Point3::new(-1.0, 0.0, -1.0), 0.5, glass()));
    world.push(Sphere::new(Point3::new(-1.0, 0.0, -1.0), -0.45, glass()));
    world.push(Sphere::new(Point3::new(1.0, 0.0, -1.0), 0.5, metal));

    let look_from = Point3::new(-2.0, 2.0, 1.0);
    let look_at = Point3::new(0.0, 0.0, -1.0);
    let mut camera = camera
        .with_position(look_from, look_at, Vec3::Y)
        .with_lens(20.0, 0.0, (look_from - look_at).length());
    camera.initialize();

    Ok(Scene::new(world, HittableList::new(), camera, config))
}

fn night(camera: Camera, config: RenderConfig, rng: &mut dyn RngCore) -> RenderResult<Scene> {
    let checker = textured(CheckerTexture::from_colors(Color::new(0.2, 0.3, 0.1), Color::splat(0.9)));

    let mut objects = HittableList::new();
    objects.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, checker));

    let spacing = 1.0 / 1.1;
    for a in -21..21 {
        for b in -21..21 {
            let choose_mat = gen_f64(rng);
            let center = Point3::new(
                a as f64 * spacing + 0.4 * gen_f64(rng),
                0.2,
                b as f64 * spacing + 0.4 * gen_f64(rng),
            );

            // Leave room for the glass ball
            if (center - Point3::new(0.0, 0.5, 0.0)).length() <= 0.8 {
                continue;
            }

            let material: Arc<dyn Material> = if choose_mat < 0.1 {
                lambertian(random_vec(rng, 0.0, 1.0) * random_vec(rng, 0.0, 1.0))
            } else if choose_mat < 0.15 {
                let albedo = random_vec(rng, 0.5, 1.0);
                Arc::new(Metal::new(albedo, gen_range(rng, 0.0, 0.5)))
            } else if choose_mat < 0.45 {
                glass()
            } else {
                light(random_vec(rng, 0.0, 1.0))
            };
            objects.push(Sphere::new(center, 0.2, material));
        }
    }

    objects.push(Sphere::new(Point3::new(0.0, 1.1, 0.0), 1.0, glass()));
    objects.push(Heart::new(
        Point3::new(0.0, 1.0, 0.0),
        0.5,
        light(Color::new(0.65, 0.05, 0.05)),
    ));

    let look_from = Point3::new(18.0, 4.0, 5.0);
    let mut camera = camera
        .with_position(look_from, Point3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.1, look_from.length());
    camera.initialize();

    let world = BvhNode::new(objects.into_objects(), rng)?;
    Ok(Scene::new(world, HittableList::new(), camera, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_renderer::Hittable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(kind: SceneKind, width: u32) -> Scene {
        let mut rng = StdRng::seed_from_u64(1);
        let config = kind.defaults().config.with_samples(1).with_max_depth(4);
        let assets = SceneAssets {
            earth_map: PathBuf::from("does/not/exist.jpg"),
        };
        kind.build(width, config, &assets, &mut rng).unwrap()
    }

    #[test]
    fn test_every_scene_builds() {
        for kind in SceneKind::value_variants() {
            let scene = build(*kind, 32);
            let aspect = kind.defaults().aspect_ratio;

            assert_eq!(scene.camera.image_width, 32, "scene {}", kind.name());
            assert_eq!(scene.camera.image_height, (32.0 / aspect) as u32, "scene {}", kind.name());
            assert!(scene.world.bounding_box().is_some(), "scene {} is unbounded", kind.name());
        }
    }

    #[test]
    fn test_scene_names_are_kebab_case() {
        assert_eq!(SceneKind::RandomSpheres.name(), "random-spheres");
        assert_eq!(SceneKind::CornellSmoke.name(), "cornell-smoke");
        assert_eq!(SceneKind::HollowGlass.name(), "hollow-glass");
        assert_eq!(SceneKind::from_str("final", false), Ok(SceneKind::Final));
    }

    #[test]
    fn test_lit_scenes_sample_their_lamps() {
        assert_eq!(build(SceneKind::CornellBox, 8).lights.len(), 2);
        assert_eq!(build(SceneKind::CornellSmoke, 8).lights.len(), 1);
        assert_eq!(build(SceneKind::Final, 8).lights.len(), 1);
        assert!(build(SceneKind::RandomSpheres, 8).lights.is_empty());
    }

    #[test]
    fn test_scene_construction_is_seeded() {
        let a = build(SceneKind::RandomSpheres, 16);
        let b = build(SceneKind::RandomSpheres, 16);
        assert_eq!(a.world.bounding_box(), b.world.bounding_box());
    }

    #[test]
    fn test_cornell_box_renders_light() {
        let scene = build(SceneKind::CornellBox, 8);
        let image = ember_renderer::render(&scene);
        assert!(image.to_rgb8().iter().any(|&b| b > 0));
    }
}
