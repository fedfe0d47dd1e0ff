//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard depth cutoff
//! - Emission from area lights
//! - Importance sampling toward lights mixed with the material's own density
//! - Anti-aliasing via multi-sampling

use serde::{Deserialize, Serialize};

use crate::hittable::{Hittable, HittableList};
use crate::material::ScatterKind;
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::Camera;
use ember_math::{Color, Interval, Ray};
use rand::RngCore;

/// Closest distance a bounce may travel, to avoid self-intersection acne.
const T_MIN: f64 = 0.001;

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// A constant color (black for scenes lit only by emitters).
    Solid(Color),
    /// White-to-blue vertical gradient.
    Sky,
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Solid(color) => *color,
            Background::Sky => sky_gradient(ray),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid(Color::ZERO)
    }
}

/// Which estimator resolves a camera ray.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Mix light sampling with the material density (see [`ray_color`]).
    #[default]
    Importance,
    /// Follow the material's own scatter direction only (see [`ray_color_direct`]).
    Direct,
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Color returned when a ray doesn't hit anything
    pub background: Background,
    /// Estimator used for each path
    pub sampling: Sampling,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Background::default(),
            sampling: Sampling::Importance,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderConfig {
    pub fn with_samples(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel.max(1);
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything needed to render an image.
pub struct Scene {
    /// Root of the scene, usually a BVH.
    pub world: Box<dyn Hittable>,
    /// Shapes that are sampled directly as light sources. May be empty.
    pub lights: HittableList,
    pub camera: Camera,
    pub config: RenderConfig,
}

impl Scene {
    pub fn new<H: Hittable + 'static>(world: H, lights: HittableList, camera: Camera, config: RenderConfig) -> Self {
        Self {
            world: Box::new(world),
            lights,
            camera,
            config,
        }
    }
}

/// Compute the radiance carried back along a ray.
///
/// Diffuse bounces draw their next direction from an even mixture of the
/// lights and the material's density and weight by the ratio of the two.
/// With no lights the material's density is used on its own.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    lights: &HittableList,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY), rng) else {
        return config.background.color(ray);
    };

    let emission = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        // Ray was absorbed - just return emission
        return emission;
    };

    let material_pdf = match srec.kind {
        ScatterKind::Specular(specular) => {
            return emission
                + srec.attenuation * ray_color(&specular, world, lights, depth - 1, config, rng);
        }
        ScatterKind::Diffuse(pdf) => pdf,
    };

    let light_pdf = HittablePdf::new(lights, rec.p);
    let mixture = MixturePdf::new(&light_pdf, &material_pdf);
    let pdf: &dyn Pdf = if lights.is_empty() { &material_pdf } else { &mixture };

    let scattered = Ray::new(rec.p, pdf.generate(rng), ray.time());
    let pdf_value = pdf.value(scattered.direction(), rng);
    if pdf_value <= 0.0 {
        return emission;
    }

    let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
    let incoming = ray_color(&scattered, world, lights, depth - 1, config, rng);

    emission + srec.attenuation * scattering_pdf * incoming / pdf_value
}

/// Compute the radiance along a ray by following each material's own scatter
/// direction, without light sampling.
pub fn ray_color_direct(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY), rng) else {
        return config.background.color(ray);
    };

    let emission = rec.material.emitted(ray, &rec, rec.u, rec.v, rec.p);

    match rec.material.scatter_direct(ray, &rec, rng) {
        Some((attenuation, scattered)) => {
            emission + attenuation * ray_color_direct(&scattered, world, depth - 1, config, rng)
        }
        None => emission,
    }
}

/// Trace one camera ray with the estimator chosen in `config`.
pub fn trace(
    ray: &Ray,
    world: &dyn Hittable,
    lights: &HittableList,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    match config.sampling {
        Sampling::Importance => ray_color(ray, world, lights, config.max_depth, config, rng),
        Sampling::Direct => ray_color_direct(ray, world, config.max_depth, config, rng),
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
///
/// Returns the sum of all samples; divide by `samples_per_pixel` to average.
pub fn render_pixel(scene: &Scene, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..scene.config.samples_per_pixel {
        // Camera adds a random offset within the pixel for anti-aliasing
        let ray = scene.camera.get_pixel_ray(x, y, rng);
        pixel_color += trace(&ray, scene.world.as_ref(), &scene.lights, &scene.config, rng);
    }

    pixel_color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, BvhNode, DiffuseLight, FlipFace, Lambertian, Material, Sphere};
    use ember_math::{Point3, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up should be more blue (less red than white)
        let up_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0), 0.0);
        let up_color = sky_gradient(&up_ray);

        // Ray pointing down should be white
        let down_ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 0.0);
        let down_color = sky_gradient(&down_ray);

        assert_eq!(up_color, Color::new(0.5, 0.7, 1.0));
        assert_eq!(down_color, Color::ONE);
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.samples_per_pixel, 100);
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.background, Background::Solid(Color::ZERO));
        assert_eq!(config.sampling, Sampling::Importance);
        assert_eq!(config.bucket_size, 32);
    }

    #[test]
    fn test_depth_zero_is_black() {
        let mut rng = StdRng::seed_from_u64(1);
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(10.0)));
        let world = Sphere::new(Point3::new(0.0, 0.0, -2.0), 1.0, light);
        let lights = HittableList::new();
        let config = RenderConfig::default().with_background(Background::Sky);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        assert_eq!(ray_color(&ray, &world, &lights, 0, &config, &mut rng), Color::ZERO);
        assert_eq!(ray_color_direct(&ray, &world, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_returns_background() {
        let mut rng = StdRng::seed_from_u64(2);
        let world = HittableList::new();
        let config = RenderConfig::default().with_background(Background::Solid(Color::new(0.1, 0.2, 0.3)));
        let ray = Ray::new_simple(Point3::ZERO, Vec3::Y);

        let color = ray_color(&ray, &world, &world, 5, &config, &mut rng);
        assert_eq!(color, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_emitter_seen_directly() {
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::new(4.0, 2.0, 1.0)));
        let world = Sphere::new(Point3::new(0.0, 0.0, -3.0), 1.0, light);
        let lights = HittableList::new();
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        for sampling in [Sampling::Importance, Sampling::Direct] {
            let mut rng = StdRng::seed_from_u64(3);
            let config = RenderConfig::default().with_sampling(sampling);
            let color = trace(&ray, &world, &lights, &config, &mut rng);
            assert_eq!(color, Color::new(4.0, 2.0, 1.0));
        }
    }

    #[test]
    fn test_diffuse_under_light_is_lit() {
        let mut rng = StdRng::seed_from_u64(4);
        let ground: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.5)));
        let emit: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(8.0)));

        let mut objects = HittableList::new();
        objects.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));
        objects.push(FlipFace::new(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit.clone())));
        let world = BvhNode::new(objects.into_objects(), &mut rng).unwrap();

        let mut lights = HittableList::new();
        lights.push(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit));

        let config = RenderConfig::default().with_max_depth(4);
        let ray = Ray::new_simple(Point3::new(0.0, 1.0, 0.0), -Vec3::Y);

        let n = 2_000;
        let mut sum = Color::ZERO;
        for _ in 0..n {
            let c = ray_color(&ray, &world, &lights, config.max_depth, &config, &mut rng);
            assert!(c.is_finite());
            assert!(c.min_element() >= 0.0);
            sum += c;
        }
        let mean = sum / n as f64;
        assert!(mean.x > 0.2, "ground under the light should be lit, got {:?}", mean);
    }
}
