//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Each bucket seeds its own generator from the
//! render seed, so an image is reproducible regardless of thread scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::output::ImageBuffer;
use crate::renderer::{render_pixel, Scene};
use ember_math::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets are rendered from the center outward so the most important part
/// of the frame finishes first.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    // Generate grid of buckets
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    // Sort by distance from center (spiral order)
    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f64 / 2.0;
    let center_y = height as f64 / 2.0;

    let distance = |b: &Bucket| {
        let cx = b.x as f64 + b.width as f64 / 2.0;
        let cy = b.y as f64 + b.height as f64 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };

    // Stable sort keeps row-major order between equally distant buckets
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Seed for a bucket's private generator.
fn bucket_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Per-pixel sample sums in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}

/// Render a single bucket.
///
/// Returns per-pixel sample sums in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, scene: &Scene) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket_seed(scene.config.seed, bucket.index));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(render_pixel(scene, global_x, global_y, &mut rng));
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Render the whole scene in parallel buckets.
pub fn render(scene: &Scene) -> ImageBuffer {
    let width = scene.camera.image_width;
    let height = scene.camera.image_height;
    let buckets = generate_buckets(width, height, scene.config.bucket_size);
    let total = buckets.len();

    log::info!(
        "Rendering {}x{} at {} spp, depth {} ({} buckets, {} threads)",
        width,
        height,
        scene.config.samples_per_pixel,
        scene.config.max_depth,
        total,
        rayon::current_num_threads()
    );

    let start = Instant::now();
    let completed = AtomicUsize::new(0);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, scene);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            // Report roughly every 10%
            if done * 10 / total != (done - 1) * 10 / total {
                log::info!("Rendered {}/{} buckets ({:.0}%)", done, total, 100.0 * done as f64 / total as f64);
            }

            result
        })
        .collect();

    let mut image = ImageBuffer::new(width, height, scene.config.samples_per_pixel);
    for result in &results {
        let bucket = &result.bucket;
        for (i, sum) in result.pixels.iter().enumerate() {
            let x = bucket.x + i as u32 % bucket.width;
            let y = bucket.y + i as u32 / bucket.width;
            image.set(x, y, *sum);
        }
    }

    log::info!("Render finished in {:.2?}", start.elapsed());

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, Background, BvhNode, Camera, DiffuseLight, FlipFace, HittableList};
    use crate::{Lambertian, Material, RenderConfig, Sphere};
    use ember_math::{Point3, Vec3};
    use std::sync::Arc;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 100, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 100);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!(first.x, 64);
        assert_eq!(first.y, 64);
        assert_eq!(first.index, 0);
    }

    /// Ground sphere lit by a downward-facing panel, with an opaque black
    /// sheet above the camera shading everything at x >= 1.
    fn shadow_scene(config: RenderConfig) -> Scene {
        let mut rng = StdRng::seed_from_u64(99);
        let ground: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.8)));
        let black: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::ZERO));
        let emit: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(6.0)));

        let mut objects = HittableList::new();
        objects.push(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));
        objects.push(AaRect::xz(0.0, 10.0, -10.0, 10.0, 1.0, black));
        objects.push(FlipFace::new(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit.clone())));
        let world = BvhNode::new(objects.into_objects(), &mut rng).unwrap();

        let mut lights = HittableList::new();
        lights.push(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit));

        // Looking straight down from below the sheet; +x is to the right
        let mut camera = Camera::new()
            .with_resolution(16, 16)
            .with_position(Point3::new(0.0, 0.5, 0.0), Point3::ZERO, Vec3::new(0.0, 0.0, -1.0))
            .with_lens(150.0, 0.0, 1.0);
        camera.initialize();

        Scene::new(world, lights, camera, config)
    }

    fn column_brightness(image: &ImageBuffer, columns: std::ops::Range<u32>) -> f64 {
        let mut sum = 0.0;
        let mut count = 0;
        for x in columns {
            for y in 0..image.height() {
                sum += image.color(x, y).element_sum();
                count += 1;
            }
        }
        sum / count as f64
    }

    #[test]
    fn test_render_lit_brighter_than_shadowed() {
        let config = RenderConfig::default()
            .with_samples(16)
            .with_max_depth(4)
            .with_bucket_size(4)
            .with_seed(7);
        let image = render(&shadow_scene(config));

        assert_eq!(image.width(), 16);
        assert_eq!(image.height(), 16);

        let lit = column_brightness(&image, 0..3);
        let shadowed = column_brightness(&image, 13..16);
        assert!(lit > 0.05, "lit side too dark: {}", lit);
        assert!(shadowed < 0.1 * lit, "shadow {} vs lit {}", shadowed, lit);
    }

    #[test]
    fn test_render_zero_depth_is_black() {
        let config = RenderConfig::default()
            .with_samples(2)
            .with_max_depth(0)
            .with_background(Background::Sky);
        let image = render(&shadow_scene(config));

        assert!(image.to_rgb8().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = RenderConfig::default().with_samples(2).with_max_depth(3).with_seed(3);
        let a = render(&shadow_scene(config.clone()));
        let b = render(&shadow_scene(config));
        assert_eq!(a.to_rgb8(), b.to_rgb8());
    }
}
