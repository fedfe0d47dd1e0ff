//! Textures: color lookups by surface coordinates and hit point.
//!
//! Procedural textures (solid, checker, marble noise) and an image-backed
//! texture decoded with the `image` crate. Textures are shared between
//! materials through `Arc<dyn Texture>`.

use std::path::Path;
use std::sync::Arc;

use ember_math::{Color, Interval, Point3};
use rand::RngCore;
use thiserror::Error;

use crate::perlin::Perlin;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Color returned by an image texture that has no pixel data.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(0.0, 1.0, 1.0);

/// A color lookup over surface coordinates `(u, v)` and hit point `p`.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    albedo: Color,
}

impl SolidColor {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(Color::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        self.albedo
    }
}

/// Solid 3D checker pattern choosing between two sub-textures by the sign of
/// `sin(fx)·sin(fy)·sin(fz)`.
#[derive(Clone)]
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: f64,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            even,
            odd,
            frequency: 10.0,
        }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }

    /// Set the angular frequency of the pattern (default 10).
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Point3) -> Color {
        let f = self.frequency;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Marble-like pattern driven by Perlin turbulence.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    /// Larger scale means more frequent stripes.
    scale: f64,
}

impl NoiseTexture {
    pub fn new(scale: f64, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f64, _v: f64, p: Point3) -> Color {
        Color::ONE * 0.5 * (1.0 + (self.scale * p.z + 10.0 * self.noise.turb(p, 7)).sin())
    }
}

/// Texture backed by a decoded 8-bit RGB image.
///
/// Lookups clamp `(u, v)` to the unit square and pick the nearest pixel;
/// `v = 0` is the bottom row of the image.
#[derive(Debug, Clone, Default)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major RGB bytes, row 0 at the top.
    data: Vec<u8>,
}

impl ImageTexture {
    const BYTES_PER_PIXEL: usize = 3;

    /// Load an image, degrading to an empty (cyan) texture on failure.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Could not load texture image {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load an image from disk.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            TextureError::LoadError(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path.display(),
            width,
            height,
            rgb.as_raw().len() as f64 / 1024.0
        );

        Ok(Self::from_rgb8(width, height, rgb.into_raw()))
    }

    /// Build from raw row-major RGB bytes.
    ///
    /// A buffer whose length does not match `width * height * 3` yields an
    /// empty texture.
    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        if data.len() != width as usize * height as usize * Self::BYTES_PER_PIXEL {
            log::warn!(
                "Image texture buffer has {} bytes, expected {}x{}x3",
                data.len(),
                width,
                height
            );
            return Self::default();
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Point3) -> Color {
        if self.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }

        let unit = Interval::new(0.0, 1.0);
        let u = unit.clamp(u);
        let v = 1.0 - unit.clamp(v); // Flip V to image coordinates

        // Coordinates of exactly 1.0 map past the last pixel
        let i = ((u * self.width as f64) as usize).min(self.width as usize - 1);
        let j = ((v * self.height as f64) as usize).min(self.height as usize - 1);

        let offset = (j * self.width as usize + i) * Self::BYTES_PER_PIXEL;
        let pixel = &self.data[offset..offset + Self::BYTES_PER_PIXEL];

        let color_scale = 1.0 / 255.0;
        Color::new(
            color_scale * pixel[0] as f64,
            color_scale * pixel[1] as f64,
            color_scale * pixel[2] as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_solid_color_texture() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        let sample = tex.value(0.3, 0.7, Point3::new(4.0, 5.0, 6.0));
        assert_eq!(sample, Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates() {
        let even = Color::new(1.0, 1.0, 1.0);
        let odd = Color::new(0.0, 0.0, 0.0);
        let checker = CheckerTexture::from_colors(even, odd);

        let step = std::f64::consts::PI / 10.0;
        let a = Point3::new(0.5 * step, 0.5 * step, 0.5 * step);
        let b = Point3::new(1.5 * step, 0.5 * step, 0.5 * step);

        assert_eq!(checker.value(0.0, 0.0, a), even);
        assert_eq!(checker.value(0.0, 0.0, b), odd);
    }

    #[test]
    fn test_noise_texture_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(21);
        let tex = NoiseTexture::new(4.0, &mut rng);

        for i in 0..200 {
            let p = Point3::new(i as f64 * 0.13, -(i as f64) * 0.07, i as f64 * 0.29);
            let c = tex.value(0.0, 0.0, p);
            assert!(c.x >= 0.0 && c.x <= 1.0);
            assert_eq!(c.x, c.y);
            assert_eq!(c.y, c.z);
        }
    }

    #[test]
    fn test_missing_image_is_cyan() {
        let tex = ImageTexture::open("definitely/not/a/real/texture.png");
        assert!(tex.is_empty());
        assert_eq!(tex.value(0.5, 0.5, Point3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_image_lookup_nearest_and_flipped() {
        // 2x2 image: top row red, green; bottom row blue, white
        let data = vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ];
        let tex = ImageTexture::from_rgb8(2, 2, data);

        assert_eq!(tex.value(0.0, 1.0, Point3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.9, Point3::ZERO), Color::new(0.0, 1.0, 0.0));
        assert_eq!(tex.value(0.1, 0.1, Point3::ZERO), Color::new(0.0, 0.0, 1.0));
        // Clamped at the corners
        assert_eq!(tex.value(2.0, -1.0, Point3::ZERO), Color::ONE);
        assert_eq!(tex.value(1.0, 0.0, Point3::ZERO), Color::ONE);
    }

    #[test]
    fn test_bad_buffer_is_empty() {
        let tex = ImageTexture::from_rgb8(4, 4, vec![0; 5]);
        assert!(tex.is_empty());
    }
}
