//! Accumulated render output and plain-text PPM encoding.
//!
//! Pixels are kept as linear sums of samples until they are written, so
//! renders can be averaged together before gamma and quantization.

use std::io::{BufRead, Write};

use crate::error::{RenderError, RenderResult};
use ember_math::{Color, Interval};
use image::codecs::pnm::PnmDecoder;
use image::DynamicImage;

/// Linear-radiance image holding per-pixel sample sums.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    samples_per_pixel: u32,
    /// Row-major, row 0 at the top.
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32, samples_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            samples_per_pixel: samples_per_pixel.max(1),
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the sample sum at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the sample sum at (x, y).
    pub fn set(&mut self, x: u32, y: u32, sum: Color) {
        let i = self.index(x, y);
        self.pixels[i] = sum;
    }

    /// Averaged linear color at (x, y).
    pub fn color(&self, x: u32, y: u32) -> Color {
        self.get(x, y) / self.samples_per_pixel as f64
    }

    /// Convert to 8-bit gamma-corrected RGB, row 0 first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for sum in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb(*sum, self.samples_per_pixel));
        }
        bytes
    }

    /// Write as a plain-text (P3) PPM.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> RenderResult<()> {
        write!(out, "P3\n{} {}\n255\n", self.width, self.height)?;
        for rgb in self.to_rgb8().chunks_exact(3) {
            writeln!(out, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
        }
        out.flush()?;
        Ok(())
    }

    /// Read a PPM (plain or binary) back into linear colors.
    ///
    /// Stored values are treated as gamma 2, so each channel becomes
    /// `(value / 255)^2` with one sample per pixel.
    pub fn read_ppm<R: BufRead>(input: R) -> RenderResult<Self> {
        let decoder = PnmDecoder::new(input)?;
        let rgb = DynamicImage::from_decoder(decoder)?.to_rgb8();

        let mut image = Self::new(rgb.width(), rgb.height(), 1);
        for (pixel, stored) in image.pixels.iter_mut().zip(rgb.pixels()) {
            let [r, g, b] = stored.0;
            let gamma = Color::new(r as f64, g as f64, b as f64) / 255.0;
            *pixel = gamma * gamma;
        }

        Ok(image)
    }

    /// Average several renders of the same resolution.
    ///
    /// Each input contributes its per-pixel average with equal weight; the
    /// result holds one sample per pixel.
    pub fn average(images: &[ImageBuffer]) -> RenderResult<Self> {
        let first = images
            .first()
            .ok_or(RenderError::NoImages)?;

        for image in &images[1..] {
            if image.width != first.width || image.height != first.height {
                return Err(RenderError::ResolutionMismatch {
                    expected_width: first.width,
                    expected_height: first.height,
                    width: image.width,
                    height: image.height,
                });
            }
        }

        let mut result = Self::new(first.width, first.height, 1);
        let weight = 1.0 / images.len() as f64;
        for image in images {
            let spp = image.samples_per_pixel as f64;
            for (acc, sum) in result.pixels.iter_mut().zip(&image.pixels) {
                *acc += weight * *sum / spp;
            }
        }

        Ok(result)
    }
}

/// Convert a sum of `samples_per_pixel` linear samples to 8-bit RGB.
///
/// Averages, replaces non-finite values with zero, applies gamma 2 and clamps to
/// `[0, 0.999]` before scaling to `[0, 255]`.
pub fn color_to_rgb(sum: Color, samples_per_pixel: u32) -> [u8; 3] {
    let scale = 1.0 / samples_per_pixel.max(1) as f64;
    let intensity = Interval::new(0.0, 0.999);

    let channel = |c: f64| {
        let c = c * scale;
        let c = if c.is_finite() { c } else { 0.0 };
        let gamma = c.max(0.0).sqrt();
        (256.0 * intensity.clamp(gamma)) as u8
    };

    [channel(sum.x), channel(sum.y), channel(sum.z)]
}
