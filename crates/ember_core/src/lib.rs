//! Ember Core - surface textures for the path tracer.
//!
//! This crate provides:
//!
//! - **Texture trait**: color lookup by `(u, v)` and hit point
//! - **Procedural textures**: `SolidColor`, `CheckerTexture`, `NoiseTexture`
//! - **Image textures**: `ImageTexture`, decoded from disk with graceful fallback
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{ImageTexture, Texture};
//!
//! let earth = ImageTexture::open("earthmap.jpg");
//! let color = earth.value(0.5, 0.5, Point3::ZERO);
//! ```

pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use perlin::Perlin;
pub use texture::{
    CheckerTexture, ImageTexture, NoiseTexture, SolidColor, Texture, TextureError,
    TextureResult, MISSING_TEXTURE_COLOR,
};
