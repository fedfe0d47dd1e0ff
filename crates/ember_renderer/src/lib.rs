//! Ember renderer - CPU path tracing
//!
//! A Monte Carlo path tracer for physically-based rendering:
//!
//! - **Geometry**: spheres (optionally moving), axis-aligned rectangles and
//!   boxes, an implicit heart surface, constant-density media, and instancing
//!   wrappers
//! - **Acceleration**: a bounding volume hierarchy over shared primitives
//! - **Materials**: diffuse, metal, glass, emitters and isotropic phase functions
//! - **Sampling**: cosine, sphere, light and mixture densities
//! - **Output**: bucketed parallel rendering into a linear image buffer, PPM I/O

mod aarect;
mod bucket;
mod bvh;
mod camera;
mod constant_medium;
mod cuboid;
mod error;
mod heart;
mod hittable;
mod material;
mod output;
mod pdf;
mod renderer;
mod sphere;
mod transform;

pub use aarect::{AaRect, Plane};
pub use bucket::{generate_buckets, render, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use constant_medium::ConstantMedium;
pub use cuboid::Cuboid;
pub use error::{RenderError, RenderResult};
pub use heart::Heart;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{
    Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal, ScatterKind, ScatterRecord,
};
pub use output::{color_to_rgb, ImageBuffer};
pub use pdf::{CosinePdf, HittablePdf, MaterialPdf, MixturePdf, Pdf, SpherePdf};
pub use renderer::{ray_color, ray_color_direct, render_pixel, trace, Background, RenderConfig, Sampling, Scene};
pub use sphere::Sphere;
pub use transform::{FlipFace, RotateY, Translate};

/// Re-export the math types used throughout the public API
pub use ember_math::{Aabb, Color, Interval, Point3, Ray, Vec3};
