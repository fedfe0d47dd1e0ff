//! Heart-shaped implicit surface.
//!
//! The surface is the zero set of
//! `F(x, y, z) = (z² + P·x² + y² - 1)³ - z²·y³ - Q·x²·y³`
//! in local coordinates scaled by `1/|scale|`, with `y` as the vertical axis.
//! Rays are marched across the bounding box until `F` changes sign and the
//! crossing is refined by bisection.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

const P: f64 = 9.0 / 4.0;
const Q: f64 = 9.0 / 80.0;

/// Samples of `F` taken across the bounding-box chord.
const MARCH_STEPS: usize = 256;
const BISECTION_STEPS: usize = 60;

pub struct Heart {
    center: Point3,
    /// Size of the heart; a negative scale turns the normals inward.
    scale: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Heart {
    pub fn new(center: Point3, scale: f64, material: Arc<dyn Material>) -> Self {
        let extent = Vec3::splat(2.0 * scale.abs());
        Self {
            center,
            scale,
            material,
            bbox: Aabb::from_points(center - extent, center + extent),
        }
    }

    fn local(&self, p: Point3) -> Vec3 {
        (p - self.center) / self.scale.abs()
    }

    fn field(&self, p: Point3) -> f64 {
        let Vec3 { x, y, z } = self.local(p);
        let g = z * z + P * x * x + y * y - 1.0;
        g * g * g - z * z * y * y * y - Q * x * x * y * y * y
    }

    fn gradient(&self, p: Point3) -> Vec3 {
        let Vec3 { x, y, z } = self.local(p);
        let g = z * z + P * x * x + y * y - 1.0;
        let g2 = 3.0 * g * g;
        Vec3::new(
            g2 * 2.0 * P * x - 2.0 * Q * x * y * y * y,
            g2 * 2.0 * y - 3.0 * z * z * y * y - 3.0 * Q * x * x * y * y,
            g2 * 2.0 * z - 2.0 * z * y * y * y,
        )
    }

    /// First sign change of `F` along the ray inside `span`.
    fn crossing(&self, ray: &Ray, span: Interval) -> Option<f64> {
        let step = span.size() / MARCH_STEPS as f64;
        let mut t_prev = span.min;
        let mut f_prev = self.field(ray.at(t_prev));

        for i in 1..=MARCH_STEPS {
            let t = span.min + step * i as f64;
            let f = self.field(ray.at(t));

            if f == 0.0 {
                return Some(t);
            }
            if (f < 0.0) != (f_prev < 0.0) {
                return Some(self.bisect(ray, t_prev, t, f_prev));
            }

            t_prev = t;
            f_prev = f;
        }

        None
    }

    fn bisect(&self, ray: &Ray, mut lo: f64, mut hi: f64, f_lo: f64) -> f64 {
        let lo_negative = f_lo < 0.0;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if (self.field(ray.at(mid)) < 0.0) == lo_negative {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

impl Hittable for Heart {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let span = self.bbox.clip(ray, ray_t)?;
        let t = self.crossing(ray, span)?;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        // The gradient vanishes where the surface pinches; fall back to radial
        let gradient = self.gradient(p);
        let mut outward_normal = if gradient.length_squared() > 1e-18 {
            gradient.normalize()
        } else {
            (p - self.center).normalize()
        };
        if self.scale < 0.0 {
            outward_normal = -outward_normal;
        }

        Some(HitRecord::new(ray, t, outward_normal, self.material.as_ref(), (0.0, 0.0)))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}
