//! Homogeneous participating medium (smoke, fog) bounded by another shape.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::material::Isotropic;
use ember_core::Texture;
use ember_math::{sampling, Aabb, Color, Interval, Ray, Vec3};
use rand::RngCore;

/// A volume of constant density filling a closed boundary.
///
/// A ray passing through scatters at an exponentially distributed distance;
/// it may also pass straight through without interacting.
pub struct ConstantMedium {
    boundary: Box<dyn Hittable>,
    neg_inv_density: f64,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new<H: Hittable + 'static>(boundary: H, density: f64, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::new(albedo),
        }
    }

    pub fn from_color<H: Hittable + 'static>(boundary: H, density: f64, albedo: Color) -> Self {
        Self {
            boundary: Box::new(boundary),
            neg_inv_density: -1.0 / density,
            phase_function: Isotropic::from_color(albedo),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        // Where the ray enters and leaves the boundary, regardless of ray_t
        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit = self
            .boundary
            .hit(ray, Interval::new(entry.t + 0.0001, f64::INFINITY), rng)?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        t_enter = t_enter.max(0.0);

        let ray_length = ray.direction().length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        let hit_distance = self.neg_inv_density * sampling::gen_f64(rng).ln();

        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;

        // Inside a volume there is no surface; normal and face are arbitrary
        Some(HitRecord {
            p: ray.at(t),
            normal: Vec3::X,
            material: &self.phase_function,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.boundary.bounding_box()
    }
}
