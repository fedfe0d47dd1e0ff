//! Instancing wrappers that move, rotate or flip another hittable.
//!
//! Each wrapper owns its child and transforms incoming rays into the child's
//! object space instead of transforming the geometry itself.

use crate::hittable::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

/// Offsets a child by a fixed vector.
pub struct Translate {
    object: Box<dyn Hittable>,
    offset: Vec3,
    bbox: Option<Aabb>,
}

impl Translate {
    pub fn new<H: Hittable + 'static>(object: H, offset: Vec3) -> Self {
        let bbox = object.bounding_box().map(|b| b.translate(offset));
        Self {
            object: Box::new(object),
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        // Move the ray backwards by the offset
        let moved = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        let mut rec = self.object.hit(&moved, ray_t, rng)?;
        rec.p += self.offset;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        self.object.pdf_value(origin - self.offset, direction, rng)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin - self.offset, rng)
    }
}

/// Rotates a child about the Y axis.
pub struct RotateY {
    object: Box<dyn Hittable>,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Option<Aabb>,
}

impl RotateY {
    /// Rotate by `angle` degrees, counter-clockwise looking down -Y.
    pub fn new<H: Hittable + 'static>(object: H, angle: f64) -> Self {
        let radians = angle.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let mut rotated = Self {
            object: Box::new(object),
            sin_theta,
            cos_theta,
            bbox: None,
        };

        rotated.bbox = rotated.object.bounding_box().map(|b| {
            b.corners()
                .into_iter()
                .map(|corner| rotated.to_world(corner))
                .fold(Aabb::EMPTY, |acc, p| Aabb::surrounding(&acc, &Aabb::from_points(p, p)))
        });

        rotated
    }

    /// World space to object space.
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object space to world space.
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let rotated = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.time(),
        );

        // Rotation preserves the dot product, so front_face carries over
        let mut rec = self.object.hit(&rotated, ray_t, rng)?;
        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.bbox
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        self.object
            .pdf_value(self.to_object(origin), self.to_object(direction), rng)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.to_world(self.object.random(self.to_object(origin), rng))
    }
}

/// Reports the child's hits with the faces swapped.
///
/// Used to make a one-sided surface face the other way, e.g. a ceiling
/// light whose emitting side must point down.
pub struct FlipFace {
    object: Box<dyn Hittable>,
}

impl FlipFace {
    pub fn new<H: Hittable + 'static>(object: H) -> Self {
        Self {
            object: Box::new(object),
        }
    }
}

impl Hittable for FlipFace {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let mut rec = self.object.hit(ray, ray_t, rng)?;
        rec.front_face = !rec.front_face;
        Some(rec)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        self.object.bounding_box()
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        self.object.pdf_value(origin, direction, rng)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AaRect, Cuboid, Lambertian, Material, Sphere};
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    #[test]
    fn test_translate_moves_hits_and_box() {
        let mut rng = StdRng::seed_from_u64(0);
        let moved = Translate::new(Sphere::new(Point3::ZERO, 1.0, gray()), Vec3::new(10.0, 0.0, 0.0));

        let bbox = moved.bounding_box().unwrap();
        assert_eq!(bbox.x, Interval::new(9.0, 11.0));

        let ray = Ray::new_simple(Point3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = moved
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("translated sphere should be hit");
        assert!((rec.t - 4.0).abs() < 1e-12);
        assert!((rec.p - Point3::new(10.0, 0.0, 1.0)).length() < 1e-12);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);

        // Nothing left at the original position
        let old = Ray::new_simple(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(moved.hit(&old, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());
    }

    #[test]
    fn test_rotate_y_quarter_turn() {
        let mut rng = StdRng::seed_from_u64(0);
        // Thin slab along +X, rotated 90 degrees to lie along -Z
        let slab = Cuboid::new(Point3::new(0.0, -1.0, -0.5), Point3::new(4.0, 1.0, 0.5), gray());
        let rotated = RotateY::new(slab, 90.0);

        let bbox = rotated.bounding_box().unwrap();
        assert!((bbox.z.min + 4.0).abs() < 1e-9, "z.min = {}", bbox.z.min);
        assert!(bbox.z.max.abs() < 1e-9, "z.max = {}", bbox.z.max);
        assert!((bbox.x.min + 0.5).abs() < 1e-9 && (bbox.x.max - 0.5).abs() < 1e-9);

        // Looking down -Y at (0, 5, -3) hits the top face at y = 1
        let ray = Ray::new_simple(Point3::new(0.0, 5.0, -3.0), -Vec3::Y);
        let rec = rotated
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("rotated slab should be hit");
        assert!((rec.t - 4.0).abs() < 1e-9);
        assert!((rec.p - Point3::new(0.0, 1.0, -3.0)).length() < 1e-9);
        assert!((rec.normal - Vec3::Y).length() < 1e-9);

        // And the original orientation is now empty
        let ray = Ray::new_simple(Point3::new(3.0, 5.0, 0.0), -Vec3::Y);
        assert!(rotated.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());
    }

    #[test]
    fn test_rotation_round_trip() {
        let rotated = RotateY::new(Sphere::new(Point3::ZERO, 1.0, gray()), 37.0);
        let v = Vec3::new(1.5, -2.0, 0.25);
        assert!((rotated.to_world(rotated.to_object(v)) - v).length() < 1e-12);
        assert!((rotated.to_object(v).length() - v.length()).abs() < 1e-12);
    }

    #[test]
    fn test_flip_face() {
        let mut rng = StdRng::seed_from_u64(0);
        let ceiling = AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, gray());
        let flipped = FlipFace::new(AaRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, gray()));
        let up = Ray::new_simple(Point3::ZERO, Vec3::Y);
        let ray_t = Interval::new(0.001, f64::INFINITY);

        let plain = ceiling.hit(&up, ray_t, &mut rng).unwrap();
        let flip = flipped.hit(&up, ray_t, &mut rng).unwrap();

        assert!(!plain.front_face);
        assert!(flip.front_face);
        assert_eq!(plain.t, flip.t);
        assert_eq!(plain.normal, flip.normal);
        assert_eq!(flipped.bounding_box(), ceiling.bounding_box());
    }
}
