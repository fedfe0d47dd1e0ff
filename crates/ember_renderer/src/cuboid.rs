//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use crate::aarect::AaRect;
use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::transform::FlipFace;
use crate::Material;
use ember_math::{Aabb, Interval, Point3, Ray};
use rand::RngCore;

/// A closed box spanning two opposite corners.
///
/// The min-side faces are flipped so every face's front side points out of
/// the box.
pub struct Cuboid {
    sides: HittableList,
    bbox: Aabb,
}

impl Cuboid {
    pub fn new(p0: Point3, p1: Point3, material: Arc<dyn Material>) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);

        let mut sides = HittableList::new();

        sides.push(AaRect::xy(min.x, max.x, min.y, max.y, max.z, material.clone()));
        sides.push(FlipFace::new(AaRect::xy(min.x, max.x, min.y, max.y, min.z, material.clone())));

        sides.push(AaRect::xz(min.x, max.x, min.z, max.z, max.y, material.clone()));
        sides.push(FlipFace::new(AaRect::xz(min.x, max.x, min.z, max.z, min.y, material.clone())));

        sides.push(AaRect::yz(min.y, max.y, min.z, max.z, max.x, material.clone()));
        sides.push(FlipFace::new(AaRect::yz(min.y, max.y, min.z, max.z, min.x, material)));

        Self {
            sides,
            bbox: Aabb::from_points(min, max),
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use ember_math::{Color, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_box() -> Cuboid {
        Cuboid::new(
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, -1.0, -1.0),
            Arc::new(Lambertian::from_color(Color::splat(0.73))),
        )
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mut rng = StdRng::seed_from_u64(0);
        let cube = unit_box();
        let ray_t = Interval::new(0.001, f64::INFINITY);

        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            for sign in [1.0, -1.0] {
                let outward = sign * axis;
                let ray = Ray::new_simple(outward * 5.0, -outward);

                let rec = cube.hit(&ray, ray_t, &mut rng).expect("box face should be hit");
                assert!((rec.t - 4.0).abs() < 1e-12);
                assert!(rec.front_face, "face {:?} should face outward", outward);
                assert_eq!(rec.normal, outward);
            }
        }
    }

    #[test]
    fn test_cuboid_hit_from_inside() {
        let mut rng = StdRng::seed_from_u64(0);
        let cube = unit_box();

        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = cube
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 1.0).abs() < 1e-12);
        assert!(!rec.front_face);
    }

    #[test]
    fn test_cuboid_bounding_box() {
        let cube = unit_box();
        let bbox = cube.bounding_box().unwrap();
        assert_eq!(bbox.min(), Point3::splat(-1.0));
        assert_eq!(bbox.max(), Point3::splat(1.0));
    }
}
