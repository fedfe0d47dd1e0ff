//! Axis-aligned rectangles, the building block for boxes and area lights.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use ember_math::{sampling, Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

/// The plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    /// Indices of the two in-plane axes and the fixed axis.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            Plane::XY => (0, 1, 2),
            Plane::XZ => (0, 2, 1),
            Plane::YZ => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` lying in `plane` at offset `k` on the fixed axis.
///
/// The outward normal is the positive fixed axis. `u` grows along the first
/// in-plane axis and `v` along the second.
#[derive(Clone)]
pub struct AaRect {
    plane: Plane,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    material: Arc<dyn Material>,
}

impl AaRect {
    pub fn new(
        plane: Plane,
        (a0, a1): (f64, f64),
        (b0, b1): (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            material,
        }
    }

    /// Rectangle in the plane `z = k`.
    pub fn xy(x0: f64, x1: f64, y0: f64, y1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XY, (x0, x1), (y0, y1), k, material)
    }

    /// Rectangle in the plane `y = k`.
    pub fn xz(x0: f64, x1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::XZ, (x0, x1), (z0, z1), k, material)
    }

    /// Rectangle in the plane `x = k`.
    pub fn yz(y0: f64, y1: f64, z0: f64, z1: f64, k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(Plane::YZ, (y0, y1), (z0, z1), k, material)
    }

    pub fn area(&self) -> f64 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }

    /// Point with in-plane coordinates `(a, b)`.
    fn point(&self, a: f64, b: f64) -> Point3 {
        let (ai, bi, ki) = self.plane.axes();
        let mut p = Point3::ZERO;
        p[ai] = a;
        p[bi] = b;
        p[ki] = self.k;
        p
    }

    fn outward_normal(&self) -> Vec3 {
        let (_, _, ki) = self.plane.axes();
        let mut n = Vec3::ZERO;
        n[ki] = 1.0;
        n
    }
}

impl Hittable for AaRect {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let (ai, bi, ki) = self.plane.axes();
        let origin = ray.origin();
        let direction = ray.direction();

        // A ray parallel to the plane gives an infinite or NaN t
        let t = (self.k - origin[ki]) / direction[ki];
        if !ray_t.surrounds(t) {
            return None;
        }

        let a = origin[ai] + t * direction[ai];
        let b = origin[bi] + t * direction[bi];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return None;
        }

        let u = (a - self.a0) / (self.a1 - self.a0);
        let v = (b - self.b0) / (self.b1 - self.b0);

        Some(HitRecord::new(ray, t, self.outward_normal(), self.material.as_ref(), (u, v)))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        // Flat on the fixed axis; Aabb pads it to a minimum thickness
        Some(Aabb::from_points(
            self.point(self.a0, self.b0),
            self.point(self.a1, self.b1),
        ))
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        let probe = Ray::new_simple(origin, direction);
        let Some(rec) = self.hit(&probe, Interval::new(0.001, f64::INFINITY), rng) else {
            return 0.0;
        };

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();

        distance_squared / (cosine * self.area())
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let a = sampling::gen_range(rng, self.a0, self.a1);
        let b = sampling::gen_range(rng, self.b0, self.b1);
        self.point(a, b) - origin
    }
}
