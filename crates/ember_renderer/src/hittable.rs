//! Hittable trait and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::Material;
use ember_math::{sampling, Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;

/// Record of a ray-object intersection.
///
/// Borrows the material of the primitive that was hit; the scene owns it.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Unit surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Surface coordinates for texture lookup
    pub u: f64,
    pub v: f64,
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record for a hit at `t`, orienting `outward_normal` against the ray.
    pub fn new(
        ray: &Ray,
        t: f64,
        outward_normal: Vec3,
        material: &'a dyn Material,
        (u, v): (f64, f64),
    ) -> Self {
        let mut rec = Self {
            p: ray.at(t),
            normal: outward_normal,
            material,
            u,
            v,
            t,
            front_face: true,
        };
        rec.set_face_normal(ray, outward_normal);
        rec
    }

    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        // If the ray and normal point in the same direction, we're inside
        self.front_face = ray.direction().dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Find the closest intersection with `ray.at(t)` for `t` strictly inside `ray_t`.
    ///
    /// The generator is only consumed by stochastic geometry such as
    /// participating media.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>>;

    /// Axis-aligned bounding box, or `None` if the object has no finite bounds.
    fn bounding_box(&self) -> Option<Aabb>;

    /// Solid-angle density of sampling `direction` from `origin` toward this object.
    fn pdf_value(&self, _origin: Point3, _direction: Vec3, _rng: &mut dyn RngCore) -> f64 {
        0.0
    }

    /// Random direction from `origin` toward this object.
    fn random(&self, _origin: Point3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

impl<H: Hittable + ?Sized> Hittable for Box<H> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (**self).bounding_box()
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        (**self).pdf_value(origin, direction, rng)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        (**self).random(origin, rng)
    }
}

impl<H: Hittable + ?Sized> Hittable for Arc<H> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        (**self).hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Option<Aabb> {
        (**self).bounding_box()
    }

    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        (**self).pdf_value(origin, direction, rng)
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        (**self).random(origin, rng)
    }
}

/// A flat list of hittable objects.
///
/// Objects are reference counted so the same shape can appear both in the
/// scene and in the list of lights used for importance sampling.
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
    bbox: Aabb,
    unbounded: bool,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
            unbounded: false,
        }
    }

    /// Add a shared object to the list.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        match object.bounding_box() {
            Some(b) => self.bbox = Aabb::surrounding(&self.bbox, &b),
            None => self.unbounded = true,
        }
        self.objects.push(object);
    }

    /// Add an owned object to the list.
    pub fn push<H: Hittable + 'static>(&mut self, object: H) {
        self.add(Arc::new(object));
    }

    /// Clear all objects from the list.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.bbox = Aabb::EMPTY;
        self.unbounded = false;
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[Arc<dyn Hittable>] {
        &self.objects
    }

    /// Take the objects out, e.g. to build a BVH over them.
    pub fn into_objects(self) -> Vec<Arc<dyn Hittable>> {
        self.objects
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Arc<dyn Hittable>> for HittableList {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Hittable>>>(iter: I) -> Self {
        let mut list = Self::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let mut closest: Option<HitRecord<'a>> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, ray_t.with_max(closest_so_far), rng) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }

    fn bounding_box(&self) -> Option<Aabb> {
        if self.unbounded || self.objects.is_empty() {
            None
        } else {
            Some(self.bbox)
        }
    }

    /// Uniform average of the members' densities.
    fn pdf_value(&self, origin: Point3, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        if self.objects.is_empty() {
            return 0.0;
        }
        let weight = 1.0 / self.objects.len() as f64;
        self.objects
            .iter()
            .map(|object| weight * object.pdf_value(origin, direction, rng))
            .sum()
    }

    /// Pick a member uniformly and sample toward it.
    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::X;
        }
        let index = sampling::gen_int(rng, 0, self.objects.len() as i32 - 1) as usize;
        self.objects[index].random(origin, rng)
    }
}
