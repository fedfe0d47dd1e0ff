//! Sphere primitive for ray tracing, optionally moving for motion blur.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::{
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{sampling, Aabb, Interval, Onb, Point3, Ray, Vec3};
use rand::RngCore;

/// Linear motion of a sphere center between two keyframes.
#[derive(Debug, Clone, Copy)]
struct Motion {
    center1: Point3,
    time0: f64,
    time1: f64,
}

/// A sphere primitive.
#[derive(Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Arc<dyn Material>,
    motion: Option<Motion>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new stationary sphere.
    ///
    /// A negative radius keeps the same surface with inward-facing normals,
    /// which makes a hollow shell when nested inside a glass sphere.
    pub fn new(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let rvec = Vec3::splat(radius.abs());
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            motion: None,
            bbox,
        }
    }

    /// Create a sphere whose center moves from `center0` at `time0` to
    /// `center1` at `time1`.
    pub fn moving(
        center0: Point3,
        center1: Point3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        let mut sphere = Self::new(center0, radius, material);
        sphere.motion = Some(Motion {
            center1,
            time0,
            time1,
        });

        let rvec = Vec3::splat(sphere.radius.abs());
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        sphere.bbox = Aabb::surrounding(&sphere.bbox, &box1);
        sphere
    }

    /// Center of the sphere at the given shutter time.
    pub fn center_at(&self, time: f64) -> Point3 {
        match self.motion {
            Some(m) if m.time1 != m.time0 => {
                let s = (time - m.time0) / (m.time1 - m.time0);
                self.center + s * (m.center1 - self.center)
            }
            _ => self.center,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Center and radius of a sphere containing every position of this one.
    fn light_bounds(&self) -> (Point3, f64) {
        match self.motion {
            Some(m) => {
                let travel = m.center1 - self.center;
                (self.center + 0.5 * travel, self.radius.abs() + 0.5 * travel.length())
            }
            None => (self.center, self.radius.abs()),
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f64, f64) {
        // p is a point on the unit sphere centered at origin
        // theta: angle up from -Y
        // phi: angle around Y axis from -X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }

    /// Nearest root of the ray/sphere quadratic inside `ray_t`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f64, Point3)> {
        let center = self.center_at(ray.time());
        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        Some((root, center))
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, _rng: &mut dyn RngCore) -> Option<HitRecord<'a>> {
        let (t, center) = self.intersect(ray, ray_t)?;

        let outward_normal = (ray.at(t) - center) / self.radius;
        let uv = Self::get_sphere_uv(outward_normal);

        Some(HitRecord::new(ray, t, outward_normal, self.material.as_ref(), uv))
    }

    fn bounding_box(&self) -> Option<Aabb> {
        Some(self.bbox)
    }

    /// Uniform density over the cone of directions that see the sphere.
    ///
    /// A moving sphere is sampled through a sphere enclosing its whole path,
    /// so the density covers every shutter time.
    fn pdf_value(&self, origin: Point3, direction: Vec3, _rng: &mut dyn RngCore) -> f64 {
        let (center, radius) = self.light_bounds();

        let oc = center - origin;
        let a = direction.length_squared();
        let h = direction.dot(oc);
        let c = oc.length_squared() - radius * radius;
        let discriminant = h * h - a * c;
        if a == 0.0 || discriminant < 0.0 || (h + discriminant.sqrt()) / a <= 0.001 {
            return 0.0;
        }

        let distance_squared = oc.length_squared();
        let cos_theta_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);

        1.0 / solid_angle
    }

    fn random(&self, origin: Point3, rng: &mut dyn RngCore) -> Vec3 {
        let (center, radius) = self.light_bounds();
        let direction = center - origin;
        let distance_squared = direction.length_squared();
        let uvw = Onb::from_w(direction);
        uvw.local(sampling::random_to_sphere(rng, radius, distance_squared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use ember_math::Color;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = sphere
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("ray should hit the sphere");

        assert!((rec.t - 0.5).abs() < 1e-12, "Should hit at t=0.5, got {}", rec.t);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);
        assert!(rec.front_face);
    }

    #[test]
    fn test_negative_radius_flips_normal() {
        let shell = Sphere::new(Point3::ZERO, -0.5, gray());
        let ray = Ray::new_simple(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let rec = shell
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("ray should hit the shell");

        assert!((rec.t - 4.5).abs() < 1e-12);
        // Outward normal points inward, so the outside is the back face
        assert!(!rec.front_face);
        assert!((rec.normal - Vec3::Z).length() < 1e-12);

        let bbox = shell.bounding_box().unwrap();
        assert!((bbox.max() - Point3::splat(0.5)).length() < 1e-12);
    }

    #[test]
    fn test_sphere_roots_symmetric() {
        let sphere = Sphere::new(Point3::ZERO, 1.0, gray());
        let ray = Ray::new_simple(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rng = StdRng::seed_from_u64(0);

        let near = sphere
            .hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rng)
            .expect("entry hit");
        let far = sphere
            .hit(&ray, Interval::new(near.t + 1e-6, f64::INFINITY), &mut rng)
            .expect("exit hit");

        // Closest approach is at t = 5
        assert!((near.t - 4.0).abs() < 1e-12);
        assert!((far.t - 6.0).abs() < 1e-12);
        assert!(((near.t + far.t) / 2.0 - 5.0).abs() < 1e-12);

        // Exiting from inside hits the back face
        assert!(!far.front_face);
        assert!((far.normal - Vec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray());
        let mut rng = StdRng::seed_from_u64(0);

        // Ray pointing away from sphere
        let away = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        assert!(sphere.hit(&away, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());

        // Closest approach 0.6 > radius
        let offset = Ray::new_simple(Vec3::new(0.6, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&offset, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());

        // Hit lies outside the interval
        let toward = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(sphere.hit(&toward, Interval::new(0.001, 0.4), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_uv() {
        let (u, v) = Sphere::get_sphere_uv(Vec3::new(0.0, 1.0, 0.0));
        assert!((v - 1.0).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&u));

        let (u, v) = Sphere::get_sphere_uv(Vec3::new(1.0, 0.0, 0.0));
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.5).abs() < 1e-12);

        let (_, v) = Sphere::get_sphere_uv(Vec3::new(0.0, -1.0, 0.0));
        assert!(v.abs() < 1e-12);
    }

    #[test]
    fn test_moving_sphere_center() {
        let sphere = Sphere::moving(
            Point3::ZERO,
            Point3::new(2.0, 0.0, 0.0),
            0.0,
            1.0,
            0.5,
            gray(),
        );

        assert_eq!(sphere.center_at(0.0), Point3::ZERO);
        assert_eq!(sphere.center_at(0.5), Point3::new(1.0, 0.0, 0.0));
        assert_eq!(sphere.center_at(1.0), Point3::new(2.0, 0.0, 0.0));

        let bbox = sphere.bounding_box().unwrap();
        assert_eq!(bbox.x, Interval::new(-0.5, 2.5));

        // A ray at time 1 sees the sphere at its final position
        let mut rng = StdRng::seed_from_u64(0);
        let late = Ray::new(Point3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 1.0);
        let early = Ray::new(Point3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(sphere.hit(&late, Interval::new(0.001, f64::INFINITY), &mut rng).is_some());
        assert!(sphere.hit(&early, Interval::new(0.001, f64::INFINITY), &mut rng).is_none());
    }

    #[test]
    fn test_sphere_light_sampling() {
        let sphere = Sphere::new(Point3::new(0.0, 0.0, -4.0), 1.0, gray());
        let origin = Point3::ZERO;
        let mut rng = StdRng::seed_from_u64(9);

        let cos_theta_max = (1.0 - 1.0 / 16.0_f64).sqrt();
        let expected = 1.0 / (2.0 * PI * (1.0 - cos_theta_max));

        for _ in 0..500 {
            let dir = sphere.random(origin, &mut rng);
            let pdf = sphere.pdf_value(origin, dir, &mut rng);
            assert!((pdf - expected).abs() < 1e-9 * expected, "pdf={} expected={}", pdf, expected);
        }

        // A direction away from the sphere has zero density
        assert_eq!(sphere.pdf_value(origin, Vec3::Z, &mut rng), 0.0);
    }

    #[test]
    fn test_moving_sphere_light_covers_whole_path() {
        // Travels from x = -2 to x = 2 at distance 10
        let sphere = Sphere::moving(
            Point3::new(-2.0, 0.0, -10.0),
            Point3::new(2.0, 0.0, -10.0),
            0.0,
            1.0,
            1.0,
            gray(),
        );
        let origin = Point3::ZERO;
        let mut rng = StdRng::seed_from_u64(17);

        // Directions toward either end of the path see the light
        for time in [0.0, 1.0] {
            let toward = sphere.center_at(time) - origin;
            assert!(sphere.pdf_value(origin, toward, &mut rng) > 0.0, "time {}", time);
        }

        // Samples stay inside the cone around the swept path
        let cos_theta_max = (1.0 - 9.0 / 100.0_f64).sqrt();
        for _ in 0..500 {
            let dir = sphere.random(origin, &mut rng).normalize();
            assert!(dir.dot(-Vec3::Z) >= cos_theta_max - 1e-9);
            assert!(sphere.pdf_value(origin, dir, &mut rng) > 0.0);
        }
    }
}
