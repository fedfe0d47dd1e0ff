//! Ember math types.
//!
//! Double-precision vectors (glam `DVec3`), intervals, bounding boxes, rays,
//! orthonormal bases and the random sampling routines shared by the renderer.

pub use glam::DVec3;

mod aabb;
mod interval;
mod onb;
mod ray;
pub mod sampling;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
pub use vector::Vec3Ext;

/// 3D vector used for directions.
pub type Vec3 = DVec3;
/// 3D vector used for positions.
pub type Point3 = DVec3;
/// Linear RGB color.
pub type Color = DVec3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(a.cross(b), Vec3::new(-3.0, 6.0, -3.0));
        assert_eq!(a.dot(b), 32.0);
        assert!((b.normalize().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_color_is_componentwise() {
        let a = Color::new(0.5, 0.25, 1.0);
        let b = Color::new(2.0, 4.0, 0.0);
        assert_eq!(a * b, Color::new(1.0, 1.0, 0.0));
    }
}
