use crate::Vec3;

/// Extension trait for `Vec3` with the reflection helpers the materials need.
pub trait Vec3Ext {
    /// True if the vector is close to zero in every dimension.
    fn near_zero(&self) -> bool;

    /// Mirror reflection about a unit normal.
    fn reflect_about(&self, n: Vec3) -> Vec3;

    /// Snell refraction of a unit vector through a surface with unit normal `n`.
    ///
    /// `etai_over_etat` is the ratio of refractive indices; the caller is
    /// responsible for detecting total internal reflection first.
    fn refract_through(&self, n: Vec3, etai_over_etat: f64) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn near_zero(&self) -> bool {
        const S: f64 = 1e-8;
        self.x.abs() < S && self.y.abs() < S && self.z.abs() < S
    }

    #[inline]
    fn reflect_about(&self, n: Vec3) -> Vec3 {
        *self - 2.0 * self.dot(n) * n
    }

    #[inline]
    fn refract_through(&self, n: Vec3, etai_over_etat: f64) -> Vec3 {
        let cos_theta = (-*self).dot(n).min(1.0);
        let r_out_perp = etai_over_etat * (*self + cos_theta * n);
        let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
        r_out_perp + r_out_parallel
    }
}
