//! Probability densities over directions, used for importance sampling.

use std::f64::consts::PI;

use crate::hittable::Hittable;
use ember_math::{sampling, Onb, Point3, Vec3};
use rand::RngCore;

/// A density over directions that can also draw samples from itself.
pub trait Pdf {
    /// Density of `direction` with respect to solid angle.
    fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f64;

    /// Draw a direction distributed according to this density.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere about a surface normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(w: Vec3) -> Self {
        Self {
            uvw: Onb::from_w(w),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3, _rng: &mut dyn RngCore) -> f64 {
        let cosine_theta = direction.normalize().dot(self.uvw.w());
        (cosine_theta / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.local(sampling::random_cosine_direction(rng))
    }
}

/// Uniform density over the whole sphere of directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3, _rng: &mut dyn RngCore) -> f64 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        sampling::random_unit_vector(rng)
    }
}

/// The density a material scatters with.
///
/// A closed set of variants so scattering never has to box a density.
#[derive(Debug, Clone, Copy)]
pub enum MaterialPdf {
    Cosine(CosinePdf),
    Sphere(SpherePdf),
}

impl Pdf for MaterialPdf {
    fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        match self {
            MaterialPdf::Cosine(pdf) => pdf.value(direction, rng),
            MaterialPdf::Sphere(pdf) => pdf.value(direction, rng),
        }
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            MaterialPdf::Cosine(pdf) => pdf.generate(rng),
            MaterialPdf::Sphere(pdf) => pdf.generate(rng),
        }
    }
}

/// Directions from `origin` toward a hittable (usually the scene's lights).
pub struct HittablePdf<'a> {
    origin: Point3,
    target: &'a dyn Hittable,
}

impl<'a> HittablePdf<'a> {
    pub fn new(target: &'a dyn Hittable, origin: Point3) -> Self {
        Self { origin, target }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        self.target.pdf_value(self.origin, direction, rng)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.target.random(self.origin, rng)
    }
}

/// Equal-weight blend of two densities.
pub struct MixturePdf<'a> {
    p0: &'a dyn Pdf,
    p1: &'a dyn Pdf,
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { p0, p1 }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3, rng: &mut dyn RngCore) -> f64 {
        0.5 * self.p0.value(direction, rng) + 0.5 * self.p1.value(direction, rng)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if sampling::gen_f64(rng) < 0.5 {
            self.p0.generate(rng)
        } else {
            self.p1.generate(rng)
        }
    }
}
