//! Material trait for surface scattering.

use std::f64::consts::PI;
use std::sync::Arc;

use crate::hittable::HitRecord;
use crate::pdf::{CosinePdf, MaterialPdf, Pdf, SpherePdf};
use ember_core::{SolidColor, Texture};
use ember_math::{sampling, Color, Point3, Ray, Vec3Ext};
use rand::RngCore;

/// How a scattered path continues.
#[derive(Debug, Clone, Copy)]
pub enum ScatterKind {
    /// A single deterministic-per-sample direction (mirror, glass).
    Specular(Ray),
    /// A density to draw the next direction from.
    Diffuse(MaterialPdf),
}

/// Result of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

impl ScatterRecord {
    pub fn specular(attenuation: Color, ray: Ray) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Specular(ray),
        }
    }

    pub fn diffuse(attenuation: Color, pdf: MaterialPdf) -> Self {
        Self {
            attenuation,
            kind: ScatterKind::Diffuse(pdf),
        }
    }

    pub fn is_specular(&self) -> bool {
        matches!(self.kind, ScatterKind::Specular(_))
    }

    pub fn specular_ray(&self) -> Option<Ray> {
        match self.kind {
            ScatterKind::Specular(ray) => Some(ray),
            ScatterKind::Diffuse(_) => None,
        }
    }

    pub fn pdf(&self) -> Option<&MaterialPdf> {
        match &self.kind {
            ScatterKind::Specular(_) => None,
            ScatterKind::Diffuse(pdf) => Some(pdf),
        }
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }

    /// Density with which this material scatters `ray_in` into `scattered`.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        0.0
    }

    /// Get emitted light from this material.
    ///
    /// Most materials return black (no emission).
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord, _u: f64, _v: f64, _p: Point3) -> Color {
        Color::ZERO
    }

    /// Scatter into a concrete ray without importance weights.
    ///
    /// Returns Some((attenuation, scattered_ray)) if the ray scatters.
    fn scatter_direct(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<(Color, Ray)> {
        let srec = self.scatter(ray_in, rec, rng)?;
        let scattered = match srec.kind {
            ScatterKind::Specular(ray) => ray,
            ScatterKind::Diffuse(pdf) => Ray::new(rec.p, pdf.generate(rng), ray_in.time()),
        };
        Some((srec.attenuation, scattered))
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with a textured albedo.
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    /// Create a new Lambertian material with the given albedo color.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let attenuation = self.albedo.value(rec.u, rec.v, rec.p);
        Some(ScatterRecord::diffuse(
            attenuation,
            MaterialPdf::Cosine(CosinePdf::new(rec.normal)),
        ))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f64 {
        let cosine = rec.normal.dot(scattered.direction().normalize());
        if cosine < 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }

    fn scatter_direct(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<(Color, Ray)> {
        let mut scatter_direction = rec.normal + sampling::random_unit_vector(rng);

        // Catch degenerate scatter direction
        if scatter_direction.near_zero() {
            scatter_direction = rec.normal;
        }

        let scattered = Ray::new(rec.p, scatter_direction, ray_in.time());
        Some((self.albedo.value(rec.u, rec.v, rec.p), scattered))
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.min(1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let reflected = ray_in.direction().normalize().reflect_about(rec.normal);
        let direction = reflected + self.fuzz * sampling::random_in_unit_sphere(rng);

        // Fuzz can push the reflection below the surface
        if direction.dot(rec.normal) <= 0.0 {
            return None;
        }

        let scattered = Ray::new(rec.p, direction, ray_in.time());
        Some(ScatterRecord::specular(self.albedo, scattered))
    }
}

/// Dielectric (glass) material.
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ratio: f64) -> f64 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > sampling::gen_f64(rng)
        {
            unit_direction.reflect_about(rec.normal)
        } else {
            unit_direction.refract_through(rec.normal, refraction_ratio)
        };

        let scattered = Ray::new(rec.p, direction, ray_in.time());
        Some(ScatterRecord::specular(Color::ONE, scattered))
    }
}

/// Diffuse light emitter.
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    /// Create a new diffuse light with the given emission color.
    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    // Lights don't scatter rays, and only their front side glows
    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord, u: f64, v: f64, p: Point3) -> Color {
        if rec.front_face {
            self.emit.value(u, v, p)
        } else {
            Color::ZERO
        }
    }
}

/// Phase function of a participating medium: scatters uniformly in all directions.
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let attenuation = self.albedo.value(rec.u, rec.v, rec.p);
        Some(ScatterRecord::diffuse(attenuation, MaterialPdf::Sphere(SpherePdf)))
    }

    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f64 {
        1.0 / (4.0 * PI)
    }
}
