//! Camera for ray generation.

use ember_math::{sampling, Point3, Ray, Vec3};
use rand::RngCore;

/// Thin-lens camera with a shutter interval for motion blur.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64,       // Vertical field of view in degrees
    aperture: f64,   // Lens diameter, 0 for a pinhole
    focus_dist: f64, // Distance from camera to plane of perfect focus

    // Shutter open/close times
    time0: f64,
    time1: f64,

    // Cached computed values (set by initialize())
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 600,
            image_height: 400,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 40.0,
            aperture: 0.0,
            focus_dist: 10.0,
            time0: 0.0,
            time1: 0.0,
            // Cached values (initialized below)
            origin: Point3::ZERO,
            lower_left_corner: Point3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set image resolution. The aspect ratio follows from it.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the interval the shutter is open for.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.image_width as f64 / self.image_height as f64
    }

    /// Initialize the camera (must be called after changing settings).
    pub fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio() * viewport_height;

        // Calculate camera basis vectors
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        self.origin = self.look_from;
        self.horizontal = self.focus_dist * viewport_width * self.u;
        self.vertical = self.focus_dist * viewport_height * self.v;
        self.lower_left_corner =
            self.origin - self.horizontal / 2.0 - self.vertical / 2.0 - self.focus_dist * self.w;

        self.lens_radius = self.aperture / 2.0;
    }

    /// Generate a ray through normalized image-plane coordinates.
    ///
    /// `s` runs left to right and `t` bottom to top, both over [0, 1].
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * sampling::random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        let direction = self.lower_left_corner + s * self.horizontal + t * self.vertical
            - self.origin
            - offset;
        let time = sampling::gen_range(rng, self.time0, self.time1);

        Ray::new(self.origin + offset, direction, time)
    }

    /// Jittered ray through pixel `(i, j)`, with row 0 at the top of the image.
    pub fn get_pixel_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let s = (i as f64 + sampling::gen_f64(rng)) / (self.image_width.max(2) - 1) as f64;
        let row = (self.image_height - 1 - j.min(self.image_height - 1)) as f64;
        let t = (row + sampling::gen_f64(rng)) / (self.image_height.max(2) - 1) as f64;
        self.get_ray(s, t, rng)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
