//! Orbit camera around the field center.

use glam::{Mat4, Vec3};

/// Rotation per dragged pixel, in radians.
const ROTATE_PER_PIXEL: f32 = 0.005;
/// Closest the elevation may get to either pole.
const POLE_MARGIN: f32 = 0.05;
/// Target shift per dragged pixel, as a fraction of the visible half-height.
const PAN_PER_PIXEL: f32 = 0.002;

/// Perspective camera orbiting `target` on a sphere.
///
/// `theta` is the azimuth around `Y` and `phi` the elevation above the
/// `XZ` plane; with both at zero the camera sits on `+Z` looking at the
/// target. Input accumulates as deltas that [`OrbitCamera::update`]
/// bleeds off by `damping_factor` each frame.
///
/// ### Fields
/// - `target` - Point the camera orbits and looks at; moved by panning.
/// - `fov_y_deg`, `near`, `far` - Perspective projection settings.
/// - `min_distance`, `max_distance` - Zoom limits.
/// - `damping_factor` - Fraction of pending rotation applied per frame.
///
/// - `radius`, `theta`, `phi` - Spherical position around `target`.
/// - `delta_theta`, `delta_phi` - Rotation still to be applied.
/// - `scale` - Pending zoom factor.
/// - `pan_offset` - Pending target shift.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,

    radius: f32,
    theta: f32,
    phi: f32,

    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitCamera {
    pub fn new(distance: f32, fov_y_deg: f32, near: f32, far: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            fov_y_deg,
            near,
            far,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            damping_factor: 1.0,
            radius: distance,
            theta: 0.0,
            phi: 0.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    pub fn with_limits(mut self, min_distance: f32, max_distance: f32) -> Self {
        self.min_distance = min_distance;
        self.max_distance = max_distance;
        self.radius = self.radius.clamp(min_distance, max_distance);
        self
    }

    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Drag by screen pixels; dragging right swings the camera left.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        self.delta_theta -= dx * ROTATE_PER_PIXEL;
        self.delta_phi += dy * ROTATE_PER_PIXEL;
    }

    /// Drag by screen pixels to slide the target in the view plane, so the
    /// scene follows the pointer.
    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        let half_height = self.radius * (self.fov_y_deg.to_radians() * 0.5).tan();
        let k = half_height * PAN_PER_PIXEL;
        self.pan_offset += right * (-dx * k) + up * (dy * k);
    }

    /// Scroll-wheel zoom; positive `delta` moves closer.
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        let factor = (1.0 - delta * 0.001).clamp(0.5, 2.0);
        self.scale *= factor;
    }

    /// Applies pending input. Returns `true` while the camera is still moving.
    pub fn update(&mut self) -> bool {
        let k = self.damping_factor;

        self.theta += self.delta_theta * k;
        self.phi += self.delta_phi * k;
        self.delta_theta *= 1.0 - k;
        self.delta_phi *= 1.0 - k;

        let limit = std::f32::consts::FRAC_PI_2 - POLE_MARGIN;
        self.phi = self.phi.clamp(-limit, limit);

        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        self.target += self.pan_offset;
        self.pan_offset = Vec3::ZERO;

        let moving = self.delta_theta.abs() > 1e-4 || self.delta_phi.abs() > 1e-4;
        if !moving {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        moving
    }

    pub fn position(&self) -> Vec3 {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        self.target + self.radius * Vec3::new(cos_p * sin_t, sin_p, cos_p * cos_t)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position(), self.target, Vec3::Y);
        proj * view
    }

    /// Projects a world point into `rect`.
    ///
    /// Returns the screen position and the clip-space `w` (view depth),
    /// or `None` if the point is outside the near/far range.
    pub fn project(&self, view_proj: &Mat4, p: Vec3, rect: egui::Rect) -> Option<(egui::Pos2, f32)> {
        let clip = *view_proj * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let center = rect.center();
        Some((
            egui::pos2(
                center.x + ndc.x * rect.width() * 0.5,
                center.y - ndc.y * rect.height() * 0.5,
            ),
            clip.w,
        ))
    }

    /// Screen pixels per world unit at view depth `w`.
    pub fn pixels_per_unit(&self, w: f32, rect: egui::Rect) -> f32 {
        let half_fov = (self.fov_y_deg.to_radians() * 0.5).tan();
        rect.height() * 0.5 / (w * half_fov)
    }
}
