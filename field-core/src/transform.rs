//! Per-particle twist and displacement.
//!
//! For each particle, every frame:
//! 1. [`falloff_factor`] — how strongly the particle twists, from its
//!    distance to [`FIELD_CENTER`].
//! 2. Displacement along `-Z` by the particle's luma times the
//!    displace factor.
//! 3. [`twist_rotation`] — rotation about `Y` and then about `Z`, both by
//!    `twist_angle * falloff`.
//!
//! [`transform`] is pure; any number of particles may be evaluated in any
//! order or in parallel with identical results.

use crate::{params::SharedParameters, types::Rgb};
use glam::{Quat, Vec3};

/// Center of the field that falloff distances are measured from.
pub const FIELD_CENTER: Vec3 = Vec3::ZERO;

/// Linear falloff from `1` at the center to `0` at `radius` and beyond.
///
/// `radius` must be positive.
#[inline]
pub fn falloff_factor(distance: f32, radius: f32) -> f32 {
    ((radius - distance) / radius).clamp(0.0, 1.0)
}

/// Rotation about `Y` by `angle_rad`, followed by rotation about `Z` by
/// the same angle.
#[inline]
pub fn twist_rotation(angle_rad: f32) -> Quat {
    // Rightmost factor is applied first.
    Quat::from_rotation_z(angle_rad) * Quat::from_rotation_y(angle_rad)
}

/// Maps a particle's rest data and the shared parameters to its render
/// position and color for this frame.
///
/// The color is always the gray seed; only the position is transformed.
pub fn transform(rest_position: Vec3, color_seed: f32, params: &SharedParameters) -> (Vec3, Rgb) {
    let color = Rgb::gray(color_seed);

    let d = (rest_position - FIELD_CENTER).length();
    let falloff = falloff_factor(d, params.falloff_radius);

    let displacement = Vec3::new(0.0, 0.0, -color.luma() * params.displace_factor);
    let displaced = rest_position + displacement;

    let angle = (params.twist_angle_deg * falloff).to_radians();
    let rendered = twist_rotation(angle) * displaced;

    (rendered, color)
}
