use glam::Vec3;

/// Identifier for a particle in a [`crate::layout::ParticleSet`].
///
/// This is the particle's index in grid order, and is only meaningful
/// within one generation of a field. Ids are reassigned on regeneration.
pub type ParticleId = usize;

/// Linear RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Gray color with the same value on every channel.
    pub const fn gray(v: f32) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Rec. 601 luma of this color.
    #[inline]
    pub fn luma(self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }
}

/// Per-particle output of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub id: ParticleId,
    pub position: Vec3,
    pub color: Rgb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_of_gray_is_the_gray_value() {
        for v in [0.0, 0.25, 0.5, 1.0] {
            assert!((Rgb::gray(v).luma() - v).abs() < 1e-6);
        }
    }

    #[test]
    fn luma_weights_channels() {
        assert!((Rgb::new(1.0, 0.0, 0.0).luma() - 0.299).abs() < 1e-6);
        assert!((Rgb::new(0.0, 1.0, 0.0).luma() - 0.587).abs() < 1e-6);
        assert!((Rgb::new(0.0, 0.0, 1.0).luma() - 0.114).abs() < 1e-6);
    }
}
