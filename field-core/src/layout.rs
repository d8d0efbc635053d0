//! Grid layout of particle rest positions.
//!
//! Particles are laid out row by row on the `z = 0` plane, on the
//! smallest square-ish grid that holds them, with the grid's lower-left
//! corner at `(-width/2, -height/2)`.

use crate::types::{ParticleId, Rgb};
use glam::Vec3;
use rand::Rng;

/// Cell counts and spacing of the grid for a given particle count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub count: usize,
    pub size_x: usize,
    pub size_y: usize,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub width: f32,
    pub height: f32,
}

impl GridLayout {
    /// Computes the grid for `count` particles over a `width` × `height` area.
    ///
    /// `size_x = ceil(sqrt(count))` and `size_y = ceil(count / size_x)`.
    /// The caller guarantees `count > 0` and positive extents.
    pub fn new(count: usize, width: f32, height: f32) -> Self {
        debug_assert!(count > 0, "grid layout needs at least one particle");

        let size_x = ceil_sqrt(count);
        let size_y = count.div_ceil(size_x);

        Self {
            count,
            size_x,
            size_y,
            spacing_x: width / size_x as f32,
            spacing_y: height / size_y as f32,
            width,
            height,
        }
    }

    /// Column and row of particle `i`.
    #[inline]
    pub fn cell(&self, i: ParticleId) -> (usize, usize) {
        (i % self.size_x, i / self.size_x)
    }

    /// Rest position of particle `i`.
    #[inline]
    pub fn rest_position(&self, i: ParticleId) -> Vec3 {
        let (col, row) = self.cell(i);
        Vec3::new(
            col as f32 * self.spacing_x - self.width / 2.0,
            row as f32 * self.spacing_y - self.height / 2.0,
            0.0,
        )
    }
}

/// Smallest `n` with `n * n >= v`.
fn ceil_sqrt(v: usize) -> usize {
    let mut n = (v as f64).sqrt().ceil() as usize;
    while n > 1 && (n - 1) * (n - 1) >= v {
        n -= 1;
    }
    while n * n < v {
        n += 1;
    }
    n.max(1)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub rest_position: Vec3,
    /// Gray level in `[0, 1)`, drawn once at generation.
    pub color_seed: f32,
}

impl Particle {
    #[inline]
    pub fn color(&self) -> Rgb {
        Rgb::gray(self.color_seed)
    }
}

/// One generation of particles, in grid order.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    pub layout: GridLayout,
    pub particles: Vec<Particle>,
}

impl ParticleSet {
    /// Lays out `count` particles and draws a color seed for each one.
    ///
    /// Positions depend only on the arguments; seeds are independent
    /// uniform draws from `rng`.
    pub fn generate(count: usize, width: f32, height: f32, rng: &mut impl Rng) -> Self {
        let layout = GridLayout::new(count, width, height);
        let particles = (0..count)
            .map(|id| Particle {
                id,
                rest_position: layout.rest_position(id),
                color_seed: rng.random::<f32>(),
            })
            .collect();

        Self { layout, particles }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
