//! The field orchestrator.
//!
//! [`ParticleField`] owns the current [`ParticleSet`] and the
//! [`ParameterStore`]. The host's render loop drives it:
//!
//! 1. [`ParticleField::set_parameters`] — merge a partial update. A change
//!    to the particle count or grid extents regenerates the whole set
//!    before the call returns.
//! 2. [`ParticleField::tick`] — once per displayed frame, evaluate
//!    [`transform`] for every particle and rotate the result as one
//!    rigid group by the global rotation.

use crate::{
    error::Result,
    layout::{GridLayout, Particle, ParticleSet},
    params::{Changes, ParameterStore, ParameterUpdate, SharedParameters},
    transform::transform,
    types::{RenderState, Rgb},
};
use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

/// Particle count from which [`ParticleField::tick`] fans out over the
/// rayon thread pool.
pub const PARALLEL_THRESHOLD: usize = 4096;

const BLANK: RenderState = RenderState {
    id: 0,
    position: Vec3::ZERO,
    color: Rgb::gray(0.0),
};

/// Whether the particle set matches the current count and extents.
///
/// `Regenerating` only holds inside [`ParticleField::set_parameters`] while
/// the set is being replaced. Since that call takes `&mut self`, callers
/// always observe `Stable`; [`ParticleField::tick`] relies on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldState {
    Stable,
    Regenerating,
}

/// A grid of particles twisted and displaced by shared parameters.
///
/// `R` is the source of color seeds; inject a seeded generator with
/// [`ParticleField::with_rng`] for reproducible fields.
///
/// ### Fields
/// - `store` - Current [`SharedParameters`] and their listeners.
/// - `set` - Particles of the current generation, in id order.
/// - `state` - [`FieldState`] of `set` relative to `store`.
/// - `generation` - Number of regenerations since construction.
///
/// - `rng` - Source of color seeds, drawn only on (re)generation.
///
/// - `local` - Scratch buffer of transformed states before the group rotation.
/// - `frame` - Scratch buffer of final states returned by [`ParticleField::tick`].
/// - `parallel_threshold` - Particle count from which `tick` uses rayon.
pub struct ParticleField<R: Rng = StdRng> {
    store: ParameterStore,
    set: ParticleSet,
    state: FieldState,
    generation: u64,

    rng: R,

    local: Vec<RenderState>,
    frame: Vec<RenderState>,
    parallel_threshold: usize,
}

impl ParticleField<StdRng> {
    /// Creates a field seeded from the operating system.
    ///
    /// ### Errors
    /// [`crate::FieldError::InvalidParameter`] if any initial value is invalid.
    pub fn new(params: SharedParameters) -> Result<Self> {
        Self::with_rng(params, StdRng::from_os_rng())
    }
}

impl<R: Rng> ParticleField<R> {
    /// Creates a field that draws color seeds from `rng`.
    ///
    /// ### Errors
    /// [`crate::FieldError::InvalidParameter`] if any initial value is invalid.
    pub fn with_rng(params: SharedParameters, mut rng: R) -> Result<Self> {
        let store = ParameterStore::new(params)?;
        let p = store.get();
        let set = ParticleSet::generate(p.particle_count, p.grid_width, p.grid_height, &mut rng);
        log::debug!(
            "generated {} particles on a {}x{} grid",
            set.len(),
            set.layout.size_x,
            set.layout.size_y
        );

        Ok(Self {
            store,
            set,
            state: FieldState::Stable,
            generation: 0,
            rng,
            local: Vec::new(),
            frame: Vec::new(),
            parallel_threshold: PARALLEL_THRESHOLD,
        })
    }

    #[inline]
    pub fn params(&self) -> &SharedParameters {
        self.store.get()
    }

    #[inline]
    pub fn particle_size(&self) -> f32 {
        self.store.get().particle_size
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.set.particles
    }

    #[inline]
    pub fn layout(&self) -> &GridLayout {
        &self.set.layout
    }

    /// Current [`FieldState`]; `Stable` whenever a caller can ask.
    #[inline]
    pub fn state(&self) -> FieldState {
        self.state
    }

    /// Number of regenerations since construction.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Registers a listener on the underlying [`ParameterStore`].
    pub fn subscribe(&mut self, listener: impl FnMut(&SharedParameters, Changes) + Send + 'static) {
        self.store.subscribe(listener);
    }

    /// Merges `update` into the shared parameters.
    ///
    /// Regenerates the particle set when the count or an extent changed;
    /// other changes take effect on the next [`Self::tick`].
    ///
    /// ### Errors
    /// [`crate::FieldError::InvalidParameter`] if any field is invalid. The
    /// parameters and the particle set are then left untouched.
    pub fn set_parameters(&mut self, update: &ParameterUpdate) -> Result<Changes> {
        let changes = self.store.apply(update)?;
        if changes.needs_regeneration() {
            self.regenerate();
        }
        Ok(changes)
    }

    /// Replaces the particle set from the current count and extents.
    ///
    /// Every color seed is redrawn and ids restart at zero.
    fn regenerate(&mut self) {
        self.state = FieldState::Regenerating;

        let p = *self.store.get();
        let old_len = self.set.len();
        self.set = ParticleSet::generate(
            p.particle_count,
            p.grid_width,
            p.grid_height,
            &mut self.rng,
        );
        self.local.clear();
        self.frame.clear();
        self.generation += 1;

        log::debug!(
            "regenerated field: {} -> {} particles, grid {}x{} over {}x{}",
            old_len,
            self.set.len(),
            self.set.layout.size_x,
            self.set.layout.size_y,
            p.grid_width,
            p.grid_height
        );
        self.state = FieldState::Stable;
    }

    /// Rotation applied to the whole group: `global_rotation` about `Y`
    /// and `Z` (never `X`), composed as an `XYZ` Euler rotation.
    pub fn group_rotation(&self) -> Quat {
        let r = self.store.get().global_rotation_deg.to_radians();
        Quat::from_rotation_y(r) * Quat::from_rotation_z(r)
    }

    /// Evaluates every particle for the current parameters.
    ///
    /// Returns the final state of each particle in id order, with the
    /// group rotation applied.
    ///
    /// ### Panics
    /// Panics if a particle transforms to a non-finite position, which
    /// validated parameters cannot produce.
    pub fn tick(&mut self) -> &[RenderState] {
        debug_assert_eq!(self.state, FieldState::Stable);

        let params = *self.store.get();
        let group = self.group_rotation();
        let n = self.set.len();

        self.local.resize(n, BLANK);
        self.frame.resize(n, BLANK);

        let parallel = n >= self.parallel_threshold;
        if parallel {
            self.set
                .particles
                .par_iter()
                .zip(self.local.par_iter_mut())
                .zip(self.frame.par_iter_mut())
                .for_each(|((p, local), out)| evaluate(p, &params, group, local, out));
        } else {
            for ((p, local), out) in self
                .set
                .particles
                .iter()
                .zip(self.local.iter_mut())
                .zip(self.frame.iter_mut())
            {
                evaluate(p, &params, group, local, out);
            }
        }

        log::trace!("tick: {n} particles (parallel: {parallel})");
        &self.frame
    }

    /// Per-particle states of the last [`Self::tick`] before the group
    /// rotation.
    #[inline]
    pub fn local_states(&self) -> &[RenderState] {
        &self.local
    }

    /// Final states of the last [`Self::tick`].
    #[inline]
    pub fn frame(&self) -> &[RenderState] {
        &self.frame
    }
}

#[inline]
fn evaluate(
    p: &Particle,
    params: &SharedParameters,
    group: Quat,
    local: &mut RenderState,
    out: &mut RenderState,
) {
    let (position, color) = transform(p.rest_position, p.color_seed, params);
    assert!(
        position.is_finite(),
        "particle {} transformed to non-finite position {position:?}",
        p.id
    );

    *local = RenderState {
        id: p.id,
        position,
        color,
    };
    *out = RenderState {
        id: p.id,
        position: group * position,
        color,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use std::sync::{Arc, Mutex};

    fn params(count: usize) -> SharedParameters {
        SharedParameters::new(900.0, 20.0, 0.4, 0.0, 0.02, count, 10.0, 10.0).unwrap()
    }

    fn seeded(count: usize, seed: u64) -> ParticleField {
        ParticleField::with_rng(params(count), StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn construction_rejects_invalid_parameters() {
        let bad = SharedParameters {
            falloff_radius: 0.0,
            ..params(10)
        };
        assert!(matches!(
            ParticleField::with_rng(bad, StdRng::seed_from_u64(0)),
            Err(FieldError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn new_field_is_stable_with_requested_count() {
        let field = seeded(100, 1);
        assert_eq!(field.particles().len(), 100);
        assert_eq!(field.state(), FieldState::Stable);
        assert_eq!(field.generation(), 0);
        assert_eq!(field.layout().size_x, 10);
    }

    #[test]
    fn tick_returns_one_gray_state_per_particle_in_id_order() {
        let mut field = seeded(37, 2);
        let seeds: Vec<f32> = field.particles().iter().map(|p| p.color_seed).collect();

        let frame = field.tick();

        assert_eq!(frame.len(), 37);
        for (i, s) in frame.iter().enumerate() {
            assert_eq!(s.id, i);
            assert_eq!(s.color, Rgb::gray(seeds[i]));
        }
    }

    #[test]
    fn zero_global_rotation_leaves_local_positions() {
        let mut field = seeded(25, 3);
        field.tick();
        assert_eq!(field.frame(), field.local_states());
    }

    #[test]
    fn global_rotation_rotates_the_group_rigidly() {
        let mut field = seeded(25, 4);
        field
            .set_parameters(&ParameterUpdate::new().global_rotation_deg(90.0))
            .unwrap();
        field.tick();

        let group = field.group_rotation();
        for (local, out) in field.local_states().iter().zip(field.frame()) {
            assert!((group * local.position - out.position).length() < 1e-5);
            assert!((local.position.length() - out.position.length()).abs() < 1e-4);
        }

        // Z is applied before Y, as for an XYZ Euler rotation with x = 0.
        // Z by 90 deg takes +X to +Y, which Y leaves alone.
        assert!((group * Vec3::X - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn shrinking_count_regenerates_with_fresh_seeds() {
        let mut field = seeded(100, 5);
        let old: Vec<f32> = field.particles()[..50]
            .iter()
            .map(|p| p.color_seed)
            .collect();

        let changes = field
            .set_parameters(&ParameterUpdate::new().particle_count(50))
            .unwrap();

        assert!(changes.needs_regeneration());
        assert_eq!(field.state(), FieldState::Stable);
        assert_eq!(field.generation(), 1);
        assert_eq!(field.particles().len(), 50);
        assert_eq!(field.tick().len(), 50);

        let new: Vec<f32> = field.particles().iter().map(|p| p.color_seed).collect();
        assert_ne!(old, new);
    }

    #[test]
    fn state_is_stable_after_every_update() {
        let mut field = seeded(10, 11);
        let counter = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counter);
        field.subscribe(move |p, _| sink.lock().unwrap().push(p.particle_count));

        for update in [
            ParameterUpdate::new().particle_count(20),
            ParameterUpdate::new().grid_height(3.0),
            ParameterUpdate::new().particle_count(0),
            ParameterUpdate::new().twist_angle_deg(45.0),
        ] {
            let _ = field.set_parameters(&update);
            assert_eq!(field.state(), FieldState::Stable);
            assert_eq!(field.tick().len(), field.params().particle_count);
        }

        // The rejected update is not broadcast.
        assert_eq!(counter.lock().unwrap().as_slice(), &[20, 20, 20]);
        assert_eq!(field.generation(), 2);
    }

    #[test]
    fn extent_change_regenerates() {
        let mut field = seeded(16, 6);
        field
            .set_parameters(&ParameterUpdate::new().grid_width(4.0))
            .unwrap();

        assert_eq!(field.generation(), 1);
        assert_eq!(field.particles()[0].rest_position.x, -2.0);
    }

    #[test]
    fn rejected_count_keeps_previous_set() {
        let mut field = seeded(100, 7);
        let before = field.particles().to_vec();

        let result = field.set_parameters(&ParameterUpdate::new().particle_count(0));

        assert!(result.is_err());
        assert_eq!(field.particles(), before.as_slice());
        assert_eq!(field.generation(), 0);
        assert_eq!(field.params().particle_count, 100);
    }

    #[test]
    fn non_layout_change_keeps_seeds_and_shows_next_tick() {
        let mut field = seeded(9, 8);
        let before = field.particles().to_vec();
        let first = field.tick().to_vec();

        field
            .set_parameters(&ParameterUpdate::new().twist_angle_deg(0.0))
            .unwrap();
        let second = field.tick().to_vec();

        assert_eq!(field.particles(), before.as_slice());
        assert_eq!(field.generation(), 0);
        assert_ne!(first, second);
    }

    #[test]
    fn parallel_and_serial_paths_agree() {
        let mut serial = seeded(5000, 9);
        let mut parallel = seeded(5000, 9);
        serial.set_parallel_threshold(usize::MAX);
        parallel.set_parallel_threshold(0);

        for twist in [0.0, 333.3, -1750.0] {
            let update = ParameterUpdate::new()
                .twist_angle_deg(twist)
                .global_rotation_deg(twist / 7.0);
            serial.set_parameters(&update).unwrap();
            parallel.set_parameters(&update).unwrap();

            assert_eq!(serial.tick(), parallel.tick());
        }
    }

    #[test]
    fn field_can_be_shared_behind_a_mutex() {
        let field = Arc::new(Mutex::new(seeded(64, 10)));

        let writer = {
            let field = Arc::clone(&field);
            std::thread::spawn(move || {
                field
                    .lock()
                    .unwrap()
                    .set_parameters(&ParameterUpdate::new().particle_count(32))
                    .unwrap();
            })
        };
        writer.join().unwrap();

        let mut field = field.lock().unwrap();
        assert_eq!(field.tick().len(), 32);
    }
}
