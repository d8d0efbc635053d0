//! Shared field parameters and the store that validates updates to them.
//!
//! Every particle of a field reads the same [`SharedParameters`]. The
//! surrounding UI writes them through [`ParameterStore::apply`], which
//! validates a whole [`ParameterUpdate`] before committing any of it and
//! reports what changed as a [`Changes`] set.

use crate::error::{FieldError, Result};
use bitflags::bitflags;

/// The tunable values shared by every particle of a field.
///
/// Angles are in degrees. `particle_size` is carried for renderers and
/// never enters the transform math.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedParameters {
    pub twist_angle_deg: f32,
    pub falloff_radius: f32,
    pub displace_factor: f32,
    pub global_rotation_deg: f32,
    pub particle_size: f32,
    pub particle_count: usize,
    pub grid_width: f32,
    pub grid_height: f32,
}

bitflags! {
    /// Fields that changed value in one update.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Changes: u16 {
        const TWIST_ANGLE     = 0x0001;
        const FALLOFF_RADIUS  = 0x0002;
        const DISPLACE_FACTOR = 0x0004;
        const GLOBAL_ROTATION = 0x0008;
        const PARTICLE_SIZE   = 0x0010;
        const PARTICLE_COUNT  = 0x0020;
        const GRID_WIDTH      = 0x0040;
        const GRID_HEIGHT     = 0x0080;

        /// Fields whose change invalidates the current particle set
        const LAYOUT = Self::PARTICLE_COUNT.bits()
            | Self::GRID_WIDTH.bits()
            | Self::GRID_HEIGHT.bits();
    }
}

impl Changes {
    /// Returns `true` if the particle set must be rebuilt.
    pub fn needs_regeneration(self) -> bool {
        self.intersects(Self::LAYOUT)
    }
}

fn require_finite(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FieldError::invalid(name, value.into(), "must be finite"))
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<()> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::invalid(name, value.into(), "must be greater than zero"))
    }
}

impl SharedParameters {
    /// Builds a parameter set from every field and validates it.
    ///
    /// ### Errors
    /// [`FieldError::InvalidParameter`] naming the first invalid field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        twist_angle_deg: f32,
        falloff_radius: f32,
        displace_factor: f32,
        global_rotation_deg: f32,
        particle_size: f32,
        particle_count: usize,
        grid_width: f32,
        grid_height: f32,
    ) -> Result<Self> {
        Self {
            twist_angle_deg,
            falloff_radius,
            displace_factor,
            global_rotation_deg,
            particle_size,
            particle_count,
            grid_width,
            grid_height,
        }
        .validated()
    }

    /// Checks every field against its accepted domain.
    ///
    /// - `falloff_radius`, `grid_width` and `grid_height` must be finite
    ///   and strictly positive.
    /// - `particle_count` must be at least one.
    /// - All other fields must be finite.
    pub fn validate(&self) -> Result<()> {
        require_finite("twist_angle_deg", self.twist_angle_deg)?;
        require_positive("falloff_radius", self.falloff_radius)?;
        require_finite("displace_factor", self.displace_factor)?;
        require_finite("global_rotation_deg", self.global_rotation_deg)?;
        require_finite("particle_size", self.particle_size)?;
        if self.particle_count == 0 {
            return Err(FieldError::invalid(
                "particle_count",
                0.0,
                "must be greater than zero",
            ));
        }
        require_positive("grid_width", self.grid_width)?;
        require_positive("grid_height", self.grid_height)?;
        Ok(())
    }

    /// Consumes `self`, returning it only if [`Self::validate`] passes.
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Returns a copy with every field set in `update` overwritten.
    pub fn merged(&self, update: &ParameterUpdate) -> Self {
        Self {
            twist_angle_deg: update.twist_angle_deg.unwrap_or(self.twist_angle_deg),
            falloff_radius: update.falloff_radius.unwrap_or(self.falloff_radius),
            displace_factor: update.displace_factor.unwrap_or(self.displace_factor),
            global_rotation_deg: update
                .global_rotation_deg
                .unwrap_or(self.global_rotation_deg),
            particle_size: update.particle_size.unwrap_or(self.particle_size),
            particle_count: update.particle_count.unwrap_or(self.particle_count),
            grid_width: update.grid_width.unwrap_or(self.grid_width),
            grid_height: update.grid_height.unwrap_or(self.grid_height),
        }
    }

    /// Field-by-field difference between `self` and `other`.
    pub fn diff(&self, other: &Self) -> Changes {
        let mut changes = Changes::empty();
        changes.set(
            Changes::TWIST_ANGLE,
            self.twist_angle_deg != other.twist_angle_deg,
        );
        changes.set(
            Changes::FALLOFF_RADIUS,
            self.falloff_radius != other.falloff_radius,
        );
        changes.set(
            Changes::DISPLACE_FACTOR,
            self.displace_factor != other.displace_factor,
        );
        changes.set(
            Changes::GLOBAL_ROTATION,
            self.global_rotation_deg != other.global_rotation_deg,
        );
        changes.set(
            Changes::PARTICLE_SIZE,
            self.particle_size != other.particle_size,
        );
        changes.set(
            Changes::PARTICLE_COUNT,
            self.particle_count != other.particle_count,
        );
        changes.set(Changes::GRID_WIDTH, self.grid_width != other.grid_width);
        changes.set(Changes::GRID_HEIGHT, self.grid_height != other.grid_height);
        changes
    }
}

/// A partial update; `None` fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParameterUpdate {
    pub twist_angle_deg: Option<f32>,
    pub falloff_radius: Option<f32>,
    pub displace_factor: Option<f32>,
    pub global_rotation_deg: Option<f32>,
    pub particle_size: Option<f32>,
    pub particle_count: Option<usize>,
    pub grid_width: Option<f32>,
    pub grid_height: Option<f32>,
}

impl ParameterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn twist_angle_deg(mut self, v: f32) -> Self {
        self.twist_angle_deg = Some(v);
        self
    }

    pub fn falloff_radius(mut self, v: f32) -> Self {
        self.falloff_radius = Some(v);
        self
    }

    pub fn displace_factor(mut self, v: f32) -> Self {
        self.displace_factor = Some(v);
        self
    }

    pub fn global_rotation_deg(mut self, v: f32) -> Self {
        self.global_rotation_deg = Some(v);
        self
    }

    pub fn particle_size(mut self, v: f32) -> Self {
        self.particle_size = Some(v);
        self
    }

    pub fn particle_count(mut self, v: usize) -> Self {
        self.particle_count = Some(v);
        self
    }

    pub fn grid_width(mut self, v: f32) -> Self {
        self.grid_width = Some(v);
        self
    }

    pub fn grid_height(mut self, v: f32) -> Self {
        self.grid_height = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

type Listener = Box<dyn FnMut(&SharedParameters, Changes) + Send>;

/// Owner of the current [`SharedParameters`].
///
/// Updates are all-or-nothing: if any field of an update is invalid the
/// stored parameters are left exactly as they were.
pub struct ParameterStore {
    params: SharedParameters,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for ParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterStore")
            .field("params", &self.params)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ParameterStore {
    /// Creates a store from a complete set of initial values.
    ///
    /// ### Errors
    /// [`FieldError::InvalidParameter`] if any initial value is invalid.
    pub fn new(params: SharedParameters) -> Result<Self> {
        Ok(Self {
            params: params.validated()?,
            listeners: Vec::new(),
        })
    }

    #[inline]
    pub fn get(&self) -> &SharedParameters {
        &self.params
    }

    /// Registers a listener called after each update that changed a field.
    pub fn subscribe(&mut self, listener: impl FnMut(&SharedParameters, Changes) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Validates and commits `update`, returning the set of changed fields.
    ///
    /// ### Errors
    /// [`FieldError::InvalidParameter`] naming the first invalid field. The
    /// store is not modified and no listener is called.
    pub fn apply(&mut self, update: &ParameterUpdate) -> Result<Changes> {
        let candidate = self.params.merged(update);
        if let Err(e) = candidate.validate() {
            log::warn!("rejected parameter update: {e}");
            return Err(e);
        }

        let changes = self.params.diff(&candidate);
        self.params = candidate;

        if !changes.is_empty() {
            for listener in &mut self.listeners {
                listener(&self.params, changes);
            }
        }
        Ok(changes)
    }
}

/// Converts a numeric count from an untyped source.
///
/// ### Errors
/// [`FieldError::InvalidParameter`] for non-finite, fractional or
/// non-positive values.
pub fn particle_count_from_f64(value: f64) -> Result<usize> {
    if !value.is_finite() {
        return Err(FieldError::invalid("particle_count", value, "must be finite"));
    }
    if value.fract() != 0.0 {
        return Err(FieldError::invalid(
            "particle_count",
            value,
            "must be an integer",
        ));
    }
    if value < 1.0 {
        return Err(FieldError::invalid(
            "particle_count",
            value,
            "must be greater than zero",
        ));
    }
    // `usize::MAX as f64` rounds up, so the bound itself is out of range.
    if value >= usize::MAX as f64 {
        return Err(FieldError::invalid(
            "particle_count",
            value,
            "too large",
        ));
    }
    Ok(value as usize)
}

/// Parses a particle count typed by a user.
///
/// Surrounding whitespace is ignored; anything other than a positive
/// base-10 integer is rejected.
pub fn parse_particle_count(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FieldError::InvalidParticleCount(text.to_owned())),
    }
}
