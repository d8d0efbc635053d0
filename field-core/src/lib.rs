//! Core of a twisted 3-D particle field.
//!
//! Main components:
//! - [`params`] — shared tunable parameters, validation and change tracking.
//! - [`layout`] — grid layout of rest positions and per-particle color seeds.
//! - [`transform`] — the pure per-particle, per-frame twist/displace transform.
//! - [`field`] — the orchestrator that regenerates the set and runs each frame.
//! - [`error`] — parameter validation errors.
//! - [`types`] — shared ids, colors and render output.

pub mod error;
pub mod field;
pub mod layout;
pub mod params;
pub mod transform;
pub mod types;

pub use error::{FieldError, Result};
pub use field::{FieldState, ParticleField};
pub use params::{Changes, ParameterStore, ParameterUpdate, SharedParameters};
pub use types::{ParticleId, RenderState, Rgb};
