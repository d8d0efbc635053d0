//! Stepped value editors with auto-repeat.
//!
//! A [`SteppedControl`] sits beside a slider as a pair of direction
//! buttons. In continuous mode a button toggles auto-repeat: the value
//! moves by one step every frame until the same button is pressed again.
//! Otherwise each press moves the value by a single step.

use crate::config::ControlSpec;

/// One parameter editor.
///
/// ### Fields
/// - `label` - Name shown above the control.
/// - `unit` - Suffix appended to the displayed value (e.g. `"°"`).
/// - `spec` - Range, step, wrap and repeat behaviour.
/// - `direction` - Running auto-repeat direction, `0` when idle.
#[derive(Clone, Debug)]
pub struct SteppedControl {
    pub label: &'static str,
    pub unit: &'static str,
    pub spec: ControlSpec,
    direction: i8,
}

impl SteppedControl {
    pub fn new(label: &'static str, spec: ControlSpec) -> Self {
        let direction = if spec.continuous {
            spec.initial_direction.signum()
        } else {
            0
        };
        Self {
            label,
            unit: "",
            spec,
            direction,
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Current auto-repeat direction, `0` when idle.
    #[inline]
    pub fn direction(&self) -> i8 {
        self.direction
    }

    /// Moves `value` one step in `direction`, clamping to the range or
    /// wrapping to the opposite end.
    pub fn advance(&self, value: f32, direction: i8) -> f32 {
        let ControlSpec {
            min,
            max,
            step,
            wrap_around,
            ..
        } = self.spec;
        let next = value + f32::from(direction) * step;

        if wrap_around {
            if next > max {
                min
            } else if next < min {
                max
            } else {
                next
            }
        } else {
            next.clamp(min, max)
        }
    }

    /// Handles a direction button press.
    ///
    /// Continuous controls start, switch or stop auto-repeat and return
    /// `None`; single-step controls return the stepped value.
    pub fn press(&mut self, value: f32, direction: i8) -> Option<f32> {
        let direction = direction.signum();
        if self.spec.continuous {
            self.direction = if self.direction == direction {
                0
            } else {
                direction
            };
            None
        } else {
            Some(self.advance(value, direction))
        }
    }

    /// Per-frame auto-repeat; `None` when idle.
    pub fn tick(&self, value: f32) -> Option<f32> {
        (self.direction != 0).then(|| self.advance(value, self.direction))
    }

    pub fn stop(&mut self) {
        self.direction = 0;
    }
}
