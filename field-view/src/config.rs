use field_core::SharedParameters;

/// Range, step and repeat behaviour of one parameter control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSpec {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub wrap_around: bool,
    pub continuous: bool,
    /// Auto-repeat direction on launch (`-1`, `0` or `1`).
    pub initial_direction: i8,
}

impl ControlSpec {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self {
            min,
            max,
            step,
            wrap_around: false,
            continuous: true,
            initial_direction: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub initial: SharedParameters,

    pub twist: ControlSpec,
    pub global_rotation: ControlSpec,
    pub falloff: ControlSpec,
    pub displace: ControlSpec,
    pub particle_size: ControlSpec,

    pub camera_distance: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,

    pub background: [u8; 3],
    pub bloom: bool,
}

// `Default` cannot fail, so the initial values are spelled out here and
// checked against `SharedParameters::new` in the tests.
impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial: SharedParameters {
                twist_angle_deg: 900.0,
                falloff_radius: 20.0,
                displace_factor: 0.4,
                global_rotation_deg: 0.0,
                particle_size: 0.02,
                particle_count: 6000,
                grid_width: 10.0,
                grid_height: 10.0,
            },

            twist: ControlSpec {
                initial_direction: 1,
                ..ControlSpec::new(-2000.0, 2000.0, 0.4)
            },
            global_rotation: ControlSpec {
                wrap_around: true,
                ..ControlSpec::new(-360.0, 360.0, 0.4)
            },
            falloff: ControlSpec::new(1.0, 100.0, 0.05),
            displace: ControlSpec::new(-10.0, 10.0, 0.05),
            particle_size: ControlSpec {
                continuous: false,
                ..ControlSpec::new(0.01, 0.1, 0.01)
            },

            camera_distance: 20.0,
            fov_y_deg: 30.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 10.0,
            max_distance: 100.0,
            damping_factor: 0.1,

            background: [0x22, 0x22, 0x22],
            bloom: true,
        }
    }
}
