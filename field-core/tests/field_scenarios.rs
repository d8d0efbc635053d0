use field_core::{
    FieldError, FieldState, ParameterUpdate, ParticleField, Rgb, SharedParameters,
    params::parse_particle_count,
};
use glam::Vec3;
use rand::{SeedableRng, rngs::StdRng};

fn app_defaults() -> SharedParameters {
    SharedParameters::new(900.0, 20.0, 0.4, 0.0, 0.02, 6000, 10.0, 10.0).unwrap()
}

#[test]
fn default_scene_runs_several_frames() {
    let mut field = ParticleField::with_rng(app_defaults(), StdRng::seed_from_u64(42)).unwrap();

    for frame in 0..5 {
        let twist = 900.0 + frame as f32 * 0.4;
        field
            .set_parameters(&ParameterUpdate::new().twist_angle_deg(twist))
            .unwrap();

        let states = field.tick();
        assert_eq!(states.len(), 6000);
        assert!(states.iter().all(|s| s.position.is_finite()));
        assert!(
            states
                .iter()
                .all(|s| s.color.r == s.color.g && s.color.g == s.color.b)
        );
    }
    assert_eq!(field.generation(), 0);
}

#[test]
fn typed_count_drives_regeneration() {
    let mut field = ParticleField::with_rng(app_defaults(), StdRng::seed_from_u64(1)).unwrap();

    let count = parse_particle_count("250").unwrap();
    field
        .set_parameters(&ParameterUpdate::new().particle_count(count))
        .unwrap();
    assert_eq!(field.tick().len(), 250);
    assert_eq!(field.state(), FieldState::Stable);

    assert!(matches!(
        parse_particle_count("-3"),
        Err(FieldError::InvalidParticleCount(_))
    ));
    assert_eq!(field.particles().len(), 250);
}

#[test]
fn particles_outside_falloff_only_sink_along_z() {
    let params = SharedParameters {
        falloff_radius: 0.5,
        particle_count: 4,
        ..app_defaults()
    };
    let mut field = ParticleField::with_rng(params, StdRng::seed_from_u64(2)).unwrap();

    // 2x2 grid over 10x10: rest positions at (-5,-5), (0,-5), (-5,0), (0,0).
    let rest: Vec<(Vec3, f32)> = field
        .particles()
        .iter()
        .map(|p| (p.rest_position, p.color_seed))
        .collect();
    let states = field.tick().to_vec();

    for ((rest, seed), state) in rest.into_iter().zip(states) {
        assert_eq!(state.color, Rgb::gray(seed));
        if rest.length() >= 0.5 {
            let expected = rest + Vec3::new(0.0, 0.0, -Rgb::gray(seed).luma() * 0.4);
            assert!((state.position - expected).length() < 1e-5);
        }
    }
}
