use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use terrigraphic::effects::{
    apply_force, generate_with, AnimationClock, Color, EffectConfig, Element, InteractionField,
    Pattern, ShapeKind,
};

#[test]
fn deterministic_patterns_repeat_exactly() {
    for pattern in Pattern::ALL.into_iter().filter(|p| p.is_deterministic()) {
        for count in [10, 37, 100] {
            let config = EffectConfig {
                count,
                pattern,
                ..EffectConfig::default()
            };
            // Different seeds only change rotations, never deterministic positions.
            let a = generate_with(&config, &mut StdRng::seed_from_u64(1));
            let b = generate_with(&config, &mut StdRng::seed_from_u64(2));
            assert_eq!(a.len(), count);
            for (x, y) in a.iter().zip(&b) {
                assert_eq!(x.position, y.position, "{pattern} with {count}");
            }
        }
    }
}

#[test]
fn every_pattern_yields_finite_positions() {
    let mut rng = StdRng::seed_from_u64(11);
    for pattern in Pattern::ALL {
        for total in [1, 2, 10, 100, 1000] {
            for index in 0..total {
                let p = pattern.position(index, total, &mut rng);
                assert!(p.is_finite(), "{pattern} {index}/{total} -> {p}");
            }
        }
    }
}

#[test]
fn spiral_matches_formula() {
    let mut rng = StdRng::seed_from_u64(0);
    let p = Pattern::Spiral.position(5, 50, &mut rng);
    let angle = (5.0f32 / 50.0) * std::f32::consts::TAU * 3.0;
    let radius = 3.0 + 0.1 * 5.0;
    let expected = Vec3::new(
        angle.cos() * radius * 0.3,
        angle.sin() * radius * 0.3,
        (5.0 - 25.0) * 0.2,
    );
    assert!((p - expected).length() < 1e-5);
}

#[test]
fn random_pattern_stays_in_box() {
    let config = EffectConfig {
        count: 100,
        pattern: Pattern::Random,
        ..EffectConfig::default()
    };
    let elements = generate_with(&config, &mut StdRng::seed_from_u64(8));
    assert!(elements
        .iter()
        .all(|e| e.position.abs().max_element() <= 4.0));
}

#[test]
fn generated_shape_follows_complexity() {
    for (complexity, shape) in [
        (1, ShapeKind::Box),
        (2, ShapeKind::Cone),
        (3, ShapeKind::Octahedron),
        (4, ShapeKind::Icosahedron),
    ] {
        let config = EffectConfig {
            complexity,
            ..EffectConfig::default()
        };
        let elements = generate_with(&config, &mut StdRng::seed_from_u64(3));
        assert!(elements.iter().all(|e| e.shape == shape));
    }
}

#[test]
fn field_leaves_far_elements_alone() {
    let field = InteractionField::new(10.0, 0.5);
    assert_eq!(field.displacement(Vec2::new(10.0, 0.0), Vec2::ZERO), None);
    assert_eq!(field.displacement(Vec2::new(30.0, 4.0), Vec2::ZERO), None);
}

#[test]
fn field_skips_element_under_pointer() {
    let mut elements = vec![Element::point(Vec3::new(2.0, 2.0, 0.0), Color::Rgb([1.0; 3]))];
    let moved = apply_force(&mut elements, Vec2::new(2.0, 2.0), 10.0);
    assert_eq!(moved, 0);
    assert!(elements[0].position.is_finite());
    assert_eq!(elements[0].position, Vec3::new(2.0, 2.0, 0.0));

    // Arbitrarily close still produces a finite push.
    let near = InteractionField::default()
        .displacement(Vec2::new(1e-3, 0.0), Vec2::ZERO)
        .unwrap();
    assert!(near.is_finite() && near.x > 0.0);
}

#[test]
fn clock_resumes_where_it_paused() {
    let mut clock = AnimationClock::new();
    for _ in 0..10 {
        clock.advance(0.1);
    }
    let before = clock.elapsed();
    clock.toggle();
    for _ in 0..10 {
        assert_eq!(clock.advance(0.1), None);
    }
    clock.toggle();
    let after = clock.advance(0.1).unwrap();
    assert!((after - before - 0.1).abs() < 1e-6);
}
