//! Effect primitive generation and the geometric art effect built on it.

use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::staggered_rotation;
use super::{Color, Element, Pattern, ShapeKind};
use crate::overlay::{Effect, Layer};
use crate::render::{Blending, Camera, Material};

/// Parameters for one generation. A changed config means a full rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    pub count: usize,
    pub pattern: Pattern,
    pub complexity: u8,
    /// Base hue in degrees.
    pub hue: f32,
    pub size: f32,
    /// Radians per tick.
    pub rotation_speed: f32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            count: 50,
            pattern: Pattern::Spiral,
            complexity: 3,
            hue: 180.0,
            size: 1.0,
            rotation_speed: 0.01,
        }
    }
}

impl EffectConfig {
    /// Builds a config from raw control values, clamped into the ranges the
    /// controls offer. [`generate`] relies on these bounds and does not check.
    pub fn from_controls(
        count: u32,
        pattern: &str,
        complexity: u32,
        hue: f32,
        size: f32,
        rotation_speed: f32,
    ) -> Self {
        Self {
            count: count.clamp(10, 100) as usize,
            pattern: Pattern::from_name(pattern),
            complexity: complexity.clamp(1, 4) as u8,
            hue: finite_or(hue, 180.0).clamp(0.0, 360.0),
            size: finite_or(size, 1.0).clamp(0.5, 2.0),
            rotation_speed: finite_or(rotation_speed, 0.01).clamp(0.0, 0.05),
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Generates `config.count` elements.
///
/// Positions follow `config.pattern`; the random pattern and the base
/// rotations draw from `rng`. Precondition: the config is within control
/// ranges (see [`EffectConfig::from_controls`]).
pub fn generate_with<R: Rng + ?Sized>(config: &EffectConfig, rng: &mut R) -> Vec<Element> {
    let shape = ShapeKind::from_complexity(config.complexity);
    (0..config.count)
        .map(|i| {
            let position = config.pattern.position(i, config.count, rng);
            let color = Color::hsl(config.hue + i as f32 * 10.0, 0.8, 0.6);
            let mut element = Element::new(position, shape, color);
            element.scale = config.size;
            element.rotation = Vec3::new(
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
                rng.gen_range(0.0..PI),
            );
            element
        })
        .collect()
}

/// [`generate_with`] using the thread-local entropy source.
pub fn generate(config: &EffectConfig) -> Vec<Element> {
    generate_with(config, &mut rand::thread_rng())
}

/// Applies one tick of the staggered rotation rule to a generated collection.
pub fn spin(elements: &mut [Element], rotation_speed: f32) {
    for (index, element) in elements.iter_mut().enumerate() {
        let delta = staggered_rotation(rotation_speed, index);
        element.rotation.x += delta;
        element.rotation.y += delta;
    }
}

/// Procedural geometric art: a generated collection spinning as a group.
pub struct GeometricArt {
    config: EffectConfig,
    elements: Vec<Element>,
    group_rotation: Vec2,
    generation: u64,
    rng: StdRng,
}

impl GeometricArt {
    pub fn new(config: EffectConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Uses `rng` for random layouts and base rotations, for reproducible output.
    pub fn with_rng(config: EffectConfig, rng: StdRng) -> Self {
        Self {
            config,
            elements: Vec::new(),
            group_rotation: Vec2::ZERO,
            generation: 0,
            rng,
        }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Replaces the config and regenerates if anything changed.
    pub fn set_config(&mut self, config: EffectConfig) {
        if config != self.config {
            self.config = config;
            self.rebuild();
        }
    }
}

impl Effect for GeometricArt {
    fn title(&self) -> &str {
        "Geometric Art Generator"
    }

    fn clear_color(&self) -> [f32; 4] {
        let [r, g, b] = Color::from_hex(0x0a0a0a).to_rgb();
        [r, g, b, 1.0]
    }

    fn camera(&self) -> Camera {
        Camera::looking_at_origin(10.0)
    }

    fn rebuild(&mut self) {
        self.elements = generate_with(&self.config, &mut self.rng);
        self.generation += 1;
        tracing::debug!(
            count = self.config.count,
            pattern = %self.config.pattern,
            complexity = self.config.complexity,
            "geometric art regenerated"
        );
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn step(&mut self, _pointer: Option<Vec2>) {
        let speed = self.config.rotation_speed;
        self.group_rotation.x += speed;
        self.group_rotation.y += speed * 0.7;
        spin(&mut self.elements, speed);
    }

    fn layers(&self) -> Vec<Layer<'_>> {
        vec![Layer {
            elements: &self.elements,
            transform: Mat4::from_quat(Quat::from_euler(
                EulerRot::XYZ,
                self.group_rotation.x,
                self.group_rotation.y,
                0.0,
            )),
            material: Material {
                point_size: 0.08,
                opacity: 0.7,
                blending: Blending::Normal,
            },
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_are_clamped() {
        let config = EffectConfig::from_controls(500, "helix", 0, 400.0, 0.1, 1.0);
        assert_eq!(config.count, 100);
        assert_eq!(config.pattern, Pattern::Helix);
        assert_eq!(config.complexity, 1);
        assert_eq!(config.hue, 360.0);
        assert_eq!(config.size, 0.5);
        assert_eq!(config.rotation_speed, 0.05);
    }

    #[test]
    fn hues_step_by_ten_degrees() {
        let config = EffectConfig {
            hue: 350.0,
            ..EffectConfig::default()
        };
        let elements = generate_with(&config, &mut StdRng::seed_from_u64(3));
        assert_eq!(elements[0].color.hue(), Some(350.0));
        assert_eq!(elements[1].color.hue(), Some(0.0));
        assert_eq!(elements[2].color.hue(), Some(10.0));
    }

    #[test]
    fn unchanged_config_does_not_regenerate() {
        let mut art = GeometricArt::with_rng(EffectConfig::default(), StdRng::seed_from_u64(1));
        art.rebuild();
        let generation = art.generation();
        art.set_config(EffectConfig::default());
        assert_eq!(art.generation(), generation);
        art.set_config(EffectConfig {
            count: 20,
            ..EffectConfig::default()
        });
        assert_eq!(art.generation(), generation + 1);
        assert_eq!(art.elements().len(), 20);
    }
}
