//! Named layouts mapping an element index to a position.

use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::Vec3;
use rand::Rng;

/// Half-extent of the cube sampled by [`Pattern::Random`].
pub const RANDOM_EXTENT: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pattern {
    #[default]
    Spiral,
    Helix,
    Sphere,
    Random,
}

impl Pattern {
    pub const ALL: [Pattern; 4] = [
        Pattern::Spiral,
        Pattern::Helix,
        Pattern::Sphere,
        Pattern::Random,
    ];

    /// Parses a control value. Unrecognised names lay out randomly.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "spiral" => Pattern::Spiral,
            "helix" => Pattern::Helix,
            "sphere" => Pattern::Sphere,
            _ => Pattern::Random,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Spiral => "spiral",
            Pattern::Helix => "helix",
            Pattern::Sphere => "sphere",
            Pattern::Random => "random",
        }
    }

    pub fn is_deterministic(self) -> bool {
        !matches!(self, Pattern::Random)
    }

    /// Position of element `index` out of `total`.
    ///
    /// `rng` is only consulted by [`Pattern::Random`]; the other layouts are
    /// pure functions of `index` and `total`. Callers guarantee `total > 0`.
    pub fn position<R: Rng + ?Sized>(self, index: usize, total: usize, rng: &mut R) -> Vec3 {
        let i = index as f32;
        let n = total as f32;
        match self {
            Pattern::Spiral => {
                let angle = (i / n) * TAU * 3.0;
                let radius = 3.0 + 0.1 * i;
                Vec3::new(
                    angle.cos() * radius * 0.3,
                    angle.sin() * radius * 0.3,
                    (i - n / 2.0) * 0.2,
                )
            }
            Pattern::Helix => {
                let angle = (i / n) * TAU;
                Vec3::new(angle.cos() * 2.0, (i - n / 2.0) * 0.3, angle.sin() * 2.0)
            }
            Pattern::Sphere => {
                // acos is undefined just past 1.0; clamp float noise at the poles.
                let phi = (-1.0 + 2.0 * i / n).clamp(-1.0, 1.0).acos();
                let theta = (n * PI).sqrt() * phi;
                Vec3::new(
                    theta.cos() * phi.sin() * 3.0,
                    theta.sin() * phi.sin() * 3.0,
                    phi.cos() * 3.0,
                )
            }
            Pattern::Random => Vec3::new(
                rng.gen_range(-RANDOM_EXTENT..RANDOM_EXTENT),
                rng.gen_range(-RANDOM_EXTENT..RANDOM_EXTENT),
                rng.gen_range(-RANDOM_EXTENT..RANDOM_EXTENT),
            ),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
