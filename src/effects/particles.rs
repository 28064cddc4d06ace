use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Color, Element, InteractionField};
use crate::overlay::{Effect, Layer};
use crate::render::{Blending, Camera, Material};

pub const PARTICLE_COUNT: usize = 5000;
/// Half-extent of the cube particles live in; they wrap at its faces.
pub const BOUNDS: f32 = 50.0;
/// Pointer NDC is scaled by this to reach field space.
pub const POINTER_SCALE: f32 = 50.0;
const MAX_DRIFT: f32 = 0.01;

/// Interactive particle field: drifting points repelled by the pointer.
pub struct ParticleField {
    count: usize,
    elements: Vec<Element>,
    velocities: Vec<Vec3>,
    field: InteractionField,
    // Last known pointer in NDC; the field acts at the origin until it moves.
    pointer: Vec2,
    rotation: Vec2,
    generation: u64,
    rng: StdRng,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new(PARTICLE_COUNT)
    }
}

impl ParticleField {
    pub fn new(count: usize) -> Self {
        Self::with_rng(count, StdRng::from_entropy())
    }

    pub fn with_rng(count: usize, rng: StdRng) -> Self {
        Self {
            count,
            elements: Vec::new(),
            velocities: Vec::new(),
            field: InteractionField::default(),
            pointer: Vec2::ZERO,
            rotation: Vec2::ZERO,
            generation: 0,
            rng,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }
}

fn wrap(value: f32) -> f32 {
    if value > BOUNDS {
        -BOUNDS
    } else if value < -BOUNDS {
        BOUNDS
    } else {
        value
    }
}

/// Colour from drift speed: slow particles are pale, fast ones cyan.
pub fn speed_color(velocity: Vec3) -> Color {
    let intensity = (velocity.length() * 50.0 + 0.3).min(1.0);
    Color::Rgb([1.0 - intensity, intensity * 0.8 + (1.0 - intensity), 1.0])
}

impl Effect for ParticleField {
    fn title(&self) -> &str {
        "Interactive 3D Particle System"
    }

    fn clear_color(&self) -> [f32; 4] {
        let [r, g, b] = Color::from_hex(0x000011).to_rgb();
        [r, g, b, 1.0]
    }

    fn camera(&self) -> Camera {
        Camera::looking_at_origin(50.0)
    }

    fn rebuild(&mut self) {
        let rng = &mut self.rng;
        self.elements = (0..self.count)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(-BOUNDS..BOUNDS),
                    rng.gen_range(-BOUNDS..BOUNDS),
                    rng.gen_range(-BOUNDS..BOUNDS),
                );
                // Initial gradient between white and cyan-blue.
                let t: f32 = rng.gen();
                Element::point(position, Color::Rgb([1.0 - t, 1.0 - t * 0.5, 1.0]))
            })
            .collect();
        self.velocities = (0..self.count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
                    rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
                    rng.gen_range(-MAX_DRIFT..MAX_DRIFT),
                )
            })
            .collect();
        self.rotation = Vec2::ZERO;
        self.generation += 1;
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn step(&mut self, pointer: Option<Vec2>) {
        if let Some(pointer) = pointer {
            self.pointer = pointer;
        }
        self.field.apply(&mut self.elements, self.pointer * POINTER_SCALE);
        for (element, velocity) in self.elements.iter_mut().zip(&self.velocities) {
            let p = element.position + *velocity;
            element.position = Vec3::new(wrap(p.x), wrap(p.y), wrap(p.z));
            element.color = speed_color(*velocity);
        }
        self.rotation.x += 0.001;
        self.rotation.y += 0.002;
    }

    fn layers(&self) -> Vec<Layer<'_>> {
        vec![Layer {
            elements: &self.elements,
            transform: Mat4::from_quat(Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                0.0,
            )),
            material: Material {
                point_size: 2.0,
                opacity: 0.8,
                blending: Blending::Additive,
            },
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_both_faces() {
        assert_eq!(wrap(50.5), -50.0);
        assert_eq!(wrap(-50.5), 50.0);
        assert_eq!(wrap(12.0), 12.0);
    }

    #[test]
    fn particles_stay_in_bounds() {
        let mut field = ParticleField::with_rng(500, StdRng::seed_from_u64(9));
        field.rebuild();
        for frame in 0..200 {
            let pointer = Vec2::new((frame as f32 * 0.01).sin(), 0.2);
            field.step(Some(pointer));
        }
        assert_eq!(field.elements().len(), 500);
        for element in field.elements() {
            assert!(element.position.is_finite());
            assert!(element.position.abs().max_element() <= BOUNDS);
        }
    }

    #[test]
    fn repels_from_origin_before_pointer_moves() {
        let mut field = ParticleField::with_rng(1, StdRng::seed_from_u64(2));
        field.rebuild();
        field.elements[0].position = Vec3::new(2.0, 0.0, 0.0);
        field.velocities[0] = Vec3::ZERO;
        field.step(None);
        assert!(field.elements()[0].position.x > 2.0);

        // The last pointer position keeps acting when no new one arrives.
        field.elements[0].position = Vec3::new(20.0, 0.0, 0.0);
        field.step(Some(Vec2::new(0.5, 0.0)));
        let after_move = field.elements()[0].position.x;
        assert!(after_move < 20.0);
        field.step(None);
        assert!(field.elements()[0].position.x < after_move);
    }

    #[test]
    fn speed_colour_saturates() {
        assert_eq!(speed_color(Vec3::splat(1.0)).to_rgb(), [0.0, 0.8, 1.0]);
        let [r, g, b] = speed_color(Vec3::ZERO).to_rgb();
        assert!((r - 0.7).abs() < 1e-6 && (g - 0.94).abs() < 1e-6 && b == 1.0);
    }
}
