use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::element::icosahedron;
use super::{Color, Element};
use crate::overlay::{Effect, Layer};
use crate::render::{Blending, Camera, Material};

const CYAN: u32 = 0x00ffff;
const EASE: f32 = 0.05;

/// Decorative page background: a wireframe icosahedron inside a slow dust
/// cloud, with the camera drifting after the pointer.
pub struct Backdrop {
    shell: Vec<Element>,
    dust: Vec<Element>,
    shell_rotation: Vec2,
    dust_rotation: f32,
    eye: Vec2,
    generation: u64,
    rng: StdRng,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Backdrop {
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            shell: Vec::new(),
            dust: Vec::new(),
            shell_rotation: Vec2::ZERO,
            dust_rotation: 0.0,
            eye: Vec2::ZERO,
            generation: 0,
            rng,
        }
    }

    /// Camera offset in the xy plane.
    pub fn eye(&self) -> Vec2 {
        self.eye
    }
}

/// Samples along each icosahedron edge so the wireframe reads as lines.
fn wireframe(radius: f32) -> Vec<Vec3> {
    let vertices = icosahedron(radius);
    let edge = vertices[0].distance(vertices[1]);
    let mut points = Vec::new();
    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            if (a.distance(*b) - edge).abs() < 1e-3 {
                points.extend((0..10).map(|s| a.lerp(*b, s as f32 / 10.0)));
            }
        }
    }
    points
}

impl Effect for Backdrop {
    fn title(&self) -> &str {
        "Backdrop"
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 0.0]
    }

    fn camera(&self) -> Camera {
        let mut camera = Camera::looking_at_origin(5.0);
        camera.eye = self.eye.extend(5.0);
        camera
    }

    fn rebuild(&mut self) {
        let cyan = Color::from_hex(CYAN);
        self.shell = wireframe(1.0)
            .into_iter()
            .map(|p| Element::point(p, cyan))
            .collect();
        let rng = &mut self.rng;
        self.dust = (0..1000)
            .map(|_| {
                Element::point(
                    Vec3::new(
                        rng.gen_range(-5.0..5.0),
                        rng.gen_range(-5.0..5.0),
                        rng.gen_range(-5.0..5.0),
                    ),
                    cyan,
                )
            })
            .collect();
        self.generation += 1;
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn step(&mut self, pointer: Option<Vec2>) {
        self.shell_rotation += Vec2::splat(0.01);
        self.dust_rotation += 0.002;
        if let Some(pointer) = pointer {
            self.eye += (pointer * 0.5 - self.eye) * EASE;
        }
    }

    fn layers(&self) -> Vec<Layer<'_>> {
        vec![
            Layer {
                elements: &self.shell,
                transform: Mat4::from_quat(Quat::from_euler(
                    EulerRot::XYZ,
                    self.shell_rotation.x,
                    self.shell_rotation.y,
                    0.0,
                )),
                material: Material {
                    point_size: 0.04,
                    opacity: 0.3,
                    blending: Blending::Normal,
                },
            },
            Layer {
                elements: &self.dust,
                transform: Mat4::from_rotation_y(self.dust_rotation),
                material: Material {
                    point_size: 0.02,
                    opacity: 0.6,
                    blending: Blending::Normal,
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wireframe_has_thirty_edges() {
        assert_eq!(wireframe(1.0).len(), 30 * 10);
    }

    #[test]
    fn camera_eases_toward_pointer() {
        let mut backdrop = Backdrop::with_rng(StdRng::seed_from_u64(2));
        backdrop.rebuild();
        backdrop.step(Some(Vec2::new(1.0, -1.0)));
        assert!((backdrop.eye().x - 0.025).abs() < 1e-6);
        assert!((backdrop.eye().y + 0.025).abs() < 1e-6);
        for _ in 0..1000 {
            backdrop.step(Some(Vec2::new(1.0, -1.0)));
        }
        assert!((backdrop.eye().x - 0.5).abs() < 1e-3);
        assert_eq!(backdrop.camera().eye.z, 5.0);
    }
}
