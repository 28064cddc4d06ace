use glam::Vec2;

use super::Element;

/// Pointer repulsion acting in the xy plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionField {
    pub radius: f32,
    pub strength: f32,
}

impl Default for InteractionField {
    fn default() -> Self {
        Self {
            radius: 10.0,
            strength: 0.5,
        }
    }
}

impl InteractionField {
    pub fn new(radius: f32, strength: f32) -> Self {
        Self { radius, strength }
    }

    /// Displacement for a point at `at`, or `None` when it is outside the
    /// radius or exactly under the pointer (direction undefined).
    pub fn displacement(&self, at: Vec2, pointer: Vec2) -> Option<Vec2> {
        let offset = at - pointer;
        let distance = offset.length();
        if distance >= self.radius || distance <= f32::EPSILON {
            return None;
        }
        let force = (self.radius - distance) / self.radius;
        Some(offset / distance * force * self.strength)
    }

    /// Pushes every element within the radius away from `pointer`. Returns
    /// how many elements moved.
    pub fn apply(&self, elements: &mut [Element], pointer: Vec2) -> usize {
        let mut moved = 0;
        for element in elements {
            if let Some(delta) = self.displacement(element.position.truncate(), pointer) {
                element.position.x += delta.x;
                element.position.y += delta.y;
                moved += 1;
            }
        }
        moved
    }
}

/// Free-function form of [`InteractionField::apply`] with the default strength.
pub fn apply_force(elements: &mut [Element], pointer: Vec2, influence_radius: f32) -> usize {
    InteractionField::new(influence_radius, 0.5).apply(elements, pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Color, Element};
    use glam::Vec3;

    #[test]
    fn falloff_is_linear() {
        let field = InteractionField::default();
        let d = field
            .displacement(Vec2::new(5.0, 0.0), Vec2::ZERO)
            .unwrap();
        assert!((d.x - 0.25).abs() < 1e-6);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn depth_is_ignored() {
        let mut elements = vec![Element::point(Vec3::new(0.0, 3.0, 40.0), Color::Rgb([1.0; 3]))];
        assert_eq!(apply_force(&mut elements, Vec2::ZERO, 10.0), 1);
        assert!(elements[0].position.y > 3.0);
        assert_eq!(elements[0].position.z, 40.0);
    }
}
