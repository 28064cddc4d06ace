//! Named scenes and the cycler that plays them one at a time.

use std::f32::consts::{FRAC_PI_4, TAU};

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::{AnimationClock, FRAME_STEP};
use super::{Color, Element, ShapeKind};
use crate::overlay::{Effect, Layer};
use crate::render::{Blending, Camera, Material};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    MorphingShapes,
    ParticleExplosion,
    WaveDistortion,
    ColorTransitions,
    LogoAnimation,
}

impl SceneKind {
    pub const REEL: [SceneKind; 5] = [
        SceneKind::MorphingShapes,
        SceneKind::ParticleExplosion,
        SceneKind::WaveDistortion,
        SceneKind::ColorTransitions,
        SceneKind::LogoAnimation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::MorphingShapes => "Morphing Shapes",
            SceneKind::ParticleExplosion => "Particle Explosion",
            SceneKind::WaveDistortion => "Wave Distortion",
            SceneKind::ColorTransitions => "Color Transitions",
            SceneKind::LogoAnimation => "Logo Animation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SceneKind::MorphingShapes => "Fluid geometric transformations",
            SceneKind::ParticleExplosion => "Dynamic particle systems",
            SceneKind::WaveDistortion => "Sine wave animations",
            SceneKind::ColorTransitions => "Smooth color morphing",
            SceneKind::LogoAnimation => "Brand identity motion",
        }
    }

    /// Builds a fresh scene of this kind.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Scene {
        let parts = match self {
            SceneKind::MorphingShapes => vec![Part::new(
                (0..5)
                    .map(|i| {
                        let x = (i as f32 - 2.0) * 2.0;
                        Element::new(
                            Vec3::new(x, 0.0, 0.0),
                            ShapeKind::Sphere,
                            Color::hsl_turns(i as f32 * 0.2, 0.8, 0.6),
                        )
                    })
                    .collect(),
                Material {
                    point_size: 0.1,
                    opacity: 0.8,
                    blending: Blending::Normal,
                },
            )],
            SceneKind::ParticleExplosion => vec![Part::new(
                (0..1000)
                    .map(|_| {
                        let p = Vec3::new(
                            rng.gen_range(-5.0..5.0),
                            rng.gen_range(-5.0..5.0),
                            rng.gen_range(-5.0..5.0),
                        );
                        Element::point(p, Color::hsl_turns(rng.gen(), 0.8, 0.6))
                    })
                    .collect(),
                Material {
                    point_size: 0.1,
                    opacity: 0.8,
                    blending: Blending::Normal,
                },
            )],
            SceneKind::WaveDistortion => {
                let mut part = Part::new(
                    grid(8.0, 32)
                        .map(|p| Element::point(p, Color::from_hex(0x00ffff)))
                        .collect(),
                    Material {
                        point_size: 0.06,
                        opacity: 0.7,
                        blending: Blending::Normal,
                    },
                );
                part.rotation.x = -FRAC_PI_4;
                vec![part]
            }
            SceneKind::ColorTransitions => vec![Part::new(
                torus(2.0, 0.5, 16, 100)
                    .map(|p| Element::point(p, Color::hsl(0.0, 1.0, 0.5)))
                    .collect(),
                Material {
                    point_size: 0.06,
                    opacity: 0.8,
                    blending: Blending::Normal,
                },
            )],
            SceneKind::LogoAnimation => {
                let cyan = Color::from_hex(0x00ffff);
                let material = Material {
                    point_size: 0.06,
                    opacity: 1.0,
                    blending: Blending::Normal,
                };
                let mut glyph: Vec<Element> = sampled_box(Vec3::ZERO, Vec3::new(0.2, 2.0, 0.2))
                    .map(|p| Element::point(p, cyan))
                    .collect();
                glyph.extend(
                    sampled_box(Vec3::new(0.0, 0.9, 0.0), Vec3::new(1.5, 0.2, 0.2))
                        .map(|p| Element::point(p, cyan)),
                );
                let mut t = Part::new(glyph, material);
                t.offset.x = -1.5;
                let mut ring = Part::new(
                    torus(0.8, 0.1, 8, 32)
                        .map(|p| Element::point(p, cyan))
                        .collect(),
                    material,
                );
                ring.offset.x = 1.5;
                ring.pulses = true;
                vec![t, ring]
            }
        };
        Scene { kind: self, parts }
    }
}

/// A group of elements moved as one, with a rest copy of their positions.
#[derive(Debug, Clone)]
pub struct Part {
    pub elements: Vec<Element>,
    rest: Vec<Vec3>,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub material: Material,
    pulses: bool,
}

impl Part {
    fn new(elements: Vec<Element>, material: Material) -> Self {
        let rest = elements.iter().map(|e| e.position).collect();
        Self {
            elements,
            rest,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            material,
            pulses: false,
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x,
                self.rotation.y,
                self.rotation.z,
            ),
            self.offset,
        )
    }
}

/// One named composition: its parts and the update rule picked by its kind.
#[derive(Debug, Clone)]
pub struct Scene {
    kind: SceneKind,
    parts: Vec<Part>,
}

impl Scene {
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn element_count(&self) -> usize {
        self.parts.iter().map(|p| p.elements.len()).sum()
    }

    /// Sets every element to its state at scene-local time `t`.
    pub fn update(&mut self, t: f32) {
        match self.kind {
            SceneKind::MorphingShapes => {
                for part in &mut self.parts {
                    for (i, element) in part.elements.iter_mut().enumerate() {
                        let i = i as f32;
                        element.rotation.y = t + i;
                        element.scale = 1.0 + (t * 2.0 + i).sin() * 0.3;
                        element.color = Color::hsl_turns(t * 0.1 + i * 0.2, 0.8, 0.6);
                    }
                }
            }
            SceneKind::ParticleExplosion => {
                let factor = (t * 2.0).sin() * 0.5 + 0.5;
                let stretch = 1.0 + factor * 0.1;
                for part in &mut self.parts {
                    part.rotation.y = t * 0.5;
                    for (element, rest) in part.elements.iter_mut().zip(&part.rest) {
                        element.position = *rest * stretch;
                    }
                }
            }
            SceneKind::WaveDistortion => {
                for part in &mut self.parts {
                    for (element, rest) in part.elements.iter_mut().zip(&part.rest) {
                        element.position.z = (rest.x * 0.5 + t * 2.0).sin()
                            * (rest.y * 0.5 + t * 2.0).cos()
                            * 0.5;
                    }
                }
            }
            SceneKind::ColorTransitions => {
                let color = Color::hsl_turns(t * 0.1, 0.8, 0.6);
                for part in &mut self.parts {
                    part.rotation.x = t;
                    part.rotation.y = t * 0.7;
                    for element in &mut part.elements {
                        element.color = color;
                    }
                }
            }
            SceneKind::LogoAnimation => {
                for (i, part) in self.parts.iter_mut().enumerate() {
                    let i = i as f32;
                    part.rotation.y = (t + i).sin() * 0.3;
                    part.offset.y = (t * 2.0 + i).sin() * 0.2;
                    if part.pulses {
                        part.scale = (t * 3.0).sin() * 0.1 + 1.0;
                    }
                }
            }
        }
    }
}

/// `segments` x `segments` cells over a `size` square plane: `(segments + 1)^2` points.
fn grid(size: f32, segments: usize) -> impl Iterator<Item = Vec3> {
    let step = size / segments as f32;
    let half = size / 2.0;
    (0..=segments).flat_map(move |row| {
        (0..=segments).map(move |col| {
            Vec3::new(-half + col as f32 * step, half - row as f32 * step, 0.0)
        })
    })
}

fn torus(radius: f32, tube: f32, radial: usize, tubular: usize) -> impl Iterator<Item = Vec3> {
    (0..radial).flat_map(move |j| {
        (0..tubular).map(move |i| {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;
            Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            )
        })
    })
}

/// Points along the twelve edges of a box.
fn sampled_box(center: Vec3, size: Vec3) -> impl Iterator<Item = Vec3> {
    const STEPS: usize = 8;
    let half = size / 2.0;
    let corners: Vec<Vec3> = (0..8)
        .map(|c| {
            Vec3::new(
                if c & 1 == 0 { -half.x } else { half.x },
                if c & 2 == 0 { -half.y } else { half.y },
                if c & 4 == 0 { -half.z } else { half.z },
            )
        })
        .collect();
    let mut edges = Vec::with_capacity(12);
    for a in 0..8usize {
        for bit in [1, 2, 4] {
            if a & bit == 0 {
                edges.push((corners[a], corners[a | bit]));
            }
        }
    }
    edges.into_iter().flat_map(move |(a, b)| {
        (0..STEPS).map(move |s| center + a.lerp(b, s as f32 / STEPS as f32))
    })
}

/// Finite state machine over an ordered scene list.
///
/// Exactly one scene is live at a time; entering another drops the live
/// scene's elements and builds the new one from scratch.
pub struct SceneCycler {
    kinds: Vec<SceneKind>,
    current: usize,
    scene: Scene,
    clock: AnimationClock,
    rng: StdRng,
}

impl SceneCycler {
    /// Cycler over the five reel scenes, starting at the first, playing.
    pub fn reel() -> Self {
        Self::reel_with_rng(StdRng::from_entropy())
    }

    pub fn reel_with_rng(rng: StdRng) -> Self {
        Self::start(SceneKind::REEL.to_vec(), SceneKind::REEL[0], rng)
    }

    /// Cycler over `kinds` in order. Fails with [`Error::NoScenes`] when
    /// `kinds` is empty.
    pub fn with_rng(kinds: Vec<SceneKind>, rng: StdRng) -> Result<Self> {
        let first = *kinds.first().ok_or(Error::NoScenes)?;
        Ok(Self::start(kinds, first, rng))
    }

    fn start(kinds: Vec<SceneKind>, first: SceneKind, mut rng: StdRng) -> Self {
        let scene = first.build(&mut rng);
        Self {
            kinds,
            current: 0,
            scene,
            clock: AnimationClock::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Scene-local elapsed time.
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn next(&mut self) {
        self.enter((self.current + 1) % self.len());
    }

    pub fn previous(&mut self) {
        self.enter((self.current + self.len() - 1) % self.len());
    }

    /// Jumps to `index`. Out-of-range indices are rejected and leave the
    /// cycler untouched; jumping to the current scene is a no-op.
    pub fn jump_to(&mut self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::SceneOutOfRange {
                index,
                len: self.len(),
            });
        }
        if index != self.current {
            self.enter(index);
        }
        Ok(())
    }

    pub fn toggle_play(&mut self) -> bool {
        self.clock.toggle()
    }

    /// Advances the live scene by `dt` seconds unless paused. Returns whether
    /// anything moved.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.clock.advance(dt) {
            Some(t) => {
                self.scene.update(t);
                true
            }
            None => false,
        }
    }

    /// Rebuilds the live scene in place, restarting its time.
    pub fn rebuild(&mut self) {
        self.scene = self.kinds[self.current].build(&mut self.rng);
        self.clock.reset();
    }

    fn enter(&mut self, index: usize) {
        self.current = index;
        self.rebuild();
        tracing::debug!(index, scene = self.scene.name(), "scene entered");
    }
}

/// The motion graphics reel: a scene cycler presented as an effect.
pub struct MotionReel {
    cycler: SceneCycler,
    generation: u64,
}

impl Default for MotionReel {
    fn default() -> Self {
        Self::new(SceneCycler::reel())
    }
}

impl MotionReel {
    pub fn new(cycler: SceneCycler) -> Self {
        Self {
            cycler,
            generation: 0,
        }
    }

    pub fn cycler(&self) -> &SceneCycler {
        &self.cycler
    }

    /// Navigation goes through here so scene changes bump the generation.
    pub fn navigate<T>(&mut self, f: impl FnOnce(&mut SceneCycler) -> T) -> T {
        let before = self.cycler.current();
        let out = f(&mut self.cycler);
        if self.cycler.current() != before {
            self.generation += 1;
        }
        out
    }
}

impl Effect for MotionReel {
    fn title(&self) -> &str {
        "Motion Graphics Reel"
    }

    fn clear_color(&self) -> [f32; 4] {
        [0.0, 0.0, 0.0, 1.0]
    }

    fn camera(&self) -> Camera {
        Camera::looking_at_origin(8.0)
    }

    fn rebuild(&mut self) {
        self.cycler.rebuild();
        self.generation += 1;
    }

    fn generation(&self) -> u64 {
        self.generation
    }

    fn step(&mut self, _pointer: Option<Vec2>) {
        self.cycler.advance(FRAME_STEP);
    }

    fn layers(&self) -> Vec<Layer<'_>> {
        self.cycler
            .scene()
            .parts()
            .iter()
            .map(|part| Layer {
                elements: &part.elements,
                transform: part.transform(),
                material: part.material,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycler() -> SceneCycler {
        SceneCycler::reel_with_rng(StdRng::seed_from_u64(5))
    }

    #[test]
    fn scene_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(SceneKind::MorphingShapes.build(&mut rng).element_count(), 5);
        assert_eq!(SceneKind::ParticleExplosion.build(&mut rng).element_count(), 1000);
        assert_eq!(SceneKind::WaveDistortion.build(&mut rng).element_count(), 33 * 33);
        assert_eq!(SceneKind::ColorTransitions.build(&mut rng).element_count(), 1600);
        assert_eq!(SceneKind::LogoAnimation.build(&mut rng).parts().len(), 2);
    }

    #[test]
    fn explosion_pulses_without_diverging() {
        let mut c = cycler();
        c.jump_to(1).unwrap();
        for _ in 0..10_000 {
            c.advance(FRAME_STEP);
        }
        for part in c.scene().parts() {
            for e in &part.elements {
                assert!(e.position.abs().max_element() <= 5.0 * 1.1 + 1e-4);
            }
        }
    }

    #[test]
    fn wave_height_bounded() {
        let mut c = cycler();
        c.jump_to(2).unwrap();
        for _ in 0..50 {
            c.advance(FRAME_STEP);
        }
        let part = &c.scene().parts()[0];
        assert!(part.elements.iter().all(|e| e.position.z.abs() <= 0.5));
        assert!((part.rotation.x + FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn paused_cycler_holds_time() {
        let mut c = cycler();
        c.advance(FRAME_STEP);
        c.toggle_play();
        assert!(!c.advance(FRAME_STEP));
        assert!((c.elapsed() - FRAME_STEP).abs() < 1e-7);
        c.toggle_play();
        assert!(c.advance(FRAME_STEP));
        assert!((c.elapsed() - 2.0 * FRAME_STEP).abs() < 1e-7);
    }

    #[test]
    fn entering_scene_restarts_time() {
        let mut c = cycler();
        c.advance(1.0);
        c.next();
        assert_eq!(c.elapsed(), 0.0);
        assert_eq!(c.scene().kind(), SceneKind::ParticleExplosion);
    }

    #[test]
    fn reel_generation_follows_navigation() {
        let mut reel = MotionReel::new(cycler());
        reel.rebuild();
        let g = reel.generation();
        reel.navigate(|c| c.jump_to(0)).unwrap();
        assert_eq!(reel.generation(), g);
        reel.navigate(|c| c.next());
        assert_eq!(reel.generation(), g + 1);
        assert!(reel.navigate(|c| c.jump_to(9)).is_err());
        assert_eq!(reel.generation(), g + 1);
    }
}
