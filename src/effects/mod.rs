//! Procedural visual effects: element generation, layouts, per-frame motion
//! and the effects hosted by overlays.

mod backdrop;
mod clock;
mod element;
mod field;
mod generator;
mod particles;
mod pattern;
mod scene;

pub use backdrop::Backdrop;
pub use clock::{staggered_rotation, AnimationClock, FRAME_STEP};
pub use element::{icosahedron, Color, Element, ShapeKind};
pub use field::{apply_force, InteractionField};
pub use generator::{generate, generate_with, spin, EffectConfig, GeometricArt};
pub use particles::{speed_color, ParticleField, BOUNDS, PARTICLE_COUNT, POINTER_SCALE};
pub use pattern::{Pattern, RANDOM_EXTENT};
pub use scene::{MotionReel, Part, Scene, SceneCycler, SceneKind};
