//! Full-screen views that own one effect and its render resources.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::effects::Element;
use crate::render::{
    Camera, DrawCall, Frame, Material, Renderer, ResourceBundle, ResourceHandle, Vertex,
};
use crate::Result;

/// A group of elements drawn with one material under one group transform.
pub struct Layer<'a> {
    pub elements: &'a [Element],
    pub transform: Mat4,
    pub material: Material,
}

impl Layer<'_> {
    /// Expands every element into its outline points in world space.
    pub fn write_vertices(&self, out: &mut Vec<Vertex>) {
        for element in self.elements {
            let rotation = Quat::from_euler(
                EulerRot::XYZ,
                element.rotation.x,
                element.rotation.y,
                element.rotation.z,
            );
            let local = Mat4::from_scale_rotation_translation(
                Vec3::splat(element.scale),
                rotation,
                element.position,
            );
            let world = self.transform * local;
            let color = element.color.to_rgb();
            for point in element.shape.outline() {
                out.push(Vertex {
                    position: world.transform_point3(*point).to_array(),
                    color,
                    size: self.material.point_size,
                });
            }
        }
    }
}

/// An animated composition an overlay can host.
pub trait Effect {
    fn title(&self) -> &str;

    fn clear_color(&self) -> [f32; 4];

    fn camera(&self) -> Camera;

    /// Discards the current elements and builds a fresh set.
    fn rebuild(&mut self);

    /// Bumped whenever the element set is replaced, so owners know to swap
    /// their per-layer render resources.
    fn generation(&self) -> u64;

    /// Advances one frame. `pointer` is in normalised device coordinates.
    fn step(&mut self, pointer: Option<Vec2>);

    fn layers(&self) -> Vec<Layer<'_>>;
}

/// Shared cancellation flag checked at the top of every frame callback.
#[derive(Debug, Clone, Default)]
pub struct FrameGate(Rc<Cell<bool>>);

impl FrameGate {
    pub fn open() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_open(&self) -> bool {
        self.0.get()
    }

    pub fn cancel(&self) {
        self.0.set(false);
    }
}

struct LayerResources {
    geometry: ResourceHandle,
    material: ResourceHandle,
}

struct Session<R: Renderer> {
    gate: FrameGate,
    context: ResourceHandle,
    // Declared before `context_bundle` so layer handles go first on drop.
    layer_bundle: ResourceBundle<R>,
    layers: Vec<LayerResources>,
    generation: u64,
    context_bundle: ResourceBundle<R>,
}

/// A modal view: closed until opened, owns exactly one resource bundle while open.
pub struct Overlay<R: Renderer, E: Effect> {
    renderer: Rc<RefCell<R>>,
    effect: E,
    session: Option<Session<R>>,
    scratch: Vec<Vec<Vertex>>,
}

impl<R: Renderer, E: Effect> Overlay<R, E> {
    pub fn new(renderer: Rc<RefCell<R>>, effect: E) -> Self {
        Self {
            renderer,
            effect,
            session: None,
            scratch: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    /// Mutable access for parameter changes. Changes that rebuild the element
    /// set are picked up on the next tick.
    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// Gate of the current session, if open.
    pub fn gate(&self) -> Option<FrameGate> {
        self.session.as_ref().map(|s| s.gate.clone())
    }

    /// Acquires the render context and builds the effect. Opening an already
    /// open overlay returns its existing gate.
    pub fn open(&mut self, target: &R::Target) -> Result<FrameGate> {
        if let Some(session) = &self.session {
            return Ok(session.gate.clone());
        }
        let mut context_bundle = ResourceBundle::new(self.renderer.clone());
        let context = context_bundle.acquire(|r| r.create_context(target))?;

        self.effect.rebuild();
        let mut session = Session {
            gate: FrameGate::open(),
            context,
            layer_bundle: ResourceBundle::new(self.renderer.clone()),
            layers: Vec::new(),
            generation: self.effect.generation(),
            context_bundle,
        };
        // On error `session` drops here and gives back what it acquired.
        Self::acquire_layers(&self.effect, &mut session)?;
        tracing::info!(effect = self.effect.title(), "overlay opened");
        let gate = session.gate.clone();
        self.session = Some(session);
        Ok(gate)
    }

    /// Cancels the frame gate and releases every resource. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.gate.cancel();
            session.layer_bundle.release();
            session.context_bundle.release();
            tracing::info!(effect = self.effect.title(), "overlay closed");
        }
    }

    /// Applies the host's visibility flag.
    pub fn set_visible(&mut self, visible: bool, target: &R::Target) -> Result<()> {
        if visible {
            self.open(target).map(|_| ())
        } else {
            self.close();
            Ok(())
        }
    }

    /// Runs one frame. Returns `false` once the overlay is closed, telling the
    /// host loop not to reschedule.
    pub fn tick(&mut self, pointer: Option<Vec2>) -> Result<bool> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        if !session.gate.is_open() {
            return Ok(false);
        }

        self.effect.step(pointer);

        if self.effect.generation() != session.generation {
            session.layer_bundle.release();
            session.layers.clear();
            if let Err(err) = Self::acquire_layers(&self.effect, session) {
                // Leave the generation stale so the next tick retries the swap.
                session.layer_bundle.release();
                session.layers.clear();
                return Err(err);
            }
            session.generation = self.effect.generation();
        }

        let layers = self.effect.layers();
        self.scratch.resize_with(layers.len(), Vec::new);
        for (layer, buffer) in layers.iter().zip(self.scratch.iter_mut()) {
            buffer.clear();
            layer.write_vertices(buffer);
        }
        let calls: Vec<DrawCall<'_>> = session
            .layers
            .iter()
            .zip(self.scratch.iter())
            .map(|(res, vertices)| DrawCall {
                geometry: res.geometry,
                material: res.material,
                vertices,
            })
            .collect();
        let camera = self.effect.camera();
        let frame = Frame {
            clear: self.effect.clear_color(),
            camera: &camera,
            calls: &calls,
        };
        self.renderer.borrow_mut().draw(session.context, &frame)?;
        Ok(true)
    }

    fn acquire_layers(effect: &E, session: &mut Session<R>) -> Result<()> {
        let context = session.context;
        for layer in effect.layers() {
            let geometry = session
                .layer_bundle
                .acquire(|r| r.create_geometry(context))?;
            let material = session
                .layer_bundle
                .acquire(|r| r.create_material(context, &layer.material))?;
            session.layers.push(LayerResources { geometry, material });
        }
        tracing::debug!(
            effect = effect.title(),
            generation = effect.generation(),
            layers = session.layers.len(),
            "layer resources acquired"
        );
        Ok(())
    }
}

impl<R: Renderer, E: Effect> Drop for Overlay<R, E> {
    fn drop(&mut self) {
        self.close();
    }
}
