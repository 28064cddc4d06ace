//! Renderer collaborator interface and the resource ownership around it.
//!
//! Effects never talk to a graphics API directly. An overlay acquires a
//! context, geometry and material handles through a [`Renderer`] and keeps
//! them in a [`ResourceBundle`], which hands every handle back to the renderer
//! when it is released or dropped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::Result;

/// One point sprite as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    /// Sprite size in world units; the shader attenuates by depth.
    pub size: f32,
}

impl Vertex {
    /// Floats per vertex in the interleaved buffer.
    pub const STRIDE: usize = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub point_size: f32,
    pub opacity: f32,
    pub blending: Blending,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            point_size: 0.08,
            opacity: 1.0,
            blending: Blending::Normal,
        }
    }
}

/// Perspective camera looking at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// The 75 degree camera every effect uses, pulled back `distance` along +z.
    pub fn looking_at_origin(distance: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, distance),
            target: Vec3::ZERO,
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let projection =
            Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), aspect, self.near, self.far);
        projection * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    /// Pixels per world unit at distance 1 for a viewport `height` pixels tall.
    pub fn pixel_scale(&self, height: f32) -> f32 {
        height / (2.0 * (self.fov_y_degrees.to_radians() / 2.0).tan())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Context,
    Geometry,
    Material,
}

/// Opaque handle to something a renderer allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: u64,
    kind: ResourceKind,
}

impl ResourceHandle {
    pub fn new(id: u64, kind: ResourceKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

pub struct DrawCall<'a> {
    pub geometry: ResourceHandle,
    pub material: ResourceHandle,
    pub vertices: &'a [Vertex],
}

pub struct Frame<'a> {
    pub clear: [f32; 4],
    pub camera: &'a Camera,
    pub calls: &'a [DrawCall<'a>],
}

/// Graphics collaborator consumed by overlays.
///
/// Every handle returned by a `create_*` method must eventually be passed to
/// [`Renderer::dispose`]; [`ResourceBundle`] does that bookkeeping.
pub trait Renderer {
    /// What a context is created on (a canvas in the browser).
    type Target;

    fn create_context(&mut self, target: &Self::Target) -> Result<ResourceHandle>;
    fn create_geometry(&mut self, context: ResourceHandle) -> Result<ResourceHandle>;
    fn create_material(
        &mut self,
        context: ResourceHandle,
        material: &Material,
    ) -> Result<ResourceHandle>;
    fn draw(&mut self, context: ResourceHandle, frame: &Frame<'_>) -> Result<()>;
    fn dispose(&mut self, handles: &[ResourceHandle]);
}

/// Scoped ownership of renderer handles.
///
/// Handles are disposed in reverse acquisition order on [`release`] or drop,
/// whichever comes first.
///
/// [`release`]: ResourceBundle::release
pub struct ResourceBundle<R: Renderer> {
    renderer: Rc<RefCell<R>>,
    handles: Vec<ResourceHandle>,
}

impl<R: Renderer> ResourceBundle<R> {
    pub fn new(renderer: Rc<RefCell<R>>) -> Self {
        Self {
            renderer,
            handles: Vec::new(),
        }
    }

    /// Runs `acquire` against the renderer and takes ownership of the handle.
    pub fn acquire(
        &mut self,
        acquire: impl FnOnce(&mut R) -> Result<ResourceHandle>,
    ) -> Result<ResourceHandle> {
        let handle = acquire(&mut self.renderer.borrow_mut())?;
        self.handles.push(handle);
        Ok(handle)
    }

    pub fn handles(&self) -> &[ResourceHandle] {
        &self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn release(&mut self) {
        if self.handles.is_empty() {
            return;
        }
        self.handles.reverse();
        match self.renderer.try_borrow_mut() {
            Ok(mut renderer) => renderer.dispose(&self.handles),
            Err(_) => {
                tracing::error!(
                    count = self.handles.len(),
                    "renderer busy during release; handles leaked"
                );
            }
        }
        self.handles.clear();
    }
}

impl<R: Renderer> Drop for ResourceBundle<R> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Renderer that allocates nothing but bookkeeping.
///
/// Used on the host to exercise overlay lifecycles and to check that every
/// acquired handle is disposed.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    live: HashMap<u64, ResourceKind>,
    frames: u64,
    last_vertex_count: usize,
    double_disposals: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    pub fn last_vertex_count(&self) -> usize {
        self.last_vertex_count
    }

    /// Handles disposed that were not live at the time.
    pub fn double_disposals(&self) -> u64 {
        self.double_disposals
    }

    fn allocate(&mut self, kind: ResourceKind) -> ResourceHandle {
        self.next_id += 1;
        self.live.insert(self.next_id, kind);
        ResourceHandle::new(self.next_id, kind)
    }

    fn check_live(&self, handle: ResourceHandle) -> Result<()> {
        match self.live.get(&handle.id()) {
            Some(kind) if *kind == handle.kind() => Ok(()),
            _ => Err(crate::Error::Render(format!(
                "{:?} handle {} is not live",
                handle.kind(),
                handle.id()
            ))),
        }
    }
}

impl Renderer for HeadlessRenderer {
    type Target = ();

    fn create_context(&mut self, _target: &()) -> Result<ResourceHandle> {
        Ok(self.allocate(ResourceKind::Context))
    }

    fn create_geometry(&mut self, context: ResourceHandle) -> Result<ResourceHandle> {
        self.check_live(context)?;
        Ok(self.allocate(ResourceKind::Geometry))
    }

    fn create_material(
        &mut self,
        context: ResourceHandle,
        _material: &Material,
    ) -> Result<ResourceHandle> {
        self.check_live(context)?;
        Ok(self.allocate(ResourceKind::Material))
    }

    fn draw(&mut self, context: ResourceHandle, frame: &Frame<'_>) -> Result<()> {
        self.check_live(context)?;
        for call in frame.calls {
            self.check_live(call.geometry)?;
            self.check_live(call.material)?;
        }
        self.frames += 1;
        self.last_vertex_count = frame.calls.iter().map(|c| c.vertices.len()).sum();
        Ok(())
    }

    fn dispose(&mut self, handles: &[ResourceHandle]) {
        for handle in handles {
            if self.live.remove(&handle.id()).is_none() {
                self.double_disposals += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_disposes_on_drop() {
        let renderer = HeadlessRenderer::shared();
        {
            let mut bundle = ResourceBundle::new(renderer.clone());
            let ctx = bundle.acquire(|r| r.create_context(&())).unwrap();
            bundle.acquire(|r| r.create_geometry(ctx)).unwrap();
            bundle
                .acquire(|r| r.create_material(ctx, &Material::default()))
                .unwrap();
            assert_eq!(renderer.borrow().live_resources(), 3);
        }
        assert_eq!(renderer.borrow().live_resources(), 0);
        assert_eq!(renderer.borrow().double_disposals(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let renderer = HeadlessRenderer::shared();
        let mut bundle = ResourceBundle::new(renderer.clone());
        bundle.acquire(|r| r.create_context(&())).unwrap();
        bundle.release();
        bundle.release();
        drop(bundle);
        assert_eq!(renderer.borrow().live_resources(), 0);
        assert_eq!(renderer.borrow().double_disposals(), 0);
    }

    #[test]
    fn geometry_needs_live_context() {
        let mut renderer = HeadlessRenderer::new();
        let ctx = renderer.create_context(&()).unwrap();
        renderer.dispose(&[ctx]);
        assert!(renderer.create_geometry(ctx).is_err());
    }

    #[test]
    fn camera_centres_its_target() {
        let camera = Camera::looking_at_origin(10.0);
        for aspect in [16.0 / 9.0, 9.0 / 16.0, 1.0] {
            let clip = camera.view_projection(aspect) * Vec3::ZERO.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
            assert!(ndc.z > -1.0 && ndc.z < 1.0);
        }
    }
}
