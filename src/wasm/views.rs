//! Browser bindings for the effect overlays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

use super::dom::{self, Listener};
use super::render::{FrameLoop, WebGlRenderer};
use crate::effects::{Backdrop, EffectConfig, GeometricArt, MotionReel, ParticleField};
use crate::overlay::{Effect, FrameGate, Overlay};

/// Canvas, overlay and the listeners and frame loop that live while it is open.
struct ViewCore<E: Effect + 'static> {
    canvas: HtmlCanvasElement,
    overlay: Rc<RefCell<Overlay<WebGlRenderer, E>>>,
    pointer: Rc<Cell<Option<Vec2>>>,
    frame_loop: Option<FrameLoop>,
    listeners: Vec<Listener>,
    on_close: Option<js_sys::Function>,
}

impl<E: Effect + 'static> ViewCore<E> {
    fn new(canvas_id: &str, effect: E) -> Result<Self, JsValue> {
        Ok(Self {
            canvas: dom::canvas_by_id(canvas_id)?,
            overlay: Rc::new(RefCell::new(Overlay::new(WebGlRenderer::shared(), effect))),
            pointer: Rc::new(Cell::new(None)),
            frame_loop: None,
            listeners: Vec::new(),
            on_close: None,
        })
    }

    fn is_open(&self) -> bool {
        self.overlay.borrow().is_open()
    }

    fn open(&mut self) -> Result<(), JsValue> {
        if self.is_open() {
            return Ok(());
        }
        // A loop stopped by a failed frame leaves these behind.
        self.frame_loop.take();
        self.listeners.clear();

        dom::fit_to_window(&self.canvas)?;
        let gate = self
            .overlay
            .borrow_mut()
            .open(&self.canvas)
            .map_err(dom::to_js)?;
        if let Err(err) = self.attach(gate) {
            self.close();
            return Err(err);
        }
        Ok(())
    }

    /// Registers the listeners and starts drawing for a freshly opened overlay.
    fn attach(&mut self, gate: FrameGate) -> Result<(), JsValue> {
        let window = dom::window()?;
        let canvas = self.canvas.clone();
        self.listeners.push(Listener::new(&window, "resize", move |_| {
            if let Err(err) = dom::fit_to_window(&canvas) {
                log::warn!("resize failed: {:?}", err);
            }
        })?);

        let pointer = self.pointer.clone();
        let canvas = self.canvas.clone();
        self.listeners.push(Listener::new(&window, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                let rect = canvas.get_bounding_client_rect();
                let width = rect.width().max(1.0);
                let height = rect.height().max(1.0);
                let x = ((event.client_x() as f64 - rect.left()) / width) * 2.0 - 1.0;
                let y = -((event.client_y() as f64 - rect.top()) / height) * 2.0 + 1.0;
                pointer.set(Some(Vec2::new(x as f32, y as f32)));
            }
        })?);

        if let Some(on_close) = self.on_close.clone() {
            self.listeners.push(Listener::new(&window, "keydown", move |event| {
                let escape = event
                    .dyn_ref::<KeyboardEvent>()
                    .is_some_and(|k| k.key() == "Escape");
                if escape {
                    if let Err(err) = on_close.call0(&JsValue::NULL) {
                        log::warn!("onClose callback failed: {:?}", err);
                    }
                }
            })?);
        }

        let overlay = self.overlay.clone();
        let pointer = self.pointer.clone();
        self.frame_loop = Some(FrameLoop::start(gate, move || {
            let Ok(mut overlay) = overlay.try_borrow_mut() else {
                return true;
            };
            match overlay.tick(pointer.get()) {
                Ok(running) => running,
                Err(err) => {
                    log::error!("frame failed, closing {}: {}", overlay.effect().title(), err);
                    overlay.close();
                    false
                }
            }
        })?);
        Ok(())
    }

    fn close(&mut self) {
        // Stop scheduling first, then detach listeners, then free GPU resources.
        self.frame_loop.take();
        self.listeners.clear();
        self.pointer.set(None);
        self.overlay.borrow_mut().close();
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), JsValue> {
        if visible {
            self.open()
        } else {
            self.close();
            Ok(())
        }
    }

    fn title(&self) -> String {
        self.overlay.borrow().effect().title().to_string()
    }
}

impl<E: Effect + 'static> Drop for ViewCore<E> {
    fn drop(&mut self) {
        self.close();
    }
}

macro_rules! view_lifecycle {
    ($view:ident) => {
        #[wasm_bindgen]
        impl $view {
            /// Opens the overlay: acquires the WebGL context and starts drawing.
            pub fn open(&mut self) -> Result<(), JsValue> {
                self.core.open()
            }

            /// Stops drawing and releases every GPU resource.
            pub fn close(&mut self) {
                self.core.close();
            }

            #[wasm_bindgen(js_name = setVisible)]
            pub fn set_visible(&mut self, visible: bool) -> Result<(), JsValue> {
                self.core.set_visible(visible)
            }

            /// Called when Escape is pressed while open.
            #[wasm_bindgen(js_name = setOnClose)]
            pub fn set_on_close(&mut self, callback: js_sys::Function) {
                self.core.on_close = Some(callback);
            }

            #[wasm_bindgen(getter, js_name = isOpen)]
            pub fn is_open(&self) -> bool {
                self.core.is_open()
            }

            #[wasm_bindgen(getter)]
            pub fn title(&self) -> String {
                self.core.title()
            }
        }
    };
}

#[wasm_bindgen]
pub struct GeometricArtView {
    core: ViewCore<GeometricArt>,
}

#[wasm_bindgen]
impl GeometricArtView {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<GeometricArtView, JsValue> {
        Ok(Self {
            core: ViewCore::new(canvas_id, GeometricArt::new(EffectConfig::default()))?,
        })
    }

    /// Applies the control panel values; any change regenerates the art.
    #[wasm_bindgen(js_name = setControls)]
    pub fn set_controls(
        &mut self,
        count: u32,
        pattern: &str,
        complexity: u32,
        hue: f32,
        size: f32,
        rotation_speed: f32,
    ) {
        let config =
            EffectConfig::from_controls(count, pattern, complexity, hue, size, rotation_speed);
        self.core.overlay.borrow_mut().effect_mut().set_config(config);
    }

    /// Regenerates with the current controls (new random rotations).
    pub fn regenerate(&mut self) {
        self.core.overlay.borrow_mut().effect_mut().rebuild();
    }

    /// The canvas as a PNG data URL, for saving as `geometric-art.png`.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self) -> Result<String, JsValue> {
        self.core.canvas.to_data_url_with_type("image/png")
    }
}

view_lifecycle!(GeometricArtView);

#[wasm_bindgen]
pub struct ParticleFieldView {
    core: ViewCore<ParticleField>,
}

#[wasm_bindgen]
impl ParticleFieldView {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<ParticleFieldView, JsValue> {
        Ok(Self {
            core: ViewCore::new(canvas_id, ParticleField::default())?,
        })
    }
}

view_lifecycle!(ParticleFieldView);

#[wasm_bindgen]
pub struct MotionReelView {
    core: ViewCore<MotionReel>,
}

#[wasm_bindgen]
impl MotionReelView {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<MotionReelView, JsValue> {
        Ok(Self {
            core: ViewCore::new(canvas_id, MotionReel::default())?,
        })
    }

    pub fn next(&mut self) {
        self.core.overlay.borrow_mut().effect_mut().navigate(|c| c.next());
    }

    pub fn previous(&mut self) {
        self.core
            .overlay
            .borrow_mut()
            .effect_mut()
            .navigate(|c| c.previous());
    }

    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, index: usize) -> Result<(), JsValue> {
        self.core
            .overlay
            .borrow_mut()
            .effect_mut()
            .navigate(|c| c.jump_to(index))
            .map_err(dom::to_js)
    }

    /// Returns whether the reel is playing afterwards.
    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&mut self) -> bool {
        self.core
            .overlay
            .borrow_mut()
            .effect_mut()
            .navigate(|c| c.toggle_play())
    }

    #[wasm_bindgen(getter, js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.core.overlay.borrow().effect().cycler().is_playing()
    }

    #[wasm_bindgen(getter, js_name = currentScene)]
    pub fn current_scene(&self) -> usize {
        self.core.overlay.borrow().effect().cycler().current()
    }

    #[wasm_bindgen(getter, js_name = sceneName)]
    pub fn scene_name(&self) -> String {
        let overlay = self.core.overlay.borrow();
        overlay.effect().cycler().scene().name().to_string()
    }

    #[wasm_bindgen(getter, js_name = sceneDescription)]
    pub fn scene_description(&self) -> String {
        let overlay = self.core.overlay.borrow();
        overlay.effect().cycler().scene().kind().description().to_string()
    }

    #[wasm_bindgen(getter, js_name = sceneCount)]
    pub fn scene_count(&self) -> usize {
        self.core.overlay.borrow().effect().cycler().len()
    }
}

view_lifecycle!(MotionReelView);

/// The page-wide animated background.
#[wasm_bindgen]
pub struct BackdropView {
    core: ViewCore<Backdrop>,
}

#[wasm_bindgen]
impl BackdropView {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<BackdropView, JsValue> {
        Ok(Self {
            core: ViewCore::new(canvas_id, Backdrop::default())?,
        })
    }
}

view_lifecycle!(BackdropView);
