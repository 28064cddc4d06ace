use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::dom;
use crate::overlay::FrameGate;
use crate::render::{
    Blending, Frame, Material, Renderer, ResourceHandle, ResourceKind, Vertex,
};
use crate::{Error, Result};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
layout(location = 2) in float a_size;
uniform mat4 u_view_projection;
uniform float u_pixel_scale;
out vec3 v_color;
void main() {
    vec4 clip = u_view_projection * vec4(a_position, 1.0);
    gl_Position = clip;
    gl_PointSize = max(1.0, a_size * u_pixel_scale / max(clip.w, 0.001));
    v_color = a_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
uniform float u_opacity;
out vec4 out_color;
void main() {
    vec2 c = gl_PointCoord - 0.5;
    if (dot(c, c) > 0.25) discard;
    out_color = vec4(v_color, u_opacity);
}
"#;

const STRIDE_BYTES: i32 = (Vertex::STRIDE * 4) as i32;

fn js_err(context: &str, err: JsValue) -> Error {
    Error::Render(format!("{context}: {err:?}"))
}

struct Context {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    u_view_projection: Option<WebGlUniformLocation>,
    u_pixel_scale: Option<WebGlUniformLocation>,
    u_opacity: Option<WebGlUniformLocation>,
}

struct Geometry {
    context: u64,
    buffer: WebGlBuffer,
    vao: WebGlVertexArrayObject,
}

/// WebGL2 point-sprite renderer.
#[derive(Default)]
pub struct WebGlRenderer {
    next_id: u64,
    contexts: HashMap<u64, Context>,
    geometries: HashMap<u64, Geometry>,
    materials: HashMap<u64, (u64, Material)>,
    // Reused upload buffer.
    floats: Vec<f32>,
}

impl WebGlRenderer {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }

    fn next(&mut self, kind: ResourceKind) -> ResourceHandle {
        self.next_id += 1;
        ResourceHandle::new(self.next_id, kind)
    }

    fn context(&self, handle: ResourceHandle) -> Result<&Context> {
        self.contexts
            .get(&handle.id())
            .ok_or_else(|| Error::Render(format!("unknown context {}", handle.id())))
    }
}

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| Error::Render("unable to create shader".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(Error::Render(format!("shader compile failed: {log}")))
    }
}

fn link(gl: &GL) -> Result<WebGlProgram> {
    let vertex = compile(gl, GL::VERTEX_SHADER, VERTEX_SHADER)?;
    let fragment = compile(gl, GL::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| Error::Render("unable to create program".into()))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);
    // Shaders are no longer needed once linked.
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));
    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(Error::Render(format!("program link failed: {log}")))
    }
}

impl Renderer for WebGlRenderer {
    type Target = HtmlCanvasElement;

    fn create_context(&mut self, canvas: &HtmlCanvasElement) -> Result<ResourceHandle> {
        // Keep the drawing buffer so the canvas can be exported as an image.
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &JsValue::from_str("preserveDrawingBuffer"), &JsValue::TRUE)
            .map_err(|e| js_err("context options", e))?;
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &options)
            .map_err(|e| js_err("getContext", e))?
            .ok_or_else(|| Error::Render("WebGL2 not supported".into()))?
            .dyn_into()
            .map_err(|_| Error::Render("not a WebGL2 context".into()))?;
        let program = link(&gl)?;
        let context = Context {
            u_view_projection: gl.get_uniform_location(&program, "u_view_projection"),
            u_pixel_scale: gl.get_uniform_location(&program, "u_pixel_scale"),
            u_opacity: gl.get_uniform_location(&program, "u_opacity"),
            gl,
            canvas: canvas.clone(),
            program,
        };
        let handle = self.next(ResourceKind::Context);
        self.contexts.insert(handle.id(), context);
        Ok(handle)
    }

    fn create_geometry(&mut self, context: ResourceHandle) -> Result<ResourceHandle> {
        let gl = &self.context(context)?.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| Error::Render("unable to create vertex array".into()))?;
        let Some(buffer) = gl.create_buffer() else {
            gl.delete_vertex_array(Some(&vao));
            return Err(Error::Render("unable to create buffer".into()));
        };
        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, STRIDE_BYTES, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 3, GL::FLOAT, false, STRIDE_BYTES, 12);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_with_i32(2, 1, GL::FLOAT, false, STRIDE_BYTES, 24);
        gl.bind_vertex_array(None);

        let handle = self.next(ResourceKind::Geometry);
        self.geometries.insert(
            handle.id(),
            Geometry {
                context: context.id(),
                buffer,
                vao,
            },
        );
        Ok(handle)
    }

    fn create_material(
        &mut self,
        context: ResourceHandle,
        material: &Material,
    ) -> Result<ResourceHandle> {
        self.context(context)?;
        let handle = self.next(ResourceKind::Material);
        self.materials.insert(handle.id(), (context.id(), *material));
        Ok(handle)
    }

    fn draw(&mut self, context: ResourceHandle, frame: &Frame<'_>) -> Result<()> {
        let ctx = self
            .contexts
            .get(&context.id())
            .ok_or_else(|| Error::Render(format!("unknown context {}", context.id())))?;
        let gl = &ctx.gl;
        let width = ctx.canvas.width() as f32;
        let height = ctx.canvas.height() as f32;
        gl.viewport(0, 0, width as i32, height as i32);
        let [r, g, b, a] = frame.clear;
        gl.clear_color(r, g, b, a);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        gl.use_program(Some(&ctx.program));
        let view_projection = frame.camera.view_projection(width / height.max(1.0));
        gl.uniform_matrix4fv_with_f32_array(
            ctx.u_view_projection.as_ref(),
            false,
            &view_projection.to_cols_array(),
        );
        gl.uniform1f(ctx.u_pixel_scale.as_ref(), frame.camera.pixel_scale(height));
        gl.enable(GL::BLEND);

        for call in frame.calls {
            let geometry = self
                .geometries
                .get(&call.geometry.id())
                .ok_or_else(|| Error::Render(format!("unknown geometry {}", call.geometry.id())))?;
            let (_, material) = self
                .materials
                .get(&call.material.id())
                .ok_or_else(|| Error::Render(format!("unknown material {}", call.material.id())))?;

            self.floats.clear();
            self.floats.extend(call.vertices.iter().flat_map(|v| {
                [
                    v.position[0],
                    v.position[1],
                    v.position[2],
                    v.color[0],
                    v.color[1],
                    v.color[2],
                    v.size,
                ]
            }));
            let data = js_sys::Float32Array::from(self.floats.as_slice());

            gl.bind_vertex_array(Some(&geometry.vao));
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&geometry.buffer));
            gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::DYNAMIC_DRAW);
            match material.blending {
                Blending::Normal => gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA),
                Blending::Additive => gl.blend_func(GL::SRC_ALPHA, GL::ONE),
            }
            gl.uniform1f(ctx.u_opacity.as_ref(), material.opacity);
            gl.draw_arrays(GL::POINTS, 0, call.vertices.len() as i32);
        }
        gl.bind_vertex_array(None);
        Ok(())
    }

    fn dispose(&mut self, handles: &[ResourceHandle]) {
        for handle in handles {
            match handle.kind() {
                ResourceKind::Geometry => {
                    if let Some(geometry) = self.geometries.remove(&handle.id()) {
                        if let Some(ctx) = self.contexts.get(&geometry.context) {
                            ctx.gl.delete_buffer(Some(&geometry.buffer));
                            ctx.gl.delete_vertex_array(Some(&geometry.vao));
                        }
                    }
                }
                ResourceKind::Material => {
                    self.materials.remove(&handle.id());
                }
                ResourceKind::Context => {
                    if let Some(ctx) = self.contexts.remove(&handle.id()) {
                        ctx.gl.delete_program(Some(&ctx.program));
                    }
                }
            }
        }
    }
}

/// `requestAnimationFrame` loop that stops when its gate closes or the tick
/// reports it is done. Dropping the loop stops it.
pub struct FrameLoop {
    gate: FrameGate,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn start(
        gate: FrameGate,
        mut tick: impl FnMut() -> bool + 'static,
    ) -> std::result::Result<Self, JsValue> {
        // `f` holds the frame closure so it can reschedule itself.
        let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();
        let pending = Rc::new(Cell::new(None));
        let frame_pending = pending.clone();
        let frame_gate = gate.clone();

        *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            frame_pending.set(None);
            if !frame_gate.is_open() || !tick() {
                return;
            }
            let next = dom::window().and_then(|w| match f.borrow().as_ref() {
                Some(callback) => w.request_animation_frame(callback.as_ref().unchecked_ref()),
                None => Err(JsValue::from_str("frame loop stopped")),
            });
            match next {
                Ok(id) => frame_pending.set(Some(id)),
                Err(err) => log::error!("failed to schedule frame: {:?}", err),
            }
        }) as Box<dyn FnMut()>));

        let id = match g.borrow().as_ref() {
            Some(callback) => {
                dom::window()?.request_animation_frame(callback.as_ref().unchecked_ref())?
            }
            None => return Err(JsValue::from_str("frame loop not initialised")),
        };
        pending.set(Some(id));

        Ok(Self {
            gate,
            callback: g,
            pending,
        })
    }

    pub fn stop(&mut self) {
        self.gate.cancel();
        if let Some(id) = self.pending.take() {
            if let Ok(window) = dom::window() {
                window.cancel_animation_frame(id).ok();
            }
        }
        // Breaks the closure's reference to itself.
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
