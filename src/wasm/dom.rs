use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, Window};

use crate::Error;

pub fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

pub fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub fn element_exists(id: &str) -> bool {
    document()
        .ok()
        .and_then(|d| d.get_element_by_id(id))
        .is_some()
}

pub fn canvas_by_id(id: &str) -> Result<HtmlCanvasElement, JsValue> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("canvas #{id} not found")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not a canvas")))
}

/// Sizes the canvas drawing buffer to the window.
pub fn fit_to_window(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let window = window()?;
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    canvas.set_width(width.max(1.0) as u32);
    canvas.set_height(height.max(1.0) as u32);
    Ok(())
}

pub fn to_js(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// An event listener that is removed when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {:?}", self.event, err);
        }
    }
}
