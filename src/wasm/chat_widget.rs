use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::dom;
use crate::chat::Chatbot;

/// Chat panel state exposed to the page.
#[wasm_bindgen]
pub struct ChatWidget {
    bot: Rc<RefCell<Chatbot>>,
    timer: Rc<Cell<Option<i32>>>,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ChatWidget {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ChatWidget {
        Self {
            bot: Rc::new(RefCell::new(Chatbot::default())),
            timer: Rc::new(Cell::new(None)),
        }
    }

    /// Sends `text`. `on_reply` is called with the bot's reply text once the
    /// typing delay has passed.
    pub fn send(&mut self, text: &str, on_reply: js_sys::Function) -> Result<(), JsValue> {
        let delay = self
            .bot
            .borrow_mut()
            .send(text, Utc::now())
            .map_err(dom::to_js)?;

        let bot = self.bot.clone();
        let timer = self.timer.clone();
        let deliver = Closure::once_into_js(move || {
            timer.set(None);
            let reply = bot.borrow_mut().deliver(Utc::now()).map(|m| m.text.clone());
            if let Some(reply) = reply {
                if let Err(err) = on_reply.call1(&JsValue::NULL, &JsValue::from_str(&reply)) {
                    log::warn!("chat reply callback failed: {:?}", err);
                }
            }
        });
        let id = dom::window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            deliver.unchecked_ref(),
            delay.as_millis() as i32,
        )?;
        self.timer.set(Some(id));
        Ok(())
    }

    #[wasm_bindgen(getter, js_name = isTyping)]
    pub fn is_typing(&self) -> bool {
        self.bot.borrow().is_typing()
    }

    #[wasm_bindgen(js_name = quickActions)]
    pub fn quick_actions(&self) -> js_sys::Array {
        self.bot
            .borrow()
            .quick_actions()
            .iter()
            .map(|a| JsValue::from_str(a))
            .collect()
    }

    /// The transcript as a JSON array of `{id, text, sender, timestamp}`.
    pub fn messages(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.bot.borrow().transcript().messages())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        if let (Some(id), Ok(window)) = (self.timer.take(), dom::window()) {
            window.clear_timeout_with_handle(id);
        }
    }
}
