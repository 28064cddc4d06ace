use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::dom;
use crate::contact::{ContactForm, ContactFormState, ContactResponse, Field, SubmitStatus};
use crate::{Error, Result};

/// Contact form bound to the relay at `endpoint`.
#[wasm_bindgen]
pub struct ContactClient {
    endpoint: String,
    state: Rc<RefCell<ContactFormState>>,
}

#[wasm_bindgen]
impl ContactClient {
    #[wasm_bindgen(constructor)]
    pub fn new(endpoint: Option<String>) -> ContactClient {
        Self {
            endpoint: endpoint.unwrap_or_else(|| "/api/contact".to_string()),
            state: Rc::new(RefCell::new(ContactFormState::new())),
        }
    }

    /// Sets a field by its input name and clears that field's error.
    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, name: &str, value: &str) -> std::result::Result<(), JsValue> {
        let field = Field::from_name(name)
            .ok_or_else(|| JsValue::from_str(&format!("unknown field {name}")))?;
        self.state.borrow_mut().set_field(field, value);
        Ok(())
    }

    /// Validation message for a field, if any.
    pub fn error(&self, name: &str) -> Option<String> {
        let field = Field::from_name(name)?;
        self.state.borrow().errors().get(field).map(str::to_string)
    }

    pub fn value(&self, name: &str) -> Option<String> {
        let field = Field::from_name(name)?;
        Some(self.state.borrow().form().field(field).to_string())
    }

    #[wasm_bindgen(getter, js_name = isSubmitting)]
    pub fn is_submitting(&self) -> bool {
        self.state.borrow().is_submitting()
    }

    #[wasm_bindgen(getter)]
    pub fn banner(&self) -> Option<String> {
        self.state.borrow().status().banner().map(str::to_string)
    }

    /// Validates and posts the form. The promise resolves to `"invalid"`,
    /// `"success"` or `"error"`.
    pub fn submit(&mut self) -> std::result::Result<js_sys::Promise, JsValue> {
        let payload = self.state.borrow_mut().begin_submit().map_err(dom::to_js)?;
        let Some(payload) = payload else {
            return Ok(js_sys::Promise::resolve(&JsValue::from_str("invalid")));
        };

        let state = self.state.clone();
        let endpoint = self.endpoint.clone();
        Ok(future_to_promise(async move {
            let outcome = post(&endpoint, &payload).await;
            let status = state.borrow_mut().finish_submit(outcome);
            Ok(JsValue::from_str(match status {
                SubmitStatus::Success => "success",
                SubmitStatus::Error => "error",
                SubmitStatus::Idle => "idle",
            }))
        }))
    }
}

async fn post(endpoint: &str, form: &ContactForm) -> Result<ContactResponse> {
    let contact_err = |e: JsValue| Error::Contact(format!("{e:?}"));
    let body = serde_json::to_string(form).map_err(|e| Error::Contact(e.to_string()))?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::SameOrigin);
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(endpoint, &init).map_err(contact_err)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(contact_err)?;

    let window = dom::window().map_err(contact_err)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(contact_err)?
        .dyn_into()
        .map_err(contact_err)?;
    let text = JsFuture::from(response.text().map_err(contact_err)?)
        .await
        .map_err(contact_err)?
        .as_string()
        .unwrap_or_default();

    serde_json::from_str(&text).map_err(|e| {
        Error::Contact(format!("relay answered {} with unreadable body: {e}", response.status()))
    })
}
