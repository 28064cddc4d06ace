#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

pub mod chat;
pub mod contact;
pub mod effects;
pub mod error;
pub mod overlay;
pub mod render;

#[cfg(not(target_arch = "wasm32"))]
pub mod config;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;

pub use error::{Error, Result};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod chat_widget;
    mod contact_form;
    mod dom;
    mod render;
    mod views;

    pub use chat_widget::ChatWidget;
    pub use contact_form::ContactClient;
    pub use views::{BackdropView, GeometricArtView, MotionReelView, ParticleFieldView};

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        // The backdrop lives for the whole page; overlays are created by the page script.
        if dom::element_exists("backdrop") {
            let mut backdrop = BackdropView::new("backdrop")?;
            backdrop.open()?;
            std::mem::forget(backdrop);
        }
        tracing::info!("terrigraphic front end started");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{
    BackdropView, ChatWidget, ContactClient, GeometricArtView, MotionReelView, ParticleFieldView,
};
