#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use terrigraphic::{
    ChatWidget, ContactClient, GeometricArtView, MotionReelView, ParticleFieldView,
};

wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    if document.get_element_by_id(id).is_none() {
        let canvas = document
            .create_element("canvas")
            .unwrap()
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .unwrap();
        canvas.set_id(id);
        document.body().unwrap().append_child(&canvas).unwrap();
    }
}

#[wasm_bindgen_test]
fn overlay_reopens_on_same_canvas() {
    mount_canvas("art-canvas");
    let mut view = GeometricArtView::new("art-canvas").unwrap();
    for _ in 0..10 {
        view.open().unwrap();
        assert!(view.is_open());
        view.close();
        assert!(!view.is_open());
    }
    assert_eq!(view.title(), "Geometric Art Generator");
}

#[wasm_bindgen_test]
fn reel_rejects_bad_jump() {
    mount_canvas("reel-canvas");
    let mut reel = MotionReelView::new("reel-canvas").unwrap();
    assert!(reel.jump_to(7).is_err());
    reel.jump_to(3).unwrap();
    assert_eq!(reel.scene_name(), "Color Transitions");
}

#[wasm_bindgen_test]
fn chat_refuses_blank_input() {
    let mut chat = ChatWidget::new();
    assert!(chat.send("  ", js_sys::Function::new_no_args("")).is_err());
    assert_eq!(chat.quick_actions().length(), 4);
}

#[wasm_bindgen_test]
fn contact_reports_required_fields() {
    let mut contact = ContactClient::new(None);
    contact.submit().unwrap();
    assert_eq!(contact.error("fullName").as_deref(), Some("Full name is required"));
    contact.set_field("fullName", "Ada").unwrap();
    assert_eq!(contact.error("fullName"), None);
}

#[wasm_bindgen_test]
fn failed_open_leaves_view_closed() {
    mount_canvas("taken-canvas");
    let canvas = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id("taken-canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    // A canvas holding a 2D context cannot hand out WebGL2.
    canvas.get_context("2d").unwrap();

    let mut view = ParticleFieldView::new("taken-canvas").unwrap();
    assert!(view.open().is_err());
    assert!(!view.is_open());
    // Not stuck half-open: a second attempt tries again and fails the same way.
    assert!(view.open().is_err());
    assert!(!view.is_open());
}
