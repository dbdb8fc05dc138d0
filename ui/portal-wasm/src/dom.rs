//! DOM element bindings.
//!
//! All fields are resolved once at startup. To add new UI elements, add a
//! field here and bind it in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    if el.value() != val {
        el.set_value(val);
    }
}

/// Shows or hides an element through the `hidden` class.
pub fn show(el: &Element, visible: bool) {
    let _ = el.class_list().toggle_with_force("hidden", !visible);
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document().create_element(tag)
}

pub fn clear_children(el: &Element) {
    el.set_inner_html("");
}

pub fn alert(message: &str) {
    let _ = gloo_utils::window().alert_with_message(message);
}

// ── Elements struct ──

/// All DOM element references used by the portal page.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    pub connect_btn: HtmlElement,
    pub connected_container: Element,
    pub wallet_address: Element,

    pub loading: Element,

    pub initialize_panel: Element,
    pub initialize_btn: HtmlElement,

    pub unavailable_panel: Element,
    pub unavailable_reason: Element,
    pub retry_btn: HtmlElement,

    pub gallery_panel: Element,
    pub gif_form: Element,
    pub gif_input: HtmlInputElement,
    pub gif_grid: Element,
}

macro_rules! get_el {
    ($id:expr) => {
        by_id($id).ok_or_else(|| JsValue::from_str(&format!("missing element #{}", $id)))?
    };
}

macro_rules! get_input {
    ($id:expr) => {
        by_id_typed::<HtmlInputElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing input #{}", $id)))?
    };
}

macro_rules! get_html {
    ($id:expr) => {
        by_id_typed::<HtmlElement>($id)
            .ok_or_else(|| JsValue::from_str(&format!("missing html element #{}", $id)))?
    };
}

impl Elements {
    /// Resolve all DOM references. Call once after the module starts.
    pub fn bind() -> Result<Elements, JsValue> {
        Ok(Elements {
            connect_btn: get_html!("connectBtn"),
            connected_container: get_el!("connectedContainer"),
            wallet_address: get_el!("walletAddress"),

            loading: get_el!("loadingPanel"),

            initialize_panel: get_el!("initializePanel"),
            initialize_btn: get_html!("initializeBtn"),

            unavailable_panel: get_el!("unavailablePanel"),
            unavailable_reason: get_el!("unavailableReason"),
            retry_btn: get_html!("retryBtn"),

            gallery_panel: get_el!("galleryPanel"),
            gif_form: get_el!("gifForm"),
            gif_input: get_input!("gifInput"),
            gif_grid: get_el!("gifGrid"),
        })
    }
}
