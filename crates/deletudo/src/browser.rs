//! Browser bindings: the content-script entry point.
//!
//! [`WebDom`] implements [`Dom`] over `web-sys`, and [`start`] installs one
//! document-level keydown listener that feeds every key-press through a
//! [`KeyPressCoordinator`].

use js_sys::Array;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, FocusEvent, FocusEventInit, HtmlElement, KeyboardEvent, MouseEvent,
    MouseEventInit, ShadowRoot, Window,
};

use crate::config::DeleteConfig;
use crate::context::PageContext;
use crate::dom::Dom;
use crate::event::{BoundingBox, SyntheticEvent, SyntheticEventKind};
use crate::keypress::{KeyPress, KeyPressCoordinator, KeyTarget, Modifiers};
use crate::logging::init_logging;
use crate::result::{DeletudoError, DeletudoResult};
use crate::selector::Selector;

/// Searchable root in the live page
#[derive(Debug, Clone, PartialEq)]
pub enum WebRoot {
    /// The page document
    Document(Document),
    /// An open shadow root
    Shadow(ShadowRoot),
}

impl WebRoot {
    fn query_selector(&self, pattern: &str) -> Result<Option<Element>, JsValue> {
        match self {
            Self::Document(document) => document.query_selector(pattern),
            Self::Shadow(shadow) => shadow.query_selector(pattern),
        }
    }

    fn all_elements(&self) -> Result<web_sys::NodeList, JsValue> {
        match self {
            Self::Document(document) => document.query_selector_all("*"),
            Self::Shadow(shadow) => shadow.query_selector_all("*"),
        }
    }
}

/// [`Dom`] over the live page
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDom;

impl Dom for WebDom {
    type Root = WebRoot;
    type Element = Element;

    fn document(&self) -> DeletudoResult<WebRoot> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(WebRoot::Document)
            .ok_or(DeletudoError::NoDocument)
    }

    fn query(&self, root: &WebRoot, selector: &Selector) -> DeletudoResult<Option<Element>> {
        root.query_selector(selector.as_str())
            .map_err(|err| DeletudoError::invalid_selector(selector.as_str(), js_message(&err)))
    }

    fn shadow_roots(&self, root: &WebRoot) -> DeletudoResult<Vec<WebRoot>> {
        let nodes = root
            .all_elements()
            .map_err(|err| DeletudoError::js(js_message(&err)))?;
        let roots = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|element| element.shadow_root())
            .map(WebRoot::Shadow)
            .collect();
        Ok(roots)
    }

    fn bounding_box(&self, element: &Element) -> DeletudoResult<BoundingBox> {
        if !element.is_connected() {
            return Err(DeletudoError::detached(self.describe(element)));
        }
        let rect = element.get_bounding_client_rect();
        Ok(BoundingBox::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn first_element_child(&self, element: &Element) -> Option<Element> {
        element.first_element_child()
    }

    fn dispatch(&self, element: &Element, event: &SyntheticEvent) -> DeletudoResult<bool> {
        let kind = event.dom_type();
        let dom_event = build_event(event)
            .map_err(|err| DeletudoError::dispatch(kind, js_message(&err)))?;
        element
            .dispatch_event(&dom_event)
            .map_err(|err| DeletudoError::dispatch(kind, js_message(&err)))
    }

    fn native_click(&self, element: &Element) -> DeletudoResult<bool> {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => {
                html.click();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn describe(&self, element: &Element) -> String {
        let mut label = element.tag_name().to_ascii_lowercase();
        let id = element.id();
        if !id.is_empty() {
            label.push('#');
            label.push_str(&id);
        }
        for class in element.class_name().split_whitespace() {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}

#[allow(clippy::cast_possible_truncation)]
fn build_event(event: &SyntheticEvent) -> Result<Event, JsValue> {
    let kind = event.dom_type();
    if event.kind == SyntheticEventKind::FocusIn {
        let init = FocusEventInit::new();
        init.set_bubbles(event.bubbles);
        init.set_cancelable(event.cancelable);
        return FocusEvent::new_with_focus_event_init_dict(kind, &init).map(Into::into);
    }

    let init = MouseEventInit::new();
    init.set_bubbles(event.bubbles);
    init.set_cancelable(event.cancelable);
    if let Some(window) = web_sys::window() {
        init.set_view(Some(&window));
    }
    if let Some(point) = event.client {
        // MouseEventInit coordinates are integral CSS pixels
        init.set_client_x(point.x.round() as i32);
        init.set_client_y(point.y.round() as i32);
    }
    MouseEvent::new_with_mouse_event_init_dict(kind, &init).map(Into::into)
}

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

fn element_target(element: &Element) -> KeyTarget {
    let editable = element
        .dyn_ref::<HtmlElement>()
        .is_some_and(HtmlElement::is_content_editable);
    let target = KeyTarget::new(element.tag_name());
    if editable {
        target.editable()
    } else {
        target
    }
}

fn key_target(event: &KeyboardEvent) -> KeyTarget {
    let path: Array = event.composed_path();
    let head = path
        .iter()
        .map(|node| node.dyn_into::<Element>().ok().map(|el| element_target(&el)));
    let retargeted = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .map(|el| element_target(&el));
    KeyTarget::from_composed_path(head, retargeted)
}

fn on_keydown(coordinator: &KeyPressCoordinator, window: &Window, event: &KeyboardEvent) {
    let location = window.location();
    let page = PageContext::new(
        location.hostname().unwrap_or_default(),
        location.hash().unwrap_or_default(),
    );
    let key = KeyPress::new(event.key(), key_target(event)).with_modifiers(Modifiers {
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    });
    coordinator.handle(&WebDom, &page, &key, || event.prevent_default());
}

fn install_listener(window: Window, document: &Document, coordinator: KeyPressCoordinator) {
    let handler = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        on_keydown(&coordinator, &window, &event);
    }) as Box<dyn FnMut(KeyboardEvent)>);

    match document.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref()) {
        Ok(()) => info!("delete key handler initialized"),
        Err(err) => error!(error = %js_message(&err), "failed to install keydown listener"),
    }
    // lives as long as the page
    handler.forget();
}

/// Content-script entry point.
///
/// Installs the keydown listener right away, or once `DOMContentLoaded`
/// fires when the document is still loading.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let config = DeleteConfig::default();
    init_logging(&config.log_level);

    let coordinator =
        KeyPressCoordinator::from_config(&config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let target = document.clone();
        let on_ready = Closure::once(move || install_listener(window, &target, coordinator));
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            on_ready.as_ref().unchecked_ref(),
        )?;
        on_ready.forget();
    } else {
        install_listener(window, &document, coordinator);
    }
    Ok(())
}
