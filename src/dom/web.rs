//! Browser document backend over `web-sys`
//!
//! Visibility is written as inline `display: block` / `display: none`, the
//! submission name through the `name` attribute. A radio driver stands for
//! its whole group: it reads the checked radio of that name and listens on
//! every one of them.

use super::traits::{ChangeEvents, ChangeListener, FormDocument};
use crate::controller::VisibilityController;
use crate::pages;
use crate::rules::RulesFile;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement};

/// A handle to the live page document
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the current window, if running in a browser page
    pub fn from_window() -> Option<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn checked_radio_value(&self, radio: &HtmlInputElement) -> String {
        let name = radio.name();
        if name.is_empty() {
            return if radio.checked() {
                radio.value()
            } else {
                String::new()
            };
        }
        self.document
            .query_selector(&format!("{}:checked", radio_selector(&name)))
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    /// Elements whose `change` event means `element`'s value changed
    fn change_targets(&self, element: Element) -> Vec<Element> {
        let group = element
            .dyn_ref::<HtmlInputElement>()
            .filter(|input| is_radio(input))
            .map(HtmlInputElement::name)
            .filter(|name| !name.is_empty());
        let Some(name) = group else {
            return vec![element];
        };

        match self.document.query_selector_all(&radio_selector(&name)) {
            Ok(radios) => (0..radios.length())
                .filter_map(|i| radios.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect(),
            Err(err) => {
                tracing::warn!("cannot find radios named `{name}`: {err:?}");
                vec![element]
            }
        }
    }
}

fn is_radio(input: &HtmlInputElement) -> bool {
    input.type_().eq_ignore_ascii_case("radio")
}

fn radio_selector(name: &str) -> String {
    let name = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("input[type=\"radio\"][name=\"{name}\"]")
}

impl FormDocument for WebDocument {
    fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    fn value(&self, id: &str) -> Option<String> {
        let element = self.element(id)?;
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            if is_radio(input) {
                return Some(self.checked_radio_value(input));
            }
            return Some(input.value());
        }
        element.get_attribute("value")
    }

    fn set_displayed(&mut self, id: &str, displayed: bool) {
        let Some(element) = self
            .element(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            tracing::warn!("cannot set display on `{id}`: not an HTML element in the page");
            return;
        };
        let display = if displayed { "block" } else { "none" };
        if let Err(err) = element.style().set_property("display", display) {
            tracing::warn!("failed to set display on `{id}`: {err:?}");
        }
    }

    fn set_name(&mut self, id: &str, name: &str) {
        let Some(element) = self.element(id) else {
            tracing::warn!("cannot set name on missing element `{id}`");
            return;
        };
        if let Err(err) = element.set_attribute("name", name) {
            tracing::warn!("failed to set name on `{id}`: {err:?}");
        }
    }
}

impl ChangeEvents for WebDocument {
    fn listen(&mut self, id: &str, mut listener: ChangeListener) {
        let Some(element) = self.element(id) else {
            tracing::warn!("cannot listen on missing element `{id}`");
            return;
        };

        let document = self.document.clone();
        let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            let mut page = WebDocument::new(document.clone());
            let page: &mut dyn FormDocument = &mut page;
            listener(page);
        });

        let mut bound = false;
        for target in self.change_targets(element) {
            match target.add_event_listener_with_callback("change", callback.as_ref().unchecked_ref())
            {
                Ok(()) => bound = true,
                Err(err) => tracing::warn!("failed to listen on `{id}`: {err:?}"),
            }
        }
        // The listener lives as long as the page
        if bound {
            callback.forget();
        }
    }
}

fn page_document() -> Result<WebDocument, JsValue> {
    WebDocument::from_window().ok_or_else(|| JsValue::from_str("no document in this context"))
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Bind one of the built-in pages to the current document.
///
/// Throws if the page is unknown or the markup lacks a referenced control.
#[wasm_bindgen(js_name = bindPage)]
pub fn bind_page(page: &str) -> Result<(), JsValue> {
    let pages = pages::builtin().map_err(js_error)?;
    let page = pages
        .get(page)
        .ok_or_else(|| JsValue::from_str(&format!("unknown page `{page}`")))?;

    let mut document = page_document()?;
    VisibilityController::initialize(&mut document, page.driver.clone(), page.rules.clone())
        .map_err(js_error)?;
    Ok(())
}

/// Bind a page declared in a JSON rules file to the current document
#[wasm_bindgen(js_name = bindRules)]
pub fn bind_rules(rules_json: &str, page: &str) -> Result<(), JsValue> {
    let file = RulesFile::from_json(rules_json).map_err(js_error)?;
    let pages = file.build().map_err(js_error)?;
    let page = pages
        .into_iter()
        .find(|p| p.name == page)
        .ok_or_else(|| JsValue::from_str(&format!("page `{page}` not in rules")))?;

    let mut document = page_document()?;
    VisibilityController::initialize(&mut document, page.driver, page.rules).map_err(js_error)?;
    Ok(())
}
