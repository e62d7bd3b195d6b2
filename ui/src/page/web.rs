use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use super::Page;

/// The live browser document.
#[derive(Debug, Clone)]
pub struct WebPage {
    document: Document,
}

impl WebPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the current window, if any.
    pub fn current() -> Option<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// `querySelectorAll` collected into elements; an invalid selector yields nothing.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            tracing::debug!(selector, "selector rejected by the browser");
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl Page for WebPage {
    type Node = Element;

    fn elements_with_attr(&self, attr: &str) -> Vec<Element> {
        self.query_all(&format!("[{attr}]"))
    }

    fn elements_with_class(&self, class: &str) -> Vec<Element> {
        self.query_all(&format!(".{class}"))
    }

    fn elements_by_tag(&self, tag: &str) -> Vec<Element> {
        self.query_all(tag)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn attr(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_inner_html(&mut self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn set_class(&mut self, node: &Element, class: &str, enabled: bool) {
        let classes = node.class_list();
        let result = if enabled {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if result.is_err() {
            tracing::debug!(class, "class list rejected token");
        }
    }

    fn set_document_lang(&mut self, tag: &str) {
        if let Some(root) = self.document.document_element() {
            if root.set_attribute("lang", tag).is_err() {
                tracing::debug!(tag, "could not set document language");
            }
        }
    }
}
