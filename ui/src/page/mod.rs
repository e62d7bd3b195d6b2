//! The document seam.
//!
//! Everything that reads or mutates markup goes through [`Page`], so the
//! loader and the language switcher run unchanged against the live browser
//! document ([`WebPage`], wasm only) and against the in-memory model used by
//! tests and headless hosts ([`MemoryPage`]).

mod memory;
pub use memory::{MemoryPage, NodeId};

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::WebPage;

/// Minimal DOM surface the site runtime relies on.
///
/// Queries return elements in document order.
pub trait Page {
    /// Handle to an element; cheap to clone.
    type Node: Clone;

    fn elements_with_attr(&self, attr: &str) -> Vec<Self::Node>;
    fn elements_with_class(&self, class: &str) -> Vec<Self::Node>;
    fn elements_by_tag(&self, tag: &str) -> Vec<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// Concatenated text of the element and its descendants.
    fn text(&self, node: &Self::Node) -> String;

    /// Replace the element's children with a single text node.
    fn set_text(&mut self, node: &Self::Node, text: &str);
    /// Replace the element's children with parsed markup.
    fn set_inner_html(&mut self, node: &Self::Node, html: &str);
    fn set_class(&mut self, node: &Self::Node, class: &str, enabled: bool);
    /// Set the `lang` attribute of the document root.
    fn set_document_lang(&mut self, tag: &str);

    fn first_with_attr(&self, attr: &str) -> Option<Self::Node> {
        self.elements_with_attr(attr).into_iter().next()
    }

    fn first_with_class(&self, class: &str) -> Option<Self::Node> {
        self.elements_with_class(class).into_iter().next()
    }
}
