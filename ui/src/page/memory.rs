use std::borrow::Cow;

use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Page;
use crate::error::MarkupError;

/// Elements HTML never closes.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const DOCUMENT: NodeId = NodeId(0);
/// Detached holder every parse builds into before its children are moved out.
const SCRATCH: NodeId = NodeId(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
enum Child {
    Element(NodeId),
    Text(String),
    /// Markup the parser rejected, kept verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

impl Element {
    fn new(tag: impl Into<String>, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag: tag.into(),
            attrs,
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// An in-memory document for tests and headless hosts.
///
/// Markup is parsed with `quick-xml` in a lenient mode: end-tag names are not
/// checked and HTML void elements never take children. Elements detached by
/// [`Page::set_text`] or [`Page::set_inner_html`] stay in the arena but are no
/// longer reachable from queries, so the arena only grows by the elements each
/// new fragment brings.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    elements: Vec<Element>,
}

impl MemoryPage {
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let mut page = Self {
            elements: vec![
                Element::new("#document", Vec::new()),
                Element::new("#fragment", Vec::new()),
            ],
        };
        let children = page.parse_children(markup)?;
        page.elements[DOCUMENT.0].children = children;
        Ok(page)
    }

    /// The `<html>` element, or the document itself for bare fragments.
    pub fn root(&self) -> NodeId {
        self.walk()
            .into_iter()
            .find(|id| self.element(*id).tag == "html")
            .unwrap_or(DOCUMENT)
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.element(node).tag
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).has_class(class)
    }

    pub fn document_lang(&self) -> Option<String> {
        self.element(self.root()).attr("lang").map(str::to_string)
    }

    /// Serialize the element's children back to markup.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_children(node, &mut out);
        out
    }

    fn element(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.elements[id.0]
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    /// Attached elements in document order.
    fn walk(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![DOCUMENT];
        while let Some(id) = stack.pop() {
            if id != DOCUMENT {
                out.push(id);
            }
            for child in self.element(id).children.iter().rev() {
                if let Child::Element(child) = child {
                    stack.push(*child);
                }
            }
        }
        out
    }

    fn parse_children(&mut self, markup: &str) -> Result<Vec<Child>, MarkupError> {
        let holder = SCRATCH;
        self.element_mut(holder).children.clear();
        let mut reader = Reader::from_str(markup);
        reader.config_mut().check_end_names = false;

        let mut open = vec![holder];
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(MarkupError::Xml {
                        position: reader.buffer_position() as u64,
                        source,
                    })
                }
            };
            let parent = open.last().copied().unwrap_or(holder);
            match event {
                Event::Start(start) => {
                    let id = self.open_element(&start);
                    self.element_mut(parent).children.push(Child::Element(id));
                    if !is_void(&self.element(id).tag) {
                        open.push(id);
                    }
                }
                Event::Empty(start) => {
                    let id = self.open_element(&start);
                    self.element_mut(parent).children.push(Child::Element(id));
                }
                Event::End(end) => {
                    let name = lowercase(end.name().as_ref());
                    let matched = open
                        .iter()
                        .rposition(|id| *id != holder && self.element(*id).tag == name);
                    if let Some(pos) = matched {
                        open.truncate(pos);
                    }
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    self.push_text(parent, value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    self.push_text(parent, value);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(std::mem::take(&mut self.element_mut(holder).children))
    }

    fn open_element(&mut self, start: &BytesStart<'_>) -> NodeId {
        let tag = lowercase(start.name().as_ref());
        let attrs = start
            .html_attributes()
            .flatten()
            .map(|attr| {
                let key = lowercase(attr.key.as_ref());
                let value = attr
                    .unescape_value()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                (key, value)
            })
            .collect();
        self.alloc(Element::new(tag, attrs))
    }

    fn push_text(&mut self, parent: NodeId, value: String) {
        if value.is_empty() {
            return;
        }
        let children = &mut self.element_mut(parent).children;
        match children.last_mut() {
            Some(Child::Text(existing)) => existing.push_str(&value),
            _ => children.push(Child::Text(value)),
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for child in &self.element(id).children {
            match child {
                Child::Text(text) | Child::Raw(text) => out.push_str(text),
                Child::Element(child) => self.collect_text(*child, out),
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for child in &self.element(id).children {
            match child {
                Child::Text(text) => out.push_str(&partial_escape(text.as_str())),
                Child::Raw(raw) => out.push_str(raw),
                Child::Element(child) => self.write_element(*child, out),
            }
        }
    }

    fn write_element(&self, id: NodeId, out: &mut String) {
        let element = self.element(id);
        out.push('<');
        out.push_str(&element.tag);
        for (key, value) in &element.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        out.push('>');
        if is_void(&element.tag) {
            return;
        }
        self.write_children(id, out);
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

impl Page for MemoryPage {
    type Node = NodeId;

    fn elements_with_attr(&self, attr: &str) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|id| self.element(*id).attr(attr).is_some())
            .collect()
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.walk()
            .into_iter()
            .filter(|id| self.element(*id).has_class(class))
            .collect()
    }

    fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.walk()
            .into_iter()
            .filter(|id| self.element(*id).tag == tag)
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.walk()
            .into_iter()
            .find(|node| self.element(*node).attr("id") == Some(id))
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(*node).attr(name).map(str::to_string)
    }

    fn text(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        out
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        let children = if text.is_empty() {
            Vec::new()
        } else {
            vec![Child::Text(text.to_string())]
        };
        self.element_mut(*node).children = children;
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) {
        let children = match self.parse_children(html) {
            Ok(children) => children,
            Err(err) => {
                tracing::debug!(%err, "keeping unparsed markup verbatim");
                vec![Child::Raw(html.to_string())]
            }
        };
        self.element_mut(*node).children = children;
    }

    fn set_class(&mut self, node: &NodeId, class: &str, enabled: bool) {
        let element = self.element_mut(*node);
        if !enabled && !element.has_class(class) {
            return;
        }
        let mut classes: Vec<String> = element
            .attr("class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if enabled {
            classes.push(class.to_string());
        }
        element.set_attr("class", classes.join(" "));
    }

    fn set_document_lang(&mut self, tag: &str) {
        let root = self.root();
        self.element_mut(root).set_attr("lang", tag.to_string());
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn lowercase(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title data-i18n="meta.title">Old title</title>
  </head>
  <body>
    <div data-shared-header></div>
    <h1 id="hero" class="hero-title big" data-i18n="hero.title">Hello</h1>
    <p>Intro <strong data-i18n="hero.eyebrow">Agency</strong> text</p>
    <div data-shared-footer="">fallback</div>
  </body>
</html>"#;

    #[test]
    fn queries_follow_document_order() {
        let page = MemoryPage::parse(DOC).unwrap();
        let bound = page.elements_with_attr("data-i18n");
        let keys: Vec<_> = bound
            .iter()
            .filter_map(|node| page.attr(node, "data-i18n"))
            .collect();
        assert_eq!(keys, vec!["meta.title", "hero.title", "hero.eyebrow"]);

        let hero = page.element_by_id("hero").unwrap();
        assert_eq!(page.tag(hero), "h1");
        assert_eq!(page.elements_with_class("big"), vec![hero]);
        assert_eq!(page.elements_by_tag("TITLE").len(), 1);
        assert!(page.first_with_attr("data-shared-header").is_some());
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let page = MemoryPage::parse(r#"<p>a<br>b</p><span class="x">c</span>"#).unwrap();
        let p = page.elements_by_tag("p")[0];
        assert_eq!(page.inner_html(p), "a<br>b");
        let span = page.first_with_class("x").unwrap();
        assert_eq!(page.text(&span), "c");
    }

    #[test]
    fn valueless_and_unquoted_attributes_parse() {
        let page = MemoryPage::parse("<input id=name required>").unwrap();
        let input = page.element_by_id("name").unwrap();
        assert_eq!(page.attr(&input, "required").as_deref(), Some(""));
    }

    #[test]
    fn inner_html_splices_queryable_elements() {
        let mut page = MemoryPage::parse(DOC).unwrap();
        let mount = page.first_with_attr("data-shared-header").unwrap();
        page.set_inner_html(
            &mount,
            r#"<nav><button class="lang-button" data-lang="fr">FR</button></nav>"#,
        );
        let buttons = page.elements_with_class("lang-button");
        assert_eq!(buttons.len(), 1);
        assert_eq!(page.attr(&buttons[0], "data-lang").as_deref(), Some("fr"));
        assert_eq!(
            page.inner_html(mount),
            r#"<nav><button class="lang-button" data-lang="fr">FR</button></nav>"#
        );
    }

    #[test]
    fn reparsing_text_does_not_grow_the_arena() {
        let mut page = MemoryPage::parse(DOC).unwrap();
        let hero = page.element_by_id("hero").unwrap();
        page.set_inner_html(&hero, "first");
        let allocated = page.elements.len();
        for _ in 0..5 {
            page.set_inner_html(&hero, "again");
        }
        assert_eq!(page.elements.len(), allocated);
        assert_eq!(page.inner_html(hero), "again");
    }

    #[test]
    fn set_text_detaches_nested_elements() {
        let mut page = MemoryPage::parse(DOC).unwrap();
        let p = page.elements_by_tag("p")[0];
        assert_eq!(page.text(&p), "Intro Agency text");

        page.set_text(&p, "Plain");
        assert_eq!(page.text(&p), "Plain");
        assert_eq!(page.elements_with_attr("data-i18n").len(), 2);
    }

    #[test]
    fn text_is_escaped_on_serialization() {
        let mut page = MemoryPage::parse("<p></p>").unwrap();
        let p = page.elements_by_tag("p")[0];
        page.set_text(&p, "R&D <team>");
        assert_eq!(page.inner_html(p), "R&amp;D &lt;team&gt;");
        assert_eq!(page.text(&p), "R&D <team>");
    }

    #[test]
    fn class_toggling_keeps_other_tokens() {
        let mut page = MemoryPage::parse(DOC).unwrap();
        let hero = page.element_by_id("hero").unwrap();
        page.set_class(&hero, "active", true);
        page.set_class(&hero, "active", true);
        assert_eq!(page.attr(&hero, "class").as_deref(), Some("hero-title big active"));
        page.set_class(&hero, "big", false);
        assert!(!page.has_class(hero, "big"));
        assert!(page.has_class(hero, "active"));
    }

    #[test]
    fn document_lang_targets_html_root() {
        let mut page = MemoryPage::parse(DOC).unwrap();
        assert_eq!(page.document_lang().as_deref(), Some("en"));
        page.set_document_lang("zh-Hans");
        assert_eq!(page.document_lang().as_deref(), Some("zh-Hans"));
    }
}
