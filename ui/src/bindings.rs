//! Text bindings resolved once after page composition.
//!
//! Markup declares `data-i18n="key"` on elements whose text comes from the
//! catalog. Instead of rescanning the document on every language change, the
//! site scans once (after the shared header/footer are spliced in) and keeps
//! the key → elements map, plus the handful of elements the switcher updates
//! structurally: the brand name, the bound `<title>`, and the language
//! controls.

use std::collections::BTreeMap;

use crate::config::MarkupConfig;
use crate::page::Page;

/// A `.lang-button`; `language` is its `data-lang`, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageControl<N> {
    pub node: N,
    pub language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BindingRegistry<N> {
    bindings: BTreeMap<String, Vec<N>>,
    brand: Option<N>,
    title: Option<N>,
    controls: Vec<LanguageControl<N>>,
}

impl<N> Default for BindingRegistry<N> {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
            brand: None,
            title: None,
            controls: Vec::new(),
        }
    }
}

impl<N: Clone> BindingRegistry<N> {
    pub fn scan<P>(page: &P, markup: &MarkupConfig) -> Self
    where
        P: Page<Node = N>,
    {
        let mut registry = Self::default();

        for node in page.elements_with_attr(&markup.binding_attr) {
            match page.attr(&node, &markup.binding_attr) {
                Some(key) if !key.is_empty() => registry.bind(key, node),
                _ => {}
            }
        }

        registry.brand = page.first_with_class(&markup.brand_class);
        registry.title = page.elements_by_tag(&markup.title_tag).into_iter().find(|node| {
            page.attr(node, &markup.binding_attr).as_deref() == Some(markup.title_key.as_str())
        });
        registry.controls = page
            .elements_with_class(&markup.lang_control_class)
            .into_iter()
            .map(|node| {
                let language = page
                    .attr(&node, &markup.lang_control_attr)
                    .filter(|code| !code.is_empty());
                LanguageControl { node, language }
            })
            .collect();

        tracing::debug!(
            keys = registry.bindings.len(),
            nodes = registry.len(),
            controls = registry.controls.len(),
            "text bindings registered"
        );
        registry
    }

    /// Register `node` as displaying `key`.
    pub fn bind(&mut self, key: impl Into<String>, node: N) {
        self.bindings.entry(key.into()).or_default().push(node);
    }

    /// Elements displaying `key`, in document order.
    pub fn nodes_for(&self, key: &str) -> &[N] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Every (key, element) pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &N)> {
        self.bindings
            .iter()
            .flat_map(|(key, nodes)| nodes.iter().map(move |node| (key.as_str(), node)))
    }

    /// Number of bound elements.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn brand(&self) -> Option<&N> {
        self.brand.as_ref()
    }

    pub fn title(&self) -> Option<&N> {
        self.title.as_ref()
    }

    pub fn controls(&self) -> &[LanguageControl<N>] {
        &self.controls
    }
}
