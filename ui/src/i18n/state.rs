use std::sync::Arc;

use super::Catalog;
use crate::core::storage::PreferenceStore;

/// Whether the page has been rendered in a language yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Applied,
}

/// The current language, passed explicitly to everything that renders text.
///
/// `current` is always a code the catalog recognizes: it starts at the
/// restored preference (or the default language) and only changes through
/// [`super::switcher::apply`].
#[derive(Debug, Clone)]
pub struct LanguageState {
    catalog: Arc<Catalog>,
    current: String,
    phase: Phase,
}

impl LanguageState {
    /// Start in the catalog's default language.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let current = catalog.default_language().to_string();
        Self {
            catalog,
            current,
            phase: Phase::Uninitialized,
        }
    }

    /// Start in the persisted language when it is present and recognized.
    pub fn restore<S>(catalog: Arc<Catalog>, store: &S, key: &str) -> Self
    where
        S: PreferenceStore + ?Sized,
    {
        let mut state = Self::new(catalog);
        match store.load(key) {
            Ok(Some(saved)) if state.catalog.recognizes(&saved) => state.current = saved,
            Ok(Some(saved)) => {
                tracing::debug!(%saved, "ignoring unrecognized stored language");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "could not read language preference"),
        }
        state
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current language → default language → `""`.
    pub fn resolve(&self, key: &str) -> &str {
        self.catalog.resolve(&self.current, key)
    }

    /// Switch to `code`; `false` (and no change) when it is not recognized.
    pub(crate) fn select(&mut self, code: &str) -> bool {
        if !self.catalog.recognizes(code) {
            return false;
        }
        if self.current != code {
            self.current = code.to_string();
        }
        self.phase = Phase::Applied;
        true
    }
}
