//! Internationalization (i18n) support for the site runtime.
//!
//! This module wires together:
//! - `rust-embed` (compile-time embedding of the translation tables)
//! - `serde_json` (table format)
//! - `unic-langid` (validating table folders, canonical document `lang` tags)
//!
//! Folder layout (relative to this crate root):
//! ```text
//! i18n/
//!   en/site.json   (default/reference)
//!   fr/site.json   (partial coverage allowed)
//!   zh/site.json
//! ```
//!
//! Each table is a flat JSON object from a dot-namespaced key
//! (`"form.success"`) to the localized string. Markup binds to keys with
//! `data-i18n="form.success"`.
//!
//! To add a new language:
//! 1. Create `i18n/<code>/site.json` (any subset of the `en` keys).
//! 2. Add a `.lang-button` with `data-lang="<code>"` to `header.html`.
//! 3. Run tests; the completeness checks flag keys the default table lacks.
//!
//! Public API surface:
//! - [`Catalog`] – the immutable set of tables plus the fallback chain.
//! - [`LanguageState`] – the explicit "current language" context.
//! - [`switcher::apply`] – re-render a page in a language.
//! - [`available_languages`] – embedded language codes (for tooling/tests).

mod state;
pub mod switcher;

pub use state::{LanguageState, Phase};
pub use switcher::ApplyOutcome;

use std::collections::BTreeMap;

use rust_embed::Embed;
use unic_langid::LanguageIdentifier;

use crate::error::CatalogError;

/// Canonical table filename inside each language folder.
pub const TABLE_FILE: &str = "site.json";

/// Embed all language folders under `i18n/`.
#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

/// One language's key → string table.
pub type Table = BTreeMap<String, String>;

/// Every translation table, keyed by language code.
///
/// The default language's table is the end of every fallback chain, so its
/// presence is checked at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    default_language: String,
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Build a catalog from in-memory tables.
    pub fn from_tables<I>(default_language: &str, tables: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (String, Table)>,
    {
        let mut validated = BTreeMap::new();
        for (code, table) in tables {
            if code.parse::<LanguageIdentifier>().is_err() {
                return Err(CatalogError::InvalidLanguage(code));
            }
            validated.insert(code, table);
        }
        if !validated.contains_key(default_language) {
            return Err(CatalogError::MissingDefault(default_language.to_string()));
        }
        Ok(Self {
            default_language: default_language.to_string(),
            tables: validated,
        })
    }

    /// Load the tables compiled into the binary.
    pub fn embedded(default_language: &str) -> Result<Self, CatalogError> {
        let mut tables = Vec::new();
        for code in available_languages() {
            let path = format!("{code}/{TABLE_FILE}");
            let Some(file) = Localizations::get(&path) else {
                continue;
            };
            let table = parse_table(&code, &file.data)?;
            tables.push((code, table));
        }
        let catalog = Self::from_tables(default_language, tables)?;
        tracing::debug!(
            languages = catalog.tables.len(),
            default = default_language,
            "loaded embedded catalog"
        );
        Ok(catalog)
    }

    /// Like [`Catalog::embedded`], but never fails: an unusable
    /// `default_language` is retried as `fallback_language`, and if that
    /// fails as well the catalog is empty. Every key of an empty catalog
    /// resolves to `""`, so pages keep their authored text.
    pub fn embedded_or_fallback(default_language: &str, fallback_language: &str) -> Self {
        let err = match Self::embedded(default_language) {
            Ok(catalog) => return catalog,
            Err(err) => err,
        };
        tracing::warn!(%err, fallback = fallback_language, "default language unusable");
        Self::embedded(fallback_language).unwrap_or_else(|err| {
            tracing::error!(%err, "embedded catalog unusable; translations disabled");
            Self {
                default_language: fallback_language.to_string(),
                tables: BTreeMap::from([(fallback_language.to_string(), Table::new())]),
            }
        })
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Whether `code` names one of the catalog's tables.
    pub fn recognizes(&self, code: &str) -> bool {
        self.tables.contains_key(code)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn table(&self, code: &str) -> Option<&Table> {
        self.tables.get(code)
    }

    /// Exact lookup in one table. Empty strings count as missing.
    pub fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.tables
            .get(language)
            .and_then(|table| table.get(key))
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    /// `language` → default language → `""`. Never fails.
    pub fn resolve(&self, language: &str, key: &str) -> &str {
        self.lookup(language, key)
            .or_else(|| self.lookup(&self.default_language, key))
            .unwrap_or("")
    }
}

fn parse_table(code: &str, bytes: &[u8]) -> Result<Table, CatalogError> {
    serde_json::from_slice(bytes).map_err(|source| CatalogError::InvalidJson {
        language: code.to_string(),
        source,
    })
}

/// List available (embedded) language codes.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

/// Value for the document root's `lang` attribute.
///
/// Uses the configured override for `code` when present (`zh` → `zh-Hans`)
/// and canonicalizes the casing when the tag parses.
pub fn document_language_tag(code: &str, overrides: &BTreeMap<String, String>) -> String {
    let raw = overrides.get(code).map(String::as_str).unwrap_or(code);
    raw.parse::<LanguageIdentifier>()
        .map(|id| id.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
pub(crate) fn table(entries: &[(&str, &str)]) -> Table {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
