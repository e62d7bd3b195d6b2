//! Error types for the site runtime.
//!
//! None of these reach the visitor: the loader and the language switcher
//! degrade to "no visible change". They exist so the boot sequence and tests
//! can tell failure modes apart.

use thiserror::Error;

/// A fragment request that did not produce a body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("request for {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Problems loading the embedded translation tables.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog folder `{0}` is not a valid language identifier")]
    InvalidLanguage(String),
    #[error("catalog for `{language}` is not valid JSON: {source}")]
    InvalidJson {
        language: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no table found for default language `{0}`")]
    MissingDefault(String),
}

/// Failures reading or writing the persisted language preference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("preference storage unavailable")]
    Unavailable,
    #[error("preference storage rejected `{key}`")]
    Rejected { key: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid site configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Markup the in-memory page model could not parse.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}
