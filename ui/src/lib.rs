//! Shared crate for the Coeur Du Ciel site. Page composition, localization
//! and the contact form live here; the `web` crate only wires them to the
//! browser.

pub mod bindings;
pub mod config;
pub mod core;
pub mod error;
pub mod form;
pub mod i18n;
pub mod nav;
pub mod page;
pub mod partials;
pub mod site;

pub use config::SiteConfig;
pub use i18n::{ApplyOutcome, Catalog, LanguageState};
pub use page::{MemoryPage, Page};
pub use site::Site;

#[cfg(target_arch = "wasm32")]
pub use page::WebPage;
