//! Startup: wait for the document, compose the site, attach handlers.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use ui::config::{I18nConfig, CONFIG_ELEMENT_ID};
use ui::core::platform::spawn_future;
use ui::core::storage::{LocalStorageStore, MemoryStore, PreferenceStore};
use ui::partials::FetchSource;
use ui::{Catalog, Site, SiteConfig, WebPage};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Document;

use crate::wiring;

pub type BrowserSite = Site<WebPage, Box<dyn PreferenceStore>>;

/// Run [`compose`] once the document has been parsed.
pub fn start() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        tracing::warn!("no document to enhance");
        return;
    };

    if document.ready_state() != "loading" {
        launch();
        return;
    }

    let callback = Closure::once_into_js(launch);
    if document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        .is_err()
    {
        tracing::warn!("could not wait for DOMContentLoaded; starting now");
        launch();
    }
}

fn launch() {
    spawn_future(compose());
}

/// A bad catalog setting costs translations, never the fragments or handlers.
async fn compose() {
    let Some(page) = WebPage::current() else {
        tracing::warn!("no document to enhance");
        return;
    };
    let config = read_config(page.document());
    let catalog = Catalog::embedded_or_fallback(
        &config.i18n.default_language,
        &I18nConfig::default().default_language,
    );
    let store = open_store();

    let site: BrowserSite =
        Site::compose(page, &FetchSource, store, Arc::new(catalog), config).await;
    wiring::attach(Rc::new(RefCell::new(site)));
}

/// Overrides from `<script type="application/json" id="site-config">`.
fn read_config(document: &Document) -> SiteConfig {
    let Some(raw) = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|node| node.text_content())
    else {
        return SiteConfig::default();
    };
    SiteConfig::from_json(&raw).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring malformed site config");
        SiteConfig::default()
    })
}

fn open_store() -> Box<dyn PreferenceStore> {
    match LocalStorageStore::open() {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(%err, "language preference will not persist");
            Box::new(MemoryStore::default())
        }
    }
}
