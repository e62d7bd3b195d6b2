//! Page composition.
//!
//! [`Site::compose`] runs the load sequence in its required order:
//!
//! 1. fetch and splice the shared header/footer (all requests settle first),
//! 2. register text bindings, including those the fragments brought in,
//! 3. restore the persisted language,
//! 4. render the page in it.
//!
//! The composed `Site` then owns the page, the preference store and the
//! language state, and is the only thing event handlers talk to.

use std::sync::Arc;

use crate::bindings::{BindingRegistry, LanguageControl};
use crate::config::SiteConfig;
use crate::core::storage::PreferenceStore;
use crate::form::{ContactForm, FeedbackKind, FormFeedback};
use crate::i18n::{switcher, ApplyOutcome, Catalog, LanguageState};
use crate::page::Page;
use crate::partials::{load_partials, FragmentSource, LoadReport};

pub struct Site<P: Page, S: PreferenceStore> {
    page: P,
    store: S,
    config: SiteConfig,
    language: LanguageState,
    bindings: BindingRegistry<P::Node>,
    partials: LoadReport,
}

impl<P: Page, S: PreferenceStore> Site<P, S> {
    pub async fn compose<F>(
        mut page: P,
        source: &F,
        store: S,
        catalog: Arc<Catalog>,
        config: SiteConfig,
    ) -> Self
    where
        F: FragmentSource,
    {
        let partials = load_partials(&mut page, source, &config.partials).await;
        let bindings = BindingRegistry::scan(&page, &config.markup);
        let language = LanguageState::restore(catalog, &store, &config.i18n.storage_key);

        let mut site = Self {
            page,
            store,
            config,
            language,
            bindings,
            partials,
        };
        let outcome = site.apply_current();
        tracing::info!(
            fragments = site.partials.spliced(),
            bindings = site.bindings.len(),
            ?outcome,
            "site composed"
        );
        site
    }

    /// Render the page in `code`; unknown codes are ignored.
    pub fn switch_language(&mut self, code: &str) -> ApplyOutcome {
        switcher::apply(
            &mut self.language,
            code,
            &mut self.page,
            &self.bindings,
            &mut self.store,
            &self.config,
        )
    }

    /// Render the page in the current language.
    pub fn apply_current(&mut self) -> ApplyOutcome {
        let code = self.language.current().to_string();
        self.switch_language(&code)
    }

    pub fn resolve(&self, key: &str) -> &str {
        self.language.resolve(key)
    }

    /// Validate a submission and show the outcome in the feedback element.
    pub fn submit_contact(&mut self, form: &ContactForm) -> FormFeedback {
        let feedback = FormFeedback::for_submission(form, &self.language);
        let markup = &self.config.markup;
        if let Some(node) = self.page.element_by_id(&markup.form_feedback_id) {
            let success = feedback.kind == FeedbackKind::Success;
            self.page.set_text(&node, &feedback.text);
            self.page.set_class(&node, &markup.error_class, !success);
            self.page.set_class(&node, &markup.success_class, success);
        }
        feedback
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn language(&self) -> &LanguageState {
        &self.language
    }

    pub fn bindings(&self) -> &BindingRegistry<P::Node> {
        &self.bindings
    }

    pub fn language_controls(&self) -> &[LanguageControl<P::Node>] {
        self.bindings.controls()
    }

    pub fn partials(&self) -> &LoadReport {
        &self.partials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MountSlot;
    use crate::core::storage::MemoryStore;
    use crate::page::MemoryPage;
    use crate::partials::{FetchOutcome, MapSource};
    use futures::executor::block_on;

    const DOC: &str = r#"<html lang="en"><body>
<div data-shared-header></div>
<form id="contact-form">
  <p id="form-feedback" class="form-feedback"></p>
</form>
</body></html>"#;

    const HEADER: &str = r#"<header class="site-header"><span class="brand-text">CDC</span><a data-i18n="nav.home">Home</a><button class="lang-button" data-lang="en">EN</button><button class="lang-button" data-lang="fr">FR</button></header>"#;

    fn compose(store: MemoryStore) -> Site<MemoryPage, MemoryStore> {
        let catalog = Arc::new(Catalog::embedded("en").unwrap());
        let page = MemoryPage::parse(DOC).unwrap();
        let source = MapSource::default().with_body("header.html?v=2", HEADER);
        block_on(Site::compose(page, &source, store, catalog, SiteConfig::default()))
    }

    #[test]
    fn fragment_bindings_are_registered_before_first_render() {
        let site = compose(MemoryStore::default().with("cdc_lang", "fr"));
        let link = site.bindings().nodes_for("nav.home")[0];
        assert_eq!(site.page().text(&link), "Accueil");
        assert_eq!(site.language_controls().len(), 2);
        let active: Vec<_> = site
            .language_controls()
            .iter()
            .filter(|control| site.page().has_class(control.node, "active"))
            .filter_map(|control| control.language.clone())
            .collect();
        assert_eq!(active, vec!["fr".to_string()]);
    }

    #[test]
    fn absent_mount_point_is_not_requested() {
        let site = compose(MemoryStore::default());
        assert_eq!(site.partials().iter().count(), 1);
        assert!(site.partials().outcome(MountSlot::Footer).is_none());
        assert_eq!(site.language().current(), "en");
    }

    #[test]
    fn renamed_header_resource_still_finds_its_mount() {
        let config =
            SiteConfig::from_json(r#"{ "partials": { "header": { "resource": "top.html" } } }"#)
                .unwrap();
        let catalog = Arc::new(Catalog::embedded("en").unwrap());
        let page = MemoryPage::parse("<body><div data-shared-header>old</div></body>").unwrap();
        let source = MapSource::default().with_body("top.html?v=2", "<p>new</p>");
        let site = block_on(Site::compose(
            page,
            &source,
            MemoryStore::default(),
            catalog,
            config,
        ));

        assert!(matches!(
            site.partials().outcome(MountSlot::Header),
            Some(FetchOutcome::Spliced { .. })
        ));
        let mount = site.page().first_with_attr("data-shared-header").unwrap();
        assert_eq!(site.page().inner_html(mount), "<p>new</p>");
    }

    #[test]
    fn contact_feedback_is_rendered_and_classed() {
        let mut site = compose(MemoryStore::default());
        let feedback = site.submit_contact(&ContactForm::new("Ada", "", "Hi"));
        assert_eq!(feedback.kind, FeedbackKind::Error);

        let node = site.page().element_by_id("form-feedback").unwrap();
        assert_eq!(site.page().text(&node), site.resolve("form.errorRequired"));
        assert!(site.page().has_class(node, "error"));

        site.submit_contact(&ContactForm::new("Ada", "ada@example.com", "Hi"));
        assert!(site.page().has_class(node, "success"));
        assert!(!site.page().has_class(node, "error"));
        assert!(site.page().has_class(node, "form-feedback"));
    }

    #[test]
    fn switching_persists_choice() {
        let mut site = compose(MemoryStore::default());
        assert!(site.switch_language("zh").is_applied());
        assert_eq!(site.store().get("cdc_lang"), Some("zh"));
        assert!(!site.switch_language("de").is_applied());
        assert_eq!(site.language().current(), "zh");
    }
}
