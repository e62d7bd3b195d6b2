//! Re-rendering a page in a language.

use super::{document_language_tag, LanguageState};
use crate::bindings::BindingRegistry;
use crate::config::SiteConfig;
use crate::core::storage::PreferenceStore;
use crate::page::Page;

/// Result of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The page now shows `language`; `updated` counts bound elements whose
    /// text was written.
    Applied { language: String, updated: usize },
    /// `requested` is not in the catalog; nothing changed.
    Ignored { requested: String },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Switch `state` to `requested` and render every binding in it.
///
/// Unknown codes (stale button markup, a tampered stored preference) are a
/// no-op. Elements whose key resolves to `""` in both the requested and the
/// default language keep their authored text. Applying the same language
/// twice renders the same page.
pub fn apply<P, S>(
    state: &mut LanguageState,
    requested: &str,
    page: &mut P,
    bindings: &BindingRegistry<P::Node>,
    store: &mut S,
    config: &SiteConfig,
) -> ApplyOutcome
where
    P: Page,
    S: PreferenceStore + ?Sized,
{
    if !state.select(requested) {
        tracing::debug!(requested, "ignoring unknown language");
        return ApplyOutcome::Ignored {
            requested: requested.to_string(),
        };
    }
    let language = state.current().to_string();

    if let Err(err) = store.save(&config.i18n.storage_key, &language) {
        tracing::warn!(%err, "language preference not persisted");
    }

    let mut updated = 0;
    for (key, node) in bindings.iter() {
        let text = state.resolve(key);
        if text.is_empty() {
            continue;
        }
        page.set_text(node, text);
        updated += 1;
    }

    let markup = &config.markup;
    if let Some(brand) = bindings.brand() {
        set_if_present(page, brand, state.resolve(&markup.brand_key));
    }

    let tag = document_language_tag(&language, &config.i18n.document_lang_overrides);
    page.set_document_lang(&tag);

    if let Some(title) = bindings.title() {
        set_if_present(page, title, state.resolve(&markup.title_key));
    }

    for control in bindings.controls() {
        let active = control.language.as_deref() == Some(language.as_str());
        page.set_class(&control.node, &markup.active_class, active);
    }

    tracing::debug!(%language, updated, "language applied");
    ApplyOutcome::Applied { language, updated }
}

fn set_if_present<P: Page>(page: &mut P, node: &P::Node, text: &str) {
    if !text.is_empty() {
        page.set_text(node, text);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::storage::MemoryStore;
    use crate::i18n::{table, Catalog, Phase};
    use crate::page::MemoryPage;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"<html lang="en"><head><title data-i18n="meta.title">Old</title></head><body>
<span class="brand-text">Brand</span>
<button class="lang-button active" data-lang="en">EN</button>
<button class="lang-button" data-lang="fr">FR</button>
<button class="lang-button" data-lang="zh">中文</button>
<h1 data-i18n="hero.title">Authored hero</h1>
<p id="thanks" data-i18n="form.success">Authored thanks</p>
<p id="ghost" data-i18n="ghost.key">Authored ghost</p>
</body></html>"#;

    struct Fixture {
        state: LanguageState,
        page: MemoryPage,
        bindings: BindingRegistry<crate::page::NodeId>,
        store: MemoryStore,
        config: SiteConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let catalog = Catalog::from_tables(
                "en",
                [
                    (
                        "en".to_string(),
                        table(&[
                            ("meta.title", "CDC - Marketing"),
                            ("brand.name", "Coeur Du Ciel"),
                            ("hero.title", "Creative marketing"),
                            ("form.success", "Thank you!"),
                        ]),
                    ),
                    (
                        "fr".to_string(),
                        table(&[
                            ("meta.title", "CDC - Agence"),
                            ("hero.title", "Marketing créatif"),
                        ]),
                    ),
                    ("zh".to_string(), table(&[("hero.title", "创意营销")])),
                ],
            )
            .unwrap();
            let page = MemoryPage::parse(DOC).unwrap();
            let config = SiteConfig::default();
            let bindings = BindingRegistry::scan(&page, &config.markup);
            Self {
                state: LanguageState::new(Arc::new(catalog)),
                page,
                bindings,
                store: MemoryStore::default(),
                config,
            }
        }

        fn apply(&mut self, language: &str) -> ApplyOutcome {
            apply(
                &mut self.state,
                language,
                &mut self.page,
                &self.bindings,
                &mut self.store,
                &self.config,
            )
        }

        fn text_of(&self, id: &str) -> String {
            self.page.text(&self.page.element_by_id(id).unwrap())
        }

        fn snapshot(&self) -> String {
            self.page.inner_html(self.page.root())
        }

        fn active_controls(&self) -> Vec<String> {
            self.page
                .elements_with_class("active")
                .iter()
                .filter_map(|node| self.page.attr(node, "data-lang"))
                .collect()
        }
    }

    #[test]
    fn apply_renders_bindings_and_structural_elements() {
        let mut fx = Fixture::new();
        let outcome = fx.apply("fr");

        assert_eq!(
            outcome,
            ApplyOutcome::Applied {
                language: "fr".into(),
                updated: 3
            }
        );
        let h1 = fx.page.elements_by_tag("h1")[0];
        assert_eq!(fx.page.text(&h1), "Marketing créatif");
        assert_eq!(fx.text_of("thanks"), "Thank you!");
        let brand = fx.page.first_with_class("brand-text").unwrap();
        assert_eq!(fx.page.text(&brand), "Coeur Du Ciel");
        let title = fx.page.elements_by_tag("title")[0];
        assert_eq!(fx.page.text(&title), "CDC - Agence");
        assert_eq!(fx.page.document_lang().as_deref(), Some("fr"));
        assert_eq!(fx.active_controls(), vec!["fr"]);
        assert_eq!(fx.store.get("cdc_lang"), Some("fr"));
        assert_eq!(fx.state.phase(), Phase::Applied);
    }

    #[test]
    fn missing_everywhere_keeps_authored_text() {
        let mut fx = Fixture::new();
        fx.apply("zh");
        assert_eq!(fx.text_of("ghost"), "Authored ghost");
        assert_eq!(fx.state.resolve("ghost.key"), "");
    }

    #[test]
    fn regional_document_tag_for_chinese() {
        let mut fx = Fixture::new();
        fx.apply("zh");
        assert_eq!(fx.page.document_lang().as_deref(), Some("zh-Hans"));
    }

    #[test]
    fn unknown_language_changes_nothing() {
        let mut fx = Fixture::new();
        fx.apply("fr");
        let before = fx.snapshot();

        let outcome = fx.apply("klingon");

        assert_eq!(
            outcome,
            ApplyOutcome::Ignored {
                requested: "klingon".into()
            }
        );
        assert_eq!(fx.state.current(), "fr");
        assert_eq!(fx.snapshot(), before);
        assert_eq!(fx.store.get("cdc_lang"), Some("fr"));
    }

    #[test]
    fn reapplying_is_idempotent() {
        let mut fx = Fixture::new();
        fx.apply("zh");
        let first = fx.snapshot();
        let outcome = fx.apply("zh");
        assert!(outcome.is_applied());
        assert_eq!(fx.snapshot(), first);
    }

    #[test]
    fn switching_back_restores_default_strings() {
        let mut fx = Fixture::new();
        fx.apply("fr");
        fx.apply("en");
        let h1 = fx.page.elements_by_tag("h1")[0];
        assert_eq!(fx.page.text(&h1), "Creative marketing");
        assert_eq!(fx.active_controls(), vec!["en"]);
    }
}
