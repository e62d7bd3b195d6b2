//! Site configuration.
//!
//! Defaults reproduce the conventions of the published markup, so a page
//! without a config block needs nothing. A host page may override any field
//! by embedding JSON:
//!
//! ```html
//! <script type="application/json" id="site-config">
//!   { "partials": { "cache_version": "3" } }
//! </script>
//! ```
//!
//! Missing fields fall back to their defaults (`#[serde(default)]` on every
//! struct), so overrides stay small. The shared fragments are the exception:
//! their defaults depend on the slot, so a partial `header`/`footer` object is
//! merged onto that slot's default rather than onto an empty fragment.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Id of the optional `<script>` block carrying JSON overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub partials: PartialsConfig,
    pub i18n: I18nConfig,
    pub markup: MarkupConfig,
    pub nav: NavConfig,
}

impl SiteConfig {
    /// Parse overrides; absent fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Which shared fragment a mount point receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountSlot {
    Header,
    Footer,
}

impl MountSlot {
    pub const ALL: [MountSlot; 2] = [MountSlot::Header, MountSlot::Footer];

    pub fn as_str(self) -> &'static str {
        match self {
            MountSlot::Header => "header",
            MountSlot::Footer => "footer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentConfig {
    /// Attribute marking the mount point, e.g. `data-shared-header`.
    pub mount_attr: String,
    /// Resource path relative to `PartialsConfig::base_path`.
    pub resource: String,
}

impl FragmentConfig {
    /// Published conventions for `slot`.
    pub fn for_slot(slot: MountSlot) -> Self {
        let name = slot.as_str();
        Self {
            mount_attr: format!("data-shared-{name}"),
            resource: format!("{name}.html"),
        }
    }
}

/// Override of a fragment's fields; absent ones keep the slot default.
#[derive(Deserialize)]
struct FragmentOverride {
    mount_attr: Option<String>,
    resource: Option<String>,
}

impl FragmentOverride {
    fn over(self, slot: MountSlot) -> FragmentConfig {
        let base = FragmentConfig::for_slot(slot);
        FragmentConfig {
            mount_attr: self.mount_attr.unwrap_or(base.mount_attr),
            resource: self.resource.unwrap_or(base.resource),
        }
    }
}

fn header_override<'de, D: Deserializer<'de>>(d: D) -> Result<FragmentConfig, D::Error> {
    Ok(FragmentOverride::deserialize(d)?.over(MountSlot::Header))
}

fn footer_override<'de, D: Deserializer<'de>>(d: D) -> Result<FragmentConfig, D::Error> {
    Ok(FragmentOverride::deserialize(d)?.over(MountSlot::Footer))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialsConfig {
    pub base_path: String,
    /// Appended as `?v=<cache_version>`; bump it to bust browser caches.
    pub cache_version: String,
    #[serde(deserialize_with = "header_override")]
    pub header: FragmentConfig,
    #[serde(deserialize_with = "footer_override")]
    pub footer: FragmentConfig,
}

impl Default for PartialsConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            cache_version: "2".into(),
            header: FragmentConfig::for_slot(MountSlot::Header),
            footer: FragmentConfig::for_slot(MountSlot::Footer),
        }
    }
}

impl PartialsConfig {
    pub fn fragment(&self, slot: MountSlot) -> &FragmentConfig {
        match slot {
            MountSlot::Header => &self.header,
            MountSlot::Footer => &self.footer,
        }
    }

    /// Cache-busted URL for a slot's fragment, e.g. `header.html?v=2`.
    pub fn url_for(&self, slot: MountSlot) -> String {
        let fragment = self.fragment(slot);
        if self.cache_version.is_empty() {
            format!("{}{}", self.base_path, fragment.resource)
        } else {
            format!(
                "{}{}?v={}",
                self.base_path, fragment.resource, self.cache_version
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: String,
    /// `localStorage` key holding the visitor's choice.
    pub storage_key: String,
    /// Document `lang` values that differ from the catalog code.
    pub document_lang_overrides: BTreeMap<String, String>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "en".into(),
            storage_key: "cdc_lang".into(),
            document_lang_overrides: BTreeMap::from([("zh".to_string(), "zh-Hans".to_string())]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    pub binding_attr: String,
    pub brand_class: String,
    pub brand_key: String,
    pub title_tag: String,
    pub title_key: String,
    pub lang_control_class: String,
    pub lang_control_attr: String,
    pub active_class: String,
    pub form_id: String,
    pub form_feedback_id: String,
    pub form_fields: [String; 3],
    pub success_class: String,
    pub error_class: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            binding_attr: "data-i18n".into(),
            brand_class: "brand-text".into(),
            brand_key: "brand.name".into(),
            title_tag: "title".into(),
            title_key: "meta.title".into(),
            lang_control_class: "lang-button".into(),
            lang_control_attr: "data-lang".into(),
            active_class: "active".into(),
            form_id: "contact-form".into(),
            form_feedback_id: "form-feedback".into(),
            form_fields: ["name".into(), "email".into(), "message".into()],
            success_class: "success".into(),
            error_class: "error".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub menu_selector: String,
    pub toggle_selector: String,
    pub open_class: String,
    pub header_selector: String,
    pub section_selector: String,
    pub link_selector: String,
    pub home_document: String,
    /// Extra pixels below the sticky header before a section counts as current.
    pub active_offset: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            menu_selector: ".main-nav".into(),
            toggle_selector: ".nav-toggle".into(),
            open_class: "open".into(),
            header_selector: ".site-header".into(),
            section_selector: "main section[id]".into(),
            link_selector: ".main-nav .nav-link".into(),
            home_document: "index.html".into(),
            active_offset: 40.0,
        }
    }
}
