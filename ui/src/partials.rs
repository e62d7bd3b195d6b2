//! Shared header/footer fragments.
//!
//! Pages mark where the shared header and footer go
//! (`<div data-shared-header></div>`). On load every present mount point gets
//! its fragment fetched, all requests in flight at once, and the page is
//! spliced only after every request has settled. A failed or empty fetch
//! leaves its mount point exactly as authored; the [`LoadReport`] records
//! which case happened for each slot.

use std::collections::HashMap;

use futures::future::join_all;

use crate::config::{MountSlot, PartialsConfig};
use crate::error::FetchError;
use crate::page::Page;

/// Where fragment bodies come from.
#[allow(async_fn_in_trait)]
pub trait FragmentSource {
    /// Body of a successful response; any transport failure or non-success
    /// status is an error.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// What happened to one mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The fragment replaced the mount point's contents.
    Spliced { bytes: usize },
    /// The request succeeded with an empty body; mount point untouched.
    Empty,
    /// The request failed; mount point untouched.
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_spliced(&self) -> bool {
        matches!(self, FetchOutcome::Spliced { .. })
    }
}

/// Outcomes for the slots that had a mount point, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    outcomes: Vec<(MountSlot, FetchOutcome)>,
}

impl LoadReport {
    pub fn outcome(&self, slot: MountSlot) -> Option<&FetchOutcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MountSlot, &FetchOutcome)> {
        self.outcomes.iter().map(|(slot, outcome)| (*slot, outcome))
    }

    pub fn spliced(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_spliced())
            .count()
    }

    /// No mount point was present, so nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Fetch every mounted fragment concurrently and splice the successful ones.
///
/// Resolves once all requests have settled, whatever their outcome.
pub async fn load_partials<P, F>(page: &mut P, source: &F, config: &PartialsConfig) -> LoadReport
where
    P: Page,
    F: FragmentSource,
{
    let mounts: Vec<(MountSlot, P::Node, String)> = MountSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            let mount_attr = &config.fragment(slot).mount_attr;
            page.first_with_attr(mount_attr)
                .map(|node| (slot, node, config.url_for(slot)))
        })
        .collect();

    if mounts.is_empty() {
        return LoadReport::default();
    }

    let bodies = join_all(mounts.iter().map(|(_, _, url)| source.fetch(url))).await;

    let mut report = LoadReport::default();
    for ((slot, node, url), body) in mounts.into_iter().zip(bodies) {
        let outcome = match body {
            Ok(html) if html.is_empty() => {
                tracing::debug!(slot = slot.as_str(), %url, "fragment empty, mount point kept");
                FetchOutcome::Empty
            }
            Ok(html) => {
                page.set_inner_html(&node, &html);
                FetchOutcome::Spliced { bytes: html.len() }
            }
            Err(err) => {
                tracing::debug!(slot = slot.as_str(), %err, "fragment unavailable, mount point kept");
                FetchOutcome::Failed(err)
            }
        };
        report.outcomes.push((slot, outcome));
    }
    report
}

/// Canned responses keyed by URL, for tests and headless hosts.
///
/// Unregistered URLs answer with status 404.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    responses: HashMap<String, Result<String, FetchError>>,
}

impl MapSource {
    pub fn with_body(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        let err = FetchError::Status {
            url: url.clone(),
            status,
        };
        self.responses.insert(url, Err(err));
        self
    }

    pub fn with_network_error(mut self, url: impl Into<String>, reason: impl Into<String>) -> Self {
        let url = url.into();
        let err = FetchError::Network {
            url: url.clone(),
            reason: reason.into(),
        };
        self.responses.insert(url, Err(err));
        self
    }
}

impl FragmentSource for MapSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

/// `window.fetch`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchSource;

#[cfg(target_arch = "wasm32")]
impl FragmentSource for FetchSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        use wasm_bindgen::{JsCast, JsValue};
        use wasm_bindgen_futures::JsFuture;

        let network = |reason: String| FetchError::Network {
            url: url.to_string(),
            reason,
        };
        let describe = |value: JsValue| value.as_string().unwrap_or_else(|| format!("{value:?}"));

        let window = web_sys::window().ok_or_else(|| network("window unavailable".into()))?;
        let response = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|err| network(describe(err)))?;
        let response: web_sys::Response = response
            .dyn_into()
            .map_err(|_| network("fetch resolved to a non-Response".into()))?;
        if !response.ok() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }
        let text = response.text().map_err(|err| network(describe(err)))?;
        let body = JsFuture::from(text)
            .await
            .map_err(|err| network(describe(err)))?;
        Ok(body.as_string().unwrap_or_default())
    }
}
