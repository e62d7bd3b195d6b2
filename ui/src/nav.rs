//! In-page navigation decisions.
//!
//! The shared header links to `index.html#section` so it works from every
//! page. On the home page those links are rewritten to plain `#section`
//! anchors, clicks scroll smoothly, and the link of the section under the
//! sticky header is highlighted. The DOM side lives in the web crate; the
//! decisions are here so they can be tested without a browser.

/// Whether `path` (a `location.pathname`) is the one-page home document.
pub fn is_home_path(path: &str, home_document: &str) -> bool {
    if path.is_empty() || path == "/" {
        return true;
    }
    let path = path.to_ascii_lowercase();
    path.ends_with(&home_document.to_ascii_lowercase())
}

/// `index.html#about` → `#about`; other hrefs are left alone.
pub fn rewrite_home_href<'a>(href: &'a str, home_document: &str) -> Option<&'a str> {
    let anchor = href.strip_prefix(home_document)?;
    anchor.starts_with('#').then_some(anchor)
}

/// Element id targeted by an in-page link, e.g. `#contact` → `contact`.
///
/// A bare `#` has no target.
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Vertical position of a section, as measured by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOffset<'a> {
    pub id: &'a str,
    pub top: f64,
}

/// The last section whose top has scrolled above the sticky header line.
pub fn active_section<'a>(
    sections: &[SectionOffset<'a>],
    scroll_y: f64,
    header_height: f64,
    offset: f64,
) -> Option<&'a str> {
    let line = scroll_y + header_height + offset;
    sections
        .iter()
        .rev()
        .find(|section| section.top <= line)
        .map(|section| section.id)
}

/// Open/closed state of the small-screen menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the menu; `true` if it was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Value for the toggle's `aria-expanded`.
    pub fn aria_expanded(self) -> &'static str {
        if self.open {
            "true"
        } else {
            "false"
        }
    }
}
