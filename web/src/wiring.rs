//! Event handlers for the composed page.
//!
//! Everything runs after the shared fragments are in place, so header
//! controls are already in the document when they are looked up here.

use std::cell::RefCell;
use std::rc::Rc;

use ui::config::{MarkupConfig, NavConfig};
use ui::form::ContactForm;
use ui::nav::{
    active_section, anchor_target, is_home_path, rewrite_home_href, MenuState, SectionOffset,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlTextAreaElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::boot::BrowserSite;

type SharedSite = Rc<RefCell<BrowserSite>>;

pub fn attach(site: SharedSite) {
    let (document, config) = {
        let site = site.borrow();
        (site.page().document().clone(), site.config().clone())
    };

    rewrite_home_links(&document, &config.nav);
    wire_anchor_links(&document, &config.nav);
    wire_menu_toggle(&document, &config.nav);
    wire_active_nav(&document, &config.nav);
    wire_contact_form(&site, &document, &config.markup);
    wire_language_controls(&site);
}

fn on<F>(target: &Element, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::debug!(event, "listener rejected");
    }
    closure.forget();
}

/// A rejected DOM write leaves that element as authored.
fn checked(result: Result<(), JsValue>, what: &str) {
    if result.is_err() {
        tracing::debug!(what, "DOM update rejected");
    }
}

fn toggle_class(element: &Element, class: &str, enabled: bool) {
    let classes = element.class_list();
    let result = if enabled {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    checked(result, class);
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// On the home page, `index.html#x` links in the menu become `#x`.
fn rewrite_home_links(document: &Document, nav: &NavConfig) {
    let path = document
        .location()
        .and_then(|location| location.pathname().ok())
        .unwrap_or_default();
    if !is_home_path(&path, &nav.home_document) {
        return;
    }
    let Some(menu) = query(document, &nav.menu_selector) else {
        return;
    };
    let Ok(links) = menu.query_selector_all("a[href]") else {
        return;
    };
    for link in (0..links.length())
        .filter_map(|index| links.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
    {
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        if let Some(anchor) = rewrite_home_href(&href, &nav.home_document) {
            checked(link.set_attribute("href", anchor), "href");
        }
    }
}

fn close_menu(document: &Document, nav: &NavConfig) {
    let (Some(menu), Some(toggle)) = (
        query(document, &nav.menu_selector),
        query(document, &nav.toggle_selector),
    ) else {
        return;
    };
    let mut state = MenuState::new(menu.class_list().contains(&nav.open_class));
    if state.close() {
        toggle_class(&menu, &nav.open_class, false);
        checked(
            toggle.set_attribute("aria-expanded", state.aria_expanded()),
            "aria-expanded",
        );
    }
}

/// Smooth-scroll in-page links and close the small-screen menu afterwards.
fn wire_anchor_links(document: &Document, nav: &NavConfig) {
    for link in query_all(document, "a[href^=\"#\"]") {
        let document = document.clone();
        let nav = nav.clone();
        let anchor = link.clone();
        on(&link, "click", move |event| {
            let href = anchor.get_attribute("href").unwrap_or_default();
            let Some(target) = anchor_target(&href).and_then(|id| document.get_element_by_id(id))
            else {
                return;
            };
            event.prevent_default();

            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);

            close_menu(&document, &nav);
        });
    }
}

fn wire_menu_toggle(document: &Document, nav: &NavConfig) {
    let (Some(menu), Some(toggle)) = (
        query(document, &nav.menu_selector),
        query(document, &nav.toggle_selector),
    ) else {
        return;
    };
    let open_class = nav.open_class.clone();
    let button = toggle.clone();
    on(&toggle, "click", move |_| {
        let mut state = MenuState::new(menu.class_list().contains(&open_class));
        toggle_class(&menu, &open_class, state.toggle());
        checked(
            button.set_attribute("aria-expanded", state.aria_expanded()),
            "aria-expanded",
        );
    });
}

/// Highlight the menu link of the section under the sticky header.
fn wire_active_nav(document: &Document, nav: &NavConfig) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let sections: Vec<HtmlElement> = query_all(document, &nav.section_selector)
        .into_iter()
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect();
    if sections.is_empty() {
        return;
    }

    let document = document.clone();
    let nav = nav.clone();
    let update = move || {
        let header_height = query(&document, &nav.header_selector)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
            .map(|header| f64::from(header.offset_height()))
            .unwrap_or(0.0);
        let scroll_y = web_sys::window()
            .and_then(|window| window.scroll_y().ok())
            .unwrap_or(0.0);
        let ids: Vec<String> = sections.iter().map(|section| section.id()).collect();
        let offsets: Vec<SectionOffset<'_>> = sections
            .iter()
            .zip(&ids)
            .map(|(section, id)| SectionOffset {
                id: id.as_str(),
                top: f64::from(section.offset_top()),
            })
            .collect();
        let current = active_section(&offsets, scroll_y, header_height, nav.active_offset);
        let wanted = current.map(|id| format!("#{id}"));

        let mut marked = false;
        for link in query_all(&document, &nav.link_selector) {
            let matches = !marked && wanted.is_some() && link.get_attribute("href") == wanted;
            marked |= matches;
            toggle_class(&link, "active", matches);
        }
    };

    update();
    let closure = Closure::<dyn FnMut()>::new(update);
    if window
        .add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::debug!("scroll listener rejected");
    }
    closure.forget();
}

fn field_value(document: &Document, id: &str) -> Option<String> {
    let node = document.get_element_by_id(id)?;
    if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    node.dyn_ref::<HtmlTextAreaElement>().map(HtmlTextAreaElement::value)
}

/// Validate on submit; nothing is sent anywhere.
fn wire_contact_form(site: &SharedSite, document: &Document, markup: &MarkupConfig) {
    let Some(form) = document
        .get_element_by_id(&markup.form_id)
        .and_then(|node| node.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };
    if document.get_element_by_id(&markup.form_feedback_id).is_none() {
        return;
    }

    let site = Rc::clone(site);
    let document = document.clone();
    let fields = markup.form_fields.clone();
    let target = form.clone();
    on(&form, "submit", move |event| {
        event.prevent_default();
        let [name, email, message] = &fields;
        let (Some(name), Some(email), Some(message)) = (
            field_value(&document, name),
            field_value(&document, email),
            field_value(&document, message),
        ) else {
            return;
        };

        let feedback = site
            .borrow_mut()
            .submit_contact(&ContactForm::new(name, email, message));
        tracing::debug!(key = feedback.message_key, "contact form submitted");
        if feedback.should_reset() {
            target.reset();
        }
    });
}

fn wire_language_controls(site: &SharedSite) {
    let controls: Vec<(Element, String)> = site
        .borrow()
        .language_controls()
        .iter()
        .filter_map(|control| Some((control.node.clone(), control.language.clone()?)))
        .collect();

    for (button, language) in controls {
        let site = Rc::clone(site);
        on(&button, "click", move |_| {
            site.borrow_mut().switch_language(&language);
        });
    }
}
