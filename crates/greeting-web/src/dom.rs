//! Document access: element lookup, computed-style snapshots and inline
//! style writes.

use std::collections::HashMap;

use greeting_engine::timeline::SEGMENTED_SELECTORS;
use greeting_engine::{Channel, ComputedStyle, ContentTarget, ElementStyle, PageLayout, StyleUpdate};
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Document, Element, HtmlAudioElement, HtmlElement, SvgElement};

pub const OVERLAY_ID: &str = "audio-overlay";
pub const OVERLAY_CONTENT: &str = ".overlay-content";
pub const REPLAY_ID: &str = "replay";

/// An element that carries an inline style. The `.eight svg` burst
/// animates SVG roots, which are not `HTMLElement`s.
#[derive(Clone)]
enum Styled {
    Html(HtmlElement),
    Svg(SvgElement),
}

impl Styled {
    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlElement>() {
            Ok(html) => Some(Styled::Html(html)),
            Err(element) => element.dyn_into::<SvgElement>().ok().map(Styled::Svg),
        }
    }

    fn style(&self) -> CssStyleDeclaration {
        match self {
            Styled::Html(e) => e.style(),
            Styled::Svg(e) => e.style(),
        }
    }

    fn element(&self) -> &Element {
        match self {
            Styled::Html(e) => e,
            Styled::Svg(e) => e,
        }
    }
}

pub struct WebDom {
    document: Document,
    /// Matches per selector, in document order. Filled on first use.
    cache: HashMap<String, Vec<Styled>>,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            cache: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn query_all(&self, selector: &str) -> Vec<Styled> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            log::warn!("invalid selector {:?}", selector);
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(Styled::from_element)
            .collect()
    }

    fn matches(&mut self, selector: &str) -> &[Styled] {
        if !self.cache.contains_key(selector) {
            let found = self.query_all(selector);
            self.cache.insert(selector.to_string(), found);
        }
        self.cache.get(selector).map(Vec::as_slice).unwrap_or(&[])
    }

    fn computed(&self, element: &Element) -> ElementStyle {
        let Some(window) = self.document.default_view() else {
            return ElementStyle::default();
        };
        match window.get_computed_style(element) {
            Ok(Some(decl)) => {
                let read = |name: &str| decl.get_property_value(name).unwrap_or_default();
                ElementStyle::from(ComputedStyle {
                    opacity: read("opacity"),
                    visibility: read("visibility"),
                    color: read("color"),
                    background_color: read("background-color"),
                })
            }
            _ => ElementStyle::default(),
        }
    }

    /// Snapshot every element the page animates, plus the text of the
    /// blocks that get segmented.
    pub fn layout<'a>(&mut self, selectors: impl IntoIterator<Item = &'a str>) -> PageLayout {
        let mut layout = PageLayout::new();
        let all = selectors.into_iter().chain(SEGMENTED_SELECTORS);
        for selector in all {
            let elements = self.matches(selector).to_vec();
            let styles = elements.iter().map(|e| self.computed(e.element())).collect();
            layout = layout.with_styles(selector, styles);
        }
        for selector in SEGMENTED_SELECTORS {
            if let Ok(Some(element)) = self.document.query_selector(selector) {
                layout = layout.with_text(selector, element.text_content().unwrap_or_default());
            }
        }
        layout
    }

    /// Write a style update's declarations inline.
    pub fn apply_style(&mut self, update: &StyleUpdate) {
        let Some(target) = self.matches(&update.selector).get(update.index) else {
            return;
        };
        let style = target.style();
        for (name, value) in update.style.css_declarations() {
            if let Err(err) = style.set_property(name, &value) {
                log::debug!("set {} on {} failed: {:?}", name, update.selector, err);
            }
        }
    }

    /// Replace the markup of the first match and forget cached matches
    /// inside it.
    pub fn set_inner_html(&mut self, selector: &str, html: &str) {
        if let Ok(Some(element)) = self.document.query_selector(selector) {
            element.set_inner_html(html);
        }
        let prefix = format!("{} ", selector);
        self.cache.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    pub fn audio(&self, channel: Channel) -> Option<HtmlAudioElement> {
        self.by_id(channel.element_id())?.dyn_into().ok()
    }

    pub fn set_overlay_visible(&self, visible: bool) {
        let Some(overlay) = self.by_id(OVERLAY_ID).and_then(|e| e.dyn_into::<HtmlElement>().ok()) else {
            return;
        };
        let style = overlay.style();
        let result = if visible {
            style.remove_property("display").map(|_| ())
        } else {
            style.set_property("display", "none")
        };
        if let Err(err) = result {
            log::debug!("overlay display change failed: {:?}", err);
        }
    }

    pub fn set_overlay_text(&self, text: &str) {
        let content = self
            .by_id(OVERLAY_ID)
            .and_then(|overlay| overlay.query_selector(OVERLAY_CONTENT).ok().flatten());
        if let Some(content) = content {
            content.set_text_content(Some(text));
        }
    }

    pub fn set_class(&self, id: &str, class: &str, present: bool) {
        let Some(element) = self.by_id(id) else {
            return;
        };
        let classes = element.class_list();
        let result = if present { classes.add_1(class) } else { classes.remove_1(class) };
        if let Err(err) = result {
            log::debug!("class {} on #{} failed: {:?}", class, id, err);
        }
    }
}

impl ContentTarget for WebDom {
    fn set_text(&mut self, id: &str, text: &str) -> bool {
        match self.by_id(id) {
            Some(element) => {
                element.set_text_content(Some(text));
                true
            }
            None => false,
        }
    }

    fn set_attribute(&mut self, id: &str, name: &str, value: &str) -> bool {
        match self.by_id(id) {
            Some(element) => element.set_attribute(name, value).is_ok(),
            None => false,
        }
    }
}
