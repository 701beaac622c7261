//! Element descriptors over a parsed document
//!
//! `Page` wraps a scraper document together with its URL and answers the
//! questions the heuristics ask about elements: owning form, label text,
//! accessible name, direct text. `ElementTextBundle` is the owned snapshot of
//! one element's text that the classifier and expiry formatter consume; it is
//! derived fresh on every call and never cached.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{FillscanError, Result};
use crate::normalize::{collapse_whitespace, join_fragments, normalize_text};
use crate::rules::FragmentSource;

/// Heading-like elements consulted when a form alone cannot decide
pub const HEADING_SELECTOR: &str = r#"h1, h2, h3, [class*="title"], [id*="title"]"#;

/// Submit-like elements on the page
pub const BUTTON_SELECTOR: &str = "button[type=submit], button:not([type]), [role=button]";

/// A parsed document and the URL it was loaded from
pub struct Page {
    url: String,
    html: Html,
}

impl Page {
    /// Parse an HTML document
    pub fn parse(url: &str, html: &str) -> Self {
        Self {
            url: url.to_string(),
            html: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn document(&self) -> &Html {
        &self.html
    }

    /// Text of the `<title>` element, empty if there is none
    pub fn title(&self) -> String {
        self.select_static("title")
            .first()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| FillscanError::SelectorError(format!("{}: {:?}", selector, e)))?;
        Ok(self.html.select(&parsed).collect())
    }

    /// The first element matching a CSS selector
    pub fn find(&self, selector: &str) -> Result<ElementRef<'_>> {
        self.select(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| FillscanError::ElementNotFound(selector.to_string()))
    }

    /// Elements matching one of the built-in selectors
    pub(crate) fn select_static(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(parsed) => self.html.select(&parsed).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Element with the given id attribute
    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        if id.is_empty() {
            return None;
        }
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().attr("id") == Some(id))
    }

    /// The form an element belongs to: its `form` attribute, else the nearest ancestor form
    pub fn owning_form<'a>(&'a self, el: ElementRef<'a>) -> Option<ElementRef<'a>> {
        if let Some(form_id) = el.value().attr("form") {
            if let Some(form) = self.element_by_id(form_id) {
                if is_tag(&form, "form") {
                    return Some(form);
                }
            }
        }
        ancestor_form(el)
    }

    /// Heading-like elements of the whole page
    pub fn headings(&self) -> Vec<ElementRef<'_>> {
        self.select_static(HEADING_SELECTOR)
    }

    /// Submit-like elements that belong to no form
    pub fn orphan_buttons(&self) -> Vec<ElementRef<'_>> {
        self.select_static(BUTTON_SELECTOR)
            .into_iter()
            .filter(|button| self.owning_form(*button).is_none())
            .collect()
    }

    /// Text of the labels associated with an element (`for=id` or wrapping label)
    pub fn label_text(&self, el: ElementRef<'_>) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(id) = el.value().attr("id").filter(|id| !id.is_empty()) {
            for label in self.select_static("label[for]") {
                if label.value().attr("for") == Some(id) {
                    parts.push(deep_text(&label));
                }
            }
        }

        if let Some(wrapping) = el
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| is_tag(a, "label"))
        {
            parts.push(deep_text(&wrapping));
        }

        join_fragments(parts.iter().map(String::as_str))
    }

    /// Computed accessible name: aria-label, then aria-labelledby, then title
    pub fn accessible_name(&self, el: ElementRef<'_>) -> String {
        if let Some(label) = el.value().attr("aria-label") {
            let label = collapse_whitespace(label);
            if !label.is_empty() {
                return label;
            }
        }

        if let Some(ids) = el.value().attr("aria-labelledby") {
            let texts: Vec<String> = ids
                .split_whitespace()
                .filter_map(|id| self.element_by_id(id))
                .map(|target| deep_text(&target))
                .collect();
            let joined = join_fragments(texts.iter().map(String::as_str));
            if !joined.is_empty() {
                return joined;
            }
        }

        el.value()
            .attr("title")
            .map(collapse_whitespace)
            .unwrap_or_default()
    }

    /// Snapshot of everything matchable about an element
    pub fn bundle(&self, el: ElementRef<'_>) -> ElementTextBundle {
        let value = el.value();
        ElementTextBundle {
            tag: value.name().to_lowercase(),
            attributes: value
                .attrs()
                .map(|(name, val)| (name.to_string(), val.to_string()))
                .collect(),
            label: self.label_text(el),
            placeholder: value.attr("placeholder").map(collapse_whitespace).unwrap_or_default(),
            aria_label: self.accessible_name(el),
            text: own_text(&el),
        }
    }
}

/// Nearest ancestor `<form>`
pub fn ancestor_form(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| is_tag(a, "form"))
}

/// Case-insensitive tag name check
pub fn is_tag(el: &ElementRef<'_>, tag: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(tag)
}

/// Lowercased attribute value, empty when absent
pub fn attr_lower(el: &ElementRef<'_>, name: &str) -> String {
    el.value()
        .attr(name)
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default()
}

/// Effective `type` of an input element (missing or empty means "text")
pub fn input_type(el: &ElementRef<'_>) -> String {
    let ty = attr_lower(el, "type");
    if ty.is_empty() && is_tag(el, "input") {
        "text".to_string()
    } else {
        ty
    }
}

/// All descendant text, whitespace-collapsed (what `innerText` gives a button)
pub fn deep_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Concatenation of direct child text nodes only.
///
/// Nested descendants carry their own text and are evaluated separately, so
/// their strings are never attributed to an ancestor.
pub fn direct_text(el: &ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = &text.text;
            out.push(' ');
            out.push_str(text);
        }
    }
    collapse_whitespace(&out)
}

/// The visible text that belongs to an element itself: literal text for
/// buttons, the value of submit/button inputs, direct text otherwise
pub fn own_text(el: &ElementRef<'_>) -> String {
    if is_tag(el, "button") {
        return deep_text(el);
    }
    if is_tag(el, "input") && matches!(input_type(el).as_str(), "submit" | "button") {
        return el.value().attr("value").map(collapse_whitespace).unwrap_or_default();
    }
    direct_text(el)
}

/// The text fragments attributable to one element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementTextBundle {
    /// Lowercased tag name
    pub tag: String,
    /// Attribute name/value pairs in document order
    pub attributes: Vec<(String, String)>,
    /// Text of associated labels
    pub label: String,
    pub placeholder: String,
    /// Accessible name (aria-label, aria-labelledby, title)
    pub aria_label: String,
    /// The element's own text
    pub text: String,
}

impl ElementTextBundle {
    /// Start a bundle for an element with the given tag
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        if name.eq_ignore_ascii_case("placeholder") {
            self.placeholder = collapse_whitespace(value);
        }
        self.attributes.push((name.to_lowercase(), value.to_string()));
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = collapse_whitespace(label);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = collapse_whitespace(placeholder);
        self
    }

    pub fn with_aria_label(mut self, aria_label: &str) -> Self {
        self.aria_label = collapse_whitespace(aria_label);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = collapse_whitespace(text);
        self
    }

    /// Attribute value by (case-insensitive) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Effective input type; inputs without one are "text"
    pub fn input_type(&self) -> String {
        let ty = self.attr("type").map(|t| t.trim().to_lowercase()).unwrap_or_default();
        if ty.is_empty() && self.tag == "input" {
            "text".to_string()
        } else {
            ty
        }
    }

    /// Normalized text for one fragment source (empty when missing)
    pub fn fragment(&self, source: FragmentSource) -> String {
        match source {
            FragmentSource::Type => self.input_type(),
            FragmentSource::Autocomplete => normalize_text(self.attr("autocomplete").unwrap_or("")),
            FragmentSource::Name => normalize_text(self.attr("name").unwrap_or("")),
            FragmentSource::Id => normalize_text(self.attr("id").unwrap_or("")),
            FragmentSource::Label => normalize_text(&self.label),
            FragmentSource::Placeholder => normalize_text(&self.placeholder),
            FragmentSource::Aria => normalize_text(&self.aria_label),
            FragmentSource::Text => normalize_text(&self.text),
        }
    }

    /// Every non-empty fragment with its source
    pub fn fragments(&self) -> Vec<(FragmentSource, String)> {
        const SOURCES: [FragmentSource; 8] = [
            FragmentSource::Type,
            FragmentSource::Autocomplete,
            FragmentSource::Name,
            FragmentSource::Id,
            FragmentSource::Label,
            FragmentSource::Placeholder,
            FragmentSource::Aria,
            FragmentSource::Text,
        ];
        SOURCES
            .iter()
            .map(|&source| (source, self.fragment(source)))
            .filter(|(_, text)| !text.is_empty())
            .collect()
    }
}
