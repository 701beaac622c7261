//! Input scanning and the form registry
//!
//! Finds the inputs autofill could act on, groups them by owning form and
//! keeps one entry per form in an explicit keyed store. The registry is owned
//! by the caller and handed in by reference on every scan; nothing here is
//! global. Rescanning the same page never registers a form twice, while
//! field classification is recomputed on every scan.

use std::collections::HashMap;

use scraper::ElementRef;
use serde::Serialize;

use crate::analyzer::{FormAnalyzer, FormScore};
use crate::classify::{classify, InputType, Subtype};
use crate::dom::{attr_lower, input_type, is_tag, Page};
use crate::expiry::{infer_expiry_format, ExpiryFormatSpec};
use crate::rules::RulesTable;
use crate::session::FormSession;

/// Input types autofill can write into
const FILLABLE_TYPES: [&str; 5] = ["text", "email", "password", "tel", "number"];

/// Identity of a form group: the form element, or the input itself when it has no form.
/// Values are element positions in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum FormKey {
    Form(usize),
    Orphan(usize),
}

/// An input and what it was classified as
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedInput {
    /// Position of the element in document order
    pub index: usize,
    pub description: String,
    pub subtype: Subtype,
    pub input_type: InputType,
    /// Only present for expiry fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_format: Option<ExpiryFormatSpec>,
}

/// Everything known about one form
#[derive(Debug, Clone, Serialize)]
pub struct FormEntry {
    pub key: FormKey,
    pub description: String,
    pub score: FormScore,
    pub inputs: Vec<ClassifiedInput>,
}

impl FormEntry {
    pub fn is_eligible(&self) -> bool {
        self.score.is_eligible()
    }

    /// A fresh tooltip state machine for this form's inputs
    pub fn session(&self) -> FormSession {
        FormSession::new(self.inputs.len(), self.is_eligible())
    }
}

/// Keyed store of the forms seen on a page
#[derive(Debug, Default)]
pub struct FormRegistry {
    entries: Vec<FormEntry>,
    index: HashMap<FormKey, usize>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a page for eligible inputs. Returns how many forms were newly registered.
    pub fn scan(&mut self, page: &Page, rules: &RulesTable, analyzer: &FormAnalyzer<'_>) -> usize {
        let matchers = rules.all();

        // Document order positions serve as stable element identities for this page
        let positions: HashMap<_, usize> = page
            .document()
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .map(|(i, el)| (el.id(), i))
            .collect();
        let position = |el: &ElementRef<'_>| positions.get(&el.id()).copied().unwrap_or(0);

        let mut added = 0;
        for input in find_eligible_inputs(page) {
            let form = page.owning_form(input);
            let key = match form {
                Some(ref f) => FormKey::Form(position(f)),
                None => FormKey::Orphan(position(&input)),
            };

            let slot = match self.index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let score = analyzer.analyze(page, form, input);
                    let description = match form {
                        Some(ref f) => describe(f, position(f)),
                        None => describe(&input, position(&input)),
                    };
                    self.entries.push(FormEntry {
                        key,
                        description,
                        score,
                        inputs: Vec::new(),
                    });
                    self.index.insert(key, self.entries.len() - 1);
                    added += 1;
                    self.entries.len() - 1
                }
            };

            let entry = &mut self.entries[slot];
            if !entry.is_eligible() {
                continue;
            }

            let index = position(&input);
            let bundle = page.bundle(input);
            let subtype = classify(&bundle, &matchers);

            entry.inputs.retain(|i| i.index != index);
            if subtype == Subtype::Unknown {
                continue;
            }
            entry.inputs.push(ClassifiedInput {
                index,
                description: describe(&input, index),
                subtype,
                input_type: subtype.input_type(),
                expiry_format: subtype.is_expiry().then(|| infer_expiry_format(&bundle)),
            });
            entry.inputs.sort_by_key(|i| i.index);
        }

        added
    }

    pub fn get(&self, key: &FormKey) -> Option<&FormEntry> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    /// Registered forms in the order they were first seen
    pub fn forms(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every form (on logout)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// Inputs and selects autofill could act on, in document order
pub fn find_eligible_inputs(page: &Page) -> Vec<ElementRef<'_>> {
    page.select_static("input, select")
        .into_iter()
        .filter(is_eligible_input)
        .collect()
}

/// Visible, editable inputs of a fillable type, and selects
pub fn is_eligible_input(el: &ElementRef<'_>) -> bool {
    if is_inert(el) {
        return false;
    }
    if is_tag(el, "select") {
        return true;
    }
    is_tag(el, "input") && FILLABLE_TYPES.contains(&input_type(el).as_str())
}

/// The narrower test used for email-only autofill: email inputs, or text
/// inputs whose name, id, placeholder or aria-label mentions "mail"
pub fn is_email_candidate(el: &ElementRef<'_>) -> bool {
    if !is_tag(el, "input") {
        return false;
    }
    let ty = input_type(el);
    if ty == "email" {
        return !is_inert(el);
    }
    if ty != "text" {
        return false;
    }

    let mentions_mail = |name: &str| attr_lower(el, name).contains("mail");
    if mentions_mail("aria-label") {
        return true;
    }
    !is_inert(el) && (mentions_mail("name") || mentions_mail("id") || mentions_mail("placeholder"))
}

fn is_inert(el: &ElementRef<'_>) -> bool {
    let value = el.value();
    value.attr("readonly").is_some()
        || value.attr("disabled").is_some()
        || value.attr("hidden").is_some()
        || attr_lower(el, "aria-hidden") == "true"
}

/// Short human-readable handle: `tag#id`, `tag[name=..]` or `tag@position`
fn describe(el: &ElementRef<'_>, position: usize) -> String {
    let tag = el.value().name();
    if let Some(id) = el.value().attr("id").filter(|id| !id.is_empty()) {
        format!("{}#{}", tag, id)
    } else if let Some(name) = el.value().attr("name").filter(|n| !n.is_empty()) {
        format!("{}[name={}]", tag, name)
    } else {
        format!("{}@{}", tag, position)
    }
}
