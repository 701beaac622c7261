//! Form Relevance Analyzer
//!
//! Decides whether a form (or the whole page, for a formless input) is a
//! sign-up style context worth autofilling. Every text source on the page is
//! turned into an immutable [`SignalSource`], each source is evaluated into
//! zero or more [`MatchSignal`]s, and the signals are folded into a
//! [`FormScore`]. A positive total means the form is eligible.

use regex::Regex;
use scraper::ElementRef;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, ProviderConfig, SignalWeights};
use crate::dom::{attr_lower, deep_text, input_type, is_tag, own_text, Page};
use crate::error::Result;
use crate::normalize::{attribute_string, collapse_whitespace};
use crate::rules::{default_rules, FormPatterns, RulesTable};

/// Elements never evaluated inside a form; their text is noise
const SKIPPED_TAGS: [&str; 6] = ["select", "option", "script", "style", "template", "noscript"];

/// Where a signal's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SignalKind {
    Generic,
    SubmitButton,
    ExternalLink,
    FormOrInputAttribute,
    Heading,
    PageTitle,
}

/// One text source to evaluate, with every option resolved up front
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSource {
    pub text: String,
    pub strength: f64,
    pub kind: SignalKind,
    /// Human-readable origin, e.g. `submit: Sign up`
    pub description: String,
    /// Invert polarity: a login link elsewhere means this is not the login form
    pub should_flip: bool,
    /// Look for login and signup wording in the same string
    pub should_check_unified_form: bool,
    /// Use the stricter positive pattern
    pub should_be_conservative: bool,
}

impl SignalSource {
    /// An attribute as `name=value`; attributes of the triggering input check for unified forms
    pub fn attribute(tag: &str, name: &str, value: &str, strength: f64, is_input: bool) -> Self {
        let text = attribute_string(name, value);
        Self {
            description: format!("{} attr: {}", tag.to_uppercase(), text),
            text,
            strength,
            kind: SignalKind::FormOrInputAttribute,
            should_flip: false,
            should_check_unified_form: is_input,
            should_be_conservative: false,
        }
    }

    pub fn page_title(title: &str, strength: f64) -> Self {
        Self::plain(title, strength, SignalKind::PageTitle, "page title")
    }

    pub fn heading(text: &str, strength: f64) -> Self {
        Self {
            should_check_unified_form: true,
            should_be_conservative: true,
            ..Self::plain(text, strength, SignalKind::Heading, "heading")
        }
    }

    pub fn submit(text: &str, strength: f64) -> Self {
        Self::plain(text, strength, SignalKind::SubmitButton, "submit")
    }

    pub fn external_link(text: &str, strength: f64) -> Self {
        Self {
            should_flip: true,
            ..Self::plain(text, strength, SignalKind::ExternalLink, "external link")
        }
    }

    pub fn generic(text: &str, strength: f64) -> Self {
        Self {
            should_check_unified_form: true,
            ..Self::plain(text, strength, SignalKind::Generic, "generic")
        }
    }

    fn plain(text: &str, strength: f64, kind: SignalKind, label: &str) -> Self {
        let text = collapse_whitespace(text);
        Self {
            description: format!("{}: {}", label, text),
            text,
            strength,
            kind,
            should_flip: false,
            should_check_unified_form: false,
            should_be_conservative: false,
        }
    }
}

/// A weighted, signed vote produced by one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSignal {
    pub source_text: String,
    pub description: String,
    pub weight: f64,
    pub kind: SignalKind,
    pub negated: bool,
}

impl MatchSignal {
    pub fn delta(&self) -> f64 {
        if self.negated {
            -self.weight
        } else {
            self.weight
        }
    }
}

/// One entry of a score breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub description: String,
    pub delta: f64,
}

impl From<&MatchSignal> for Contribution {
    fn from(signal: &MatchSignal) -> Self {
        Self {
            description: signal.description.clone(),
            delta: signal.delta(),
        }
    }
}

/// The result of analyzing one form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormScore {
    pub total_signal: f64,
    pub contributions: Vec<Contribution>,
}

impl FormScore {
    /// Fold an ordered list of contributions into a score
    pub fn from_contributions<I>(contributions: I) -> Self
    where
        I: IntoIterator<Item = Contribution>,
    {
        Self::default().extended(contributions)
    }

    /// Append more contributions to an existing score
    pub fn extended<I>(self, contributions: I) -> Self
    where
        I: IntoIterator<Item = Contribution>,
    {
        contributions.into_iter().fold(self, |mut acc, c| {
            acc.total_signal += c.delta;
            acc.contributions.push(c);
            acc
        })
    }

    /// Only the sign matters: positive means autofill may engage
    pub fn is_eligible(&self) -> bool {
        self.total_signal > 0.0
    }
}

/// Scores forms against the rule set's form patterns
pub struct FormAnalyzer<'r> {
    patterns: &'r FormPatterns,
    weights: SignalWeights,
    signup_page: Option<Regex>,
}

impl<'r> FormAnalyzer<'r> {
    /// Build an analyzer from rules and configuration
    pub fn new(rules: &'r RulesTable, config: &Config) -> Result<Self> {
        Ok(Self {
            patterns: &rules.form,
            weights: config.weights,
            signup_page: Some(config.provider.signup_page_regex()?),
        })
    }

    /// Default weights and provider settings
    pub fn with_rules(rules: &'r RulesTable) -> Self {
        Self {
            patterns: &rules.form,
            weights: SignalWeights::default(),
            signup_page: ProviderConfig::default().signup_page_regex().ok(),
        }
    }

    pub fn weights(&self) -> &SignalWeights {
        &self.weights
    }

    /// Score the context of `input`: its form when there is one, else the page
    pub fn analyze(&self, page: &Page, form: Option<ElementRef<'_>>, input: ElementRef<'_>) -> FormScore {
        if self.is_provider_signup_page(page.url()) {
            debug!(url = page.url(), "provider sign-up page, skipping analysis");
            return FormScore::default();
        }

        let mut sources = self.attribute_sources(&input, self.weights.input_attribute, true);

        let score = match form {
            Some(form) => {
                sources.extend(self.form_sources(page, &form));
                let score = self.score_sources(&sources);
                if score.total_signal == 0.0 {
                    // Undecided: let the page headings break the tie
                    let headings = self.heading_sources(page);
                    score.extended(self.contributions(&headings))
                } else {
                    score
                }
            }
            None => {
                sources.extend(self.page_sources(page));
                self.score_sources(&sources)
            }
        };

        for c in &score.contributions {
            debug!(delta = c.delta, "{}", c.description);
        }
        debug!(total = score.total_signal, "form analyzed");
        score
    }

    /// Fold a list of sources into a score
    pub fn score_sources(&self, sources: &[SignalSource]) -> FormScore {
        FormScore::from_contributions(self.contributions(sources))
    }

    fn contributions(&self, sources: &[SignalSource]) -> Vec<Contribution> {
        sources
            .iter()
            .flat_map(|source| self.evaluate(source))
            .map(|signal| Contribution::from(&signal))
            .collect()
    }

    /// Evaluate one source into the signals it produces
    pub fn evaluate(&self, source: &SignalSource) -> Vec<MatchSignal> {
        let text = source.text.as_str();
        if text.is_empty() {
            return Vec::new();
        }

        let signal = |description: String, weight: f64, negated: bool| MatchSignal {
            source_text: source.text.clone(),
            description,
            weight,
            kind: source.kind,
            negated,
        };

        let matches_negative = self.patterns.negative.is_match(text);

        // Unified login/signup forms are never autofill targets
        if source.should_check_unified_form
            && matches_negative
            && self.patterns.strict_positive.is_match(text)
        {
            return vec![signal(
                format!("Unified detected {}", source.description),
                source.strength + self.weights.unified_penalty,
                true,
            )];
        }

        let matches_positive = self
            .patterns
            .positive_for(source.should_be_conservative)
            .is_match(text);

        let mut signals = Vec::new();
        if matches_negative {
            signals.push(signal(source.description.clone(), source.strength, !source.should_flip));
        }
        if matches_positive {
            signals.push(signal(source.description.clone(), source.strength, source.should_flip));
        }
        signals
    }

    fn is_provider_signup_page(&self, url: &str) -> bool {
        self.signup_page
            .as_ref()
            .map(|re| re.is_match(url))
            .unwrap_or(false)
    }

    fn attribute_sources(&self, el: &ElementRef<'_>, strength: f64, is_input: bool) -> Vec<SignalSource> {
        let tag = el.value().name();
        el.value()
            .attrs()
            .map(|(name, value)| SignalSource::attribute(tag, name, value, strength, is_input))
            .collect()
    }

    fn form_sources(&self, page: &Page, form: &ElementRef<'_>) -> Vec<SignalSource> {
        let mut sources = Vec::new();

        let title = page.title();
        if !title.is_empty() {
            sources.push(SignalSource::page_title(&title, self.weights.page_title));
        }

        sources.extend(self.attribute_sources(form, self.weights.form_attribute, false));

        for el in form.descendants().skip(1).filter_map(ElementRef::wrap) {
            if SKIPPED_TAGS.iter().any(|tag| is_tag(&el, tag)) {
                continue;
            }
            sources.extend(self.element_sources(&el));
        }

        sources
    }

    fn page_sources(&self, page: &Page) -> Vec<SignalSource> {
        let mut sources = Vec::new();

        let title = page.title();
        if !title.is_empty() {
            sources.push(SignalSource::page_title(&title, self.weights.page_title));
        }

        sources.extend(self.heading_sources(page));

        // A button inside some other form is unrelated to a formless input
        for button in page.orphan_buttons() {
            sources.extend(self.element_sources(&button));
            sources.extend(self.attribute_sources(&button, self.weights.orphan_button, false));
        }

        sources
    }

    fn heading_sources(&self, page: &Page) -> Vec<SignalSource> {
        page.headings()
            .iter()
            .map(|heading| SignalSource::heading(&deep_text(heading), self.weights.heading))
            .filter(|source| !source.text.is_empty())
            .collect()
    }

    /// Sources contributed by one element's own text
    fn element_sources(&self, el: &ElementRef<'_>) -> Vec<SignalSource> {
        let text = own_text(el);
        if text.is_empty() {
            return Vec::new();
        }

        let mut sources = Vec::new();
        if is_submit_like(el) {
            sources.push(SignalSource::submit(&text, self.weights.submit));
        }

        if is_off_page_link(el) {
            sources.push(SignalSource::external_link(&text, self.weights.link));
        } else {
            sources.push(SignalSource::generic(&text, self.weights.generic));
        }
        sources
    }
}

/// Analyze with the embedded rules and default configuration
pub fn analyze(page: &Page, form: Option<ElementRef<'_>>, input: ElementRef<'_>) -> FormScore {
    FormAnalyzer::with_rules(default_rules()).analyze(page, form, input)
}

/// Submit inputs, submitting buttons and ARIA buttons
fn is_submit_like(el: &ElementRef<'_>) -> bool {
    if attr_lower(el, "role") == "button" {
        return true;
    }
    if is_tag(el, "input") {
        return matches!(input_type(el).as_str(), "submit" | "button");
    }
    if is_tag(el, "button") {
        // Buttons submit unless told otherwise
        return !matches!(attr_lower(el, "type").as_str(), "button" | "reset" | "menu");
    }
    false
}

/// Links that lead away from the current form
fn is_off_page_link(el: &ElementRef<'_>) -> bool {
    if attr_lower(el, "role") == "link" {
        return true;
    }
    if !is_tag(el, "a") {
        return false;
    }
    let href = attr_lower(el, "href");
    !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> FormAnalyzer<'static> {
        FormAnalyzer::with_rules(default_rules())
    }

    fn total(sources: &[SignalSource]) -> f64 {
        analyzer().score_sources(sources).total_signal
    }

    #[test]
    fn test_newsletter_is_positive() {
        let sources = [SignalSource::generic("sign up for our newsletter", 1.0)];
        assert!(total(&sources) > 0.0);
    }

    #[test]
    fn test_unified_form_is_amplified_negative() {
        let signals = analyzer().evaluate(&SignalSource::generic("sign in or sign up", 1.0));
        assert_eq!(signals.len(), 1);
        assert!(signals[0].description.starts_with("Unified detected"));
        assert_eq!(signals[0].delta(), -3.0);
    }

    #[test]
    fn test_unified_check_disabled_cancels_out() {
        // Page titles don't check for unified forms: -2 for sign in, +2 for sign up
        let sources = [SignalSource::page_title("Sign in or sign up", 2.0)];
        assert_eq!(total(&sources), 0.0);
    }

    #[test]
    fn test_flip_rule_inverts_login_link() {
        let sources = [SignalSource::external_link("Log in", 1.0)];
        assert_eq!(total(&sources), 1.0);

        let sources = [SignalSource::external_link("Create account", 1.0)];
        assert_eq!(total(&sources), -1.0);
    }

    #[test]
    fn test_conservative_heading_ignores_checkout() {
        assert_eq!(total(&[SignalSource::heading("Checkout", 0.5)]), 0.0);
        assert_eq!(total(&[SignalSource::generic("Checkout", 1.0)]), 1.0);
    }

    #[test]
    fn test_attribute_source_text() {
        let source = SignalSource::attribute("input", "name", "login-email", 3.0, true);
        assert_eq!(source.text, "name=login-email");
        assert_eq!(source.description, "INPUT attr: name=login-email");
        assert_eq!(total(&[source]), -3.0);
    }

    #[test]
    fn test_empty_text_contributes_nothing() {
        assert!(analyzer().evaluate(&SignalSource::generic("", 1.0)).is_empty());
    }

    #[test]
    fn test_score_is_replayable_fold() {
        let contributions = vec![
            Contribution { description: "a".into(), delta: 2.0 },
            Contribution { description: "b".into(), delta: -0.5 },
        ];
        let score = FormScore::from_contributions(contributions.clone());
        assert_eq!(score.total_signal, 1.5);
        assert_eq!(score.contributions, contributions);
        assert!(score.is_eligible());
        assert!(!FormScore::default().is_eligible());
    }

    #[test]
    fn test_submit_and_link_detection() {
        let page = Page::parse(
            "https://example.com",
            r##"<body>
                <button id="b1">Go</button>
                <button id="b2" type="button">Go</button>
                <input id="i1" type="submit" value="Go">
                <div id="d1" role="button">Go</div>
                <a id="a1" href="/login">x</a>
                <a id="a2" href="#top">x</a>
                <span id="s1" role="link">x</span>
            </body>"##,
        );
        let find = |sel: &str| page.find(sel).unwrap();

        assert!(is_submit_like(&find("#b1")));
        assert!(!is_submit_like(&find("#b2")));
        assert!(is_submit_like(&find("#i1")));
        assert!(is_submit_like(&find("#d1")));
        assert!(is_off_page_link(&find("#a1")));
        assert!(!is_off_page_link(&find("#a2")));
        assert!(is_off_page_link(&find("#s1")));
    }
}
