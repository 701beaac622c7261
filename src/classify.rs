//! Field Subtype Classifier
//!
//! Scores one element's text bundle against a list of field matchers and
//! returns the subtype with the strictly highest positive score. Ties and
//! non-positive scores resolve to `Unknown`.

use std::fmt;

use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dom::{ElementTextBundle, Page};
use crate::rules::FieldMatcher;

/// The semantic category of one input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subtype {
    Email,
    EmailNew,
    Username,
    Password,
    CardName,
    CardNumber,
    CardSecurityCode,
    ExpirationMonth,
    ExpirationYear,
    /// Month and year in a single field
    Expiration,
    Unknown,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Email => "email",
            Subtype::EmailNew => "emailNew",
            Subtype::Username => "username",
            Subtype::Password => "password",
            Subtype::CardName => "cardName",
            Subtype::CardNumber => "cardNumber",
            Subtype::CardSecurityCode => "cardSecurityCode",
            Subtype::ExpirationMonth => "expirationMonth",
            Subtype::ExpirationYear => "expirationYear",
            Subtype::Expiration => "expiration",
            Subtype::Unknown => "unknown",
        }
    }

    /// The kind of data that fills this field
    pub fn input_type(&self) -> InputType {
        match self {
            Subtype::Email | Subtype::EmailNew => InputType::Email,
            Subtype::Username | Subtype::Password => InputType::Credentials,
            Subtype::CardName
            | Subtype::CardNumber
            | Subtype::CardSecurityCode
            | Subtype::ExpirationMonth
            | Subtype::ExpirationYear
            | Subtype::Expiration => InputType::CreditCard,
            Subtype::Unknown => InputType::Unknown,
        }
    }

    /// Fields whose value is a month, a year, or both
    pub fn is_expiry(&self) -> bool {
        matches!(
            self,
            Subtype::ExpirationMonth | Subtype::ExpirationYear | Subtype::Expiration
        )
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main data category, used to pick what the tooltip offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    Email,
    Credentials,
    CreditCard,
    Unknown,
}

/// Accumulated score of one subtype
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtypeScore {
    pub subtype: Subtype,
    pub score: f64,
}

/// Score every matcher against a bundle, in matcher order
pub fn score_subtypes(bundle: &ElementTextBundle, matchers: &[&FieldMatcher]) -> Vec<SubtypeScore> {
    let fragments = bundle.fragments();

    matchers
        .iter()
        .map(|matcher| {
            let score = matcher
                .signals
                .iter()
                .map(|signal| {
                    fragments
                        .iter()
                        .map(|(source, text)| signal.delta(*source, text))
                        .sum::<f64>()
                })
                .sum::<f64>();
            SubtypeScore {
                subtype: matcher.subtype,
                score,
            }
        })
        .collect()
}

/// Pick the winner of a score list: strictly highest and positive, else `Unknown`
pub fn best_subtype(scores: &[SubtypeScore]) -> Subtype {
    let top = scores.iter().map(|s| s.score).fold(f64::NEG_INFINITY, f64::max);
    if top <= 0.0 {
        return Subtype::Unknown;
    }

    let mut leaders = scores.iter().filter(|s| s.score == top);
    match (leaders.next(), leaders.next()) {
        (Some(winner), None) => winner.subtype,
        _ => Subtype::Unknown,
    }
}

/// Classify one element from its text bundle
pub fn classify(bundle: &ElementTextBundle, matchers: &[&FieldMatcher]) -> Subtype {
    let scores = score_subtypes(bundle, matchers);
    let subtype = best_subtype(&scores);
    trace!(tag = %bundle.tag, %subtype, ?scores, "classified field");
    subtype
}

/// Classify an element of a page, deriving its bundle from the current document
pub fn classify_element(page: &Page, el: ElementRef<'_>, matchers: &[&FieldMatcher]) -> Subtype {
    classify(&page.bundle(el), matchers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_rules;

    fn cc_label(text: &str) -> Subtype {
        let cc = default_rules().list("cc").unwrap();
        classify(&ElementTextBundle::new("input").with_label(text), &cc)
    }

    #[test]
    fn test_card_name_labels() {
        for text in ["credit card name", "name on card", "card holder", "card owner"] {
            assert_eq!(cc_label(text), Subtype::CardName, "{}", text);
        }
        assert_ne!(cc_label("card number"), Subtype::CardName);
    }

    #[test]
    fn test_card_number_labels() {
        assert_eq!(cc_label("Credit Card Number"), Subtype::CardNumber);
        assert_eq!(cc_label("number on card"), Subtype::CardNumber);
        assert_ne!(cc_label("card owner"), Subtype::CardNumber);
    }

    #[test]
    fn test_expiration_month_labels() {
        for text in ["expiry month", "expiration month", "exp month"] {
            assert_eq!(cc_label(text), Subtype::ExpirationMonth, "{}", text);
        }
        for text in ["Credit Card Number", "expiry year", "expiration year", "exp year", "card expiry yy"] {
            assert_ne!(cc_label(text), Subtype::ExpirationMonth, "{}", text);
        }
    }

    #[test]
    fn test_expiration_year_labels() {
        for text in ["expiry year", "expiration year", "exp year", "card expiry yy"] {
            assert_eq!(cc_label(text), Subtype::ExpirationYear, "{}", text);
        }
        for text in ["Credit Card Number", "expiry month", "expiration month", "exp month", "card expiry mo"] {
            assert_ne!(cc_label(text), Subtype::ExpirationYear, "{}", text);
        }
    }

    #[test]
    fn test_unified_expiration_with_autocomplete() {
        let cc = default_rules().list("cc").unwrap();
        let bundle = ElementTextBundle::new("input")
            .with_attr("autocomplete", "cc-exp")
            .with_placeholder("MM-AAAA");
        assert_eq!(classify(&bundle, &cc), Subtype::Expiration);
    }

    #[test]
    fn test_tie_is_unknown() {
        let scores = vec![
            SubtypeScore { subtype: Subtype::Email, score: 2.0 },
            SubtypeScore { subtype: Subtype::Username, score: 2.0 },
        ];
        assert_eq!(best_subtype(&scores), Subtype::Unknown);
    }

    #[test]
    fn test_non_positive_is_unknown() {
        let scores = vec![
            SubtypeScore { subtype: Subtype::Email, score: 0.0 },
            SubtypeScore { subtype: Subtype::Username, score: -1.0 },
        ];
        assert_eq!(best_subtype(&scores), Subtype::Unknown);
        assert_eq!(best_subtype(&[]), Subtype::Unknown);
    }

    #[test]
    fn test_email_and_confirmation() {
        let email = default_rules().list("email").unwrap();
        let plain = ElementTextBundle::new("input").with_attr("type", "email");
        assert_eq!(classify(&plain, &email), Subtype::Email);

        let confirm = ElementTextBundle::new("input")
            .with_attr("type", "email")
            .with_label("Confirm email");
        assert_eq!(classify(&confirm, &email), Subtype::EmailNew);
    }

    #[test]
    fn test_credentials() {
        let all = default_rules().all();
        let password = ElementTextBundle::new("input").with_attr("type", "password");
        assert_eq!(classify(&password, &all), Subtype::Password);

        let user = ElementTextBundle::new("input").with_attr("autocomplete", "username");
        assert_eq!(classify(&user, &all), Subtype::Username);
    }

    #[test]
    fn test_plain_text_input_is_unknown() {
        let all = default_rules().all();
        let search = ElementTextBundle::new("input").with_attr("name", "q");
        assert_eq!(classify(&search, &all), Subtype::Unknown);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Subtype::EmailNew).unwrap(), "\"emailNew\"");
        assert_eq!(Subtype::CardSecurityCode.to_string(), "cardSecurityCode");
        assert_eq!(Subtype::Expiration.input_type(), InputType::CreditCard);
    }
}
