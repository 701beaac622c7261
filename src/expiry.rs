//! Expiry Date Formatter
//!
//! Infers how a single month/year field wants its value written from the
//! placeholder or label hints ("mm/yy", "MM-AAAA", "__-____", "i.e. 10-2022")
//! and formats a month and year accordingly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dom::ElementTextBundle;

/// `<month> <separator> <year>` where runs are placeholder letters, underscores or digits
static EXPIRY_HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:mm|__|\d{2})(\s*)([-/._ ])(\s*)(yyyy|aaaa|jjjj|____|\d{4}|yy|aa|jj|__|\d{2})",
    )
    .expect("Invalid expiry hint regex pattern")
});

pub const DEFAULT_SEPARATOR: char = '/';
pub const DEFAULT_YEAR_DIGITS: u8 = 4;

/// How an expiry field expects its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpiryFormatSpec {
    pub separator: char,
    /// 2 or 4
    pub year_digits: u8,
    /// Always true for the supported locales
    pub month_first: bool,
}

impl Default for ExpiryFormatSpec {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            year_digits: DEFAULT_YEAR_DIGITS,
            month_first: true,
        }
    }
}

impl ExpiryFormatSpec {
    /// Format a month (1-12) and a four-digit year
    pub fn format(&self, month: u32, year: u32) -> String {
        let year = if self.year_digits == 2 {
            format!("{:02}", year % 100)
        } else {
            format!("{:04}", year)
        };
        let month = format!("{:02}", month);

        if self.month_first {
            format!("{}{}{}", month, self.separator, year)
        } else {
            format!("{}{}{}", year, self.separator, month)
        }
    }
}

/// Read a format hint out of one piece of text
pub fn parse_expiry_hint(text: &str) -> Option<ExpiryFormatSpec> {
    let caps = EXPIRY_HINT_RE.captures(text)?;
    let separator = caps.get(2)?.as_str().chars().next()?;
    let year_run = caps.get(4)?.as_str();

    Some(ExpiryFormatSpec {
        separator,
        year_digits: if year_run.len() == 2 { 2 } else { 4 },
        month_first: true,
    })
}

/// Infer the format from placeholder, then label, then accessible name
pub fn infer_expiry_format(bundle: &ElementTextBundle) -> ExpiryFormatSpec {
    [&bundle.placeholder, &bundle.label, &bundle.aria_label]
        .into_iter()
        .find_map(|text| parse_expiry_hint(text))
        .unwrap_or_default()
}

/// Format an expiry value for a classified expiry field
pub fn format_expiry(bundle: &ElementTextBundle, month: u32, year: u32) -> String {
    infer_expiry_format(bundle).format(month, year)
}
