//! Helpers for writing values into classified fields

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::Subtype;

/// One `<option>` of a select element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

impl SelectOption {
    pub fn new(value: &str, text: &str) -> Self {
        Self {
            value: value.to_string(),
            text: text.to_string(),
        }
    }
}

/// Pick the option of a select that represents `value`.
///
/// Selects are assumed to hold card dates. Month selects with exactly twelve
/// options starting at "0" are zero-based. Option values are tried before
/// option text because they tend to be more precise.
pub fn select_option(options: &[SelectOption], subtype: Subtype, value: &str) -> Option<usize> {
    if value.is_empty() {
        return None;
    }

    let is_month = subtype == Subtype::ExpirationMonth;
    let zero_based = is_month
        && options.len() == 12
        && options.first().map(|o| o.value.trim() == "0").unwrap_or(false);

    let by_value = options.iter().position(|option| {
        let option_value = if zero_based {
            option
                .value
                .trim()
                .parse::<u32>()
                .map(|n| (n + 1).to_string())
                .unwrap_or_else(|_| option.value.clone())
        } else {
            option.value.clone()
        };
        option_value.contains(value)
    });

    by_value.or_else(|| options.iter().position(|option| option.text.contains(value)))
}

/// Given an alias, the full address
pub fn format_address(alias: &str, address_domain: &str) -> String {
    format!("{}{}", alias, address_domain)
}

/// Escape `& " ' < > /` as XML entities before putting text into markup
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether a page belongs to the provider's own web app
pub fn is_provider_domain(url: &str, domain_pattern: &Regex) -> bool {
    domain_pattern.is_match(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn months(zero_based: bool) -> Vec<SelectOption> {
        (1..=12)
            .map(|m| {
                let value = if zero_based { m - 1 } else { m };
                SelectOption::new(&value.to_string(), &format!("Month {:02}", m))
            })
            .collect()
    }

    #[test]
    fn test_select_month_one_based() {
        let options = months(false);
        assert_eq!(select_option(&options, Subtype::ExpirationMonth, "8"), Some(7));
    }

    #[test]
    fn test_select_month_zero_based() {
        let options = months(true);
        // "8" is stored as value "7"
        assert_eq!(select_option(&options, Subtype::ExpirationMonth, "8"), Some(7));
    }

    #[test]
    fn test_select_falls_back_to_text() {
        let options = vec![
            SelectOption::new("a", "2024"),
            SelectOption::new("b", "2025"),
        ];
        assert_eq!(select_option(&options, Subtype::ExpirationYear, "2025"), Some(1));
        assert_eq!(select_option(&options, Subtype::ExpirationYear, "2031"), None);
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address("quack", "@duck.com"), "quack@duck.com");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn test_provider_domain() {
        let re = ProviderConfig::default().domain_regex().unwrap();
        assert!(is_provider_domain("https://duckduckgo.com/email/settings", &re));
        assert!(is_provider_domain("https://quack.duckduckgo.com/email/", &re));
        assert!(!is_provider_domain("https://example.com/email", &re));
    }
}
