use once_cell::sync::Lazy;
use regex::Regex;

// Pre-compiled regex for whitespace normalization (compile once, use many times)
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

/// Collapse whitespace runs into single spaces and trim the ends
pub fn collapse_whitespace(content: &str) -> String {
    WHITESPACE_RE.replace_all(content, " ").trim().to_string()
}

/// Normalize text pulled from the page for matching: collapsed and lowercased
pub fn normalize_text(content: &str) -> String {
    collapse_whitespace(content).to_lowercase()
}

/// The `name=value` string the form analyzer evaluates for each attribute
pub fn attribute_string(name: &str, value: &str) -> String {
    format!("{}={}", name, value)
}

/// Join text fragments with single spaces, dropping empty ones
pub fn join_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = fragments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    collapse_whitespace(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        let input = "  Sign   up\n\n\tnow ";
        assert_eq!(collapse_whitespace(input), "Sign up now");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("Credit  Card\nNumber"), "credit card number");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_attribute_string() {
        assert_eq!(attribute_string("name", "signup-email"), "name=signup-email");
        assert_eq!(attribute_string("required", ""), "required=");
    }

    #[test]
    fn test_join_fragments() {
        let joined = join_fragments(["  Email ", "", "\n", "address"]);
        assert_eq!(joined, "Email address");
    }
}
