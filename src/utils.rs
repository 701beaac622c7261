//! Shared helpers for the command implementations

use std::path::Path;

use fillscan::dom::Page;
use fillscan::Result;

/// Read an HTML file and parse it as if it was served from `url`
pub fn load_page(file: &Path, url: &str) -> Result<Page> {
    let url = url::Url::parse(url)?;
    let html = std::fs::read_to_string(file)?;
    Ok(Page::parse(url.as_str(), &html))
}

/// Truncate a string to max_len characters (not bytes), adding "..." if truncated.
/// Safe for non-ASCII content (emoji, CJK, etc).
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        chars[..max_len].iter().collect()
    } else {
        format!("{}...", chars[..max_len - 3].iter().collect::<String>())
    }
}

/// Signed score with one decimal, e.g. "+2.5" or "-4.0"
pub fn format_signal(value: f64) -> String {
    format!("{:+.1}", value)
}
