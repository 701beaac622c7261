//! Expiry command: format a card expiry date from field hints

use colored::Colorize;
use fillscan::dom::ElementTextBundle;
use fillscan::error::Result;
use fillscan::expiry::{infer_expiry_format, parse_expiry_hint};

/// Print the expiry value a field with these hints would receive
pub fn cmd_expiry(placeholder: Option<String>, label: Option<String>, month: u32, year: u32) -> Result<()> {
    let mut bundle = ElementTextBundle::new("input");
    if let Some(ref text) = placeholder {
        bundle = bundle.with_placeholder(text);
    }
    if let Some(ref text) = label {
        bundle = bundle.with_label(text);
    }

    let format = infer_expiry_format(&bundle);
    println!("{}", format.format(month, year).bold());

    let hinted = [placeholder.as_deref(), label.as_deref()]
        .into_iter()
        .flatten()
        .any(|text| parse_expiry_hint(text).is_some());
    if !hinted {
        eprintln!("{}", "No format hint recognised, using MM/YYYY".dimmed());
    }

    Ok(())
}
