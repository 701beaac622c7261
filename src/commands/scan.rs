//! Scan command: register every form on a page and classify its fields

use std::path::Path;

use colored::Colorize;
use fillscan::analyzer::FormAnalyzer;
use fillscan::config::Config;
use fillscan::error::Result;
use fillscan::fill::{format_address, is_provider_domain};
use fillscan::rules::RulesTable;
use fillscan::scan::{FormKey, FormRegistry};

use crate::utils::{format_signal, load_page};

/// Scan a page and print one block per form
pub fn cmd_scan(file: &Path, url: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let rules = RulesTable::load(&config)?;
    let analyzer = FormAnalyzer::new(&rules, &config)?;
    let page = load_page(file, url)?;

    let mut registry = FormRegistry::new();
    registry.scan(&page, &rules, &analyzer);

    if json {
        println!("{}", serde_json::to_string_pretty(registry.forms())?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No fillable inputs found.");
        return Ok(());
    }

    let title = page.title();
    if !title.is_empty() {
        println!("\n{}", title.bold());
    }
    if is_provider_domain(page.url(), &config.provider.domain_regex()?) {
        println!(
            "{}",
            format!(
                "Provider web app: addresses here are {}",
                format_address("<alias>", &config.provider.address_domain)
            )
            .dimmed()
        );
    }
    println!("{} form(s) found:\n", registry.len());

    for entry in registry.forms() {
        let verdict = if entry.is_eligible() {
            "engaged".green()
        } else {
            "skipped".dimmed()
        };
        let scope = match entry.key {
            FormKey::Form(_) => "",
            FormKey::Orphan(_) => " (no form)",
        };
        println!(
            "  {}{}  {}  {}",
            entry.description.cyan(),
            scope,
            format_signal(entry.score.total_signal),
            verdict
        );

        for input in &entry.inputs {
            let mut line = format!("    {:<28} {}", input.description, input.subtype.to_string().bold());
            if let Some(format) = input.expiry_format {
                line.push_str(&format!(
                    "  (format: MM{}{})",
                    format.separator,
                    if format.year_digits == 2 { "YY" } else { "YYYY" }
                ));
            }
            println!("{}", line);
        }
        if entry.is_eligible() && entry.inputs.is_empty() {
            println!("    {}", "no recognised fields".dimmed());
        }
    }
    println!();

    Ok(())
}
