//! Single-element commands: classify and analyze

use std::path::Path;

use colored::Colorize;
use fillscan::analyzer::FormAnalyzer;
use fillscan::classify::{best_subtype, score_subtypes};
use fillscan::config::Config;
use fillscan::error::Result;
use fillscan::expiry::infer_expiry_format;
use fillscan::rules::RulesTable;

use crate::utils::{format_signal, load_page, truncate_str};

/// Classify the first element matching `selector`
pub fn cmd_classify(file: &Path, selector: &str, list: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let rules = RulesTable::load(&config)?;
    let matchers = rules.list(list)?;
    let page = load_page(file, "about:blank")?;

    let el = page.find(selector)?;
    let bundle = page.bundle(el);
    let scores = score_subtypes(&bundle, &matchers);
    let subtype = best_subtype(&scores);
    let expiry_format = subtype.is_expiry().then(|| infer_expiry_format(&bundle));

    if json {
        let output = serde_json::json!({
            "subtype": subtype,
            "input_type": subtype.input_type(),
            "scores": scores,
            "bundle": bundle,
            "expiry_format": expiry_format,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n{} {}\n", "Subtype:".bold(), subtype.to_string().green().bold());

    println!("  Text seen:");
    for (source, text) in bundle.fragments() {
        println!("    {:<13} {}", format!("{:?}", source).to_lowercase(), truncate_str(&text, 60));
    }

    let scored: Vec<_> = scores.iter().filter(|s| s.score != 0.0).collect();
    if !scored.is_empty() {
        println!("\n  Scores ({}):", list);
        for s in scored {
            println!("    {:<18} {}", s.subtype.to_string(), format_signal(s.score));
        }
    }

    if let Some(format) = expiry_format {
        println!(
            "\n  Expiry format: separator '{}', {}-digit year",
            format.separator, format.year_digits
        );
    }
    println!();

    Ok(())
}

/// Score the form owning the element matching `selector`
pub fn cmd_analyze(file: &Path, selector: &str, url: &str, json: bool) -> Result<()> {
    let config = Config::load()?;
    let rules = RulesTable::load(&config)?;
    let analyzer = FormAnalyzer::new(&rules, &config)?;
    let page = load_page(file, url)?;

    let input = page.find(selector)?;
    let form = page.owning_form(input);
    let score = analyzer.analyze(&page, form, input);

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    let scope = match form {
        Some(_) => "form",
        None => "page (no owning form)",
    };
    let verdict = if score.is_eligible() {
        "sign-up context, autofill engages".green()
    } else {
        "not a sign-up context".yellow()
    };
    println!("\nScored the {}: {}  {}\n", scope, format_signal(score.total_signal).bold(), verdict);

    if score.contributions.is_empty() {
        println!("  No signals matched.");
    }
    for c in &score.contributions {
        let delta = format_signal(c.delta);
        let delta = if c.delta > 0.0 { delta.green() } else { delta.red() };
        println!("  {:>6}  {}", delta, truncate_str(&c.description, 90));
    }
    println!();

    Ok(())
}
