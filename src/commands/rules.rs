//! Rules command: show the active matcher rules

use colored::Colorize;
use fillscan::config::Config;
use fillscan::error::Result;
use fillscan::rules::{RulesTable, ALL_LIST};

/// Show rules, print their locations, or write the user rules file
pub fn cmd_rules(init: bool, path: bool) -> Result<()> {
    if init {
        let written = RulesTable::ensure_user_rules()?;
        println!("Rules file: {}", written.display());
        println!("Edit it to tune matching; delete it to go back to the built-in rules.");
        return Ok(());
    }

    let config = Config::load()?;

    if path {
        println!("Config: {}", Config::config_path()?.display());
        match (&config.rules_path, RulesTable::user_rules_path()) {
            (Some(explicit), _) => println!("Rules:  {} (from config)", explicit.display()),
            (None, Some(user)) if user.exists() => println!("Rules:  {}", user.display()),
            (None, Some(user)) => println!("Rules:  built-in ({} not present)", user.display()),
            (None, None) => println!("Rules:  built-in"),
        }
        return Ok(());
    }

    let rules = RulesTable::load(&config)?;

    println!("\n{}", "Form patterns".bold());
    println!("  negative:              {}", rules.form.negative.as_str());
    println!("  positive:              {}", rules.form.positive.as_str());
    println!("  conservative positive: {}", rules.form.conservative_positive.as_str());
    println!("  strict positive:       {}", rules.form.strict_positive.as_str());

    println!("\n{}", "Field lists".bold());
    let mut names = rules.list_names();
    names.push(ALL_LIST);
    for name in names {
        let subtypes: Vec<String> = rules
            .list(name)?
            .iter()
            .map(|m| m.subtype.to_string())
            .collect();
        println!("  {:<12} {}", name.cyan(), subtypes.join(", "));
    }

    println!("\n{}", "Field matchers".bold());
    for matcher in rules.all() {
        println!("  {}", matcher.subtype.to_string().cyan());
        for signal in &matcher.signals {
            let sources: Vec<String> = signal
                .sources
                .iter()
                .map(|s| format!("{:?}", s).to_lowercase())
                .collect();
            let sign = if signal.negated { "-" } else { "+" };
            println!(
                "    {}{:<4} [{}] {}",
                sign,
                signal.weight,
                sources.join(","),
                signal.pattern.as_str()
            );
        }
    }
    println!();

    Ok(())
}
