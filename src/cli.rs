use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fillscan")]
#[command(author, version, about = "Classify form fields and score forms for autofill", long_about = None)]
#[command(after_help = r##"Examples:
  fillscan scan signup.html                                Show every form and its fields
  fillscan scan page.html --url https://shop.example/join  Score with the page's real URL
  fillscan analyze signup.html --selector "#email"         Explain a form's score
  fillscan classify checkout.html --selector "#cc-exp"     Classify a single field
  fillscan expiry --placeholder "MM / YY" --month 8 --year 2025
  fillscan rules --init                                    Write an editable rules file

Logging:
  fillscan -v scan page.html       Debug output on stderr
  RUST_LOG=fillscan=trace fillscan classify page.html --selector input
"##)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a page: register each form, score it and classify its fields
    #[command(after_help = r##"Examples:
  fillscan scan signup.html
  fillscan scan signup.html --url https://example.com/register
  fillscan scan signup.html --json | jq '.[] | select(.score.total_signal > 0)'
"##)]
    Scan {
        /// HTML file to scan
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// URL the page was served from
        #[arg(long, default_value = "about:blank")]
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify the field matched by a CSS selector
    #[command(after_help = r##"Examples:
  fillscan classify checkout.html --selector "input[name=cc-number]"
  fillscan classify checkout.html --selector "#exp" --list cc
  fillscan classify signup.html --selector "#email" --json
"##)]
    Classify {
        /// HTML file containing the field
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// CSS selector of the field (first match is used)
        #[arg(long, short = 's')]
        selector: String,

        /// Matcher list to use (email, credentials, cc or all)
        #[arg(long, short = 'l', default_value = "all")]
        list: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score the form that owns an input and list every contribution
    #[command(after_help = r##"Examples:
  fillscan analyze signup.html --selector "#email"
  fillscan analyze login.html --selector "input[type=email]" --url https://example.com/login
"##)]
    Analyze {
        /// HTML file containing the form
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// CSS selector of the triggering input
        #[arg(long, short = 's')]
        selector: String,

        /// URL the page was served from
        #[arg(long, default_value = "about:blank")]
        url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Format a card expiry date the way a field's hints ask for
    #[command(after_help = r##"Examples:
  fillscan expiry --placeholder "mm-yy" --month 8 --year 2025     # 08-25
  fillscan expiry --label "Valid thru (MM/YYYY)" --month 1 --year 2030
"##)]
    Expiry {
        /// Placeholder text of the field
        #[arg(long)]
        placeholder: Option<String>,

        /// Label text of the field
        #[arg(long)]
        label: Option<String>,

        /// Month, 1-12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Four-digit year
        #[arg(long, value_parser = clap::value_parser!(u32).range(1000..=9999))]
        year: u32,
    },

    /// Show the active matcher rules
    Rules {
        /// Write the default rules to the user rules file for editing
        #[arg(long)]
        init: bool,

        /// Print where rules and config are read from
        #[arg(long)]
        path: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_keeps_css_id_selectors() {
        let mut cmd = Cli::command();
        let help = cmd.render_long_help().to_string();
        assert!(help.contains(r##"--selector "#email""##));

        let classify = cmd.find_subcommand_mut("classify").unwrap();
        let help = classify.render_long_help().to_string();
        assert!(help.contains(r##"--selector "#exp" --list cc"##));
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from(["fillscan", "-v", "classify", "page.html", "-s", "#exp"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Classify { selector, list, json, .. } => {
                assert_eq!(selector, "#exp");
                assert_eq!(list, "all");
                assert!(!json);
            }
            _ => panic!("expected classify"),
        }
    }

    #[test]
    fn test_expiry_month_range() {
        assert!(Cli::try_parse_from(["fillscan", "expiry", "--month", "13", "--year", "2025"]).is_err());
        assert!(Cli::try_parse_from(["fillscan", "expiry", "--month", "8", "--year", "2025"]).is_ok());
    }
}
