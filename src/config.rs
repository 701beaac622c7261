use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{FillscanError, Result};

/// Global fillscan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Custom matcher rules file (overrides rules.toml in the config dir)
    #[serde(default)]
    pub rules_path: Option<PathBuf>,

    /// Settings tied to the alias provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Signal weights used by the form relevance analyzer
    #[serde(default)]
    pub weights: SignalWeights,
}

/// The alias provider's own pages and address format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Pages matching this pattern are never autofilled (the provider's sign-up page)
    #[serde(default = "default_signup_url_pattern")]
    pub signup_url_pattern: String,

    /// Pages matching this pattern belong to the provider's web app
    #[serde(default = "default_domain_pattern")]
    pub domain_pattern: String,

    /// Appended to an alias to form the full address
    #[serde(default = "default_address_domain")]
    pub address_domain: String,
}

fn default_signup_url_pattern() -> String {
    r"^https://.+\.duckduckgo\.com/email/signup".to_string()
}

fn default_domain_pattern() -> String {
    r"^https://(([a-z0-9_-]+?)\.)?duckduckgo\.com/email".to_string()
}

fn default_address_domain() -> String {
    "@duck.com".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            signup_url_pattern: default_signup_url_pattern(),
            domain_pattern: default_domain_pattern(),
            address_domain: default_address_domain(),
        }
    }
}

impl ProviderConfig {
    /// Compile the sign-up page pattern (case-insensitive)
    pub fn signup_page_regex(&self) -> Result<Regex> {
        compile_url_pattern("signup_url_pattern", &self.signup_url_pattern)
    }

    /// Compile the provider domain pattern
    pub fn domain_regex(&self) -> Result<Regex> {
        Regex::new(&self.domain_pattern)
            .map_err(|e| FillscanError::ConfigError(format!("domain_pattern: {}", e)))
    }
}

fn compile_url_pattern(field: &str, pattern: &str) -> Result<Regex> {
    regex::RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| FillscanError::ConfigError(format!("{}: {}", field, e)))
}

/// Strength of each kind of signal source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    /// Attributes of the input that triggered the analysis
    #[serde(default = "default_input_attribute")]
    pub input_attribute: f64,
    /// Attributes of the owning form
    #[serde(default = "default_form_attribute")]
    pub form_attribute: f64,
    #[serde(default = "default_page_title")]
    pub page_title: f64,
    #[serde(default = "default_heading")]
    pub heading: f64,
    /// Submit-like buttons outside any form, when the input has no form
    #[serde(default = "default_orphan_button")]
    pub orphan_button: f64,
    #[serde(default = "default_submit")]
    pub submit: f64,
    #[serde(default = "default_link")]
    pub link: f64,
    #[serde(default = "default_generic")]
    pub generic: f64,
    /// Added to the strength of a source that reveals a unified login/signup form
    #[serde(default = "default_unified_penalty")]
    pub unified_penalty: f64,
}

fn default_input_attribute() -> f64 {
    3.0
}

fn default_form_attribute() -> f64 {
    3.0
}

fn default_page_title() -> f64 {
    2.0
}

fn default_heading() -> f64 {
    0.5
}

fn default_orphan_button() -> f64 {
    0.5
}

fn default_submit() -> f64 {
    2.0
}

fn default_link() -> f64 {
    1.0
}

fn default_generic() -> f64 {
    1.0
}

fn default_unified_penalty() -> f64 {
    2.0
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            input_attribute: default_input_attribute(),
            form_attribute: default_form_attribute(),
            page_title: default_page_title(),
            heading: default_heading(),
            orphan_button: default_orphan_button(),
            submit: default_submit(),
            link: default_link(),
            generic: default_generic(),
            unified_penalty: default_unified_penalty(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: None,
            provider: ProviderConfig::default(),
            weights: SignalWeights::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that patterns compile and weights are usable
    pub fn validate(&self) -> Result<()> {
        self.provider.signup_page_regex()?;
        self.provider.domain_regex()?;

        let w = &self.weights;
        let all = [
            w.input_attribute,
            w.form_attribute,
            w.page_title,
            w.heading,
            w.orphan_button,
            w.submit,
            w.link,
            w.generic,
            w.unified_penalty,
        ];
        if all.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(FillscanError::ConfigError(
                "weights must be non-negative numbers".into(),
            ));
        }
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| FillscanError::ConfigError(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Supports FILLSCAN_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("FILLSCAN_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "fillscan")
            .ok_or_else(|| FillscanError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
