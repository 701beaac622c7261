//! Matcher Rules Table - declarative matchers compiled once and shared read-only
//!
//! The rule set lives in `assets/rules.toml`. It holds the form relevance
//! patterns used by the analyzer and the per-subtype field matchers used by
//! the classifier, plus named lists selecting ordered subsets of matchers.
//! A user copy in the config directory overrides the embedded defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::classify::Subtype;
use crate::config::Config;
use crate::error::{FillscanError, Result};

const EMBEDDED_RULES: &str = include_str!("../assets/rules.toml");

/// Name of the implicit list containing every matcher in declaration order
pub const ALL_LIST: &str = "all";

static DEFAULT_RULES: Lazy<RulesTable> = Lazy::new(|| {
    RulesTable::parse_toml(EMBEDDED_RULES).expect("Invalid embedded rules.toml")
});

/// The embedded rule set, compiled on first use
pub fn default_rules() -> &'static RulesTable {
    &DEFAULT_RULES
}

/// Which text fragment of an element a signal is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentSource {
    /// The `type` attribute (inputs default to "text")
    Type,
    Autocomplete,
    Name,
    Id,
    /// Text of associated `<label>` elements
    Label,
    Placeholder,
    /// aria-label, aria-labelledby or title
    Aria,
    /// The element's own text
    Text,
}

#[derive(Debug, Deserialize)]
struct RawRules {
    form: RawFormPatterns,
    #[serde(default)]
    lists: BTreeMap<String, Vec<Subtype>>,
    #[serde(default)]
    fields: Vec<RawFieldMatcher>,
}

#[derive(Debug, Deserialize)]
struct RawFormPatterns {
    negative: String,
    positive: String,
    conservative_positive: String,
    strict_positive: String,
}

#[derive(Debug, Deserialize)]
struct RawFieldMatcher {
    subtype: Subtype,
    #[serde(default)]
    signals: Vec<RawSignalRule>,
}

#[derive(Debug, Deserialize)]
struct RawSignalRule {
    sources: Vec<FragmentSource>,
    pattern: String,
    weight: f64,
    #[serde(default)]
    negated: bool,
}

/// Patterns deciding whether a form is a sign-up context or a sign-in one
#[derive(Debug, Clone)]
pub struct FormPatterns {
    pub negative: Regex,
    pub positive: Regex,
    pub conservative_positive: Regex,
    pub strict_positive: Regex,
}

impl FormPatterns {
    /// The positive pattern for a source, honoring conservative matching
    pub fn positive_for(&self, conservative: bool) -> &Regex {
        if conservative {
            &self.conservative_positive
        } else {
            &self.positive
        }
    }
}

/// One weighted check of a fragment source against a pattern
#[derive(Debug, Clone)]
pub struct SignalRule {
    pub sources: Vec<FragmentSource>,
    pub pattern: Regex,
    pub weight: f64,
    pub negated: bool,
}

impl SignalRule {
    /// Signed contribution of this rule for one fragment of the given source
    pub fn delta(&self, source: FragmentSource, text: &str) -> f64 {
        if text.is_empty() || !self.sources.contains(&source) || !self.pattern.is_match(text) {
            return 0.0;
        }
        if self.negated {
            -self.weight
        } else {
            self.weight
        }
    }
}

/// All signals that vote for one subtype
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    pub subtype: Subtype,
    pub signals: Vec<SignalRule>,
}

/// The compiled rule set
#[derive(Debug, Clone)]
pub struct RulesTable {
    pub form: FormPatterns,
    fields: Vec<FieldMatcher>,
    lists: BTreeMap<String, Vec<usize>>,
}

impl RulesTable {
    /// Parse and compile rules from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let raw: RawRules = toml::from_str(content)?;

        let form = FormPatterns {
            negative: compile(&raw.form.negative)?,
            positive: compile(&raw.form.positive)?,
            conservative_positive: compile(&raw.form.conservative_positive)?,
            strict_positive: compile(&raw.form.strict_positive)?,
        };

        let mut fields: Vec<FieldMatcher> = Vec::with_capacity(raw.fields.len());
        for field in raw.fields {
            if field.subtype == Subtype::Unknown {
                return Err(FillscanError::RulesError(
                    "\"unknown\" cannot have a matcher".to_string(),
                ));
            }
            if fields.iter().any(|f| f.subtype == field.subtype) {
                return Err(FillscanError::RulesError(format!(
                    "duplicate matcher for {}",
                    field.subtype
                )));
            }

            let mut signals = Vec::with_capacity(field.signals.len());
            for signal in field.signals {
                if !signal.weight.is_finite() || signal.weight < 0.0 {
                    return Err(FillscanError::RulesError(format!(
                        "{}: weight must be a non-negative number (use negated = true to subtract)",
                        field.subtype
                    )));
                }
                signals.push(SignalRule {
                    sources: signal.sources,
                    pattern: compile(&signal.pattern)?,
                    weight: signal.weight,
                    negated: signal.negated,
                });
            }

            fields.push(FieldMatcher {
                subtype: field.subtype,
                signals,
            });
        }

        let mut lists = BTreeMap::new();
        for (name, subtypes) in raw.lists {
            if name == ALL_LIST {
                return Err(FillscanError::RulesError(format!(
                    "\"{}\" is reserved for the list of every matcher",
                    ALL_LIST
                )));
            }
            let mut indices = Vec::with_capacity(subtypes.len());
            for subtype in subtypes {
                let index = fields
                    .iter()
                    .position(|f| f.subtype == subtype)
                    .ok_or_else(|| {
                        FillscanError::RulesError(format!(
                            "list \"{}\" names {} which has no matcher",
                            name, subtype
                        ))
                    })?;
                indices.push(index);
            }
            lists.insert(name, indices);
        }

        Ok(Self { form, fields, lists })
    }

    /// Load rules from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content).map_err(|e| match e {
            FillscanError::TomlError(err) => {
                FillscanError::RulesError(format!("{}: {}", path.display(), err))
            }
            other => other,
        })
    }

    /// Load the rules a configuration asks for.
    ///
    /// An explicit `rules_path` wins, then `rules.toml` in the config
    /// directory, then the embedded defaults.
    pub fn load(config: &Config) -> Result<Self> {
        if let Some(ref path) = config.rules_path {
            return Self::load_from_file(path);
        }

        if let Some(user_rules) = Self::user_rules_path() {
            if user_rules.exists() {
                return Self::load_from_file(&user_rules);
            }
        }

        Ok(default_rules().clone())
    }

    /// Location of the user rules file, if a config directory exists
    pub fn user_rules_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "fillscan").map(|dirs| dirs.config_dir().join("rules.toml"))
    }

    /// Ensure the user rules file exists (copy defaults if not)
    pub fn ensure_user_rules() -> Result<PathBuf> {
        let path = Self::user_rules_path().ok_or_else(|| {
            FillscanError::ConfigError("Could not determine config directory".into())
        })?;

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, EMBEDDED_RULES)?;
        }

        Ok(path)
    }

    /// Every matcher in declaration order
    pub fn all(&self) -> Vec<&FieldMatcher> {
        self.fields.iter().collect()
    }

    /// The matchers of a named list, in list order
    pub fn list(&self, name: &str) -> Result<Vec<&FieldMatcher>> {
        if name == ALL_LIST {
            return Ok(self.all());
        }
        self.lists
            .get(name)
            .map(|indices| indices.iter().map(|&i| &self.fields[i]).collect())
            .ok_or_else(|| FillscanError::UnknownList(name.to_string()))
    }

    /// Names of the declared lists
    pub fn list_names(&self) -> Vec<&str> {
        self.lists.keys().map(String::as_str).collect()
    }

    /// The matcher for one subtype
    pub fn matcher(&self, subtype: Subtype) -> Option<&FieldMatcher> {
        self.fields.iter().find(|f| f.subtype == subtype)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| FillscanError::RulesError(format!("{}: {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_rules_compile() {
        let rules = default_rules();
        assert_eq!(rules.list_names(), vec!["cc", "credentials", "email"]);
        assert_eq!(rules.all().len(), 10);
    }

    #[test]
    fn test_list_order_follows_declaration() {
        let cc = default_rules().list("cc").unwrap();
        let subtypes: Vec<Subtype> = cc.iter().map(|m| m.subtype).collect();
        assert_eq!(subtypes[0], Subtype::CardName);
        assert_eq!(subtypes[5], Subtype::Expiration);
    }

    #[test]
    fn test_unknown_list() {
        let err = default_rules().list("identities").unwrap_err();
        assert!(matches!(err, FillscanError::UnknownList(_)));
    }

    #[test]
    fn test_negative_pattern_skips_signing() {
        let form = &default_rules().form;
        assert!(form.negative.is_match("Sign in"));
        assert!(form.negative.is_match("signin"));
        assert!(form.negative.is_match("Log-in to continue"));
        assert!(!form.negative.is_match("designing"));
        assert!(!form.negative.is_match("signing"));
    }

    #[test]
    fn test_conservative_positive_excludes_checkout() {
        let form = &default_rules().form;
        assert!(form.positive_for(false).is_match("checkout"));
        assert!(!form.positive_for(true).is_match("checkout"));
        assert!(form.positive_for(true).is_match("subscribe"));
    }

    #[test]
    fn test_signal_rule_delta() {
        let rule = SignalRule {
            sources: vec![FragmentSource::Label],
            pattern: compile("mail").unwrap(),
            weight: 2.0,
            negated: true,
        };
        assert_eq!(rule.delta(FragmentSource::Label, "email"), -2.0);
        assert_eq!(rule.delta(FragmentSource::Name, "email"), 0.0);
        assert_eq!(rule.delta(FragmentSource::Label, ""), 0.0);
    }

    #[test]
    fn test_rejects_list_with_missing_matcher() {
        let content = r#"
            [form]
            negative = "log.?in"
            positive = "sign.?up"
            conservative_positive = "sign.?up"
            strict_positive = "sign.?up"

            [lists]
            cc = ["cardNumber"]
        "#;
        let err = RulesTable::parse_toml(content).unwrap_err();
        assert!(matches!(err, FillscanError::RulesError(_)));
    }

    #[test]
    fn test_rejects_invalid_regex() {
        let content = r#"
            [form]
            negative = "log.?in("
            positive = "sign.?up"
            conservative_positive = "sign.?up"
            strict_positive = "sign.?up"
        "#;
        assert!(RulesTable::parse_toml(content).is_err());
    }
}
