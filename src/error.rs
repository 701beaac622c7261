use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillscanError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid CSS selector: {0}")]
    SelectorError(String),

    #[error("No element matches selector: {0}")]
    ElementNotFound(String),

    #[error("Invalid matcher rules: {0}")]
    RulesError(String),

    #[error("Unknown matcher list: {0}")]
    UnknownList(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FillscanError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            FillscanError::SelectorError(_) => Some(
                "Selectors use CSS syntax, e.g. --selector \"#email\" or --selector \"input[name=user]\""
            ),
            FillscanError::ElementNotFound(_) => Some(
                "Run `fillscan scan <file>` to list the inputs fillscan can see"
            ),
            FillscanError::RulesError(_) => Some(
                "Check your rules file, or remove it to fall back to the built-in rules:\n  fillscan rules --path"
            ),
            FillscanError::UnknownList(_) => Some(
                "Run `fillscan rules` to see the available matcher lists"
            ),
            FillscanError::ConfigError(_) | FillscanError::TomlError(_) => Some(
                "Check config.toml, or point FILLSCAN_CONFIG at a different file"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FillscanError>;
