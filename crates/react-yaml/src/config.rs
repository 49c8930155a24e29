//! Key names and format identity shared by the parser and the format contract.
//!
//! The model is told to emit a reasoning key first and a discriminator key
//! after it. Both names are configurable; the defaults match the prompt
//! produced by [`render_instructions`](crate::format::render_instructions).
//!
//! ```
//! use react_yaml::config::FormatConfig;
//!
//! let config = FormatConfig::default()
//!     .with_reasoning_key("analysis")
//!     .with_type_key("kind");
//! assert!(config.validate().is_ok());
//! assert_eq!(config.reasoning_key, "analysis");
//! ```

use crate::error::ConfigError;

/// Default name of the reasoning key.
pub const DEFAULT_REASONING_KEY: &str = "thinking";
/// Default name of the discriminator key.
pub const DEFAULT_TYPE_KEY: &str = "type";
/// Default fenced-block tag for this format.
pub const DEFAULT_FORMAT_NAME: &str = "yaml";

/// Configuration for the two-section document shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Key whose value is the free-form reasoning block. Default: `"thinking"`.
    pub reasoning_key: String,
    /// Key whose value selects the action variant. Default: `"type"`.
    pub type_key: String,
    /// Tag accepted on a fenced code block wrapper. Default: `"yaml"`.
    pub format_name: String,
    /// Extra fence tags treated like `format_name`. Default: `["yml"]`.
    pub format_aliases: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            reasoning_key: DEFAULT_REASONING_KEY.to_string(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
            format_name: DEFAULT_FORMAT_NAME.to_string(),
            format_aliases: vec!["yml".to_string()],
        }
    }
}

impl FormatConfig {
    /// Set the reasoning key name.
    pub fn with_reasoning_key(mut self, key: impl Into<String>) -> Self {
        self.reasoning_key = key.into();
        self
    }

    /// Set the discriminator key name.
    pub fn with_type_key(mut self, key: impl Into<String>) -> Self {
        self.type_key = key.into();
        self
    }

    /// Set the fence tag and drop any aliases.
    pub fn with_format_name(mut self, name: impl Into<String>) -> Self {
        self.format_name = name.into();
        self.format_aliases.clear();
        self
    }

    /// Add an extra accepted fence tag.
    pub fn with_format_alias(mut self, alias: impl Into<String>) -> Self {
        self.format_aliases.push(alias.into());
        self
    }

    /// Every fence tag accepted for this format, primary name first.
    pub fn fence_tags(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.format_name.as_str()).chain(self.format_aliases.iter().map(String::as_str))
    }

    /// Check that every key and tag is a plain identifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_identifier("reasoning_key", &self.reasoning_key)?;
        check_identifier("type_key", &self.type_key)?;
        check_identifier("format_name", &self.format_name)?;
        for alias in &self.format_aliases {
            check_identifier("format_aliases", alias)?;
        }
        Ok(())
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::EmptyKey { field });
    };
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidKey {
            field,
            value: value.to_string(),
        })
    }
}
