//! Format contract: prompt instructions, structure checks, and fence
//! stripping for the two-section turn shape.
//!
//! Every operation is a pure function of its input. [`YamlFormat`] holds the
//! patterns compiled for one [`FormatConfig`]; the free functions in this
//! module use the default configuration.
//!
//! ```
//! use react_yaml::format;
//!
//! let turn = "```yaml\nthinking: |\n  ok\ntype: final\nfinal: done\n```";
//! assert!(format::validate_structure(turn));
//! assert!(format::looks_like_yaml(turn));
//! assert_eq!(
//!     format::extract_block(turn),
//!     "thinking: |\n  ok\ntype: final\nfinal: done"
//! );
//! ```

mod instructions;

pub use instructions::{ExampleDocument, InstructionsBuilder, example_documents};

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::ActionDocument;
use crate::config::FormatConfig;
use crate::error::ConfigError;

static DEFAULT_FORMAT: LazyLock<YamlFormat> = LazyLock::new(|| {
    YamlFormat::new(FormatConfig::default()).expect("default format config is valid")
});

/// Compiled format contract for one configuration.
#[derive(Debug, Clone)]
pub struct YamlFormat {
    config: FormatConfig,
    /// A fenced block, tagged with one of the format's names or untagged.
    fence: Regex,
    /// Any top-level `key:` line.
    top_level_key: Regex,
    /// Top-level reasoning key line.
    reasoning_top: Regex,
    /// Top-level discriminator key line.
    type_top: Regex,
    /// Reasoning key line at any indentation, block scalar or bare.
    reasoning_probe: Regex,
}

impl Default for YamlFormat {
    fn default() -> Self {
        DEFAULT_FORMAT.clone()
    }
}

impl YamlFormat {
    /// Validate `config` and compile its patterns.
    pub fn new(config: FormatConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let tags = config
            .fence_tags()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let reasoning = regex::escape(&config.reasoning_key);
        let type_key = regex::escape(&config.type_key);

        Ok(Self {
            fence: Regex::new(&format!(r"(?s)```(?:{tags})?\s*\n(.*?)\n```"))?,
            top_level_key: Regex::new(r"(?m)^\w+\s*:")?,
            reasoning_top: Regex::new(&format!(r"(?m)^{reasoning}\s*:"))?,
            type_top: Regex::new(&format!(r"(?m)^{type_key}\s*:"))?,
            reasoning_probe: Regex::new(&format!(r"(?m)^\s*{reasoning}\s*:"))?,
            config,
        })
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Prompt text teaching the model this format.
    pub fn render_instructions(&self) -> String {
        instructions::render(&self.config)
    }

    /// Whether `text` (optionally fenced) has a top-level reasoning key and a
    /// top-level discriminator key.
    pub fn validate_structure(&self, text: &str) -> bool {
        let cleaned = text.trim();
        let cleaned = if cleaned.starts_with("```") {
            match self.fence_interior(cleaned) {
                Some(interior) => interior,
                // Unclosed fence: drop the opening line.
                None => cleaned
                    .split_once('\n')
                    .map_or(cleaned, |(_, rest)| rest)
                    .trim(),
            }
        } else {
            cleaned
        };

        self.top_level_key.is_match(cleaned)
            && self.reasoning_top.is_match(cleaned)
            && self.type_top.is_match(cleaned)
    }

    /// Quick check separating this format from a JSON-like document.
    pub fn looks_like_yaml(&self, text: &str) -> bool {
        let cleaned = text.trim();
        if cleaned.starts_with(['{', '[']) {
            return self.validate_structure(cleaned);
        }
        if self.reasoning_probe.is_match(cleaned) {
            return true;
        }
        self.validate_structure(cleaned)
    }

    /// The interior of the first fenced block, trimmed, or the whole input
    /// trimmed when there is none.
    pub fn extract_block<'a>(&self, text: &'a str) -> &'a str {
        self.fence_interior(text).unwrap_or_else(|| text.trim())
    }

    /// Fence-strip `text` and parse it as a mapping.
    pub fn parse_lenient(&self, text: &str) -> Option<ActionDocument> {
        let block = self.extract_block(text);
        trace!(bytes = block.len(), "lenient parse");
        parse_mapping(block)
    }

    fn fence_interior<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.fence
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
    }
}

/// Parse `text` as YAML and return it when it is a non-empty mapping.
///
/// Any other outcome (syntax error, scalar, sequence, empty mapping) is
/// `None`; mid-stream that simply means more input is needed.
pub fn parse_mapping(text: &str) -> Option<ActionDocument> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// [`YamlFormat::render_instructions`] with the default configuration.
pub fn render_instructions() -> String {
    DEFAULT_FORMAT.render_instructions()
}

/// [`YamlFormat::validate_structure`] with the default configuration.
pub fn validate_structure(text: &str) -> bool {
    DEFAULT_FORMAT.validate_structure(text)
}

/// [`YamlFormat::looks_like_yaml`] with the default configuration.
pub fn looks_like_yaml(text: &str) -> bool {
    DEFAULT_FORMAT.looks_like_yaml(text)
}

/// [`YamlFormat::extract_block`] with the default configuration.
pub fn extract_block(text: &str) -> &str {
    DEFAULT_FORMAT.extract_block(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn example_documents_validate() {
        let format = YamlFormat::default();
        for doc in example_documents(format.config()) {
            assert!(format.validate_structure(&doc.body), "{}", doc.label);
            assert!(format.looks_like_yaml(&doc.body), "{}", doc.label);
        }
    }

    #[test]
    fn example_documents_parse_as_their_kind() {
        for doc in example_documents(&FormatConfig::default()) {
            let Some(kind) = doc.kind else { continue };
            let parsed = parse_mapping(&doc.body).unwrap();
            assert_eq!(parsed["type"], kind);
        }
    }

    #[test]
    fn rendered_instructions_contain_valid_blocks() {
        let text = render_instructions();
        let first = extract_block(&text);
        assert!(validate_structure(first));
    }

    #[test]
    fn unrelated_text_rejected() {
        assert!(!validate_structure("Hello there, how can I help?"));
        assert!(!validate_structure("note: nothing else"));
        assert!(!validate_structure(""));
        assert!(!looks_like_yaml("plain prose"));
    }

    #[test]
    fn indented_keys_are_not_top_level() {
        let text = "outer:\n  thinking: |\n    x\n  type: final\n";
        assert!(!validate_structure(text));
        assert!(looks_like_yaml(text));
    }

    #[test]
    fn fenced_and_unclosed_fences() {
        assert!(validate_structure("```yaml\nthinking: x\ntype: final\n```"));
        assert!(validate_structure("```yml\nthinking: x\ntype: final\n```"));
        assert!(validate_structure("```\nthinking: x\ntype: final\n```"));
        assert!(validate_structure("```yaml\nthinking: x\ntype: final\n"));
    }

    #[test]
    fn json_documents_defer_to_validation() {
        assert!(!looks_like_yaml(r#"{"thinking": "x", "type": "final"}"#));
        assert!(!looks_like_yaml("[1, 2, 3]"));
    }

    #[test]
    fn bare_reasoning_key_probe() {
        assert!(looks_like_yaml("thinking: just this"));
        assert!(looks_like_yaml("  thinking: |\n    a"));
    }

    #[test]
    fn extract_fenced_interior() {
        assert_eq!(
            extract_block("Here you go:\n```yaml\na: 1\n```\nthanks"),
            "a: 1"
        );
        assert_eq!(extract_block("```\nb: 2\n```"), "b: 2");
        assert_eq!(extract_block("  no fence  \n"), "no fence");
    }

    #[test]
    fn extract_is_idempotent() {
        let cases = [
            "```yaml\nthinking: x\n```",
            "```\n```yaml\nfoo\n```",
            "``` \n  a: 1\n```\n```\nb\n```",
            "```yaml\nunclosed",
            "   plain   ",
            "",
            "````\n```\n````",
        ];
        for case in cases {
            let once = extract_block(case);
            assert_eq!(extract_block(once), once, "{case:?}");
        }
    }

    #[test]
    fn custom_fence_tag() {
        let format = YamlFormat::new(FormatConfig::default().with_format_name("react")).unwrap();
        assert_eq!(format.extract_block("```react\nk: v\n```"), "k: v");
        // `yml` is no longer an accepted tag; the tag becomes interior text.
        assert_eq!(format.extract_block("```yml\nk: v\n```"), "```yml\nk: v\n```");
    }

    #[test]
    fn custom_keys_validate() {
        let format = YamlFormat::new(
            FormatConfig::default()
                .with_reasoning_key("analysis")
                .with_type_key("kind"),
        )
        .unwrap();
        assert!(format.validate_structure("analysis: |\n  x\nkind: final\n"));
        assert!(!format.validate_structure("thinking: |\n  x\ntype: final\n"));
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(YamlFormat::new(FormatConfig::default().with_type_key("")).is_err());
    }

    #[test]
    fn parse_mapping_requires_non_empty_object() {
        assert_eq!(parse_mapping("a: 1"), Some(json!({"a": 1}).as_object().unwrap().clone()));
        assert_eq!(parse_mapping("   \n"), None);
        assert_eq!(parse_mapping("{}"), None);
        assert_eq!(parse_mapping("just text"), None);
        assert_eq!(parse_mapping("- a\n- b"), None);
        assert_eq!(parse_mapping("a: [unclosed"), None);
    }

    #[test]
    fn lenient_parse_strips_fence() {
        let doc = YamlFormat::default()
            .parse_lenient("Sure:\n```yaml\ntype: final\nfinal: ok\n```")
            .unwrap();
        assert_eq!(doc["final"], "ok");
    }
}
