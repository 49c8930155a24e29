//! Prompt text that teaches the model the two-section turn shape.
//!
//! [`InstructionsBuilder`] assembles labelled blocks joined by blank lines.
//! [`render`] uses it to produce the standard instructions, and
//! [`example_documents`] exposes the example turns embedded in them.

use crate::config::FormatConfig;

/// Builder for format instructions.
///
/// Blocks are joined with double newlines. Empty blocks are skipped.
///
/// ```
/// use react_yaml::format::InstructionsBuilder;
///
/// let text = InstructionsBuilder::new("Respond in YAML.", "yaml")
///     .example("Example:", "type: final\nfinal: ok")
///     .notes("Important notes:", ["Keep it short"])
///     .build();
///
/// assert!(text.contains("Example:\n```yaml\ntype: final\nfinal: ok\n```"));
/// assert!(text.ends_with("Important notes:\n- Keep it short"));
/// ```
pub struct InstructionsBuilder {
    blocks: Vec<String>,
    fence_tag: String,
}

impl InstructionsBuilder {
    /// Start with a preamble block, included as-is.
    pub fn new(preamble: impl Into<String>, fence_tag: impl Into<String>) -> Self {
        Self {
            blocks: vec![preamble.into()],
            fence_tag: fence_tag.into(),
        }
    }

    /// A label line followed by a fenced code block.
    ///
    /// Skipped if `body` is empty.
    pub fn example(mut self, label: &str, body: impl Into<String>) -> Self {
        let body = body.into();
        if !body.is_empty() {
            let body = body.trim_end_matches('\n');
            self.blocks
                .push(format!("{label}\n```{}\n{body}\n```", self.fence_tag));
        }
        self
    }

    /// A label line followed by one `- ` bullet per note.
    ///
    /// Skipped if there are no notes.
    pub fn notes<I, S>(mut self, label: &str, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bullets: Vec<String> = notes
            .into_iter()
            .map(|note| format!("- {}", note.as_ref()))
            .collect();
        if !bullets.is_empty() {
            self.blocks.push(format!("{label}\n{}", bullets.join("\n")));
        }
        self
    }

    pub fn build(self) -> String {
        self.blocks.join("\n\n")
    }
}

/// One example turn shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDocument {
    /// Label line shown above the fenced block.
    pub label: &'static str,
    /// The action variant, or `None` for the generic skeleton.
    pub kind: Option<&'static str>,
    pub body: String,
}

/// The skeleton and example turns, with key names taken from `config`.
pub fn example_documents(config: &FormatConfig) -> Vec<ExampleDocument> {
    let r = &config.reasoning_key;
    let t = &config.type_key;
    vec![
        ExampleDocument {
            label: "The response must follow this structure:",
            kind: None,
            body: format!(
                "{r}: |\n  Your reasoning process here...\n  Can be multiple lines.\n\n\
                 {t}: tool|final|error\n[additional fields based on {t}]\n"
            ),
        },
        ExampleDocument {
            label: "Tool action example:",
            kind: Some("tool"),
            body: format!(
                "{r}: |\n  I need to search for information about X.\n\n\
                 {t}: tool\ntool_name: search\ntool_args:\n  query: \"search query\"\n"
            ),
        },
        ExampleDocument {
            label: "Final action example:",
            kind: Some("final"),
            body: format!(
                "{r}: |\n  I have completed the task. Here is the answer.\n\n\
                 {t}: final\nfinal: \"The final answer here...\"\n"
            ),
        },
        ExampleDocument {
            label: "Error action example:",
            kind: Some("error"),
            body: format!(
                "{r}: |\n  The request cannot be completed with the available tools.\n\n\
                 {t}: error\nerror: \"Why the task cannot continue\"\n"
            ),
        },
    ]
}

/// Full instructions for `config`.
pub fn render(config: &FormatConfig) -> String {
    let r = &config.reasoning_key;
    let t = &config.type_key;
    let builder = InstructionsBuilder::new(
        format!("Respond in YAML format with '{r}' as the first field."),
        config.format_name.clone(),
    );
    let builder = example_documents(config)
        .into_iter()
        .fold(builder, |b, doc| b.example(doc.label, doc.body));
    builder
        .notes(
            "Important notes:",
            [
                format!("'{r}' MUST be the first field"),
                format!("Use | for multi-line {r} content"),
                format!("{t} must be one of: tool, final, error"),
            ],
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_only() {
        assert_eq!(InstructionsBuilder::new("Just this.", "yaml").build(), "Just this.");
    }

    #[test]
    fn empty_blocks_skipped() {
        let text = InstructionsBuilder::new("P", "yaml")
            .example("Nothing:", "")
            .notes("Notes:", Vec::<String>::new())
            .build();
        assert_eq!(text, "P");
    }

    #[test]
    fn example_is_fenced_with_tag() {
        let text = InstructionsBuilder::new("P", "yml")
            .example("E:", "a: 1\n\n")
            .build();
        assert_eq!(text, "P\n\nE:\n```yml\na: 1\n```");
    }

    #[test]
    fn render_mentions_every_variant() {
        let text = render(&FormatConfig::default());
        assert!(text.starts_with("Respond in YAML format with 'thinking' as the first field."));
        assert!(text.contains("```yaml\nthinking: |"));
        assert!(text.contains("type: tool\ntool_name: search"));
        assert!(text.contains("type: final\nfinal:"));
        assert!(text.contains("type: error\nerror:"));
        assert!(text.contains("- type must be one of: tool, final, error"));
    }

    #[test]
    fn render_uses_configured_keys() {
        let config = FormatConfig::default()
            .with_reasoning_key("analysis")
            .with_type_key("kind");
        let text = render(&config);
        assert!(text.contains("analysis: |"));
        assert!(text.contains("kind: final"));
        assert!(!text.contains("thinking"));
    }

    #[test]
    fn render_is_deterministic() {
        let config = FormatConfig::default();
        assert_eq!(render(&config), render(&config));
    }
}
