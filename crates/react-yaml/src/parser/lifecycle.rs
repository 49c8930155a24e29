use std::fmt;

/// Where a [`StreamParser`](super::StreamParser) is within one model turn.
///
/// Transitions only move forward:
///
/// ```text
/// SeekingReasoning ──block key──▶ InReasoning ──dedent──▶ PostReasoning ──mapping──▶ Complete
///        └────────────inline key───────────────────────────────▲
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Waiting for the reasoning key line. Other lines are action preamble.
    SeekingReasoning,
    /// Inside a block-scalar reasoning value.
    InReasoning,
    /// Reasoning is over; buffering the action document until it parses.
    PostReasoning,
    /// Terminal. Further input is appended to the action text verbatim.
    Complete,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SeekingReasoning => "seeking_reasoning",
            Self::InReasoning => "in_reasoning",
            Self::PostReasoning => "post_reasoning",
            Self::Complete => "complete",
        }
    }

    /// Whether reasoning has definitively ended.
    pub fn reasoning_done(self) -> bool {
        matches!(self, Self::PostReasoning | Self::Complete)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
