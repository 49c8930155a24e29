use std::fmt;

use crate::ActionDocument;

/// What one [`feed`](super::StreamParser::feed) or
/// [`finalize`](super::StreamParser::finalize) call produced.
///
/// Deltas from every internal step of a call are concatenated in input
/// order, so nothing recognized during the call is missing from the value
/// returned to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Reasoning text recognized since the previous call.
    pub reasoning_delta: String,
    /// Action-document text recognized since the previous call.
    pub content_delta: String,
    /// The reasoning block has definitively ended.
    pub reasoning_complete: bool,
    /// The action document parsed into a mapping.
    pub action_complete: bool,
    /// The parsed document, present whenever `action_complete` is set.
    pub document: Option<ActionDocument>,
}

impl ParseOutcome {
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning_delta.is_empty()
    }

    pub fn has_content(&self) -> bool {
        !self.content_delta.is_empty()
    }

    /// No text and no flags.
    pub fn is_empty(&self) -> bool {
        !self.has_reasoning()
            && !self.has_content()
            && !self.reasoning_complete
            && !self.action_complete
    }

    pub(crate) fn push_reasoning(&mut self, text: &str) {
        self.reasoning_delta.push_str(text);
    }

    pub(crate) fn push_content(&mut self, text: &str) {
        self.content_delta.push_str(text);
    }

    pub(crate) fn complete_action(&mut self, document: &ActionDocument) {
        self.action_complete = true;
        self.document = Some(document.clone());
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParseOutcome {{ reasoning: {} chars, content: {} chars, reasoning_complete: {}, action_complete: {} }}",
            self.reasoning_delta.chars().count(),
            self.content_delta.chars().count(),
            self.reasoning_complete,
            self.action_complete
        )
    }
}
