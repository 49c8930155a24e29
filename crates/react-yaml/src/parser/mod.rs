//! Incremental parser that splits a streamed model turn into reasoning and
//! action text.
//!
//! A turn has two sections: a reasoning value under the reasoning key
//! (default `thinking`), then the action mapping (`type: tool | final |
//! error` plus variant fields). [`StreamParser::feed`] accepts chunks of any
//! size, split anywhere, and returns a [`ParseOutcome`] with whatever became
//! known during that call:
//!
//! - reasoning text is released as soon as it is certainly reasoning, even
//!   mid-line, so it can be displayed live;
//! - action text is buffered and re-parsed until it forms a mapping.
//!
//! ```
//! use react_yaml::parser::StreamParser;
//!
//! let mut parser = StreamParser::new();
//! let mut shown = String::new();
//! for chunk in ["thinking: |\n  look", "ing it up\n", "type: final\nfinal: 42\n"] {
//!     shown.push_str(&parser.feed(chunk)?.reasoning_delta);
//! }
//! parser.finalize()?;
//!
//! assert_eq!(shown, "looking it up\n");
//! assert_eq!(parser.parsed_document().unwrap()["final"], 42);
//! # Ok::<(), react_yaml::error::ParserMisuseError>(())
//! ```
//!
//! # Block boundaries
//!
//! The reasoning block ends at the first non-blank line indented at or below
//! the key line, whether or not that line is valid YAML yet. Blank lines are
//! held back until a following line shows whether they are inside the block;
//! blank lines directly before the dedent are dropped, like a YAML `|` block
//! with clip chomping. The content indentation (set by the first content
//! line) is stripped from every reasoning line.
//!
//! # End of stream
//!
//! The document parsed mid-stream is the first prefix of the action text that
//! formed a non-empty mapping. [`finalize`](StreamParser::finalize) parses the
//! complete action text once more and keeps that result when it succeeds, so
//! the final document does not depend on where chunks were split.

mod lifecycle;
mod line;
mod outcome;

pub use lifecycle::Lifecycle;
pub use outcome::ParseOutcome;

use tracing::{debug, trace};

use crate::ActionDocument;
use crate::config::{DEFAULT_REASONING_KEY, FormatConfig};
use crate::error::{ConfigError, ParserMisuseError};
use crate::format::{YamlFormat, parse_mapping};
use line::{KeyLine, is_blank, leading_width, line_body, match_key_line, strip_indent};

/// Streaming parser for one model turn.
///
/// Owned by a single consumer and mutated only through [`feed`](Self::feed)
/// and [`finalize`](Self::finalize). Neither call blocks; waiting for the next
/// chunk is the caller's business.
#[derive(Debug, Clone)]
pub struct StreamParser {
    reasoning_key: String,
    lifecycle: Lifecycle,
    /// Every chunk ever fed, unaltered.
    raw: String,
    /// Received but not yet consumed; at most one partial line between calls.
    pending: String,
    reasoning: String,
    action: String,
    /// Column of the block-scalar key line.
    reasoning_base_indent: Option<usize>,
    /// Column of the first reasoning content line.
    content_indent: Option<usize>,
    held_blank_lines: usize,
    /// Bytes of the current partial reasoning line already emitted.
    line_emitted: Option<usize>,
    document: Option<ActionDocument>,
    finalized: bool,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamParser {
    /// Create a parser that looks for the default `thinking` key.
    pub fn new() -> Self {
        Self::build(DEFAULT_REASONING_KEY.to_string())
    }

    /// Create a parser for the reasoning key in `config`.
    pub fn with_config(config: &FormatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config.reasoning_key.clone()))
    }

    /// Create a parser for the reasoning key of an already compiled format.
    pub fn for_format(format: &YamlFormat) -> Self {
        Self::build(format.config().reasoning_key.clone())
    }

    fn build(reasoning_key: String) -> Self {
        Self {
            reasoning_key,
            lifecycle: Lifecycle::SeekingReasoning,
            raw: String::new(),
            pending: String::new(),
            reasoning: String::new(),
            action: String::new(),
            reasoning_base_indent: None,
            content_indent: None,
            held_blank_lines: 0,
            line_emitted: None,
            document: None,
            finalized: false,
        }
    }

    /// Consume one chunk of model output.
    ///
    /// Drains as much of the buffered input as the current state allows and
    /// returns every delta produced along the way. Fails only when called
    /// after [`finalize`](Self::finalize).
    pub fn feed(&mut self, chunk: &str) -> Result<ParseOutcome, ParserMisuseError> {
        if self.finalized {
            return Err(ParserMisuseError::FeedAfterFinalize);
        }
        self.raw.push_str(chunk);
        self.pending.push_str(chunk);

        let mut out = ParseOutcome::default();
        while self.step(&mut out) {}

        if !out.is_empty() {
            trace!(state = %self.lifecycle, "{out}");
        }
        Ok(out)
    }

    /// Signal end of stream and flush whatever is still buffered.
    ///
    /// An unterminated reasoning block is closed. Otherwise the whole action
    /// text gets one last parse, and its result replaces any document parsed
    /// mid-stream; if it fails, [`parsed_document`] is `None`. Must be called
    /// exactly once.
    ///
    /// [`parsed_document`]: Self::parsed_document
    pub fn finalize(&mut self) -> Result<ParseOutcome, ParserMisuseError> {
        if self.finalized {
            return Err(ParserMisuseError::FinalizeTwice);
        }
        self.finalized = true;

        let mut out = ParseOutcome::default();
        let rest = std::mem::take(&mut self.pending);
        match self.lifecycle {
            Lifecycle::InReasoning => {
                let body = rest.strip_suffix('\r').unwrap_or(&rest);
                if !is_blank(body) {
                    self.emit_reasoning(body, false, &mut out);
                }
                self.end_reasoning(&mut out);
                self.lifecycle = Lifecycle::Complete;
                debug!("stream ended inside the reasoning block");
            }
            Lifecycle::SeekingReasoning => {
                self.action.push_str(&rest);
                self.reconcile(&mut out);
                // With no reasoning key, the preamble was the document.
                if self.document.is_some() {
                    out.push_content(&self.action);
                }
            }
            Lifecycle::PostReasoning | Lifecycle::Complete => {
                self.action.push_str(&rest);
                out.push_content(&rest);
                self.reconcile(&mut out);
            }
        }
        Ok(out)
    }

    /// All reasoning text extracted so far.
    pub fn reasoning_text(&self) -> &str {
        &self.reasoning
    }

    /// The parsed action document, if the action text has formed a mapping.
    pub fn parsed_document(&self) -> Option<&ActionDocument> {
        self.document.as_ref()
    }

    /// Every chunk fed so far, concatenated.
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// Text attributed to the action document, including any preamble lines
    /// seen before the reasoning key.
    pub fn action_text(&self) -> &str {
        &self.action
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Column of the block-scalar reasoning key line, once it has been seen.
    pub fn reasoning_base_indent(&self) -> Option<usize> {
        self.reasoning_base_indent
    }

    /// Terminal state reached with a non-empty document.
    pub fn is_complete(&self) -> bool {
        self.lifecycle == Lifecycle::Complete
            && self.document.as_ref().is_some_and(|d| !d.is_empty())
    }

    // ── State machine ────────────────────────────────────────────────

    /// Run one step for the current state. Returns `false` once no further
    /// progress is possible without more input.
    fn step(&mut self, out: &mut ParseOutcome) -> bool {
        match self.lifecycle {
            Lifecycle::SeekingReasoning => self.seek_reasoning(out),
            Lifecycle::InReasoning => self.read_reasoning(out),
            Lifecycle::PostReasoning => self.read_action(out),
            Lifecycle::Complete => self.read_trailing(out),
        }
    }

    fn seek_reasoning(&mut self, out: &mut ParseOutcome) -> bool {
        let Some(line) = self.take_line() else {
            return false;
        };
        match match_key_line(line_body(&line), &self.reasoning_key) {
            Some(KeyLine::Block { indent }) => {
                self.reasoning_base_indent = Some(indent);
                self.lifecycle = Lifecycle::InReasoning;
                debug!(indent, "reasoning block opened");
            }
            Some(KeyLine::Inline { value }) => {
                self.reasoning.push_str(value);
                out.push_reasoning(value);
                out.reasoning_complete = true;
                self.lifecycle = Lifecycle::PostReasoning;
                debug!(chars = value.chars().count(), "single-line reasoning");
            }
            None => {
                // Leading non-key lines are action-document preamble.
                self.action.push_str(&line);
                trace!("preamble line before reasoning key");
            }
        }
        true
    }

    fn read_reasoning(&mut self, out: &mut ParseOutcome) -> bool {
        let base = self.reasoning_base_indent.unwrap_or(0);

        if let Some(line) = self.take_line() {
            let body = line_body(&line);
            if is_blank(body) {
                self.held_blank_lines += 1;
            } else if leading_width(body) <= base {
                self.pending.insert_str(0, &line);
                self.end_reasoning(out);
            } else {
                self.emit_reasoning(body, true, out);
            }
            return true;
        }

        // Partial line: release it only once its indentation is settled.
        let partial = self.pending.clone();
        let body = partial.strip_suffix('\r').unwrap_or(&partial);
        if is_blank(body) {
            return false;
        }
        if leading_width(body) <= base {
            self.end_reasoning(out);
            return true;
        }
        self.emit_reasoning(body, false, out);
        false
    }

    fn read_action(&mut self, out: &mut ParseOutcome) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let text = std::mem::take(&mut self.pending);
        self.action.push_str(&text);
        out.push_content(&text);

        if let Some(document) = parse_mapping(&self.action) {
            debug!(fields = document.len(), "action document parsed");
            out.complete_action(&document);
            self.document = Some(document);
            self.lifecycle = Lifecycle::Complete;
        }
        true
    }

    fn read_trailing(&mut self, out: &mut ParseOutcome) -> bool {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.action.push_str(&text);
            out.push_content(&text);
        }
        if let Some(document) = &self.document {
            out.complete_action(document);
        }
        false
    }

    /// Append one reasoning line (or the new tail of a partial line).
    fn emit_reasoning(&mut self, body: &str, terminated: bool, out: &mut ParseOutcome) {
        let width = leading_width(body);
        let indent = *self.content_indent.get_or_insert(width);
        let text = strip_indent(body, indent);

        let mut delta = String::new();
        let already = match self.line_emitted.take() {
            Some(emitted) => emitted,
            None => {
                // Blank lines followed by content belong to the block.
                for _ in 0..std::mem::take(&mut self.held_blank_lines) {
                    delta.push('\n');
                }
                0
            }
        };
        delta.push_str(text.get(already..).unwrap_or_default());
        if terminated {
            delta.push('\n');
        } else {
            self.line_emitted = Some(text.len());
        }

        self.reasoning.push_str(&delta);
        out.push_reasoning(&delta);
    }

    fn end_reasoning(&mut self, out: &mut ParseOutcome) {
        self.held_blank_lines = 0;
        self.line_emitted = None;
        out.reasoning_complete = true;
        self.lifecycle = Lifecycle::PostReasoning;
        debug!(
            chars = self.reasoning.chars().count(),
            "reasoning block closed"
        );
    }

    /// Parse the complete action text at end of stream.
    fn reconcile(&mut self, out: &mut ParseOutcome) {
        match parse_mapping(&self.action) {
            Some(document) => {
                if self.document.as_ref().is_some_and(|d| d != &document) {
                    debug!("action document revised at end of stream");
                }
                self.document = Some(document);
                self.lifecycle = Lifecycle::Complete;
            }
            None => {
                // A prefix that parsed mid-stream does not outlive the full text.
                if self.document.take().is_some() {
                    debug!("early action document dropped at end of stream");
                }
                debug!(
                    bytes = self.action.len(),
                    "action text did not parse as a mapping"
                );
            }
        }
        if let Some(document) = &self.document {
            out.complete_action(document);
        }
    }

    fn take_line(&mut self) -> Option<String> {
        let pos = self.pending.find('\n')?;
        Some(self.pending.drain(..=pos).collect())
    }
}
