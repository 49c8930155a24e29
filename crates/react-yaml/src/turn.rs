//! Drive one [`StreamParser`] over a whole model turn.
//!
//! The driver feeds every chunk, reports deltas to a [`ParseObserver`] as
//! they appear, finalizes at end of input, and then decodes the action. When
//! the stream parser ends without a document (typically a turn wrapped in a
//! code fence), the raw text is fence-stripped and parsed once more; a
//! document found that way is marked `recovered`.
//!
//! ```
//! use react_yaml::format::YamlFormat;
//! use react_yaml::observer::NoopObserver;
//! use react_yaml::turn::run_chunks;
//!
//! let chunks = ["thinking: |\n  add them\n", "type: final\nfinal: 4\n"];
//! let output = run_chunks(chunks, &YamlFormat::default(), &NoopObserver)?;
//! assert_eq!(output.reasoning, "add them\n");
//! assert!(output.action.is_final());
//! # Ok::<(), react_yaml::error::ParserMisuseError>(())
//! ```

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::ActionDocument;
use crate::action::ReactAction;
use crate::error::{ParserMisuseError, TurnError};
use crate::format::YamlFormat;
use crate::observer::{ParseEvent, ParseObserver};
use crate::parser::{ParseOutcome, StreamParser};

/// Everything learned from one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutput {
    pub reasoning: String,
    pub raw: String,
    /// The action document, from the stream parser or from recovery.
    pub document: Option<ActionDocument>,
    /// The document came from the fence-stripped raw text rather than the
    /// stream parser.
    pub recovered: bool,
    /// Decoded action, or the error action describing why decoding failed.
    pub action: ReactAction,
    /// Every outcome returned by the parser, `finalize` last.
    pub outcomes: Vec<ParseOutcome>,
}

impl TurnOutput {
    pub fn is_malformed(&self) -> bool {
        self.document.is_none()
    }
}

/// Feed `chunks` in order and finish the turn.
pub fn run_chunks<I, S>(
    chunks: I,
    format: &YamlFormat,
    observer: &dyn ParseObserver,
) -> Result<TurnOutput, ParserMisuseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut turn = Turn::new(format, observer);
    for chunk in chunks {
        turn.feed(chunk.as_ref())?;
    }
    turn.finish()
}

/// Async version of [`run_chunks`] over any chunk stream.
pub async fn run_stream<St, S>(
    stream: St,
    format: &YamlFormat,
    observer: &dyn ParseObserver,
) -> Result<TurnOutput, ParserMisuseError>
where
    St: Stream<Item = S>,
    S: AsRef<str>,
{
    let mut stream = std::pin::pin!(stream);
    let mut turn = Turn::new(format, observer);
    while let Some(chunk) = stream.next().await {
        turn.feed(chunk.as_ref())?;
    }
    turn.finish()
}

/// [`run_stream`] over a fallible stream; the first read error ends the
/// turn without finalizing.
pub async fn run_io_stream<St>(
    stream: St,
    format: &YamlFormat,
    observer: &dyn ParseObserver,
) -> Result<TurnOutput, TurnError>
where
    St: Stream<Item = std::io::Result<String>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut turn = Turn::new(format, observer);
    while let Some(chunk) = stream.next().await {
        turn.feed(&chunk?)?;
    }
    Ok(turn.finish()?)
}

/// Concatenated reasoning deltas.
pub fn collect_reasoning(outcomes: &[ParseOutcome]) -> String {
    let mut reasoning = String::new();
    for outcome in outcomes {
        reasoning.push_str(&outcome.reasoning_delta);
    }
    reasoning
}

/// Concatenated content deltas.
pub fn collect_content(outcomes: &[ParseOutcome]) -> String {
    let mut content = String::new();
    for outcome in outcomes {
        content.push_str(&outcome.content_delta);
    }
    content
}

struct Turn<'a> {
    parser: StreamParser,
    format: &'a YamlFormat,
    observer: &'a dyn ParseObserver,
    outcomes: Vec<ParseOutcome>,
    reasoning_reported: bool,
    reported_document: Option<ActionDocument>,
}

impl<'a> Turn<'a> {
    fn new(format: &'a YamlFormat, observer: &'a dyn ParseObserver) -> Self {
        Self {
            parser: StreamParser::for_format(format),
            format,
            observer,
            outcomes: Vec::new(),
            reasoning_reported: false,
            reported_document: None,
        }
    }

    fn feed(&mut self, chunk: &str) -> Result<(), ParserMisuseError> {
        let outcome = self.parser.feed(chunk)?;
        self.report(outcome);
        Ok(())
    }

    fn report(&mut self, outcome: ParseOutcome) {
        if outcome.has_reasoning() {
            self.observer
                .on_event(&ParseEvent::ReasoningDelta(&outcome.reasoning_delta));
        }
        if outcome.reasoning_complete && !self.reasoning_reported {
            self.reasoning_reported = true;
            self.observer.on_event(&ParseEvent::ReasoningComplete {
                reasoning: self.parser.reasoning_text(),
            });
        }
        if outcome.has_content() {
            self.observer
                .on_event(&ParseEvent::ContentDelta(&outcome.content_delta));
        }
        if let Some(document) = &outcome.document
            && self.reported_document.as_ref() != Some(document)
        {
            self.observer
                .on_event(&ParseEvent::ActionComplete { document });
            self.reported_document = Some(document.clone());
        }
        self.outcomes.push(outcome);
    }

    fn finish(mut self) -> Result<TurnOutput, ParserMisuseError> {
        let outcome = self.parser.finalize()?;
        self.report(outcome);

        let raw = self.parser.raw_text().to_string();
        let (document, recovered) = match self.parser.parsed_document() {
            Some(document) => (Some(document.clone()), false),
            None => match self.format.parse_lenient(&raw) {
                Some(document) => {
                    warn!(bytes = raw.len(), "stream parse failed, recovered document from raw text");
                    self.observer
                        .on_event(&ParseEvent::Recovered { document: &document });
                    (Some(document), true)
                }
                None => {
                    self.observer.on_event(&ParseEvent::Malformed { raw: &raw });
                    (None, false)
                }
            },
        };

        let action = match &document {
            Some(document) => ReactAction::from_parsed(document, &raw, self.format.config())
                .or_thinking(self.parser.reasoning_text()),
            None => ReactAction::parse_failure(&raw),
        };
        debug!(kind = %action.kind(), recovered, "turn finished");

        Ok(TurnOutput {
            reasoning: self.parser.reasoning_text().to_string(),
            raw,
            document,
            recovered,
            action,
            outcomes: self.outcomes,
        })
    }
}
