//! Streaming parser for ReAct-style model turns written as YAML.
//!
//! A model prompted with [`format::render_instructions`] answers each step
//! with a reasoning block followed by an action mapping:
//!
//! ```text
//! thinking: |
//!   I need the weather first.
//!
//! type: tool
//! tool_name: weather
//! tool_args:
//!   city: Oslo
//! ```
//!
//! [`StreamParser`](parser::StreamParser) consumes that text chunk by chunk as
//! it streams in, releasing reasoning for live display before the turn is
//! finished and handing over the action mapping the moment it parses. The
//! [`turn`] driver wraps a parser with observer callbacks and a recovery pass
//! and decodes the result into a [`ReactAction`](action::ReactAction).
//!
//! ```
//! use react_yaml::prelude::*;
//!
//! let mut parser = StreamParser::new();
//! for chunk in ["thinking: quick", " note\ntype: fi", "nal\nfinal: ok\n"] {
//!     let outcome = parser.feed(chunk)?;
//!     print!("{}", outcome.reasoning_delta);
//! }
//! parser.finalize()?;
//!
//! let action = ReactAction::from_document(
//!     parser.parsed_document().unwrap(),
//!     &FormatConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(action.status(), ReactStatus::Final);
//! # Ok::<(), ParserMisuseError>(())
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`parser`] | [`StreamParser`](parser::StreamParser) state machine, [`ParseOutcome`](parser::ParseOutcome) deltas |
//! | [`format`] | Prompt instructions, structure checks, fence stripping |
//! | [`config`] | [`FormatConfig`](config::FormatConfig) key names and fence tags |
//! | [`action`] | [`ReactAction`](action::ReactAction) tool / final / error variants |
//! | [`turn`] | Drive a parser over a whole turn, sync or async |
//! | [`observer`] | [`ParseObserver`](observer::ParseObserver) callbacks |
//! | [`status`], [`event`] | Orchestration loop status and event taxonomy |
//! | [`error`] | Error types |

pub mod action;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod observer;
pub mod parser;
pub mod prelude;
pub mod status;
pub mod turn;

/// A parsed action mapping.
pub type ActionDocument = serde_json::Map<String, serde_json::Value>;
