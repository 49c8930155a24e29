//! Typed actions decoded from a parsed turn.
//!
//! The discriminator key selects one of three variants. Conversion from a raw
//! mapping is strict ([`ReactAction::from_document`]); conversion from a raw
//! model response never fails and turns every problem into an
//! [`ErrorAction`] ([`ReactAction::parse_response`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ActionDocument;
use crate::config::FormatConfig;
use crate::error::ActionError;
use crate::format::YamlFormat;
use crate::status::ReactStatus;

/// Characters of the raw response kept on a parse-failure action.
pub const RAW_RESPONSE_LIMIT: usize = 500;

/// Message for a response whose action section never parsed.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response as valid YAML action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Tool,
    Final,
    Error,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Final => "final",
            Self::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tool" => Some(Self::Tool),
            "final" => Some(Self::Final),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run stopped with a final action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    FinalAction,
    MaxStepsReached,
    ParseError,
    UserInterrupted,
}

impl StopReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinalAction => "final_action",
            Self::MaxStepsReached => "max_steps_reached",
            Self::ParseError => "parse_error",
            Self::UserInterrupted => "user_interrupted",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "final_action" => Some(Self::FinalAction),
            "max_steps_reached" => Some(Self::MaxStepsReached),
            "parse_error" => Some(Self::ParseError),
            "user_interrupted" => Some(Self::UserInterrupted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolAction {
    pub tool_name: String,
    #[serde(default)]
    pub tool_args: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
}

impl ToolAction {
    /// Payload for a `tool_end` event.
    pub fn to_end_payload(&self, result: Option<Value>, error: Option<&str>) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("tool_name".into(), self.tool_name.clone().into());
        payload.insert("ok".into(), error.is_none().into());
        match (result, error) {
            (_, Some(error)) => {
                payload.insert("error".into(), error.into());
            }
            (Some(result), None) => {
                payload.insert("result".into(), result);
            }
            (None, None) => {}
        }
        payload
    }

    /// Payload for a `tool_progress` event.
    pub fn to_progress_payload(&self, progress: Value) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("tool_name".into(), self.tool_name.clone().into());
        payload.insert("progress".into(), progress);
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAction {
    #[serde(rename = "final")]
    pub final_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default)]
    pub stop_reason: StopReason,
}

impl FinalAction {
    pub fn new(final_answer: impl Into<String>) -> Self {
        Self {
            final_answer: final_answer.into(),
            thinking: None,
            stop_reason: StopReason::FinalAction,
        }
    }

    pub fn with_stop_reason(mut self, stop_reason: StopReason) -> Self {
        self.stop_reason = stop_reason;
        self
    }

    /// Payload for a `final` event.
    pub fn to_final_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("final_response".into(), self.final_answer.clone().into());
        payload.insert("stop_reason".into(), self.stop_reason.as_str().into());
        payload.insert("summary".into(), self.summary().into());
        payload
    }

    fn summary(&self) -> &'static str {
        match self.stop_reason {
            StopReason::MaxStepsReached => "ReAct process stopped after reaching maximum steps",
            StopReason::UserInterrupted => "ReAct process interrupted by user",
            StopReason::FinalAction | StopReason::ParseError => "ReAct process completed successfully",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAction {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_response: String,
}

impl ErrorAction {
    /// Payload for an `error` event. `details` falls back to the head of the
    /// raw response.
    pub fn to_error_payload(&self, details: Option<&str>) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("error".into(), self.error.clone().into());
        let details = match details {
            Some(details) => Some(details.to_string()),
            None if !self.raw_response.is_empty() => {
                Some(head_chars(&self.raw_response, RAW_RESPONSE_LIMIT))
            }
            None => None,
        };
        if let Some(details) = details {
            payload.insert("details".into(), details.into());
        }
        payload
    }
}

/// One decision of the model, tagged by its `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactAction {
    Tool(ToolAction),
    Final(FinalAction),
    Error(ErrorAction),
}

impl ReactAction {
    /// Decode a parsed mapping using the key names in `config`.
    pub fn from_document(doc: &ActionDocument, config: &FormatConfig) -> Result<Self, ActionError> {
        let kind = match doc.get(&config.type_key) {
            None | Some(Value::Null) => {
                return Err(ActionError::MissingType {
                    key: config.type_key.clone(),
                });
            }
            Some(Value::String(name)) => {
                ActionKind::from_name(name).ok_or_else(|| ActionError::UnknownType(name.clone()))?
            }
            Some(other) => return Err(ActionError::UnknownType(other.to_string())),
        };
        let thinking = doc
            .get(&config.reasoning_key)
            .and_then(scalar_text)
            .filter(|text| !text.is_empty());

        let action = match kind {
            ActionKind::Tool => {
                let tool_name = doc
                    .get("tool_name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.trim().is_empty())
                    .ok_or(ActionError::MissingField {
                        kind: "tool",
                        field: "tool_name",
                    })?;
                let tool_args = match doc.get("tool_args") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(args)) => args.clone(),
                    Some(_) => {
                        return Err(ActionError::InvalidField {
                            field: "tool_args",
                            expected: "a mapping",
                        });
                    }
                };
                Self::Tool(ToolAction {
                    tool_name: tool_name.trim().to_string(),
                    tool_args,
                    thinking,
                })
            }
            ActionKind::Final => {
                let final_answer = doc.get("final").and_then(scalar_text).ok_or(
                    ActionError::MissingField {
                        kind: "final",
                        field: "final",
                    },
                )?;
                let stop_reason = doc
                    .get("stop_reason")
                    .and_then(Value::as_str)
                    .and_then(StopReason::from_name)
                    .unwrap_or_default();
                Self::Final(FinalAction {
                    final_answer,
                    thinking,
                    stop_reason,
                })
            }
            ActionKind::Error => {
                let error = doc.get("error").and_then(scalar_text).ok_or(
                    ActionError::MissingField {
                        kind: "error",
                        field: "error",
                    },
                )?;
                Self::Error(ErrorAction {
                    error,
                    thinking,
                    raw_response: String::new(),
                })
            }
        };
        debug!(kind = %action.kind(), "decoded action");
        Ok(action)
    }

    /// Decode a complete model response. Never fails: a response that does
    /// not decode becomes an [`ErrorAction`] carrying the problem.
    pub fn parse_response(text: &str, format: &YamlFormat) -> Self {
        let Some(doc) = format.parse_lenient(text) else {
            warn!("{PARSE_FAILURE_MESSAGE}");
            return Self::parse_failure(text);
        };
        Self::from_parsed(&doc, text, format.config())
    }

    /// Decode `doc`, falling back to an [`ErrorAction`] that keeps `raw`.
    pub fn from_parsed(doc: &ActionDocument, raw: &str, config: &FormatConfig) -> Self {
        match Self::from_document(doc, config) {
            Ok(Self::Error(mut action)) => {
                action.raw_response = raw.to_string();
                Self::Error(action)
            }
            Ok(action) => action,
            Err(err) => {
                warn!(%err, "action document rejected");
                Self::Error(ErrorAction {
                    error: err.to_string(),
                    thinking: doc
                        .get(&config.reasoning_key)
                        .and_then(scalar_text)
                        .filter(|text| !text.is_empty()),
                    raw_response: head_chars(raw, RAW_RESPONSE_LIMIT),
                })
            }
        }
    }

    /// The error action for a response whose action section never parsed.
    pub fn parse_failure(raw: &str) -> Self {
        Self::Error(ErrorAction {
            error: PARSE_FAILURE_MESSAGE.to_string(),
            thinking: None,
            raw_response: head_chars(raw, RAW_RESPONSE_LIMIT),
        })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Tool(_) => ActionKind::Tool,
            Self::Final(_) => ActionKind::Final,
            Self::Error(_) => ActionKind::Error,
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool(_))
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn thinking(&self) -> Option<&str> {
        match self {
            Self::Tool(a) => a.thinking.as_deref(),
            Self::Final(a) => a.thinking.as_deref(),
            Self::Error(a) => a.thinking.as_deref(),
        }
    }

    /// Use `reasoning` as the thinking text when the document carried none.
    pub fn or_thinking(mut self, reasoning: &str) -> Self {
        let slot = match &mut self {
            Self::Tool(a) => &mut a.thinking,
            Self::Final(a) => &mut a.thinking,
            Self::Error(a) => &mut a.thinking,
        };
        if slot.is_none() && !reasoning.is_empty() {
            *slot = Some(reasoning.to_string());
        }
        self
    }

    /// Loop status that follows this action.
    pub fn status(&self) -> ReactStatus {
        match self {
            Self::Tool(_) => ReactStatus::Running,
            Self::Final(_) => ReactStatus::Final,
            Self::Error(_) => ReactStatus::Failed,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Tool(a) if a.tool_name.is_empty() => "Executing tool".to_string(),
            Self::Tool(a) => format!("Executing tool: {}", a.tool_name),
            Self::Final(a) => a.summary().to_string(),
            Self::Error(a) => format!("ReAct process encountered an error: {}", a.error),
        }
    }

    /// Event payload: `type`, `thinking` when present, then variant fields.
    pub fn to_event_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("type".into(), self.kind().as_str().into());
        if let Some(thinking) = self.thinking() {
            payload.insert("thinking".into(), thinking.into());
        }
        match self {
            Self::Tool(a) => {
                payload.insert("tool_name".into(), a.tool_name.clone().into());
                payload.insert("tool_args".into(), Value::Object(a.tool_args.clone()));
            }
            Self::Final(a) => {
                payload.insert("final_response".into(), a.final_answer.clone().into());
                payload.insert("stop_reason".into(), a.stop_reason.as_str().into());
            }
            Self::Error(a) => {
                payload.insert("error".into(), a.error.clone().into());
                if !a.raw_response.is_empty() {
                    payload.insert("raw_response".into(), a.raw_response.clone().into());
                }
            }
        }
        payload
    }
}

/// Text of a scalar; structured values are rendered as JSON.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn head_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
