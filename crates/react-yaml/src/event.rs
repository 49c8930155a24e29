//! Event taxonomy emitted by the orchestration loop.
//!
//! [`ReactEvent`] is the envelope pushed to UIs and storage; its
//! [`ReactEventType`] is a closed set. [`ReactEvent::from_json`] applies the
//! same checks the type system enforces when building events in code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EventError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactEventType {
    LlmThinking,
    ToolStart,
    ToolProgress,
    ToolEnd,
    LlmOutput,
    Final,
    Error,
    UserMessage,
    Pause,
    Resume,
    StatusChange,
    TodoUpdate,
}

impl ReactEventType {
    pub const ALL: [Self; 12] = [
        Self::LlmThinking,
        Self::ToolStart,
        Self::ToolProgress,
        Self::ToolEnd,
        Self::LlmOutput,
        Self::Final,
        Self::Error,
        Self::UserMessage,
        Self::Pause,
        Self::Resume,
        Self::StatusChange,
        Self::TodoUpdate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LlmThinking => "llm_thinking",
            Self::ToolStart => "tool_start",
            Self::ToolProgress => "tool_progress",
            Self::ToolEnd => "tool_end",
            Self::LlmOutput => "llm_output",
            Self::Final => "final",
            Self::Error => "error",
            Self::UserMessage => "user_message",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::StatusChange => "status_change",
            Self::TodoUpdate => "todo_update",
        }
    }

    pub fn is_tool_event(self) -> bool {
        matches!(self, Self::ToolStart | Self::ToolProgress | Self::ToolEnd)
    }

    /// The run ends after this event.
    pub fn is_terminal_event(self) -> bool {
        matches!(self, Self::Final | Self::Error)
    }

    /// Incremental events that may arrive many times per step.
    pub fn is_stream_event(self) -> bool {
        matches!(self, Self::LlmThinking | Self::LlmOutput | Self::ToolProgress)
    }
}

impl fmt::Display for ReactEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactEventType {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventError::UnknownEventType(s.to_string()))
    }
}

/// One event of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactEvent {
    pub event_type: ReactEventType,
    pub project_name: String,
    pub react_type: String,
    pub run_id: String,
    pub step_id: u32,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ReactEvent {
    pub fn new(
        event_type: ReactEventType,
        project_name: impl Into<String>,
        react_type: impl Into<String>,
        run_id: impl Into<String>,
        step_id: u32,
    ) -> Self {
        Self {
            event_type,
            project_name: project_name.into(),
            react_type: react_type.into(),
            run_id: run_id.into(),
            step_id,
            payload: Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Parse an event, reporting which field is wrong.
    pub fn from_json(text: &str) -> Result<Self, EventError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| EventError::Invalid(e.to_string()))?;
        let Value::Object(fields) = &value else {
            return Err(EventError::Invalid("event must be a JSON object".into()));
        };

        if let Some(kind) = fields.get("event_type").and_then(Value::as_str) {
            kind.parse::<ReactEventType>()?;
        }
        if let Some(step) = fields.get("step_id")
            && step.as_u64().is_none_or(|n| u32::try_from(n).is_err())
        {
            return Err(EventError::Invalid(format!(
                "step_id must be a non-negative integer, got {step}"
            )));
        }
        if let Some(payload) = fields.get("payload")
            && !payload.is_object()
        {
            return Err(EventError::Invalid(format!(
                "payload must be an object, got {payload}"
            )));
        }

        serde_json::from_value(value).map_err(|e| EventError::Invalid(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        Value::from(self).to_string()
    }
}

impl From<&ReactEvent> for Value {
    fn from(event: &ReactEvent) -> Self {
        let mut fields = Map::new();
        fields.insert("event_type".into(), event.event_type.as_str().into());
        fields.insert("project_name".into(), event.project_name.clone().into());
        fields.insert("react_type".into(), event.react_type.clone().into());
        fields.insert("run_id".into(), event.run_id.clone().into());
        fields.insert("step_id".into(), event.step_id.into());
        fields.insert("payload".into(), Value::Object(event.payload.clone()));
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classification() {
        assert!(ReactEventType::ToolProgress.is_tool_event());
        assert!(ReactEventType::ToolProgress.is_stream_event());
        assert!(ReactEventType::Error.is_terminal_event());
        assert!(!ReactEventType::Pause.is_terminal_event());
        assert!(!ReactEventType::ToolEnd.is_stream_event());
        let stream: Vec<_> = ReactEventType::ALL
            .into_iter()
            .filter(|kind| kind.is_stream_event())
            .collect();
        assert_eq!(
            stream,
            [
                ReactEventType::LlmThinking,
                ReactEventType::ToolProgress,
                ReactEventType::LlmOutput
            ]
        );
    }

    #[test]
    fn names_round_trip() {
        for kind in ReactEventType::ALL {
            assert_eq!(kind.as_str().parse::<ReactEventType>(), Ok(kind));
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.to_string())
            );
        }
    }

    #[test]
    fn unknown_event_type() {
        assert_eq!(
            "thinking".parse::<ReactEventType>(),
            Err(EventError::UnknownEventType("thinking".into()))
        );
    }

    #[test]
    fn event_json_round_trip() {
        let event = ReactEvent::new(ReactEventType::ToolStart, "demo", "agent", "run-1", 3)
            .with_field("tool_name", "search");
        let parsed = ReactEvent::from_json(&event.to_json()).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.payload["tool_name"], "search");
    }

    #[test]
    fn with_payload_replaces_fields() {
        let mut payload = Map::new();
        payload.insert("answer".into(), json!("42"));
        let event = ReactEvent::new(ReactEventType::Final, "demo", "agent", "run-1", 7)
            .with_field("stale", true)
            .with_payload(payload);
        assert_eq!(Value::Object(event.payload.clone()), json!({"answer": "42"}));
        assert_eq!(ReactEvent::from_json(&event.to_json()), Ok(event));
    }

    #[test]
    fn from_json_rejects_bad_fields() {
        let base = json!({
            "event_type": "final",
            "project_name": "p",
            "react_type": "r",
            "run_id": "x",
            "step_id": 0,
            "payload": {}
        });

        let mut unknown = base.clone();
        unknown["event_type"] = json!("nope");
        assert_eq!(
            ReactEvent::from_json(&unknown.to_string()),
            Err(EventError::UnknownEventType("nope".into()))
        );

        let mut negative = base.clone();
        negative["step_id"] = json!(-1);
        assert!(matches!(
            ReactEvent::from_json(&negative.to_string()),
            Err(EventError::Invalid(msg)) if msg.contains("step_id")
        ));

        let mut list_payload = base.clone();
        list_payload["payload"] = json!([1, 2]);
        assert!(matches!(
            ReactEvent::from_json(&list_payload.to_string()),
            Err(EventError::Invalid(msg)) if msg.contains("payload")
        ));

        assert!(ReactEvent::from_json(&base.to_string()).is_ok());
    }
}
