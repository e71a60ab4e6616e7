use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const TEXT_MESSAGE: &str = "TextMessage";
pub const HANDOFF_MESSAGE: &str = "HandoffMessage";
pub const TASK_RESULT: &str = "TaskResult";

/// Inbound frame, tagged on its `type` field.
///
/// Fields beyond `source`/`content` on dialogue kinds (usage stats, handoff
/// targets) are ignored. Unrecognized kinds are kept as [`MessageEnvelope::Unknown`]
/// so they can be logged without affecting rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageEnvelope {
    TextMessage { source: String, content: String },
    HandoffMessage { source: String, content: String },
    TaskResult,
    Unknown { kind: Option<String> },
}

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("inbound frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("inbound frame must be a JSON object")]
    NotAnObject,

    #[error("inbound {kind} frame has invalid fields: {source}")]
    InvalidFields {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct DialogueFields {
    source: String,
    content: String,
}

/// Parses raw frame text into JSON without interpreting it.
pub fn parse_frame(text: &str) -> Result<Value, EnvelopeError> {
    serde_json::from_str(text).map_err(EnvelopeError::Json)
}

impl MessageEnvelope {
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        Self::from_value(&parse_frame(text)?)
    }

    pub fn from_value(value: &Value) -> Result<Self, EnvelopeError> {
        let Some(object) = value.as_object() else {
            return Err(EnvelopeError::NotAnObject);
        };

        let kind = object.get("type").and_then(Value::as_str);
        let envelope = match kind {
            Some(TEXT_MESSAGE) => {
                let fields = dialogue_fields(TEXT_MESSAGE, value)?;
                Self::TextMessage {
                    source: fields.source,
                    content: fields.content,
                }
            }
            Some(HANDOFF_MESSAGE) => {
                let fields = dialogue_fields(HANDOFF_MESSAGE, value)?;
                Self::HandoffMessage {
                    source: fields.source,
                    content: fields.content,
                }
            }
            Some(TASK_RESULT) => Self::TaskResult,
            other => Self::Unknown {
                kind: other.map(str::to_string),
            },
        };

        Ok(envelope)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::TextMessage { .. } => TEXT_MESSAGE,
            Self::HandoffMessage { .. } => HANDOFF_MESSAGE,
            Self::TaskResult => TASK_RESULT,
            Self::Unknown { kind } => kind.as_deref().unwrap_or(""),
        }
    }

    pub fn is_task_result(&self) -> bool {
        matches!(self, Self::TaskResult)
    }
}

fn dialogue_fields(kind: &'static str, value: &Value) -> Result<DialogueFields, EnvelopeError> {
    DialogueFields::deserialize(value).map_err(|source| EnvelopeError::InvalidFields { kind, source })
}

/// Outbound frame carrying the user's submitted text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub content: String,
}

impl OutboundMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Wire text, `{"content":"..."}`.
    pub fn to_frame(&self) -> String {
        serde_json::json!({ "content": self.content }).to_string()
    }
}
