//! Inbound Events
//!
//! Decoding of the server-to-panel wire protocol. The server pushes JSON
//! text frames shaped like:
//!
//! ```json
//! { "type": "state", "state": "talking", "text": "Hello!", "speaker": "Aria" }
//! ```
//!
//! Only `type == "state"` carries meaning today. Every other `type` is
//! decoded as [`InboundMessage::Other`] and ignored by the panel, so the
//! server can add message kinds without breaking older panels.
//!
//! # Fail-open decoding
//!
//! A payload that is not a JSON object, or whose `text`/`speaker` fields have
//! the wrong type, is a [`DecodeError`]. An unknown or missing `state` value
//! is *not* an error: it is preserved as [`StateField::Unknown`] or
//! [`StateField::Missing`] so the recognized fields of the same event still
//! apply.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Discriminator value of the only message kind the panel acts on
pub const STATE_MESSAGE_TYPE: &str = "state";

/// Visual state of the character
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    /// Resting, nothing in progress
    Idle,
    /// Speaking the current line
    Talking,
    /// Working on a reply
    Thinking,
}

impl VisualState {
    /// All known states, in wire order
    pub const ALL: [VisualState; 3] = [Self::Idle, Self::Talking, Self::Thinking];

    /// Wire name of this state
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Talking => "talking",
            Self::Thinking => "thinking",
        }
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known [`VisualState`]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown visual state: {0:?}")]
pub struct UnknownState(pub String);

impl FromStr for VisualState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "talking" => Ok(Self::Talking),
            "thinking" => Ok(Self::Thinking),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// The `state` field of a state-change event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateField {
    /// One of the known states
    Known(VisualState),
    /// Present but not a known state (kept for logging)
    Unknown(String),
    /// Absent or null
    Missing,
}

impl StateField {
    /// The known state, if any
    pub fn known(&self) -> Option<VisualState> {
        match self {
            Self::Known(state) => Some(*state),
            Self::Unknown(_) | Self::Missing => None,
        }
    }
}

impl From<VisualState> for StateField {
    fn from(state: VisualState) -> Self {
        Self::Known(state)
    }
}

/// A decoded state-change event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateEvent {
    /// Requested visual state
    pub state: StateField,
    /// Line to reveal (absent or empty leaves the current text alone)
    pub text: Option<String>,
    /// Speaker label (absent or empty leaves the current label alone)
    pub speaker: Option<String>,
}

impl StateEvent {
    /// Create an event with only a state
    pub fn new(state: impl Into<StateField>) -> Self {
        Self {
            state: state.into(),
            text: None,
            speaker: None,
        }
    }

    /// Attach a line of text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Attach a speaker label
    #[must_use]
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Text to reveal, if present and non-empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Speaker label, if present and non-empty
    pub fn speaker(&self) -> Option<&str> {
        self.speaker.as_deref().filter(|s| !s.is_empty())
    }
}

/// Any message the server may send
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundMessage {
    /// A state-change event
    State(StateEvent),
    /// Any other (or absent) `type`; ignored
    Other {
        /// The `type` discriminator, if one was present
        kind: Option<String>,
    },
}

/// Errors produced while decoding an inbound payload
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload is not JSON at all
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Payload is JSON but not an object
    #[error("payload is not a JSON object")]
    NotAnObject,

    /// Object fields have the wrong types
    #[error("malformed {kind} message: {source}")]
    Malformed {
        /// Message kind being decoded
        kind: &'static str,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct StatePayload {
    state: Option<Value>,
    text: Option<String>,
    speaker: Option<String>,
}

/// Decode one text frame from the server
///
/// # Errors
///
/// Returns a [`DecodeError`] when the payload is not a JSON object or when a
/// state message carries wrongly typed fields.
pub fn decode(payload: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value = serde_json::from_str(payload).map_err(DecodeError::InvalidJson)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject);
    }

    let envelope = Envelope::deserialize(&value).map_err(|source| DecodeError::Malformed {
        kind: "envelope",
        source,
    })?;

    if envelope.kind.as_deref() != Some(STATE_MESSAGE_TYPE) {
        return Ok(InboundMessage::Other {
            kind: envelope.kind,
        });
    }

    let payload = StatePayload::deserialize(&value).map_err(|source| DecodeError::Malformed {
        kind: STATE_MESSAGE_TYPE,
        source,
    })?;

    let state = match payload.state {
        None | Some(Value::Null) => StateField::Missing,
        Some(Value::String(name)) => match name.parse::<VisualState>() {
            Ok(state) => StateField::Known(state),
            Err(UnknownState(name)) => StateField::Unknown(name),
        },
        Some(other) => StateField::Unknown(other.to_string()),
    };

    Ok(InboundMessage::State(StateEvent {
        state,
        text: payload.text,
        speaker: payload.speaker,
    }))
}
