//! Shared data model for the avatar response pipeline.
//!
//! Every value in this crate is request-local: utterances are planned for one
//! incoming message, turned into speech segments, serialized into the HTTP
//! response and dropped. Nothing here is cached or persisted.
//!
//! Field names on the wire follow the avatar client (`facialExpression`,
//! `lipsync`, ...), so the types carry explicit serde renames.

pub mod presentation;

pub use presentation::{AnimationCue, FacialExpression};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One planned unit of spoken output, before synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Text to speak.
    pub text: String,
    /// Expression held while speaking.
    #[serde(rename = "facialExpression")]
    pub facial_expression: FacialExpression,
    /// Animation played while speaking.
    pub animation: AnimationCue,
}

impl Utterance {
    pub fn new(
        text: impl Into<String>,
        facial_expression: FacialExpression,
        animation: AnimationCue,
    ) -> Self {
        Self {
            text: text.into(),
            facial_expression,
            animation,
        }
    }

    /// Plain utterance with a neutral face and the idle animation.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, FacialExpression::Default, AnimationCue::Idle)
    }
}

/// Time-aligned mouth-shape markers for one audio clip.
///
/// The document is produced by the viseme extraction tool and handed to the
/// client untouched, so it is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisemeTrack(pub Value);

impl VisemeTrack {
    /// Parses a viseme document from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    /// Number of entries in the `mouthCues` array, or 0 if absent.
    pub fn cue_count(&self) -> usize {
        self.0
            .get("mouthCues")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Returns `true` if the document carries no data at all.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// An utterance after synthesis, ready for playback.
///
/// `audio` and `lipsync` always come from the same synthesis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechSegment {
    #[serde(flatten)]
    pub utterance: Utterance,
    /// Synthesized audio, base64-encoded.
    pub audio: String,
    /// Viseme track extracted from the same audio.
    pub lipsync: VisemeTrack,
}

/// The response returned for one chat message.
///
/// `messages` is in playback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBundle {
    pub messages: Vec<SpeechSegment>,
}

impl ResponseBundle {
    pub fn new(messages: Vec<SpeechSegment>) -> Self {
        Self { messages }
    }
}
