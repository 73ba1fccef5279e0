//! Presentation metadata attached to every utterance.
//!
//! The avatar client understands a closed set of facial expressions and
//! animation clips. Values outside that set are carried verbatim in the
//! `Other` variant so the client can decide what to do with them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facial expression the avatar holds while speaking an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    #[default]
    Default,
    /// A value outside the known set, passed through unchanged.
    Other(String),
}

impl FacialExpression {
    /// All expressions the avatar client ships with.
    pub const KNOWN: [FacialExpression; 6] = [
        Self::Smile,
        Self::Sad,
        Self::Angry,
        Self::Surprised,
        Self::FunnyFace,
        Self::Default,
    ];

    /// Returns the wire name of this expression.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Smile => "smile",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::FunnyFace => "funnyFace",
            Self::Default => "default",
            Self::Other(value) => value,
        }
    }

    /// Returns `true` if the value is one of the known expressions.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for FacialExpression {
    fn from(value: String) -> Self {
        match value.as_str() {
            "smile" => Self::Smile,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "surprised" => Self::Surprised,
            "funnyFace" => Self::FunnyFace,
            "default" => Self::Default,
            _ => Self::Other(value),
        }
    }
}

impl From<FacialExpression> for String {
    fn from(value: FacialExpression) -> Self {
        match value {
            FacialExpression::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FacialExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Animation clip the avatar plays while speaking an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationCue {
    Talking0,
    Talking1,
    Talking2,
    Crying,
    Laughing,
    Rumba,
    #[default]
    Idle,
    Terrified,
    Angry,
    /// A value outside the known set, passed through unchanged.
    Other(String),
}

impl AnimationCue {
    /// All animation clips the avatar client ships with.
    pub const KNOWN: [AnimationCue; 9] = [
        Self::Talking0,
        Self::Talking1,
        Self::Talking2,
        Self::Crying,
        Self::Laughing,
        Self::Rumba,
        Self::Idle,
        Self::Terrified,
        Self::Angry,
    ];

    /// Returns the wire name of this animation (the clip name in the model file).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Talking0 => "Talking_0",
            Self::Talking1 => "Talking_1",
            Self::Talking2 => "Talking_2",
            Self::Crying => "Crying",
            Self::Laughing => "Laughing",
            Self::Rumba => "Rumba",
            Self::Idle => "Idle",
            Self::Terrified => "Terrified",
            Self::Angry => "Angry",
            Self::Other(value) => value,
        }
    }

    /// Returns `true` if the value is one of the known animations.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for AnimationCue {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Talking_0" => Self::Talking0,
            "Talking_1" => Self::Talking1,
            "Talking_2" => Self::Talking2,
            "Crying" => Self::Crying,
            "Laughing" => Self::Laughing,
            "Rumba" => Self::Rumba,
            "Idle" => Self::Idle,
            "Terrified" => Self::Terrified,
            "Angry" => Self::Angry,
            _ => Self::Other(value),
        }
    }
}

impl From<AnimationCue> for String {
    fn from(value: AnimationCue) -> Self {
        match value {
            AnimationCue::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AnimationCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
