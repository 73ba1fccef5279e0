//! Errors that end a chat request.

use avatar_llm::LlmError;
use avatar_voice::VoiceError;
use std::time::Duration;
use thiserror::Error;

/// A failure anywhere in the response pipeline.
///
/// Every variant is fatal for the current request: the caller gets a generic
/// server fault and no partial bundle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("language model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("speech synthesis failed for utterance {index}: {source}")]
    Synthesis {
        index: usize,
        #[source]
        source: VoiceError,
    },

    #[error("transcoding failed for utterance {index}: {source}")]
    Transcode {
        index: usize,
        #[source]
        source: VoiceError,
    },

    #[error("failed to read asset: {0}")]
    AssetRead(String),

    #[error("failed to prepare request workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),
}

impl PipelineError {
    /// Short, stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "upstream",
            Self::Synthesis { .. } => "synthesis",
            Self::Transcode { .. } => "transcode",
            Self::AssetRead(_) => "asset_read",
            Self::Workspace(_) => "workspace",
            Self::Timeout(_) => "timeout",
        }
    }

    /// Index of the utterance that failed, for per-utterance errors.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Synthesis { index, .. } | Self::Transcode { index, .. } => Some(*index),
            _ => None,
        }
    }
}
