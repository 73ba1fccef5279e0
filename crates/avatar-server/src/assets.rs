//! Pre-recorded fallback reply.
//!
//! When the message is empty or upstream credentials are missing, the server
//! answers with a fixed two-part greeting whose audio and lip-sync files ship
//! with the deployment. The files are read verbatim on every request.

use crate::error::PipelineError;
use avatar_types::{AnimationCue, FacialExpression, ResponseBundle, SpeechSegment, Utterance};
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One pre-recorded clip and the utterance it voices.
#[derive(Debug, Clone)]
pub struct FallbackClip {
    pub text: &'static str,
    pub facial_expression: FacialExpression,
    pub animation: AnimationCue,
    pub audio_file: &'static str,
    pub lipsync_file: &'static str,
}

/// The fallback reply, in playback order.
pub static FALLBACK_CLIPS: [FallbackClip; 2] = [
    FallbackClip {
        text: "Enter your query",
        facial_expression: FacialExpression::Smile,
        animation: AnimationCue::Talking1,
        audio_file: "indro_0.ogg",
        lipsync_file: "indro_0.json",
    },
    FallbackClip {
        text: "Hey friend how may i assist you",
        facial_expression: FacialExpression::Sad,
        animation: AnimationCue::Talking2,
        audio_file: "indro_2.ogg",
        lipsync_file: "indro_2.json",
    },
];

/// Loads the fallback reply from an assets directory.
#[derive(Debug, Clone)]
pub struct FallbackLibrary {
    dir: PathBuf,
}

impl FallbackLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists clip files that are missing from the assets directory.
    pub fn missing_files(&self) -> Vec<PathBuf> {
        FALLBACK_CLIPS
            .iter()
            .flat_map(|clip| [clip.audio_file, clip.lipsync_file])
            .map(|name| self.dir.join(name))
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Reads every clip and assembles the fallback bundle.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AssetRead`] if any file is missing or its
    /// lip-sync JSON is corrupt.
    pub async fn load(&self) -> Result<ResponseBundle, PipelineError> {
        let mut messages = Vec::with_capacity(FALLBACK_CLIPS.len());
        for clip in &FALLBACK_CLIPS {
            messages.push(self.load_clip(clip).await?);
        }
        debug!(dir = ?self.dir, count = messages.len(), "fallback reply loaded");
        Ok(ResponseBundle::new(messages))
    }

    async fn load_clip(&self, clip: &FallbackClip) -> Result<SpeechSegment, PipelineError> {
        let audio_path = self.dir.join(clip.audio_file);
        let audio = tokio::fs::read(&audio_path).await.map_err(|e| {
            PipelineError::AssetRead(format!("failed to read {:?}: {}", audio_path, e))
        })?;

        let lipsync = avatar_voice::read_viseme_track(&self.dir.join(clip.lipsync_file))
            .await
            .map_err(|e| PipelineError::AssetRead(e.to_string()))?;

        Ok(SpeechSegment {
            utterance: Utterance::new(
                clip.text,
                clip.facial_expression.clone(),
                clip.animation.clone(),
            ),
            audio: base64::engine::general_purpose::STANDARD.encode(audio),
            lipsync,
        })
    }
}
