//! Segment building: planned utterances in, playable speech segments out.
//!
//! Each request gets its own artifact directory under the work root, named by
//! the request ID, so concurrent requests never touch each other's files.
//! Inside it, utterance `i` uses `message_<i>.mp3`, `message_<i>.wav` and
//! `message_<i>.json`. The directory is removed once the build finishes.

use crate::error::PipelineError;
use avatar_types::{SpeechSegment, Utterance};
use avatar_voice::{AudioConverter, SpeechSynthesizer, VisemeExtractor, VoiceError};
use base64::Engine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Drives synthesis and transcoding for every planned utterance.
#[derive(Clone)]
pub struct SegmentBuilder {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    converter: Arc<dyn AudioConverter>,
    extractor: Arc<dyn VisemeExtractor>,
    work_dir: PathBuf,
}

impl SegmentBuilder {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        converter: Arc<dyn AudioConverter>,
        extractor: Arc<dyn VisemeExtractor>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synthesizer,
            converter,
            extractor,
            work_dir: work_dir.into(),
        }
    }

    /// Directory holding the artifacts of one request.
    pub fn request_dir(&self, request_id: Uuid) -> PathBuf {
        self.work_dir.join(request_id.to_string())
    }

    /// Removes a request's artifact directory, if it exists.
    pub async fn discard(&self, request_id: Uuid) {
        let dir = self.request_dir(request_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = ?dir, "failed to remove request artifacts: {}", e),
        }
    }

    /// Builds one segment per utterance, strictly in order.
    ///
    /// The first failing utterance aborts the build; no partial result is
    /// returned. An empty plan touches no files.
    pub async fn build(
        &self,
        request_id: Uuid,
        utterances: Vec<Utterance>,
    ) -> Result<Vec<SpeechSegment>, PipelineError> {
        if utterances.is_empty() {
            return Ok(Vec::new());
        }
        let dir = self.request_dir(request_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(PipelineError::Workspace)?;

        let result = self.build_in(&dir, utterances).await;
        self.discard(request_id).await;
        result
    }

    async fn build_in(
        &self,
        dir: &Path,
        utterances: Vec<Utterance>,
    ) -> Result<Vec<SpeechSegment>, PipelineError> {
        let mut segments = Vec::with_capacity(utterances.len());
        for (index, utterance) in utterances.into_iter().enumerate() {
            segments.push(self.build_one(dir, index, utterance).await?);
        }
        Ok(segments)
    }

    async fn build_one(
        &self,
        dir: &Path,
        index: usize,
        utterance: Utterance,
    ) -> Result<SpeechSegment, PipelineError> {
        let started = Instant::now();
        let audio_path = dir.join(format!("message_{}.mp3", index));

        self.synthesizer
            .synthesize(&utterance.text, &audio_path)
            .await
            .map_err(|source| PipelineError::Synthesis { index, source })?;

        let waveform = self
            .converter
            .convert(&audio_path)
            .await
            .map_err(|source| transcode_error(index, source))?;

        let lipsync = self
            .extractor
            .extract_visemes(&waveform)
            .await
            .map_err(|source| transcode_error(index, source))?;

        let audio = tokio::fs::read(&audio_path).await.map_err(|e| {
            PipelineError::AssetRead(format!("failed to read {:?}: {}", audio_path, e))
        })?;

        info!(
            index,
            audio_bytes = audio.len(),
            mouth_cues = lipsync.cue_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "segment ready"
        );

        Ok(SpeechSegment {
            utterance,
            audio: base64::engine::general_purpose::STANDARD.encode(audio),
            lipsync,
        })
    }
}

fn transcode_error(index: usize, source: VoiceError) -> PipelineError {
    match source {
        VoiceError::AssetRead(msg) => PipelineError::AssetRead(msg),
        source => PipelineError::Transcode { index, source },
    }
}
