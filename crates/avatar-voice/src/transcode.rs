//! Audio conversion and viseme extraction.
//!
//! The transcoder is two independent stages:
//!
//! 1. [`AudioConverter`] turns synthesized audio into a PCM waveform file.
//! 2. [`VisemeExtractor`] reads that waveform and produces a [`VisemeTrack`].
//!
//! The default implementations run ffmpeg and Rhubarb Lip Sync as child
//! processes. Artifacts are written next to their input, so callers control
//! isolation by choosing the directory.

use crate::config::TranscoderConfig;
use crate::error::VoiceError;
use crate::process::run_tool;
use async_trait::async_trait;
use avatar_types::VisemeTrack;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// First transcoding stage: audio file in, waveform file out.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Converts `audio` and returns the path of the written waveform.
    async fn convert(&self, audio: &Path) -> Result<PathBuf, VoiceError>;
}

/// Second transcoding stage: waveform file in, viseme track out.
#[async_trait]
pub trait VisemeExtractor: Send + Sync {
    async fn extract_visemes(&self, waveform: &Path) -> Result<VisemeTrack, VoiceError>;
}

/// Returns the waveform path for `audio`, never equal to the input itself.
fn waveform_path(audio: &Path) -> PathBuf {
    let candidate = audio.with_extension("wav");
    if candidate == audio {
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        audio.with_file_name(format!("{}_pcm.wav", stem))
    } else {
        candidate
    }
}

/// Converts audio to WAV with ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &TranscoderConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.ffmpeg_binary),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, audio: &Path) -> Result<PathBuf, VoiceError> {
        let started = Instant::now();
        let output = waveform_path(audio);

        let mut command = Command::new(&self.binary);
        command.arg("-y").arg("-i").arg(audio).arg(&output);
        run_tool(command, "ffmpeg", None, self.timeout, VoiceError::Transcode).await?;

        debug!(
            input = ?audio,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion done"
        );
        Ok(output)
    }
}

/// Extracts visemes with Rhubarb Lip Sync.
#[derive(Debug, Clone)]
pub struct RhubarbExtractor {
    binary: PathBuf,
    recognizer: String,
    timeout: Duration,
}

impl RhubarbExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            recognizer: "phonetic".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &TranscoderConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.rhubarb_binary),
            recognizer: config.recognizer.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl VisemeExtractor for RhubarbExtractor {
    async fn extract_visemes(&self, waveform: &Path) -> Result<VisemeTrack, VoiceError> {
        let started = Instant::now();
        let output = waveform.with_extension("json");

        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg("json")
            .arg("-o")
            .arg(&output)
            .arg(waveform)
            .arg("-r")
            .arg(&self.recognizer);
        run_tool(command, "rhubarb", None, self.timeout, VoiceError::Transcode).await?;

        let track = read_viseme_track(&output).await?;
        debug!(
            input = ?waveform,
            cues = track.cue_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "lip sync done"
        );
        Ok(track)
    }
}

/// Reads and parses a viseme track JSON file.
pub async fn read_viseme_track(path: &Path) -> Result<VisemeTrack, VoiceError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| VoiceError::AssetRead(format!("failed to read {:?}: {}", path, e)))?;
    VisemeTrack::from_json(&text)
        .map_err(|e| VoiceError::AssetRead(format!("invalid viseme JSON in {:?}: {}", path, e)))
}
