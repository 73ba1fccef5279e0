//! Local speech synthesis through the Piper binary.

use crate::config::PiperConfig;
use crate::error::VoiceError;
use crate::process::run_tool;
use crate::synth::{check_input_size, SpeechSynthesizer};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Synthesizer that shells out to Piper.
///
/// Piper reads the text from stdin and writes a WAV file to `--output_file`.
#[derive(Debug, Clone)]
pub struct PiperSynthesizer {
    binary: PathBuf,
    model: PathBuf,
    speaker_id: Option<u32>,
    timeout: Duration,
}

impl PiperSynthesizer {
    pub fn new(binary: impl Into<PathBuf>, model: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            speaker_id: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &PiperConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            model: PathBuf::from(&config.model),
            speaker_id: config.speaker_id,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_speaker(mut self, speaker_id: u32) -> Self {
        self.speaker_id = Some(speaker_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn model_name(&self) -> String {
        self.model
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "piper".to_string())
    }
}

#[async_trait]
impl SpeechSynthesizer for PiperSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError> {
        check_input_size(text)?;

        if !self.model.exists() {
            return Err(VoiceError::Synthesis(format!(
                "Model file not found: {:?}",
                self.model
            )));
        }

        let mut command = Command::new(&self.binary);
        command
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output);
        if let Some(speaker) = self.speaker_id {
            command.arg("--speaker").arg(speaker.to_string());
        }

        run_tool(
            command,
            "piper",
            Some(text.as_bytes()),
            self.timeout,
            VoiceError::Synthesis,
        )
        .await?;

        if !output.exists() {
            return Err(VoiceError::Synthesis(format!(
                "piper produced no audio at {:?}",
                output
            )));
        }
        Ok(())
    }

    async fn voices(&self) -> Result<Value, VoiceError> {
        Ok(json!({
            "voices": [{
                "voice_id": self.model_name(),
                "name": self.model_name(),
                "speaker_id": self.speaker_id,
            }]
        }))
    }
}
