use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

fn default_elevenlabs_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_voice_id() -> String {
    "kgG7dCoKCfLehAPWkJOE".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_piper_binary() -> String {
    "piper".to_string()
}

fn default_ffmpeg_binary() -> String {
    "ffmpeg".to_string()
}

fn default_rhubarb_binary() -> String {
    "rhubarb".to_string()
}

fn default_recognizer() -> String {
    "phonetic".to_string()
}

/// Connection settings for the ElevenLabs text-to-speech API.
#[derive(Clone, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    #[serde(default = "default_elevenlabs_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// HTTP timeout per synthesis or catalog call, in seconds. Default: 60.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_elevenlabs_url(),
            api_key: None,
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ElevenLabsConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Returns the API key if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the local Piper synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiperConfig {
    #[serde(default = "default_piper_binary")]
    pub binary: String,
    /// Path to the `.onnx` voice model.
    #[serde(default)]
    pub model: String,
    /// Speaker ID within a multi-speaker model.
    #[serde(default)]
    pub speaker_id: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PiperConfig {
    fn default() -> Self {
        Self {
            binary: default_piper_binary(),
            model: String::new(),
            speaker_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Settings for the ffmpeg + Rhubarb transcoding stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_ffmpeg_binary")]
    pub ffmpeg_binary: String,
    #[serde(default = "default_rhubarb_binary")]
    pub rhubarb_binary: String,
    /// Rhubarb recognizer (`phonetic` or `pocketSphinx`).
    #[serde(default = "default_recognizer")]
    pub recognizer: String,
    /// Timeout per tool invocation, in seconds. Default: 60.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_binary: default_ffmpeg_binary(),
            rhubarb_binary: default_rhubarb_binary(),
            recognizer: default_recognizer(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TranscoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
