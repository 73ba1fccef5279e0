//! ElevenLabs text-to-speech over HTTP.

use crate::config::ElevenLabsConfig;
use crate::error::VoiceError;
use crate::synth::{check_input_size, SpeechSynthesizer};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const XI_API_KEY_HEADER: &str = "xi-api-key";
const AUDIO_MPEG: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Synthesizer backed by the ElevenLabs REST API.
#[derive(Debug, Clone)]
pub struct ElevenLabsSynthesizer {
    config: ElevenLabsConfig,
    http: Client,
}

impl ElevenLabsSynthesizer {
    /// Creates a synthesizer. Fails if no API key is configured.
    pub fn new(config: ElevenLabsConfig) -> Result<Self, VoiceError> {
        if config.api_key().is_none() {
            return Err(VoiceError::Config(
                "ElevenLabs API key is not configured".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> &str {
        self.config.api_key().unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError> {
        check_input_size(text)?;

        let url = self.endpoint(&format!("/v1/text-to-speech/{}", self.config.voice_id));
        let response = self
            .http
            .post(&url)
            .header(XI_API_KEY_HEADER, self.api_key())
            .header(ACCEPT, AUDIO_MPEG)
            .json(&TextToSpeechBody {
                text,
                model_id: &self.config.model_id,
            })
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("ElevenLabs request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Synthesis(format!(
                "ElevenLabs returned {}: {}",
                status, body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("failed to read ElevenLabs audio: {}", e)))?;
        if audio.is_empty() {
            return Err(VoiceError::Synthesis(
                "ElevenLabs returned empty audio".to_string(),
            ));
        }

        tokio::fs::write(output, &audio).await.map_err(|e| {
            VoiceError::Synthesis(format!("failed to write audio to {:?}: {}", output, e))
        })?;

        debug!(bytes = audio.len(), path = ?output, "ElevenLabs audio written");
        Ok(())
    }

    async fn voices(&self) -> Result<Value, VoiceError> {
        let response = self
            .http
            .get(self.endpoint("/v1/voices"))
            .header(XI_API_KEY_HEADER, self.api_key())
            .send()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("ElevenLabs request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Synthesis(format!(
                "ElevenLabs returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| VoiceError::Synthesis(format!("invalid voice catalog: {}", e)))
    }
}
