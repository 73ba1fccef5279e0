use crate::error::VoiceError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Maximum text input size for one synthesis call (64 KiB).
pub const MAX_SYNTHESIS_INPUT_BYTES: usize = 64 * 1024;

/// Turns text into an audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` and writes the resulting audio to `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), VoiceError>;

    /// Returns the provider's voice catalog in its native JSON shape.
    async fn voices(&self) -> Result<Value, VoiceError>;
}

pub(crate) fn check_input_size(text: &str) -> Result<(), VoiceError> {
    if text.len() > MAX_SYNTHESIS_INPUT_BYTES {
        return Err(VoiceError::Synthesis(format!(
            "text exceeds maximum size: {} bytes (limit: {} bytes)",
            text.len(),
            MAX_SYNTHESIS_INPUT_BYTES
        )));
    }
    Ok(())
}
