use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Transcode error: {0}")]
    Transcode(String),

    #[error("Asset read error: {0}")]
    AssetRead(String),
}
