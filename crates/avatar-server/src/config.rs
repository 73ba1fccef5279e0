//! Server configuration loading from file and environment variables.

use avatar_llm::LlmConfig;
use avatar_voice::{ElevenLabsConfig, PiperConfig, TranscoderConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language model provider.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Speech synthesis backend.
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,

    /// Audio conversion and lip-sync tools.
    #[serde(default)]
    pub transcoder: TranscoderConfig,

    /// Filesystem locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pipeline limits.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "avatar_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Which speech synthesizer to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesizerBackend {
    /// ElevenLabs REST API (requires an API key).
    #[default]
    Elevenlabs,
    /// Local Piper binary.
    Piper,
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default)]
    pub backend: SynthesizerBackend,
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    #[serde(default)]
    pub piper: PiperConfig,
}

/// Filesystem locations used by the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root for per-request synthesis artifacts.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Directory holding the pre-recorded fallback clips.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
}

/// Limits applied to each chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound for one `/chat` request end to end, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_work_dir() -> String {
    "audios/generated".to_string()
}

fn default_assets_dir() -> String {
    "audios".to_string()
}

fn default_request_timeout_secs() -> u64 {
    180
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            assets_dir: default_assets_dir(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Returns `true` when every upstream credential the pipeline needs is set.
    ///
    /// The language model always needs a key; the synthesizer only when the
    /// ElevenLabs backend is selected.
    pub fn credentials_configured(&self) -> bool {
        let synthesizer_ready = match self.synthesizer.backend {
            SynthesizerBackend::Elevenlabs => self.synthesizer.elevenlabs.api_key().is_some(),
            SynthesizerBackend::Piper => true,
        };
        self.llm.api_key().is_some() && synthesizer_ready
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `AVATAR_HOST` overrides `server.host`
/// - `AVATAR_PORT` overrides `server.port`
/// - `AVATAR_LOG_LEVEL` overrides `logging.level`
/// - `AVATAR_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `OPENAI_API_KEY` sets `llm.api_key`
/// - `ELEVEN_LABS_API_KEY` sets `synthesizer.elevenlabs.api_key`
/// - `AVATAR_WORK_DIR` overrides `storage.work_dir`
/// - `AVATAR_ASSETS_DIR` overrides `storage.assets_dir`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading overrides through `env`.
pub fn load_config_with(
    path: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    if let Some(host) = env("AVATAR_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = env("AVATAR_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = env("AVATAR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = env("AVATAR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = env("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(key) = env("ELEVEN_LABS_API_KEY") {
        config.synthesizer.elevenlabs.api_key = Some(key);
    }
    if let Some(dir) = env("AVATAR_WORK_DIR") {
        config.storage.work_dir = dir;
    }
    if let Some(dir) = env("AVATAR_ASSETS_DIR") {
        config.storage.assets_dir = dir;
    }

    Ok(config)
}
