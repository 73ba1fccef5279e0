//! Avatar server library logic.
//!
//! Wires the language model, speech synthesizer and audio tools into a
//! [`service::ResponseService`] and exposes it over HTTP.

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod segments;
pub mod service;

use assets::FallbackLibrary;
use avatar_llm::{LlmError, OpenAiClient, UtterancePlanner};
use avatar_voice::{
    ElevenLabsSynthesizer, FfmpegConverter, PiperSynthesizer, RhubarbExtractor,
    SpeechSynthesizer, VoiceError,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Router,
};
use config::{Config, SynthesizerBackend};
use segments::SegmentBuilder;
use service::ResponseService;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum accepted request body size (1 MiB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Answers chat messages.
    pub responder: Arc<ResponseService>,
    /// Backend behind `/voices`, if one is configured.
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize synthesizer: {0}")]
    Synthesizer(#[from] VoiceError),
    #[error("failed to initialize language model client: {0}")]
    LanguageModel(#[from] LlmError),
}

/// Builds the synthesizer selected by the configuration.
///
/// Returns `None` when the ElevenLabs backend is selected without a key.
fn build_synthesizer(config: &Config) -> Result<Option<Arc<dyn SpeechSynthesizer>>, VoiceError> {
    let synthesizer: Arc<dyn SpeechSynthesizer> = match config.synthesizer.backend {
        SynthesizerBackend::Elevenlabs => {
            if config.synthesizer.elevenlabs.api_key().is_none() {
                return Ok(None);
            }
            Arc::new(ElevenLabsSynthesizer::new(
                config.synthesizer.elevenlabs.clone(),
            )?)
        }
        SynthesizerBackend::Piper => {
            Arc::new(PiperSynthesizer::from_config(&config.synthesizer.piper))
        }
    };
    Ok(Some(synthesizer))
}

/// Builds the application state from configuration.
///
/// Without complete credentials the server still starts, but every chat
/// message is answered with the fallback reply.
///
/// # Errors
///
/// Returns [`StartupError`] if a configured client cannot be constructed.
pub fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let fallback = FallbackLibrary::new(&config.storage.assets_dir);
    let timeout = config.pipeline.request_timeout();
    let synthesizer = build_synthesizer(config)?;

    let model = if config.credentials_configured() {
        OpenAiClient::from_config(&config.llm).transpose()?
    } else {
        None
    };

    let responder = match (model, &synthesizer) {
        (Some(model), Some(synthesizer)) => {
            let builder = SegmentBuilder::new(
                synthesizer.clone(),
                Arc::new(FfmpegConverter::from_config(&config.transcoder)),
                Arc::new(RhubarbExtractor::from_config(&config.transcoder)),
                &config.storage.work_dir,
            );
            tracing::info!(
                backend = ?config.synthesizer.backend,
                model = %config.llm.model,
                work_dir = %config.storage.work_dir,
                "response pipeline ready"
            );
            ResponseService::new(
                UtterancePlanner::new(Arc::new(model), config.llm.clone()),
                Some(builder),
                fallback,
                timeout,
            )
        }
        _ => {
            tracing::warn!(
                backend = ?config.synthesizer.backend,
                "credentials not configured, every chat message gets the fallback reply"
            );
            ResponseService::fallback_only(config.llm.clone(), fallback, timeout)
        }
    };

    Ok(AppState {
        responder: Arc::new(responder),
        synthesizer,
    })
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root_handler))
        .route("/health", get(api::health_handler))
        .route("/voices", get(api::voices_handler))
        .route("/chat", post(api::chat_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
