//! Language-model access and utterance planning.
//!
//! [`OpenAiClient`] talks to any OpenAI-compatible chat-completions endpoint
//! behind the [`LanguageModel`] trait. [`UtterancePlanner`] turns a user
//! message into a [`Plan`]: either the fixed fallback reply or the model's
//! reply classified as parsed or degraded.

pub mod client;
pub mod config;
pub mod error;
pub mod planner;

pub use client::{CompletionRequest, LanguageModel, OpenAiClient};
pub use config::LlmConfig;
pub use error::LlmError;
pub use planner::{FallbackReason, ModelReply, Plan, UtterancePlanner, MAX_UTTERANCES};
