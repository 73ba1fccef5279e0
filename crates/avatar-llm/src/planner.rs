//! Utterance planning: user text in, ordered utterances out.
//!
//! The planner asks the language model for a JSON reply and classifies what
//! comes back. A reply matching the expected schema becomes
//! [`ModelReply::Parsed`]; anything else is spoken verbatim as a single
//! neutral utterance ([`ModelReply::Degraded`]). Only a failed model call is
//! an error.

use crate::client::{CompletionRequest, LanguageModel};
use crate::config::LlmConfig;
use crate::error::LlmError;
use avatar_types::Utterance;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Upper bound on utterances taken from one model reply.
pub const MAX_UTTERANCES: usize = 3;

/// System instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "\
You are a virtual assistant.
You will always reply with a JSON object with a \"messages\" array. With a maximum of 3 messages.
Each message has a text, facialExpression, and animation property.
The different facial expressions are: smile, sad, angry, surprised, funnyFace, and default.
The different animations are: Talking_0, Talking_1, Talking_2, Crying, Laughing, Rumba, Idle, Terrified, and Angry.
Reply with the JSON object only.";

/// Why the fixed fallback reply was chosen instead of asking the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The user message was absent, empty or whitespace.
    EmptyMessage,
    /// Model or synthesizer credentials are not configured.
    MissingCredentials,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyMessage => "empty_message",
            Self::MissingCredentials => "missing_credentials",
        }
    }
}

/// A model reply after schema classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The reply matched `{"messages": [Utterance, ...]}`.
    Parsed(Vec<Utterance>),
    /// The reply did not match; holds the raw text.
    Degraded(String),
}

#[derive(Debug, Deserialize)]
struct ReplySchema {
    messages: Vec<Utterance>,
}

/// Strips a surrounding Markdown code fence (```` ```json ... ``` ````), if any.
///
/// Any info string on the opening line (`json`, `JSON`, `json5`, ...) is
/// dropped with it.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.split_once('\n') {
        Some((info, body)) if is_info_string(info) => body,
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn is_info_string(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

impl ModelReply {
    /// Classifies raw model output against the reply schema.
    pub fn classify(raw: &str) -> Self {
        match serde_json::from_str::<ReplySchema>(strip_code_fence(raw)) {
            Ok(reply) => Self::Parsed(reply.messages),
            Err(_) => Self::Degraded(raw.to_string()),
        }
    }

    /// Returns `true` for the degrade path.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Converts the reply into the utterances to synthesize.
    ///
    /// Parsed replies are capped at [`MAX_UTTERANCES`]; a degraded reply is
    /// one plain utterance carrying the whole raw text.
    pub fn into_utterances(self) -> Vec<Utterance> {
        match self {
            Self::Parsed(mut utterances) => {
                if utterances.len() > MAX_UTTERANCES {
                    warn!(
                        received = utterances.len(),
                        kept = MAX_UTTERANCES,
                        "model returned too many utterances, truncating"
                    );
                    utterances.truncate(MAX_UTTERANCES);
                }
                for (index, utterance) in utterances.iter().enumerate() {
                    if !utterance.facial_expression.is_known() || !utterance.animation.is_known() {
                        warn!(
                            index,
                            facial_expression = %utterance.facial_expression,
                            animation = %utterance.animation,
                            "model used a value outside the known set, passing through"
                        );
                    }
                }
                utterances
            }
            Self::Degraded(raw) => vec![Utterance::plain(raw)],
        }
    }
}

/// Outcome of planning one user message.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Serve the pre-recorded fallback reply.
    Fallback(FallbackReason),
    /// Synthesize the model's reply.
    Reply(ModelReply),
}

/// Plans the spoken reply to a user message.
#[derive(Clone)]
pub struct UtterancePlanner {
    model: Option<Arc<dyn LanguageModel>>,
    config: LlmConfig,
}

impl UtterancePlanner {
    pub fn new(model: Arc<dyn LanguageModel>, config: LlmConfig) -> Self {
        Self {
            model: Some(model),
            config,
        }
    }

    /// A planner without a model; every message gets the fallback reply.
    pub fn without_model(config: LlmConfig) -> Self {
        Self {
            model: None,
            config,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    fn request_for(&self, user_text: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            system: SYSTEM_PROMPT.to_string(),
            user: user_text.to_string(),
        }
    }

    /// Plans the reply for `user_text`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] only when the model call fails. Malformed replies
    /// are degraded, not errors.
    pub async fn plan(&self, user_text: Option<&str>) -> Result<Plan, LlmError> {
        let Some(text) = user_text.filter(|t| !t.trim().is_empty()) else {
            return Ok(Plan::Fallback(FallbackReason::EmptyMessage));
        };
        let Some(model) = &self.model else {
            return Ok(Plan::Fallback(FallbackReason::MissingCredentials));
        };

        let raw = model.complete(&self.request_for(text)).await?;
        if raw.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        let reply = ModelReply::classify(&raw);
        match &reply {
            ModelReply::Parsed(utterances) if utterances.is_empty() => {
                warn!("model reply parsed with no messages, nothing to speak");
            }
            ModelReply::Parsed(utterances) => {
                info!(count = utterances.len(), "model reply parsed");
            }
            ModelReply::Degraded(raw) => {
                warn!(
                    chars = raw.len(),
                    "model reply did not match the schema, speaking it as plain text"
                );
            }
        }
        Ok(Plan::Reply(reply))
    }
}
