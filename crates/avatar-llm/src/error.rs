//! Error types for language-model calls.

/// Errors raised when the language-model call itself cannot complete.
///
/// A reply that arrives but cannot be parsed is not an error; see
/// [`crate::ModelReply::Degraded`].
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP client could not be built from the configuration.
    #[error("invalid language model configuration: {0}")]
    Config(String),

    /// The request never produced a response (connection, TLS, timeout).
    #[error("language model request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider's response envelope could not be decoded.
    #[error("failed to decode language model response: {0}")]
    Decode(String),

    /// The envelope decoded but carried no message content.
    #[error("language model returned no content")]
    EmptyResponse,
}
