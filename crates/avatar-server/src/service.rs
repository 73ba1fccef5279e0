//! Chat request orchestration.
//!
//! Ties planning, segment building and the fallback reply together and
//! applies the per-request timeout.

use crate::assets::FallbackLibrary;
use crate::error::PipelineError;
use crate::segments::SegmentBuilder;
use avatar_llm::{FallbackReason, LlmConfig, Plan, UtterancePlanner};
use avatar_types::ResponseBundle;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Answers one chat message with a bundle of speech segments.
pub struct ResponseService {
    planner: UtterancePlanner,
    builder: Option<SegmentBuilder>,
    fallback: FallbackLibrary,
    request_timeout: Duration,
}

impl ResponseService {
    pub fn new(
        planner: UtterancePlanner,
        builder: Option<SegmentBuilder>,
        fallback: FallbackLibrary,
        request_timeout: Duration,
    ) -> Self {
        Self {
            planner,
            builder,
            fallback,
            request_timeout,
        }
    }

    /// A service that only ever serves the fallback reply.
    pub fn fallback_only(
        llm: LlmConfig,
        fallback: FallbackLibrary,
        request_timeout: Duration,
    ) -> Self {
        Self::new(
            UtterancePlanner::without_model(llm),
            None,
            fallback,
            request_timeout,
        )
    }

    pub fn fallback(&self) -> &FallbackLibrary {
        &self.fallback
    }

    /// Handles one message end to end.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if any stage fails or the request exceeds the
    /// configured timeout. Artifacts of a failed request are removed.
    pub async fn handle(&self, message: Option<&str>) -> Result<ResponseBundle, PipelineError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("chat", %request_id);

        async move {
            let result = match tokio::time::timeout(
                self.request_timeout,
                self.respond(request_id, message),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    if let Some(builder) = &self.builder {
                        builder.discard(request_id).await;
                    }
                    Err(PipelineError::Timeout(self.request_timeout))
                }
            };

            match &result {
                Ok(bundle) => info!(segments = bundle.messages.len(), "chat request answered"),
                Err(e) => error!(kind = e.kind(), index = ?e.index(), "chat request failed: {}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn respond(
        &self,
        request_id: Uuid,
        message: Option<&str>,
    ) -> Result<ResponseBundle, PipelineError> {
        let reply = match self.planner.plan(message).await? {
            Plan::Fallback(reason) => {
                info!(reason = reason.as_str(), "serving fallback reply");
                return self.fallback.load().await;
            }
            Plan::Reply(reply) => reply,
        };

        let Some(builder) = &self.builder else {
            warn!(
                reason = FallbackReason::MissingCredentials.as_str(),
                "no synthesizer configured, serving fallback reply"
            );
            return self.fallback.load().await;
        };

        if reply.is_degraded() {
            info!("speaking unstructured model reply");
        }
        let segments = builder.build(request_id, reply.into_utterances()).await?;
        Ok(ResponseBundle::new(segments))
    }
}
