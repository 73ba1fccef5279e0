use async_trait::async_trait;
use avatar_llm::{
    CompletionRequest, FallbackReason, LanguageModel, LlmConfig, LlmError, ModelReply, Plan,
    UtterancePlanner,
};
use avatar_types::{AnimationCue, FacialExpression};
use std::sync::{Arc, Mutex};

/// Returns a canned reply and records every request it receives.
struct ScriptedModel {
    reply: Result<String, u16>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Status {
                status: *status,
                body: "upstream unavailable".to_string(),
            }),
        }
    }
}

fn planner_with(model: Arc<ScriptedModel>) -> UtterancePlanner {
    UtterancePlanner::new(model, LlmConfig::default())
}

#[tokio::test]
async fn test_empty_and_whitespace_messages_fall_back_without_calling_model() {
    let model = ScriptedModel::replying("unused");
    let planner = planner_with(model.clone());

    for input in [None, Some(""), Some("   "), Some("\n\t")] {
        let plan = planner.plan(input).await.unwrap();
        assert_eq!(plan, Plan::Fallback(FallbackReason::EmptyMessage), "input {:?}", input);
    }
    assert_eq!(model.request_count(), 0);
}

#[tokio::test]
async fn test_planner_without_model_falls_back_for_any_text() {
    let planner = UtterancePlanner::without_model(LlmConfig::default());
    assert!(!planner.has_model());

    let plan = planner.plan(Some("Tell me a joke")).await.unwrap();
    assert_eq!(plan, Plan::Fallback(FallbackReason::MissingCredentials));

    // An empty message is still reported as empty, even without credentials.
    let plan = planner.plan(Some("")).await.unwrap();
    assert_eq!(plan, Plan::Fallback(FallbackReason::EmptyMessage));
}

#[tokio::test]
async fn test_request_carries_settings_and_user_text() {
    let model = ScriptedModel::replying("just chatting");
    let config = LlmConfig {
        model: "gpt-4o-mini".to_string(),
        temperature: 0.2,
        max_tokens: 256,
        ..LlmConfig::default()
    };
    let planner = UtterancePlanner::new(model.clone(), config);

    planner.plan(Some("What's up?")).await.unwrap();

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "gpt-4o-mini");
    assert_eq!(request.temperature, 0.2);
    assert_eq!(request.max_tokens, 256);
    assert_eq!(request.user, "What's up?");
    assert!(request.system.contains("\"messages\""));
    assert!(request.system.contains("maximum of 3 messages"));
    assert!(request.system.contains("funnyFace"));
    assert!(request.system.contains("Terrified"));
}

#[tokio::test]
async fn test_well_formed_reply_is_planned_in_order() {
    let model = ScriptedModel::replying(
        r#"{"messages":[
            {"text":"Hi","facialExpression":"smile","animation":"Talking_0"},
            {"text":"Nice to see you","facialExpression":"surprised","animation":"Laughing"}
        ]}"#,
    );
    let plan = planner_with(model).plan(Some("Hello")).await.unwrap();

    let Plan::Reply(reply) = plan else {
        panic!("expected a model reply, got {:?}", plan);
    };
    let utterances = reply.into_utterances();
    assert_eq!(utterances.len(), 2);
    assert_eq!(utterances[0].text, "Hi");
    assert_eq!(utterances[0].facial_expression, FacialExpression::Smile);
    assert_eq!(utterances[0].animation, AnimationCue::Talking0);
    assert_eq!(utterances[1].text, "Nice to see you");
    assert_eq!(utterances[1].animation, AnimationCue::Laughing);
}

#[tokio::test]
async fn test_free_text_reply_is_degraded_not_an_error() {
    let model = ScriptedModel::replying("just chatting");
    let plan = planner_with(model).plan(Some("Hello")).await.unwrap();

    assert_eq!(
        plan,
        Plan::Reply(ModelReply::Degraded("just chatting".to_string()))
    );
}

#[tokio::test]
async fn test_model_failure_is_upstream_error() {
    let model = ScriptedModel::failing(503);
    let result = planner_with(model).plan(Some("Hello")).await;

    match result {
        Err(LlmError::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("Expected upstream status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_reply_is_empty_response() {
    for reply in ["", "  \n\t"] {
        let result = planner_with(ScriptedModel::replying(reply)).plan(Some("Hello")).await;
        assert!(
            matches!(result, Err(LlmError::EmptyResponse)),
            "reply {:?} gave {:?}",
            reply,
            result
        );
    }
}
