use avatar_llm::{CompletionRequest, LanguageModel, LlmConfig, LlmError, OpenAiClient};
use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;

async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return Err((StatusCode::UNAUTHORIZED, "invalid api key".to_string()));
    }

    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let reply = match user {
        "empty" => json!({"id": "chatcmpl-1", "choices": []}),
        "null-content" => json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]}),
        "empty-string" => json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": ""}}]}),
        "blank-string" => json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": " \n "}}]}),
        "garbage" => return Ok(Json(json!("not an envelope"))),
        _ => json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": format!(
                        "model={} temp={} max={} system={} user={}",
                        body["model"].as_str().unwrap_or_default(),
                        body["temperature"],
                        body["max_tokens"],
                        body["messages"][0]["role"].as_str().unwrap_or_default(),
                        user
                    )
                }
            }]
        }),
    };
    Ok(Json(reply))
}

async fn start_mock_openai() -> SocketAddr {
    let app = Router::new().route("/v1/chat/completions", post(chat_completions));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind listener");
    let addr = listener.local_addr().expect("failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    addr
}

fn request(user: &str) -> CompletionRequest {
    CompletionRequest {
        model: "gpt-3.5-turbo".to_string(),
        temperature: 0.5,
        max_tokens: 1000,
        system: "You are a virtual assistant.".to_string(),
        user: user.to_string(),
    }
}

fn client_for(addr: SocketAddr, key: &str) -> OpenAiClient {
    OpenAiClient::new(format!("http://{}/", addr), key, &LlmConfig::default())
        .expect("client should build")
}

#[tokio::test]
async fn test_completion_returns_first_choice_content() {
    let addr = start_mock_openai().await;
    let content = client_for(addr, "sk-test")
        .complete(&request("Hello"))
        .await
        .unwrap();

    assert_eq!(
        content,
        "model=gpt-3.5-turbo temp=0.5 max=1000 system=system user=Hello"
    );
}

#[tokio::test]
async fn test_rejected_key_is_status_error() {
    let addr = start_mock_openai().await;
    let result = client_for(addr, "sk-wrong").complete(&request("Hello")).await;

    match result {
        Err(LlmError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_content_is_empty_response() {
    let addr = start_mock_openai().await;
    let client = client_for(addr, "sk-test");

    assert!(matches!(
        client.complete(&request("empty")).await,
        Err(LlmError::EmptyResponse)
    ));
    assert!(matches!(
        client.complete(&request("null-content")).await,
        Err(LlmError::EmptyResponse)
    ));
    assert!(matches!(
        client.complete(&request("empty-string")).await,
        Err(LlmError::EmptyResponse)
    ));
    assert!(matches!(
        client.complete(&request("blank-string")).await,
        Err(LlmError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_undecodable_envelope_is_decode_error() {
    let addr = start_mock_openai().await;
    let result = client_for(addr, "sk-test").complete(&request("garbage")).await;
    assert!(matches!(result, Err(LlmError::Decode(_))));
}

#[tokio::test]
async fn test_unreachable_provider_is_request_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client_for(addr, "sk-test").complete(&request("Hello")).await;
    assert!(matches!(result, Err(LlmError::Request(_))));
}

#[test]
fn test_from_config_requires_key() {
    assert!(OpenAiClient::from_config(&LlmConfig::default()).is_none());

    let blank = LlmConfig {
        api_key: Some("  ".to_string()),
        ..LlmConfig::default()
    };
    assert!(OpenAiClient::from_config(&blank).is_none());

    let configured = LlmConfig {
        api_key: Some("sk-test".to_string()),
        ..LlmConfig::default()
    };
    assert!(matches!(OpenAiClient::from_config(&configured), Some(Ok(_))));
}

#[test]
fn test_config_debug_redacts_key() {
    let config = LlmConfig {
        api_key: Some("sk-very-secret".to_string()),
        ..LlmConfig::default()
    };
    let debug = format!("{:?}", config);
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("[REDACTED]"));
}
