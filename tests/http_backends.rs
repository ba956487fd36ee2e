//! Tests for the HTTP completion and retrieval backends against a mock server

use helpdesk::config::{OllamaConfig, OpenAiConfig};
use helpdesk::providers::{Message, OllamaProvider, OpenAiProvider, Provider};
use helpdesk::retrieval::{ContextRetriever, HttpRetriever};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_ollama_chat_request_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"model": "gemma2:9b", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "Generic"},
            "prompt_eval_count": 12,
            "eval_count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(OllamaConfig {
        host: server.uri(),
        model: "gemma2:9b".to_string(),
    })
    .unwrap();

    let response = provider.complete(&[Message::user("hello")]).await.unwrap();
    assert_eq!(response.message.content, "Generic");
    assert_eq!(response.usage.unwrap().total_tokens, 13);
}

#[tokio::test]
async fn test_ollama_error_status_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(OllamaConfig {
        host: server.uri(),
        model: "gemma2:9b".to_string(),
    })
    .unwrap();

    let err = provider.complete(&[Message::user("hi")]).await.unwrap_err();
    assert!(err.to_string().contains("model not loaded"));
}

#[tokio::test]
async fn test_openai_sends_bearer_key_and_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "gemma2-9b-it", "max_tokens": 1024})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Create_Ticket"}}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 3, "total_tokens": 43}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = OpenAiConfig {
        api_base: format!("{}/", server.uri()),
        ..OpenAiConfig::default()
    };
    let provider = OpenAiProvider::with_api_key(config, "test-key").unwrap();

    let response = provider
        .complete(&[Message::system("classify"), Message::user("help")])
        .await
        .unwrap();
    assert_eq!(response.message.content, "Create_Ticket");
    assert_eq!(response.usage.unwrap().prompt_tokens, 40);
}

#[tokio::test]
async fn test_openai_empty_choices_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let config = OpenAiConfig {
        api_base: server.uri(),
        ..OpenAiConfig::default()
    };
    let provider = OpenAiProvider::with_api_key(config, "k").unwrap();
    let err = provider.complete(&[Message::user("x")]).await.unwrap_err();
    assert!(err.to_string().contains("no choices"));
}

#[tokio::test]
async fn test_http_retriever_ranks_and_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"query": "vpn", "top_k": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "passages": [
                {"text": "low", "score": 0.1},
                {"text": "high", "score": 0.9},
                {"text": "mid", "score": 0.5}
            ]
        })))
        .mount(&server)
        .await;

    let retriever = HttpRetriever::new(format!("{}/search", server.uri())).unwrap();
    let passages = retriever.retrieve("vpn", 2).await.unwrap();
    let texts: Vec<_> = passages.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["high", "mid"]);
}

#[tokio::test]
async fn test_http_retriever_error_status_is_retrieval_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let retriever = HttpRetriever::new(server.uri()).unwrap();
    let err = retriever.retrieve("q", 2).await.unwrap_err();
    assert!(err.to_string().contains("Retrieval error"));
}
