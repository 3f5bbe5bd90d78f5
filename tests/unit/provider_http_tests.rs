/*!
 * Tests for the remote providers against a local mock server
 *
 * Every provider must classify non-success statuses the same way and parse
 * its own success body into candidates.
 */

use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doclingo::errors::ProviderError;
use doclingo::providers::anthropic::Anthropic;
use doclingo::providers::gemini::Gemini;
use doclingo::providers::ollama::Ollama;
use doclingo::providers::openai::OpenAI;
use doclingo::providers::{CompletionProvider, CompletionRequest};

const MODEL: &str = "test-model";

/// Remote providers under test, with the path each one posts to
fn providers(server: &MockServer) -> Vec<(Arc<dyn CompletionProvider>, String)> {
    let uri = server.uri();
    let openai: Arc<dyn CompletionProvider> = Arc::new(OpenAI::new("key", format!("{}/v1", uri), MODEL, 5).unwrap());
    let anthropic: Arc<dyn CompletionProvider> = Arc::new(Anthropic::new("key", uri.clone(), MODEL, 5).unwrap());
    let gemini: Arc<dyn CompletionProvider> =
        Arc::new(Gemini::new("key", format!("{}/v1beta", uri), MODEL, 5).unwrap());
    let ollama: Arc<dyn CompletionProvider> = Arc::new(Ollama::new(&uri, MODEL, 5).unwrap());

    vec![
        (openai, "/v1/chat/completions".to_string()),
        (anthropic, "/v1/messages".to_string()),
        (gemini, format!("/v1beta/models/{}:generateContent", MODEL)),
        (ollama, "/api/chat".to_string()),
    ]
}

fn request() -> CompletionRequest {
    CompletionRequest::new("Translate from English to French.", "Welcome to our restaurant.")
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status).set_body_string("provider says no"))
        .mount(server)
        .await;
}

/// Test that 401/403 become authentication errors for every provider
#[tokio::test]
async fn test_complete_withUnauthorizedStatus_shouldBeAuthenticationError() {
    for status in [401, 403] {
        let server = MockServer::start().await;
        mount_status(&server, status).await;

        for (provider, _) in providers(&server) {
            let error = provider.complete(request()).await.unwrap_err();
            assert!(
                matches!(error, ProviderError::AuthenticationError(ref message) if message == "provider says no"),
                "{} with {} gave {:?}",
                provider.name(),
                status,
                error
            );
        }
    }
}

/// Test that 429 becomes a rate-limit error for every provider
#[tokio::test]
async fn test_complete_withTooManyRequests_shouldBeRateLimitExceeded() {
    let server = MockServer::start().await;
    mount_status(&server, 429).await;

    for (provider, _) in providers(&server) {
        let error = provider.complete(request()).await.unwrap_err();
        assert!(
            matches!(error, ProviderError::RateLimitExceeded(_)),
            "{} gave {:?}",
            provider.name(),
            error
        );
    }
}

/// Test that other statuses keep their code in an API error
#[tokio::test]
async fn test_complete_withServerError_shouldBeApiError() {
    let server = MockServer::start().await;
    mount_status(&server, 502).await;

    for (provider, _) in providers(&server) {
        let error = provider.complete(request()).await.unwrap_err();
        assert!(
            matches!(error, ProviderError::ApiError { status_code: 502, .. }),
            "{} gave {:?}",
            provider.name(),
            error
        );
    }
}

/// Test that an undecodable success body is a parse error
#[tokio::test]
async fn test_complete_withMalformedBody_shouldBeParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    for (provider, _) in providers(&server) {
        let error = provider.complete(request()).await.unwrap_err();
        assert!(
            matches!(error, ProviderError::ParseError(_)),
            "{} gave {:?}",
            provider.name(),
            error
        );
    }
}

/// Test that a closed port is a connection error
#[tokio::test]
async fn test_complete_withNoServer_shouldBeConnectionError() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let provider = OpenAI::new("key", format!("http://{}/v1", address), MODEL, 5).unwrap();

    assert!(matches!(
        provider.complete(request()).await,
        Err(ProviderError::ConnectionError(_))
    ));
}

/// Test that every provider posts to its endpoint and parses its answer
#[tokio::test]
async fn test_complete_withSuccessBody_shouldReturnFirstCandidate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Bienvenue"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "Bienvenue"}],
            "usage": {"input_tokens": 12, "output_tokens": 3}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .and(header("x-goog-api-key", "key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Bienvenue"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": MODEL,
            "message": {"role": "assistant", "content": "Bienvenue"},
            "done": true,
            "prompt_eval_count": 12,
            "eval_count": 3
        })))
        .mount(&server)
        .await;

    for (provider, endpoint) in providers(&server) {
        let response = provider
            .complete(request())
            .await
            .unwrap_or_else(|e| panic!("{} at {} failed: {}", provider.name(), endpoint, e));

        assert_eq!(response.first_text(), Some("Bienvenue"), "{}", provider.name());
        assert_eq!(response.prompt_tokens, Some(12), "{}", provider.name());
        assert_eq!(response.completion_tokens, Some(3), "{}", provider.name());
    }
}
