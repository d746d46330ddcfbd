use super::*;
use crate::config::{ProviderConfig, TAILWIND_CDN};
use crate::types::CompiledPrompt;

fn prompt(text: &str) -> CompiledPrompt {
    CompiledPrompt::new(text.to_string())
}

fn closed_port_config() -> ProviderConfig {
    // Bind then drop so the port is known to refuse connections.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    ProviderConfig {
        api_url: format!("http://127.0.0.1:{}/v1/chat/completions", port),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        timeout_seconds: 2,
        ..ProviderConfig::default()
    }
}

#[test]
fn request_carries_directive_and_build_turn() {
    let client = ProviderClient::new(closed_port_config()).unwrap();
    let body = client.build_request(&prompt("A bakery landing page"), "landing", "dark");

    assert_eq!(body.model, "test-model");
    assert_eq!(body.temperature, Some(0.7));
    assert_eq!(body.max_tokens, Some(3000));
    assert_eq!(body.messages.len(), 2);
    assert_eq!(body.messages[0].role, "system");
    assert!(body.messages[0].content.contains("\"A bakery landing page\""));
    assert!(body.messages[0].content.contains("Design Theme: dark"));
    assert!(body.messages[0].content.contains("Page Category: landing"));
    assert!(body.messages[0].content.contains("Tailwind CSS"));
    assert_eq!(body.messages[1], Message::user(directive::BUILD_INSTRUCTION));
}

#[test]
fn request_serializes_to_chat_payload() {
    let client = ProviderClient::new(closed_port_config()).unwrap();
    let body = client.build_request(&prompt("x"), "other", "modern");
    let json = serde_json::to_value(&body).unwrap();

    assert_eq!(json["model"], "test-model");
    assert_eq!(json["max_tokens"], 3000);
    assert_eq!(json["messages"][1]["role"], "user");
}

#[test]
fn response_without_content_has_no_first_content() {
    let parsed: LLMResponse =
        serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
    assert_eq!(parsed.first_content(), None);

    let empty: LLMResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
    assert!(empty.choices.is_empty());
}

#[test]
fn status_codes_map_to_provider_errors() {
    assert_eq!(ProviderError::from_status(401, String::new()), ProviderError::Unauthorized);
    assert_eq!(ProviderError::from_status(429, String::new()), ProviderError::RateLimited);
    assert!(matches!(
        ProviderError::from_status(503, "down".to_string()),
        ProviderError::Server { status: 503, .. }
    ));
    assert!(matches!(
        ProviderError::from_status(404, String::new()),
        ProviderError::Status { status: 404, .. }
    ));
}

#[test]
fn fallback_document_escapes_prompt() {
    let doc = fallback_document(&prompt("<img src=x onerror=alert(1)> & more"), TAILWIND_CDN);
    let html = doc.as_str();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Service Temporarily Unavailable"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt; &amp; more"));
    assert!(!html.contains("<img"));
    assert_eq!(html.matches("https://cdn.tailwindcss.com").count(), 1);
}

#[test]
fn fallback_document_uses_given_framework() {
    let doc = fallback_document(&prompt("hello"), "https://static.example.com/ui.js?v=\"2\"");
    let html = doc.as_str();

    assert!(html.contains(r#"<script src="https://static.example.com/ui.js?v=&quot;2&quot;"></script>"#));
    assert!(!html.contains(TAILWIND_CDN));
}

#[test]
fn generation_exposes_artifact() {
    let generation = Generation::fallback(&prompt("hello"), TAILWIND_CDN, ProviderError::Timeout);
    assert!(generation.is_fallback());
    assert!(generation.artifact().as_str().contains("hello"));

    let completed = Generation::Completed(RawArtifact::new("<p>hi</p>"));
    assert!(!completed.is_fallback());
    assert_eq!(completed.artifact().as_str(), "<p>hi</p>");
}

#[tokio::test]
async fn unreachable_provider_degrades_to_fallback() {
    let client = ProviderClient::new(closed_port_config())
        .unwrap()
        .with_framework_url("https://static.example.com/ui.js");
    let generation = client
        .generate(&prompt("A page for my cat"), "other", "modern")
        .await;

    match generation {
        Generation::Fallback { artifact, cause } => {
            assert!(artifact.as_str().contains("A page for my cat"));
            assert!(artifact.as_str().contains("https://static.example.com/ui.js"));
            assert!(!artifact.as_str().contains(TAILWIND_CDN));
            assert!(matches!(
                cause,
                ProviderError::Connect(_) | ProviderError::Network(_)
            ));
        }
        other => panic!("expected fallback, got {:?}", other),
    }
}
