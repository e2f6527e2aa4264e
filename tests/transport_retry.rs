//! Deadline and retry behavior of the request-execution core.

mod integration;

use ai_voice_rust::transport::RequestDescriptor;
use ai_voice_rust::{Error, TranslationRequest, VoiceClient};
use integration::mock_server::{unreachable_url, MockServerFixture, Reply, ScriptedServer};
use mockito::Matcher;
use std::time::{Duration, Instant};

const OK_TRANSLATION: &str = r#"{"translated_text":"Bonjou monn","source_language":"en","target_language":"ht","confidence":0.95}"#;

fn request() -> TranslationRequest {
    TranslationRequest::new("Hello world", "en", "ht")
}

fn scripted_client(base_url: &str, retries: u32, delay: Duration) -> VoiceClient {
    VoiceClient::builder()
        .translation_url(base_url)
        .retries(retries)
        .retry_delay(delay)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_succeeds_after_transient_failures() {
    let server = ScriptedServer::start(vec![
        Reply::Status(500, r#"{"error":"warming up"}"#),
        Reply::Status(503, ""),
        Reply::Status(200, OK_TRANSLATION),
    ])
    .await;
    let client = scripted_client(&server.base_url, 3, Duration::from_millis(20));

    let result = client.translate(&request()).await.unwrap();
    assert_eq!(result.translated_text, "Bonjou monn");
    assert_eq!(server.hit_count(), 3);
}

#[tokio::test]
async fn test_stats_report_attempts() {
    let server = ScriptedServer::start(vec![
        Reply::Status(502, ""),
        Reply::Status(200, OK_TRANSLATION),
    ])
    .await;
    let client = scripted_client(&server.base_url, 1, Duration::from_millis(10));

    let descriptor = RequestDescriptor::post_json(
        format!("{}/translate", server.base_url),
        serde_json::json!({"text": "Hello"}),
    )
    .with_retries(1);
    let raw = client.transport().invoke_raw(&descriptor).await.unwrap();
    assert_eq!(raw.stats.attempts, 2);
    assert_eq!(raw.content_type.as_deref(), Some("application/json"));
    assert!(!raw.stats.request_id.is_empty());
}

#[tokio::test]
async fn test_fails_after_exhausting_budget() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/translate")
        .with_status(500)
        .with_body(r#"{"error":{"message":"translator crashed"}}"#)
        .expect(3)
        .create_async()
        .await;
    let client = fixture.client_builder().retries(2).build().unwrap();

    let err = client.translate(&request()).await.unwrap_err();
    match err {
        Error::Service { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "translator crashed");
        }
        other => panic!("expected service error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retries_are_separated_by_backoff() {
    let server = ScriptedServer::start(vec![Reply::Status(500, "")]).await;
    let delay = Duration::from_millis(150);
    let client = scripted_client(&server.base_url, 2, delay);

    let err = client.translate(&request()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    let hits = server.hits();
    assert_eq!(hits.len(), 3);
    for pair in hits.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= delay);
    }
}

#[tokio::test]
async fn test_timeout_surfaces_after_retries() {
    let server = ScriptedServer::start(vec![Reply::Hang]).await;
    let deadline = Duration::from_millis(200);
    let client = VoiceClient::builder()
        .translation_url(&server.base_url)
        .timeout(deadline)
        .retries(1)
        .retry_delay(Duration::from_millis(50))
        .build()
        .unwrap();

    let start = Instant::now();
    let err = client.translate(&request()).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(matches!(err, Error::Timeout { timeout_ms: 200, .. }));
    assert!(start.elapsed() >= deadline * 2);

    // The second attempt starts only after the first deadline fired.
    let hits = server.hits();
    assert_eq!(hits.len(), 2);
    assert!(hits[1].duration_since(hits[0]) >= deadline);
}

#[tokio::test]
async fn test_timeout_then_success() {
    let server = ScriptedServer::start(vec![Reply::Hang, Reply::Status(200, OK_TRANSLATION)]).await;
    let client = VoiceClient::builder()
        .translation_url(&server.base_url)
        .timeout(Duration::from_millis(200))
        .retries(1)
        .retry_delay(Duration::from_millis(10))
        .build()
        .unwrap();

    let result = client.translate(&request()).await.unwrap();
    assert_eq!(result.target_language, "ht");
    assert_eq!(server.hit_count(), 2);
}

#[tokio::test]
async fn test_decode_failure_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/translate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"unexpected":true}"#)
        .expect(1)
        .create_async()
        .await;
    let client = fixture.client_builder().retries(3).build().unwrap();

    let err = client.translate(&request()).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }), "got {err:?}");
    assert_eq!(err.context().and_then(|c| c.attempts), Some(1));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = VoiceClient::builder()
        .translation_url(unreachable_url())
        .retries(1)
        .retry_delay(Duration::from_millis(10))
        .build()
        .unwrap();

    let err = tokio_test::assert_err!(client.translate(&request()).await);
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_client_errors_terminal_when_configured() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/translate")
        .with_status(400)
        .with_body(r#"{"detail":"unsupported language pair"}"#)
        .expect(1)
        .create_async()
        .await;
    let client = fixture
        .client_builder()
        .retries(3)
        .retry_client_errors(false)
        .build()
        .unwrap();

    let err = client.translate(&request()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("unsupported language pair"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_errors_retried_by_default() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/translate")
        .with_status(404)
        .expect(2)
        .create_async()
        .await;
    let client = fixture.client_builder().retries(1).build().unwrap();

    let err = client.translate(&request()).await.unwrap_err();
    match err {
        Error::Service { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "HTTP 404: Not Found");
        }
        other => panic!("expected service error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_request_headers() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/translate")
        .match_header("authorization", "Bearer secret-key")
        .match_header(
            "x-request-id",
            Matcher::Regex("^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-".to_string()),
        )
        .with_status(200)
        .with_body(OK_TRANSLATION)
        .create_async()
        .await;
    let client = fixture.client_builder().api_key("secret-key").build().unwrap();

    client.translate(&request()).await.unwrap();
    mock.assert_async().await;
}
