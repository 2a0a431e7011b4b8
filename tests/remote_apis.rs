//! Integration tests driving the real HTTP client against mocked remote APIs.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kb_ingest::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use kb_ingest::domain::error::DomainError;
use kb_ingest::domain::ingestion::{ExtractRequest, SourceExtractor};
use kb_ingest::domain::vector::{Namespace, VectorRecord, VectorStore};
use kb_ingest::infrastructure::embedding::OpenAiEmbeddingProvider;
use kb_ingest::infrastructure::extractors::{StaticHtmlExtractor, YoutubeExtractor};
use kb_ingest::infrastructure::http::HttpClient;
use kb_ingest::infrastructure::vector_store::RemoteVectorStore;

fn vector_records(n: usize) -> Vec<VectorRecord> {
    (0..n)
        .map(|i| {
            VectorRecord::new(format!("doc-1-chunk-{}", i), vec![0.5, -0.5])
                .with_metadata("document_id", json!("doc-1"))
        })
        .collect()
}

#[tokio::test]
async fn openai_provider_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "text-embedding-3-small",
            "data": [{"index": 0, "embedding": [0.25, 0.5, 0.75], "object": "embedding"}],
            "usage": {"prompt_tokens": 6, "total_tokens": 6}
        })))
        .mount(&server)
        .await;

    let provider =
        OpenAiEmbeddingProvider::with_base_url(HttpClient::new(), "test-key", server.uri());

    let response = provider
        .embed(EmbeddingRequest::new("text-embedding-3-small", "Hello"))
        .await
        .unwrap();

    assert_eq!(response.vector(), &[0.25, 0.5, 0.75]);
    assert_eq!(response.usage().unwrap().total_tokens(), 6);
}

#[tokio::test]
async fn openai_provider_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let provider =
        OpenAiEmbeddingProvider::with_base_url(HttpClient::new(), "test-key", server.uri());

    let result = provider
        .embed(EmbeddingRequest::new("text-embedding-3-small", "Hello"))
        .await;

    assert!(matches!(result, Err(DomainError::EmbeddingProvider { .. })));
}

#[tokio::test]
async fn vector_store_upserts_after_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"totalVectorCount": 10})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 2})))
        .expect(1)
        .mount(&server)
        .await;

    let store = RemoteVectorStore::new(HttpClient::new(), server.uri());
    let namespace = Namespace::for_user_kb("user-1", "kb-1");

    let summary = store.upsert(&namespace, vector_records(2)).await.unwrap();

    assert_eq!(summary.upserted_count, 2);
    assert!(!summary.degraded);
}

#[tokio::test]
async fn vector_store_degrades_when_index_is_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe_index_stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 3})))
        .expect(0)
        .mount(&server)
        .await;

    let store = RemoteVectorStore::new(HttpClient::new(), server.uri());
    let namespace = Namespace::for_user_kb("user-1", "kb-1");

    let summary = store.upsert(&namespace, vector_records(3)).await.unwrap();

    assert!(summary.degraded);
    assert_eq!(summary.upserted_count, 3);
}

#[tokio::test]
async fn static_extractor_scrapes_real_responses() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"
            <html>
            <head><title>Release Notes</title></head>
            <body>
                <h1>Version 2.0</h1>
                <p>This release introduces the long awaited ingestion pipeline.</p>
                <script>analytics.track('view');</script>
            </body>
            </html>
            "#,
        ))
        .mount(&server)
        .await;

    let extractor = StaticHtmlExtractor::new(HttpClient::new());
    let url = format!("{}/article", server.uri());

    let processed = extractor
        .extract(ExtractRequest::from_url(&url))
        .await
        .unwrap();

    assert_eq!(processed.title.as_deref(), Some("Release Notes"));
    assert!(processed.content.contains("ingestion pipeline"));
    assert!(!processed.content.contains("analytics"));
    assert_eq!(
        processed.metadata.get("extraction_method"),
        Some(&json!("static"))
    );
}

#[tokio::test]
async fn static_extractor_flags_spa_shells() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div id="root"></div><script type="module" src="/main.js"></script></body></html>"#,
        ))
        .mount(&server)
        .await;

    let extractor = StaticHtmlExtractor::new(HttpClient::new());
    let url = format!("{}/app", server.uri());

    let result = extractor.extract(ExtractRequest::from_url(&url)).await;

    assert!(matches!(result, Err(DomainError::SpaDetected { .. })));
}

#[tokio::test]
async fn youtube_extractor_maps_service_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/transcript"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transcript": "Welcome to the channel. Today we cover vector databases.",
            "title": "Vector DBs Explained",
            "author": "Tech Channel",
            "length_seconds": 640,
            "video_id": "abcdefghijk"
        })))
        .mount(&server)
        .await;

    let extractor = YoutubeExtractor::new(
        HttpClient::new(),
        format!("{}/api/transcript", server.uri()),
    );

    let processed = extractor
        .extract(ExtractRequest::from_url(
            "https://www.youtube.com/watch?v=abcdefghijk",
        ))
        .await
        .unwrap();

    assert_eq!(processed.title.as_deref(), Some("Vector DBs Explained"));
    assert_eq!(processed.metadata.get("video_id"), Some(&json!("abcdefghijk")));
    assert!(processed.content.contains("vector databases"));
}
