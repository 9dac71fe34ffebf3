//! Integration tests for the async client
//!
//! These run every operation against wiremock servers and verify request
//! construction, status classification, and body decoding end-to-end.

use driftline_client::{Client, ClientConfig, ClientError, QueryParams, RequestParams, RetryPolicy};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a client pointed at the mock server, with retries off so failure
/// tests return immediately.
fn test_client(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .retry(RetryPolicy::disabled())
        .build()
        .expect("config should build");
    Client::with_config(config).expect("client should build")
}

#[tokio::test]
async fn test_scrape_round_trips_json_body() {
    let server = MockServer::start().await;
    let body = json!({"url": "https://example.com", "content": "<html></html>"});

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"url": "https://example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .scrape_url("https://example.com", None, "application/json")
        .await
        .expect("scrape should succeed");

    assert_eq!(result, body);
}

#[tokio::test]
async fn test_scrape_forces_limit_one() {
    let server = MockServer::start().await;

    // The mock only matches a payload carrying limit=1; a payload that kept
    // the caller's limit of 50 would miss it and fail the call.
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({"limit": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let params = RequestParams {
        limit: Some(50),
        ..RequestParams::default()
    };
    let client = test_client(&server);
    let result = client
        .scrape_url("https://example.com", Some(&params), "application/json")
        .await
        .expect("scrape should succeed");

    assert_eq!(result, json!({"ok": true}));
}

#[tokio::test]
async fn test_crawl_passes_caller_params_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .and(body_partial_json(json!({
            "url": "https://example.com",
            "limit": 25,
            "depth": 3,
            "metadata": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let params = RequestParams {
        limit: Some(25),
        depth: Some(3),
        metadata: Some(true),
        ..RequestParams::default()
    };
    let client = test_client(&server);
    client
        .crawl_url("https://example.com", Some(&params), "application/json")
        .await
        .expect("crawl should succeed");
}

#[tokio::test]
async fn test_known_error_extracts_error_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(
            ResponseTemplate::new(402).set_body_json(json!({"error": "payment required"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let error = client
        .crawl_url("https://example.com", None, "application/json")
        .await
        .expect_err("402 should error");

    match error {
        ClientError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 402);
            assert_eq!(message, "payment required");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_known_error_with_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/links"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let error = client
        .links("https://example.com", None, "application/json")
        .await
        .expect_err("500 should error");

    match error {
        ClientError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_status_carries_code() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/screenshot"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let error = client
        .screenshot("https://example.com", None, "application/json")
        .await
        .expect_err("403 should error");

    match error {
        ClientError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_serializes_booleans_as_lowercase_strings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/data/pages"))
        .and(query_param("metadata", "true"))
        .and(query_param("cache", "false"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .expect(1)
        .mount(&server)
        .await;

    let params = RequestParams {
        metadata: Some(true),
        cache: Some(false),
        limit: Some(5),
        ..RequestParams::default()
    };
    let client = test_client(&server);
    client
        .data_get("pages", Some(&params))
        .await
        .expect("data_get should succeed");
}

#[tokio::test]
async fn test_credits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/data/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"credits": 1200})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.credits().await.expect("credits should succeed");
    assert_eq!(result, json!({"credits": 1200}));
}

#[tokio::test]
async fn test_search_injects_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/search"))
        .and(body_partial_json(json!({"search": "rust http clients"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .search("rust http clients", None, "application/json")
        .await
        .expect("search should succeed");
}

#[tokio::test]
async fn test_pipeline_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/pipeline/extract-contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"email": "a@b.c"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/pipeline/label"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"label": "docs"}])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let contacts = client
        .extract_contacts("https://example.com", None, "application/json")
        .await
        .expect("extract_contacts should succeed");
    assert_eq!(contacts, json!([{"email": "a@b.c"}]));

    let labels = client
        .label("https://example.com", None, "application/json")
        .await
        .expect("label should succeed");
    assert_eq!(labels, json!([{"label": "docs"}]));
}

#[tokio::test]
async fn test_delete_accepts_accepted_and_no_content() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/data/pages"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"deleted": 3})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/data/pages"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let accepted = client
        .data_delete("pages", None)
        .await
        .expect("202 should be success");
    assert_eq!(accepted, json!({"deleted": 3}));

    let no_content = client
        .data_delete("pages", None)
        .await
        .expect("204 should be success");
    assert_eq!(no_content, serde_json::Value::Null);
}

#[tokio::test]
async fn test_query_and_signed_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/data/query"))
        .and(query_param("domain", "example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": "x"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/data/sign-url"))
        .and(query_param("url", "https://example.com/a"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"signed": "https://dl/x?sig=y"})),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let document = client
        .query(&QueryParams {
            domain: Some("example.com".into()),
            ..QueryParams::default()
        })
        .await
        .expect("query should succeed");
    assert_eq!(document, json!({"content": "x"}));

    let signed = client
        .signed_url(&QueryParams {
            url: Some("https://example.com/a".into()),
            ..QueryParams::default()
        })
        .await
        .expect("signed_url should succeed");
    assert_eq!(signed, json!({"signed": "https://dl/x?sig=y"}));
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let server = MockServer::start().await;
    let payload: &[u8] = &[0x1f, 0x8b, 0x08, 0x00, 0x42];

    Mock::given(method("GET"))
        .and(path("/v1/data/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(payload)
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let bytes = client
        .download(&QueryParams {
            url: Some("https://example.com/a".into()),
            ..QueryParams::default()
        })
        .await
        .expect("download should succeed");
    assert_eq!(&bytes[..], payload);

    // Typical caller flow: persist the blob
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("page.bin");
    std::fs::write(&file, &bytes).expect("write");
    assert_eq!(std::fs::read(&file).expect("read"), payload);
}

#[tokio::test]
async fn test_missing_api_key_fails_before_any_request() {
    let server = MockServer::start().await;
    std::env::remove_var("DRIFTLINE_API_KEY");

    let result = ClientConfig::builder().base_url(server.uri()).build();
    assert!(matches!(result, Err(ClientError::MissingApiKey)));

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty(), "no network call should be attempted");
}

#[tokio::test]
async fn test_closed_client_refuses_operations() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    client.close();

    let error = client
        .crawl_url("https://example.com", None, "application/json")
        .await
        .expect_err("closed client should refuse");
    assert!(matches!(error, ClientError::Closed));

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_retry_recovers_from_transient_server_error() {
    let server = MockServer::start().await;

    // First attempt sees a 500, the retry sees a 200.
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(500).set_body_string("flaky"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/crawl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .retry(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
            retry_server_errors: true,
        })
        .build()
        .expect("config should build");
    let client = Client::with_config(config).expect("client should build");

    let result = client
        .crawl_url("https://example.com", None, "application/json")
        .await
        .expect("retry should recover");
    assert_eq!(result, json!({"ok": true}));

    let requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 2);
}
