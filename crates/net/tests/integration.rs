//! Integration tests for net crate

use httpmock::prelude::*;
use modsync_errors::{Error, NetworkError};
use modsync_net::{fetch_bytes_with_progress, fetch_json, NetClient, NetConfig};
use serde::Deserialize;
use std::time::Duration;

fn fast_client(retry_count: u32) -> NetClient {
    NetClient::new(NetConfig {
        retry_count,
        retry_delay: Duration::from_millis(10),
        ..NetConfig::default()
    })
    .unwrap()
}

#[derive(Debug, Deserialize)]
struct IndexBody {
    content: Vec<String>,
    hash: String,
}

#[tokio::test]
async fn test_fetch_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/index");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"content": ["https://cdn.example.com/chunk-0"], "hash": "abc123"}"#);
    });

    let client = fast_client(5);
    let body: IndexBody = fetch_json(&client, &server.url("/index")).await.unwrap();

    mock.assert();
    assert_eq!(body.hash, "abc123");
    assert_eq!(body.content.len(), 1);
}

#[tokio::test]
async fn test_get_retries_server_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/flaky");
        then.status(503);
    });

    let client = fast_client(5);
    let err = fetch_json::<IndexBody>(&client, &server.url("/flaky"))
        .await
        .unwrap_err();

    // All five attempts were made before surfacing the failure
    mock.assert_hits(5);
    assert!(matches!(
        err,
        Error::Network(NetworkError::RetriesExhausted { attempts: 5, .. })
    ));
}

#[tokio::test]
async fn test_get_does_not_retry_client_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });

    let client = fast_client(5);
    let err = fetch_json::<IndexBody>(&client, &server.url("/missing"))
        .await
        .unwrap_err();

    mock.assert_hits(1);
    assert!(matches!(
        err,
        Error::Network(NetworkError::HttpError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_fetch_bytes_with_progress() {
    let server = MockServer::start();
    let content = vec![7u8; 4096];
    server.mock(|when, then| {
        when.method(GET).path("/artifact.zip");
        then.status(200)
            .header("content-length", content.len().to_string())
            .body(&content);
    });

    let client = fast_client(1);
    let mut last_percent = 0.0;
    let body = fetch_bytes_with_progress(&client, &server.url("/artifact.zip"), |progress| {
        let percent = progress.percent();
        assert!(percent >= last_percent);
        last_percent = percent;
    })
    .await
    .unwrap();

    assert_eq!(body, content);
    assert!((last_percent - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_download_fetch_is_single_attempt() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/broken.zip");
        then.status(500);
    });

    let client = fast_client(5);
    let err = fetch_bytes_with_progress(&client, &server.url("/broken.zip"), |_| {})
        .await
        .unwrap_err();

    // Artifact downloads surface errors immediately, no retry budget
    mock.assert_hits(1);
    assert!(matches!(
        err,
        Error::Network(NetworkError::HttpError { status: 500, .. })
    ));
}
