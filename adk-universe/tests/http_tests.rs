//! End-to-end tests of `UniverseStore` over the reqwest transport against a
//! mock universe server.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use adk_universe::{
    RagPlugin, RetryPolicy, UniverseConfig, UniverseError, UniverseStore, credential_name,
};
use httpmock::prelude::*;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const TOKEN: &str = "test_token";

async fn store_for(server_url: String, universe: &str) -> UniverseStore {
    let config = UniverseConfig::builder()
        .server_url(server_url.clone())
        .universe_name(universe)
        .build()
        .unwrap();
    let mut store = UniverseStore::new(config).unwrap();
    let credentials = HashMap::from([(credential_name(&server_url), TOKEN.to_string())]);
    store.init(&credentials, None).await.unwrap();
    store
}

#[tokio::test]
async fn add_file_emits_json_with_bearer_auth() {
    let server = MockServer::start_async().await;
    let emit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/emit")
                .header("authorization", "Bearer test_token")
                .header("content-type", "application/json")
                .json_body(json!({"universe": "myuni", "thing": {"id": "doc1", "text": "hello world"}}));
            then.status(200).json_body(json!({"ok": true}));
        })
        .await;

    let store = store_for(server.base_url(), "myuni").await;
    store.add_file("doc1", "hello world").await.unwrap();
    store.update_file("doc1", "hello world").await.unwrap();

    emit.assert_calls_async(2).await;
}

#[tokio::test]
async fn delete_file_not_found_is_an_api_error() {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/thing/myuni/x");
            then.status(404).json_body(json!({"error": "not found"}));
        })
        .await;

    let store = store_for(server.base_url(), "myuni").await;
    let err = store.delete_file("x").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("not found"));
    delete.assert_calls_async(1).await;
}

#[tokio::test]
async fn delete_all_files_keeps_server_path_prefix() {
    let server = MockServer::start_async().await;
    let delete_all = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/universe/docs")
                .header("authorization", "Bearer test_token");
            then.status(204);
        })
        .await;

    let store = store_for(server.url("/api/"), "docs").await;
    store.delete_all_files().await.unwrap();

    delete_all.assert_async().await;
}

#[tokio::test]
async fn description_field_is_used_when_error_is_absent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/emit");
            then.status(403).json_body(json!({"description": "token lacks write scope"}));
        })
        .await;

    let store = store_for(server.base_url(), "myuni").await;
    let err = store.add_file("doc1", "text").await.unwrap_err();

    match err {
        UniverseError::ApiError { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "token lacks write scope");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/universe/myuni");
            then.status(500).body("upstream exploded");
        })
        .await;

    let store = store_for(server.base_url(), "myuni").await;
    let err = store.delete_all_files().await.unwrap_err();

    assert!(matches!(
        err,
        UniverseError::ApiError { status: 500, ref message } if message == "500 Internal Server Error"
    ));
    failing.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let server_url = format!("http://127.0.0.1:{port}");
    let config =
        UniverseConfig::builder().server_url(&server_url).universe_name("myuni").build().unwrap();
    let mut store = UniverseStore::new(config)
        .unwrap()
        .with_retry_policy(RetryPolicy::Once(Duration::from_millis(10)));
    let credentials = HashMap::from([(credential_name(&server_url), TOKEN.to_string())]);
    store.init(&credentials, None).await.unwrap();

    let err = store.add_file("doc1", "text").await.unwrap_err();

    assert!(err.is_transport(), "expected transport error, got {err:?}");
}

#[tokio::test]
async fn truncated_error_body_keeps_the_status_and_is_not_retried() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server_url = format!("http://{}", listener.local_addr().unwrap());
    let connections = Arc::new(AtomicUsize::new(0));

    let accepted = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            accepted.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 200\r\n\r\n{\"error\":\"not")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    let store = store_for(server_url, "myuni").await;
    let err = store.delete_file("x").await.unwrap_err();

    assert!(
        matches!(err, UniverseError::ApiError { status: 404, ref message } if message == "404 Not Found"),
        "expected ApiError(404), got {err:?}"
    );
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
