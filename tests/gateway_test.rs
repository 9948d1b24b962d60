mod common;

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Value, json};
use spotlite::{
    Error,
    management::{CredentialStore, MemoryStore, TokenManager},
    spotify::{
        gateway::{Gateway, SpotifyGateway},
        transport::HttpResponse,
    },
};

use common::{API_URL, FixedClock, NOW, ScriptedTransport, TOKEN_URL, credentials, settings};

fn gateway(logged_in: bool) -> (SpotifyGateway, Arc<ScriptedTransport>) {
    let store = CredentialStore::new(Arc::new(MemoryStore::new()));
    if logged_in {
        store.save(&credentials(NOW + 3_600_000)).unwrap();
    }
    let transport = Arc::new(ScriptedTransport::new());
    let tokens = Arc::new(TokenManager::new(
        store,
        transport.clone(),
        Arc::new(FixedClock::new(NOW)),
        TOKEN_URL.to_string(),
    ));

    (
        SpotifyGateway::new(&settings(), tokens, transport.clone()),
        transport,
    )
}

#[tokio::test]
async fn test_request_without_token_makes_no_call() {
    let (gateway, transport) = gateway(false);

    let err = gateway
        .request("/me/tracks", Method::GET, None)
        .await
        .unwrap_err();

    assert_eq!(err, Error::Unauthenticated);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_request_sends_bearer_and_returns_json() {
    let (gateway, transport) = gateway(true);
    transport.push_json(200, json!({"id": "me"}));

    let value = gateway.request("/me", Method::GET, None).await.unwrap();

    assert_eq!(value, json!({"id": "me"}));
    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, format!("{API_URL}/me"));
    assert_eq!(request.bearer.as_deref(), Some("stored-access"));
    assert!(request.json.is_none());
}

#[tokio::test]
async fn test_request_forwards_json_body_and_accepts_empty_response() {
    let (gateway, transport) = gateway(true);
    transport.push_status(204);

    let value = gateway
        .request("/me/tracks", Method::PUT, Some(json!({"ids": ["t1"]})))
        .await
        .unwrap();

    assert_eq!(value, Value::Null);
    assert_eq!(transport.requests()[0].json, Some(json!({"ids": ["t1"]})));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (gateway, transport) = gateway(true);
    transport.push_status(404);

    let err = gateway
        .request("/albums/missing", Method::GET, None)
        .await
        .unwrap_err();

    assert_eq!(err, Error::Upstream(404));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_unavailable_is_retried_then_succeeds() {
    let (gateway, transport) = gateway(true);
    transport.push_status(503);
    transport.push_json(200, json!({"ok": true}));

    let value = gateway.request("/me", Method::GET, None).await.unwrap();

    assert_eq!(value, json!({"ok": true}));
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_unavailable_is_surfaced_after_bounded_retries() {
    let (gateway, transport) = gateway(true);
    for _ in 0..5 {
        transport.push_status(503);
    }

    let err = gateway.request("/me", Method::GET, None).await.unwrap_err();

    assert_eq!(err, Error::Upstream(503));
    // one attempt plus the two default retries
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_internal_server_error_is_not_retried() {
    let (gateway, transport) = gateway(true);
    transport.push_status(500);

    let err = gateway.request("/me", Method::GET, None).await.unwrap_err();

    assert_eq!(err, Error::Upstream(500));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_long_retry_after_is_not_waited_for() {
    let (gateway, transport) = gateway(true);
    transport.push(Ok(HttpResponse {
        status: 429,
        retry_after: Some(60),
        body: String::new(),
    }));

    let err = gateway.request("/me", Method::GET, None).await.unwrap_err();

    assert_eq!(err, Error::Upstream(429));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    let (gateway, transport) = gateway(true);
    transport.push_error("timed out");

    let err = gateway.request("/me", Method::GET, None).await.unwrap_err();

    assert_eq!(err, Error::Transport("timed out".to_string()));
}

#[tokio::test]
async fn test_non_json_success_is_a_decode_error() {
    let (gateway, transport) = gateway(true);
    transport.push(Ok(HttpResponse {
        status: 200,
        retry_after: None,
        body: "definitely not json".to_string(),
    }));

    let err = gateway.request("/me", Method::GET, None).await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}
