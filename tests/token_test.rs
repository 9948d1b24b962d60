mod common;

use std::time::Duration;

use serde_json::json;
use spotlite::{config::REFRESH_MARGIN, spotify::auth::GrantedToken, types::AppCredentials};

use common::{CLIENT_ID, Harness, NOW, TOKEN_URL, credentials};

#[tokio::test]
async fn test_fresh_token_is_returned_without_network() {
    let h = Harness::new().logged_in();

    let token = h.client.valid_access_token().await;

    assert_eq!(token.as_deref(), Some("stored-access"));
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn test_token_within_margin_is_refreshed_once() {
    let h = Harness::new();
    h.store.save(&credentials(NOW + 60_000)).unwrap();
    h.transport.push_json(
        200,
        json!({"access_token": "new-access", "token_type": "Bearer", "expires_in": 3600}),
    );

    let token = h.client.valid_access_token().await;

    assert_eq!(token.as_deref(), Some("new-access"));
    assert_eq!(h.transport.call_count(), 1);

    let request = &h.transport.requests()[0];
    assert_eq!(request.url, TOKEN_URL);
    assert_eq!(request.form_value("grant_type"), Some("refresh_token"));
    assert_eq!(request.form_value("refresh_token"), Some("stored-refresh"));
    assert_eq!(request.form_value("client_id"), Some(CLIENT_ID));

    let stored = h.store.load().unwrap();
    assert_eq!(stored.access_token, "new-access");
    assert_eq!(stored.expires_at, NOW + 3_600_000);
    // no rotation: the old refresh token and scope survive
    assert_eq!(stored.refresh_token, "stored-refresh");
    assert_eq!(stored.scope, "user-library-read");
}

#[tokio::test]
async fn test_refresh_keeps_rotated_refresh_token() {
    let h = Harness::new();
    h.store.save(&credentials(NOW - 1)).unwrap();
    h.transport.push_json(
        200,
        json!({"access_token": "new-access", "refresh_token": "rotated", "expires_in": 1800}),
    );

    h.client.valid_access_token().await.unwrap();

    let stored = h.store.load().unwrap();
    assert_eq!(stored.refresh_token, "rotated");
    assert_eq!(stored.expires_at, NOW + 1_800_000);
}

#[tokio::test]
async fn test_expiry_exactly_at_margin_counts_as_expired() {
    let h = Harness::new();
    let margin = REFRESH_MARGIN.as_millis() as i64;
    h.store.save(&credentials(NOW + margin)).unwrap();
    h.transport
        .push_json(200, json!({"access_token": "new-access", "expires_in": 3600}));

    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("new-access")
    );
    assert_eq!(h.transport.call_count(), 1);
}

#[tokio::test]
async fn test_expiry_just_beyond_margin_is_still_valid() {
    let h = Harness::new();
    let margin = REFRESH_MARGIN.as_millis() as i64;
    h.store.save(&credentials(NOW + margin + 1)).unwrap();

    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("stored-access")
    );
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn test_rejected_refresh_clears_credentials() {
    let h = Harness::new();
    h.store.save(&credentials(NOW - 1)).unwrap();
    h.transport
        .push_json(400, json!({"error": "invalid_grant"}));

    assert_eq!(h.client.valid_access_token().await, None);
    assert_eq!(h.transport.call_count(), 1);
    assert_eq!(h.store.load(), None);
    assert!(!h.client.is_configured());
}

#[tokio::test]
async fn test_refresh_without_access_token_clears_credentials() {
    let h = Harness::new();
    h.store.save(&credentials(NOW - 1)).unwrap();
    h.transport.push_json(200, json!({"expires_in": 3600}));

    assert_eq!(h.client.valid_access_token().await, None);
    assert_eq!(h.store.load(), None);
}

#[tokio::test]
async fn test_refresh_with_absurd_lifetime_is_rejected() {
    let h = Harness::new();
    h.store.save(&credentials(NOW - 1)).unwrap();
    h.transport.push_json(
        200,
        json!({"access_token": "new-access", "expires_in": 9_223_372_036_854_775u64}),
    );

    assert_eq!(h.client.valid_access_token().await, None);
    assert_eq!(h.store.load(), None);
}

#[test]
fn test_granted_lifetime_conversion_saturates() {
    let token = GrantedToken {
        access_token: "a".to_string(),
        refresh_token: None,
        expires_in: u64::MAX,
        scope: None,
    };
    assert_eq!(token.expires_in_ms(), i64::MAX);

    let token = GrantedToken {
        expires_in: 90,
        ..token
    };
    assert_eq!(token.expires_in_ms(), 90_000);
}

#[tokio::test]
async fn test_transport_failure_during_refresh_keeps_record() {
    let h = Harness::new();
    h.store.save(&credentials(NOW - 1)).unwrap();
    h.transport.push_error("connection refused");

    assert_eq!(h.client.valid_access_token().await, None);
    assert_eq!(h.store.load(), Some(credentials(NOW - 1)));
}

#[tokio::test]
async fn test_token_expires_as_clock_advances() {
    let h = Harness::new().logged_in();
    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("stored-access")
    );

    h.clock.advance(Duration::from_secs(56 * 60));
    h.transport
        .push_json(200, json!({"access_token": "later-access", "expires_in": 3600}));

    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("later-access")
    );
}

#[tokio::test]
async fn test_no_credentials_means_no_token_and_no_call() {
    let h = Harness::new();

    assert_eq!(h.client.valid_access_token().await, None);
    assert_eq!(h.transport.call_count(), 0);
}

#[tokio::test]
async fn test_app_token_is_requested_once_and_cached() {
    let h = Harness::new();
    h.store
        .set_app_credentials(&AppCredentials {
            client_id: "app-id".to_string(),
            client_secret: "app-secret".to_string(),
        })
        .unwrap();
    h.transport
        .push_json(200, json!({"access_token": "app-access", "expires_in": 3600}));

    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("app-access")
    );
    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("app-access")
    );
    assert_eq!(h.transport.call_count(), 1);

    let request = &h.transport.requests()[0];
    assert_eq!(request.form_value("grant_type"), Some("client_credentials"));
    assert_eq!(
        request.basic_auth,
        Some(("app-id".to_string(), "app-secret".to_string()))
    );
}

#[tokio::test]
async fn test_user_credentials_take_precedence_over_app_access() {
    let h = Harness::new().logged_in();
    h.store
        .set_app_credentials(&AppCredentials {
            client_id: "app-id".to_string(),
            client_secret: "app-secret".to_string(),
        })
        .unwrap();

    assert_eq!(
        h.client.valid_access_token().await.as_deref(),
        Some("stored-access")
    );
    assert_eq!(h.transport.call_count(), 0);
}
