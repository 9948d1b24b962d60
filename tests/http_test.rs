mod common;

use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    Form, Json, Router,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Method;
use serde_json::{Value, json};
use spotlite::{
    config::Settings,
    management::{CredentialStore, MemoryStore},
    server,
    spotify::{
        SpotifyClient,
        transport::{HttpRequest, HttpTransport, Transport},
    },
    types::AuthFlowState,
};
use tokio::net::TcpListener;
use url::Url;

use common::{CLIENT_ID, FixedClock, NOW, RecordingNavigator, credentials};

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.contains_key("code_verifier") => Json(json!({
            "access_token": "live-access",
            "token_type": "Bearer",
            "refresh_token": "live-refresh",
            "expires_in": 3600
        }))
        .into_response(),
        Some("refresh_token") => Json(json!({
            "access_token": "refreshed-access",
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        )
            .into_response(),
    }
}

async fn new_releases(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some("Bearer refreshed-access");
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({"albums": {"items": [{"id": "live-album", "name": "Live Album"}]}}))
        .into_response()
}

async fn albums(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let ids = params.get("ids").cloned().unwrap_or_default();
    Json(json!({"albums": [{
        "id": ids,
        "name": "Live Album",
        "images": [{"url": "https://i.scdn.co/image/live"}],
        "tracks": {"items": [{"id": "live-track", "name": "Live Track", "artists": [{"name": "Live Band"}]}]}
    }]}))
}

async fn limited() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, "7")],
        "slow down",
    )
        .into_response()
}

fn mock_spotify() -> Router {
    Router::new()
        .route("/api/token", post(token))
        .route("/v1/browse/new-releases", get(new_releases))
        .route("/v1/albums", get(albums))
        .route("/v1/limited", get(limited))
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn live_client(base: &str, store: Arc<MemoryStore>) -> SpotifyClient {
    let settings = Settings {
        api_url: format!("{base}/v1"),
        auth_url: format!("{base}/authorize"),
        token_url: format!("{base}/api/token"),
        max_retry_delay: Duration::from_millis(5),
        ..Settings::default()
    };

    SpotifyClient::new(
        settings,
        store,
        Arc::new(HttpTransport::new(Duration::from_secs(5)).unwrap()),
        Arc::new(FixedClock::new(NOW)),
        Arc::new(RecordingNavigator::default()),
    )
}

#[tokio::test]
async fn test_http_transport_reports_status_and_retry_after() {
    let base = serve(mock_spotify()).await;
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();

    let response = transport
        .send(HttpRequest::new(Method::GET, format!("{base}/v1/limited")))
        .await
        .unwrap();

    assert_eq!(response.status, 429);
    assert_eq!(response.retry_after, Some(7));
    assert_eq!(response.body, "slow down");
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_expired_session_is_refreshed_before_browsing() {
    let base = serve(mock_spotify()).await;
    let store = Arc::new(MemoryStore::new());
    CredentialStore::new(store.clone())
        .save(&credentials(NOW - 1))
        .unwrap();
    let client = live_client(&base, store);

    let tracks = client.new_releases(5).await.unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].id, "live-track");
    assert_eq!(tracks[0].album.id.as_deref(), Some("live-album"));
    assert_eq!(
        client.credentials().map(|c| c.access_token),
        Some("refreshed-access".to_string())
    );
}

#[tokio::test]
async fn test_unreachable_api_serves_fallback_data() {
    // nothing listens on the discard port
    let store = Arc::new(MemoryStore::new());
    CredentialStore::new(store.clone())
        .save(&credentials(NOW + 3_600_000))
        .unwrap();
    let client = live_client("http://127.0.0.1:9", store);

    let tracks = client.new_releases(6).await.unwrap();

    assert_eq!(tracks.len(), 6);
    assert!(tracks.iter().all(|t| t.id.starts_with("fallback-track-")));
    assert!(client.saved_tracks(6).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_through_the_callback_server() {
    let base = serve(mock_spotify()).await;
    let client = Arc::new(live_client(&base, Arc::new(MemoryStore::new())));
    let host = serve(server::router(Arc::clone(&client), "/callback")).await;

    let auth_url = client.start_login(CLIENT_ID).unwrap();
    let state = auth_url
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .unwrap();

    let mut callback = Url::parse(&format!("{host}/callback")).unwrap();
    callback
        .query_pairs_mut()
        .append_pair("code", "live-code")
        .append_pair("state", &state);
    let response = reqwest::get(callback).await.unwrap();

    // redirected to the landing page, the code is gone from the address
    assert_eq!(response.url().path(), "/");
    assert!(response.text().await.unwrap().contains("Connected to Spotify"));
    assert_eq!(client.flow_state(), AuthFlowState::Authorized);
    assert_eq!(
        client.credentials().map(|c| c.refresh_token),
        Some("live-refresh".to_string())
    );
}

#[tokio::test]
async fn test_callback_server_rejects_forged_state() {
    let client = Arc::new(live_client("http://127.0.0.1:9", Arc::new(MemoryStore::new())));
    let host = serve(server::router(Arc::clone(&client), "/callback")).await;
    client.start_login(CLIENT_ID).unwrap();

    let response = reqwest::get(format!("{host}/callback?code=x&state=forged"))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains("Login failed"));
    assert_eq!(client.credentials(), None);
}

#[tokio::test]
async fn test_health_endpoint() {
    let client = Arc::new(live_client("http://127.0.0.1:9", Arc::new(MemoryStore::new())));
    let host = serve(server::router(client, "/callback")).await;

    let health: Value = reqwest::get(format!("{host}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(health["status"], "ok");
    assert_eq!(health["configured"], false);
    assert_eq!(health["flow"], "Idle");
}
