use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, sync::Arc};

use crate::{api, spotify::SpotifyClient};

/// Routes of the callback server. `callback_path` is the path component of
/// the configured callback address.
pub fn router(client: Arc<SpotifyClient>, callback_path: &str) -> Router {
    let mut app = Router::new().route("/health", get(api::health));
    if callback_path != "/" {
        app = app.route("/", get(api::landing));
    }

    app.route(callback_path, get(api::callback))
        .layer(Extension(client))
}

pub async fn start_api_server(
    client: Arc<SpotifyClient>,
    addr: SocketAddr,
    callback_path: &str,
) -> Result<(), String> {
    let app = router(client, callback_path);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("cannot bind {addr}: {e}"))?;
    axum::serve(listener, app).await.map_err(|e| e.to_string())
}
