use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::SpotifyClient;

pub async fn health(Extension(client): Extension<Arc<SpotifyClient>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "configured": client.is_configured(),
        "flow": format!("{:?}", client.flow_state()),
    }))
}
