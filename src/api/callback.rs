use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{spotify::SpotifyClient, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(client): Extension<Arc<SpotifyClient>>,
) -> Response {
    match client.handle_callback(&params).await {
        // leave the callback URL so a reload cannot replay the code
        Ok(_) => Redirect::to("/").into_response(),
        Err(e) => {
            warning!("Login failed: {}", e);
            let page = Html(format!(
                "<h4>Login failed.</h4><p>{}</p>",
                escape_html(&e.to_string())
            ));
            (StatusCode::BAD_REQUEST, page).into_response()
        }
    }
}

pub async fn landing() -> Html<&'static str> {
    Html("<h2>Connected to Spotify.</h2><p>You can close this browser window.</p>")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
