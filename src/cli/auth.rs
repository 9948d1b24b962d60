use std::{net::SocketAddr, sync::Arc, time::Duration};

use chrono::{DateTime, Local};
use tokio::time::{Instant, sleep};
use url::Url;

use super::{or_exit, spinner};
use crate::{
    config, error, info, server, spotify::SpotifyClient, success, types::AuthFlowState, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub async fn login(client: Arc<SpotifyClient>, client_id: Option<String>) {
    let Some(client_id) = client_id.or_else(config::spotify_client_id) else {
        error!("No client id given. Pass --client-id or set SPOTLITE_CLIENT_ID.")
    };

    let (addr, path) = match listen_target(&client.callback_address()) {
        Ok(target) => target,
        Err(e) => error!("{}", e),
    };

    let server_client = Arc::clone(&client);
    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(server_client, addr, &path).await {
            error!("Callback server failed. Err: {}", e);
        }
    });

    let auth_url = or_exit(client.start_login(&client_id));
    info!(
        "Waiting for the Spotify redirect. If no browser opened, visit:\n{}",
        auth_url
    );

    match wait_for_authorization(&client).await {
        AuthFlowState::Authorized => {
            // let the browser fetch the landing page before the server goes away
            sleep(Duration::from_millis(500)).await;
            success!("Connected to Spotify.");
        }
        AuthFlowState::Failed(e) => error!("Login failed. Err: {}", e),
        _ => error!(
            "No redirect received within {} seconds.",
            LOGIN_TIMEOUT.as_secs()
        ),
    }
}

async fn wait_for_authorization(client: &SpotifyClient) -> AuthFlowState {
    let pb = spinner("Waiting for authorization...");
    let deadline = Instant::now() + LOGIN_TIMEOUT;

    let state = loop {
        let state = client.flow_state();
        if matches!(state, AuthFlowState::Authorized | AuthFlowState::Failed(_))
            || Instant::now() >= deadline
        {
            break state;
        }
        sleep(POLL_INTERVAL).await;
    };

    pb.finish_and_clear();
    state
}

/// Socket and route the callback server has to serve for `address`.
fn listen_target(address: &str) -> Result<(SocketAddr, String), String> {
    let url =
        Url::parse(address).map_err(|e| format!("invalid callback address {address}: {e}"))?;
    let addr = url
        .socket_addrs(|| None)
        .map_err(|e| format!("cannot resolve {address}: {e}"))?
        .into_iter()
        .next()
        .ok_or_else(|| format!("cannot resolve {address}"))?;

    Ok((addr, url.path().to_string()))
}

pub async fn connect(
    client: &SpotifyClient,
    client_id: Option<String>,
    client_secret: Option<String>,
) {
    let Some(client_id) = client_id.or_else(config::spotify_client_id) else {
        error!("No client id given. Pass --client-id or set SPOTLITE_CLIENT_ID.")
    };
    let Some(client_secret) = client_secret.or_else(config::spotify_client_secret) else {
        error!("No client secret given. Pass --client-secret or set SPOTLITE_CLIENT_SECRET.")
    };

    let pb = spinner("Requesting app token...");
    let result = client.connect_app(&client_id, &client_secret).await;
    pb.finish_and_clear();

    or_exit(result);
    success!("App-only access configured. Library commands still need `spotlite login`.");
}

pub fn logout(client: &SpotifyClient) {
    or_exit(client.logout());
    success!("Logged out.");
}

pub async fn status(client: &SpotifyClient) {
    info!("Callback address: {}", client.callback_address());

    match client.credentials() {
        Some(credentials) => {
            info!("Logged in with client id {}", credentials.client_id);
            match DateTime::from_timestamp_millis(credentials.expires_at) {
                Some(at) => info!(
                    "Access token expires {}",
                    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
                ),
                None => warning!("Stored expiry is out of range."),
            }
            if !credentials.scope.is_empty() {
                info!("Scope: {}", credentials.scope);
            }
        }
        None if client.is_configured() => info!("App-only access, no user login."),
        None => {
            warning!("Not connected. Run `spotlite login` or `spotlite connect`.");
            return;
        }
    }

    match client.valid_access_token().await {
        Some(_) => success!("A valid access token is available."),
        None => warning!("No valid access token. Log in again."),
    }
}

pub fn callback(client: &SpotifyClient, set: Option<String>, reset: bool) {
    if reset {
        or_exit(client.reset_callback_address());
        success!("Callback address reset to {}", client.callback_address());
    } else if let Some(address) = set {
        or_exit(client.set_callback_address(&address));
        success!("Callback address set to {}", client.callback_address());
        info!("Register this exact address as a redirect URI of your Spotify app.");
    } else {
        println!("{}", client.callback_address());
    }
}
