//! Configuration management for spotlite.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files. The resulting [`Settings`] are plain data
//! that the composition root hands to
//! [`SpotifyClient`](crate::spotify::SpotifyClient); nothing below `main`
//! reads the environment on its own.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use log::warn;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SCOPE: &str = "user-read-private user-library-read user-top-read user-read-recently-played playlist-read-private";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Access tokens are treated as stale this long before they actually expire.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `spotlite` data directory if it doesn't exist and loads
/// `spotlite/.env` from it. A missing file is fine: every setting has a
/// default, and the client id can be given on the command line.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotlite/.env`
/// - macOS: `~/Library/Application Support/spotlite/.env`
/// - Windows: `%LOCALAPPDATA%/spotlite/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Returns the platform-specific data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotlite");
    path
}

/// Returns the client id configured in the environment, if any.
///
/// Used as the default for `spotlite login --client-id`.
pub fn spotify_client_id() -> Option<String> {
    env::var("SPOTLITE_CLIENT_ID")
        .ok()
        .filter(|id| !id.trim().is_empty())
}

/// Returns the client secret configured in the environment, if any.
///
/// Only app-only access (`spotlite connect`) needs a secret. It should be
/// kept out of logs and version control.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTLITE_CLIENT_SECRET")
        .ok()
        .filter(|secret| !secret.trim().is_empty())
}

/// Runtime settings of the client.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the versioned Web API, without trailing slash.
    pub api_url: String,
    /// Authorization endpoint the browser is sent to.
    pub auth_url: String,
    /// Token endpoint for every grant type.
    pub token_url: String,
    /// Space separated scopes requested at login.
    pub scope: String,
    /// Address of the local callback server (`host:port`).
    pub server_addr: String,
    /// Timeout applied to every HTTP call.
    pub request_timeout: Duration,
    /// How often a transient upstream status is retried.
    pub max_retries: u32,
    /// Upper bound for the wait between two retries.
    pub max_retry_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 2,
            max_retry_delay: Duration::from_secs(10),
        }
    }
}

impl Settings {
    /// Builds settings from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SPOTLITE_API_URL` | `https://api.spotify.com/v1` |
    /// | `SPOTLITE_AUTH_URL` | `https://accounts.spotify.com/authorize` |
    /// | `SPOTLITE_TOKEN_URL` | `https://accounts.spotify.com/api/token` |
    /// | `SPOTLITE_AUTH_SCOPE` | see [`DEFAULT_SCOPE`] |
    /// | `SERVER_ADDRESS` | `127.0.0.1:8888` |
    /// | `SPOTLITE_REQUEST_TIMEOUT_SECS` | `10` |
    /// | `SPOTLITE_MAX_RETRIES` | `2` |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: string_var("SPOTLITE_API_URL", &defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            auth_url: string_var("SPOTLITE_AUTH_URL", &defaults.auth_url),
            token_url: string_var("SPOTLITE_TOKEN_URL", &defaults.token_url),
            scope: string_var("SPOTLITE_AUTH_SCOPE", &defaults.scope),
            server_addr: string_var("SERVER_ADDRESS", &defaults.server_addr),
            request_timeout: Duration::from_secs(parsed_var(
                "SPOTLITE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            max_retries: parsed_var("SPOTLITE_MAX_RETRIES", defaults.max_retries),
            max_retry_delay: defaults.max_retry_delay,
        }
    }

    /// The callback address used when the user has not configured one.
    ///
    /// It is the `/callback` path on the origin of the local server.
    pub fn default_callback_address(&self) -> String {
        format!("http://{}/callback", self.server_addr)
    }
}

fn string_var(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parsed_var<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={value:?}, using {default}");
            default
        }),
        Err(_) => default,
    }
}
