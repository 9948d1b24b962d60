//! # API Module
//!
//! HTTP endpoints of the local callback server that receives the OAuth
//! redirect from Spotify.
//!
//! ## Endpoints
//!
//! - [`callback`] - Hands the redirect query to
//!   [`SpotifyClient::handle_callback`](crate::spotify::SpotifyClient::handle_callback).
//!   On success the browser is redirected to [`landing`], which drops the
//!   authorization code from the address bar.
//! - [`landing`] - Confirmation page after a successful login.
//! - [`health`] - Status and version for monitoring.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotlite::api::{callback, health, landing};
//!
//! let app = Router::new()
//!     .route("/", get(landing))
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::{callback, landing};
pub use health::health;
