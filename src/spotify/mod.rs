//! # Spotify Integration Module
//!
//! This module is the integration layer between spotlite and the Spotify
//! Web API. It implements the authorization code flow, authenticated API
//! access and the typed catalog operations the command-line host calls.
//!
//! ## Architecture
//!
//! ```text
//! Host (CLI, callback server)
//!          ↓
//! SpotifyClient
//!     ├── AuthFlow      (authorization code + PKCE, callback handling)
//!     ├── Catalog       (browse / search / library, fallback policy)
//!     │      ↓
//!     └── Gateway       (bearer token, status classification, retries)
//!             ↓
//! TokenManager (management) ── CredentialStore ── SessionStore
//!             ↓
//! Transport (reqwest, explicit timeout)
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Authorization flow driver and the raw token endpoint grants
//!   (authorization code, refresh token, client credentials)
//! - [`gateway`] - Authenticated requests against the versioned API with
//!   bounded retries for `429` and `502`-`504`
//! - [`catalog`], `browse`, `library` - Typed operations; browsing falls
//!   back to synthetic data, library operations to empty lists
//! - [`transport`] - HTTP abstraction so tests can script responses
//! - [`navigator`] - Opens the authorization page
//! - [`client`] - The facade wiring everything together
//!
//! ## Error Types
//!
//! Every function returns [`crate::Result`]. Transport failures and non-2xx
//! statuses are reported precisely up to the catalog, which is the only
//! place that swallows them.
//!
//! ## Thread Safety
//!
//! All operations are async and take `&self`; [`SpotifyClient`] is
//! `Send + Sync` and meant to be shared behind an `Arc`. Concurrent token
//! refreshes may race, the last write to the store wins.

pub mod auth;
mod browse;
pub mod catalog;
pub mod client;
pub mod gateway;
mod library;
pub mod navigator;
pub mod transport;

pub use client::SpotifyClient;
