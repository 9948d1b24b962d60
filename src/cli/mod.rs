//! # CLI Module
//!
//! Command handlers of the `spotlite` binary. Each handler talks to a shared
//! [`SpotifyClient`] and renders the result for the terminal.
//!
//! ## Command Categories
//!
//! ### Session
//!
//! - [`login`] - Authorization code flow with PKCE; runs the callback server
//!   until the redirect arrives
//! - [`connect`] - App-only access through the client-credentials grant
//! - [`logout`] - Forgets every stored credential
//! - [`status`] - Shows what is stored and when the token expires
//! - [`callback`] - Shows, overrides or resets the callback address
//!
//! ### Catalog
//!
//! - [`search`], [`featured`], [`releases`], [`categories`], [`playlist`] -
//!   Browsing; served from synthetic data when Spotify is unreachable
//! - [`saved`], [`top`], [`recent`], [`playlists`] - The user's library
//!
//! ## Error Presentation
//!
//! Failures are printed with the [`error!`](crate::error!) macro, which
//! terminates the process with exit code 1. An unauthenticated catalog call
//! points the user at `spotlite login`.

mod auth;
mod browse;
mod library;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

pub use auth::{callback, connect, login, logout, status};
pub use browse::{categories, featured, playlist, releases, search};
pub use library::{playlists, recent, saved, top};

use crate::{
    Error, error, info,
    types::{Category, CategoryTableRow, Playlist, PlaylistTableRow, Track, TrackTableRow},
};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

fn or_exit<T>(result: crate::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(Error::Unauthenticated) => {
            error!("Not connected to Spotify. Run `spotlite login` or `spotlite connect` first.")
        }
        Err(e) => error!("{}", e),
    }
}

fn print_tracks(tracks: &[Track]) {
    if tracks.is_empty() {
        info!("No tracks found.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks
        .iter()
        .enumerate()
        .map(|(i, track)| TrackTableRow::new(i + 1, track))
        .collect();
    println!("{}", Table::new(rows));
}

fn print_playlists(playlists: &[Playlist]) {
    if playlists.is_empty() {
        info!("No playlists found.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .map(|p| PlaylistTableRow {
            id: p.id.clone(),
            name: p.name.clone(),
            tracks: p.tracks_total,
            description: p.description.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        info!("No categories found.");
        return;
    }

    let rows: Vec<CategoryTableRow> = categories
        .iter()
        .map(|c| CategoryTableRow {
            id: c.id.clone(),
            name: c.name.clone(),
        })
        .collect();
    println!("{}", Table::new(rows));
}
