use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

/// Delegated user credentials as persisted by the credential store.
///
/// Access and refresh token always travel together: a session either has
/// this whole record or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token in epoch milliseconds.
    pub expires_at: i64,
    #[serde(default)]
    pub scope: String,
}

impl Credentials {
    /// A record with an empty token cannot have been written by us.
    pub fn is_well_formed(&self) -> bool {
        !self.client_id.is_empty()
            && !self.access_token.is_empty()
            && !self.refresh_token.is_empty()
    }
}

/// Client id and secret for app-only access (client-credentials grant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Progress of the authorization code flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlowState {
    Idle,
    AwaitingRedirect,
    ExchangingCode,
    Authorized,
    Failed(crate::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: Option<String>,
    pub name: String,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<Artist>,
    pub album: Album,
    pub duration_ms: u64,
    pub preview_url: Option<String>,
}

impl Track {
    pub fn artwork(&self) -> &[Image] {
        &self.album.images
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub images: Vec<Image>,
    pub tracks_total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icons: Vec<Image>,
}

// Web API response shapes. Anything Spotify documents as nullable is
// optional here; mapping into the types above happens in `spotify`.

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<Option<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistObject {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumObject {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub tracks: Option<Paging<TrackObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    #[serde(default)]
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Wrapper used by saved tracks, playlist tracks and play history.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksRef {
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Image>>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icons: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Paging<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeaturedPlaylistsResponse {
    pub playlists: Paging<PlaylistObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReleasesResponse {
    pub albums: Paging<AlbumObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetSeveralAlbumsResponse {
    pub albums: Vec<Option<AlbumObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Paging<CategoryObject>,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub title: String,
    pub artists: String,
    pub album: String,
    pub duration: String,
}

impl TrackTableRow {
    pub fn new(position: usize, track: &Track) -> Self {
        Self {
            position,
            title: track.name.clone(),
            artists: track.artist_names(),
            album: track.album.name.clone(),
            duration: utils::format_duration(track.duration_ms),
        }
    }
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub tracks: u32,
    pub description: String,
}

#[derive(Tabled)]
pub struct CategoryTableRow {
    pub id: String,
    pub name: String,
}
