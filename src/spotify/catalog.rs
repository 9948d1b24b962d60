use std::sync::Arc;

use log::warn;
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::{
    Result,
    spotify::gateway::Gateway,
    types::{
        Album, AlbumObject, Artist, ArtistObject, Category, CategoryObject, Paging, Playlist,
        PlaylistObject, Track, TrackObject,
    },
};

/// Typed catalog operations on top of a [`Gateway`].
///
/// Browsing operations (search, featured playlists, new releases,
/// categories, playlist tracks) answer transient failures with synthetic
/// data of the requested size from [`crate::fallback`]. Operations on the
/// user's own library answer them with an empty list instead. Any other
/// error, most notably [`crate::Error::Unauthenticated`], is returned.
pub struct Catalog {
    gateway: Arc<dyn Gateway>,
}

impl Catalog {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.gateway.request(path, Method::GET, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Replaces recoverable failures of `operation` with `fallback()`.
    pub(crate) fn recover<T>(
        operation: &str,
        result: Result<Vec<T>>,
        fallback: impl FnOnce() -> Vec<T>,
    ) -> Result<Vec<T>> {
        match result {
            Ok(items) => Ok(items),
            Err(e) if e.is_recoverable() => {
                warn!("{operation} failed ({e}), serving fallback data");
                Ok(fallback())
            }
            Err(e) => Err(e),
        }
    }
}

/// Drops the `null` entries Spotify leaves in paged lists.
pub(crate) fn present<T>(paging: Paging<T>) -> impl Iterator<Item = T> {
    paging.items.into_iter().flatten()
}

fn map_artist(artist: ArtistObject) -> Artist {
    Artist {
        id: artist.id,
        name: artist.name,
    }
}

pub(crate) fn map_album(album: AlbumObject) -> Album {
    Album {
        id: album.id,
        name: album.name,
        images: album.images,
    }
}

/// Maps an upstream track; local files without an id are skipped.
///
/// Tracks nested in an album object carry no album of their own, `album`
/// supplies it.
pub(crate) fn map_track(track: TrackObject, album: Option<&Album>) -> Option<Track> {
    let id = track.id.filter(|id| !id.is_empty())?;
    let album = match (track.album, album) {
        (Some(own), _) => map_album(own),
        (None, Some(parent)) => parent.clone(),
        (None, None) => Album {
            id: None,
            name: String::new(),
            images: Vec::new(),
        },
    };

    Some(Track {
        id,
        name: track.name,
        artists: track.artists.into_iter().map(map_artist).collect(),
        album,
        duration_ms: track.duration_ms,
        preview_url: track.preview_url,
    })
}

pub(crate) fn map_playlist(playlist: PlaylistObject) -> Playlist {
    Playlist {
        id: playlist.id,
        name: playlist.name,
        description: playlist.description.unwrap_or_default(),
        images: playlist.images.unwrap_or_default(),
        tracks_total: playlist.tracks.map(|t| t.total).unwrap_or(0),
    }
}

pub(crate) fn map_category(category: CategoryObject) -> Category {
    Category {
        id: category.id,
        name: category.name,
        icons: category.icons,
    }
}
