//! Operations on the authenticated user's own library.
//!
//! Inventing somebody's saved tracks or listening history would be
//! misleading, so these answer transient failures with an empty list.

use crate::{
    Result,
    spotify::catalog::{Catalog, map_playlist, map_track, present},
    types::{Paging, Playlist, PlaylistObject, Track, TrackItem, TrackObject},
    utils,
};

impl Catalog {
    pub async fn saved_tracks(&self, limit: u32) -> Result<Vec<Track>> {
        let limit = utils::clamp_limit(limit);
        let result = self
            .wrapped_tracks(&format!("/me/tracks?limit={limit}"))
            .await;

        Self::recover("saved tracks", result, Vec::new)
    }

    pub async fn top_tracks(&self, limit: u32) -> Result<Vec<Track>> {
        let limit = utils::clamp_limit(limit);
        let result: Result<Vec<Track>> = self
            .get::<Paging<TrackObject>>(&format!("/me/top/tracks?limit={limit}"))
            .await
            .map(|page| present(page).filter_map(|t| map_track(t, None)).collect());

        Self::recover("top tracks", result, Vec::new)
    }

    pub async fn recently_played(&self, limit: u32) -> Result<Vec<Track>> {
        let limit = utils::clamp_limit(limit);
        let result = self
            .wrapped_tracks(&format!("/me/player/recently-played?limit={limit}"))
            .await;

        Self::recover("recently played", result, Vec::new)
    }

    pub async fn user_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        let limit = utils::clamp_limit(limit);
        let result: Result<Vec<Playlist>> = self
            .get::<Paging<PlaylistObject>>(&format!("/me/playlists?limit={limit}"))
            .await
            .map(|page| present(page).map(map_playlist).collect());

        Self::recover("user playlists", result, Vec::new)
    }

    /// Saved tracks and play history wrap each track in an item object.
    async fn wrapped_tracks(&self, path: &str) -> Result<Vec<Track>> {
        let page: Paging<TrackItem> = self.get(path).await?;
        Ok(present(page)
            .filter_map(|item| item.track)
            .filter_map(|t| map_track(t, None))
            .collect())
    }
}
