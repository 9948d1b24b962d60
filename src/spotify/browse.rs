use crate::{
    Result, fallback,
    spotify::catalog::{Catalog, map_album, map_category, map_playlist, map_track, present},
    types::{
        CategoriesResponse, Category, FeaturedPlaylistsResponse, GetSeveralAlbumsResponse,
        NewReleasesResponse, Paging, Playlist, SearchResponse, Track, TrackItem,
    },
    utils,
};

/// `GET /albums` accepts at most this many ids.
const ALBUMS_PER_REQUEST: usize = 20;

impl Catalog {
    /// Searches the catalog for tracks.
    ///
    /// A blank query returns nothing without calling Spotify. When Spotify
    /// fails, synthetic tracks whose title, artist or album contain the
    /// query are returned instead.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = utils::clamp_limit(limit);
        let path = format!(
            "/search?q={q}&type=track&limit={limit}",
            q = utils::encode_component(query)
        );
        let result: Result<Vec<Track>> = self
            .get::<SearchResponse>(&path)
            .await
            .map(|res| present(res.tracks).filter_map(|t| map_track(t, None)).collect());

        Self::recover("track search", result, || {
            fallback::search_tracks(query, limit as usize)
        })
    }

    pub async fn featured_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        let limit = utils::clamp_limit(limit);
        let result: Result<Vec<Playlist>> = self
            .get::<FeaturedPlaylistsResponse>(&format!("/browse/featured-playlists?limit={limit}"))
            .await
            .map(|res| present(res.playlists).map(map_playlist).collect());

        Self::recover("featured playlists", result, || {
            fallback::playlists(limit as usize)
        })
    }

    /// Returns the lead track of each newly released album.
    ///
    /// The new releases listing only has simplified albums, so the albums
    /// are fetched again in batches to get at their tracks.
    pub async fn new_releases(&self, limit: u32) -> Result<Vec<Track>> {
        let limit = utils::clamp_limit(limit);
        let result = self.lead_tracks_of_new_releases(limit).await;

        Self::recover("new releases", result, || fallback::tracks(limit as usize))
    }

    async fn lead_tracks_of_new_releases(&self, limit: u32) -> Result<Vec<Track>> {
        let releases: NewReleasesResponse = self
            .get(&format!("/browse/new-releases?limit={limit}"))
            .await?;
        let album_ids: Vec<String> = present(releases.albums).filter_map(|a| a.id).collect();

        let mut tracks = Vec::with_capacity(album_ids.len());
        for chunk in album_ids.chunks(ALBUMS_PER_REQUEST) {
            let response: GetSeveralAlbumsResponse = self
                .get(&format!("/albums?ids={}", chunk.join(",")))
                .await?;

            for mut album in response.albums.into_iter().flatten() {
                let lead = album.tracks.take().and_then(|t| present(t).next());
                let parent = map_album(album);
                if let Some(track) = lead.and_then(|t| map_track(t, Some(&parent))) {
                    tracks.push(track);
                }
            }
        }

        Ok(tracks)
    }

    pub async fn categories(&self, limit: u32) -> Result<Vec<Category>> {
        let limit = utils::clamp_limit(limit);
        let result: Result<Vec<Category>> = self
            .get::<CategoriesResponse>(&format!("/browse/categories?limit={limit}"))
            .await
            .map(|res| present(res.categories).map(map_category).collect());

        Self::recover("categories", result, || fallback::categories(limit as usize))
    }

    pub async fn playlist_tracks(&self, playlist_id: &str, limit: u32) -> Result<Vec<Track>> {
        let limit = utils::clamp_limit(limit);
        let path = format!(
            "/playlists/{id}/tracks?limit={limit}",
            id = utils::encode_component(playlist_id)
        );
        let result: Result<Vec<Track>> = self
            .get::<Paging<TrackItem>>(&path)
            .await
            .map(|page| {
                present(page)
                    .filter_map(|item| item.track)
                    .filter_map(|t| map_track(t, None))
                    .collect()
            });

        Self::recover("playlist tracks", result, || fallback::tracks(limit as usize))
    }
}
