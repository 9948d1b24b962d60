use super::{or_exit, print_categories, print_playlists, print_tracks, spinner};
use crate::spotify::SpotifyClient;

pub async fn search(client: &SpotifyClient, query: &str, limit: u32) {
    let pb = spinner(&format!("Searching for \"{query}\"..."));
    let result = client.search_tracks(query, limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}

pub async fn featured(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching featured playlists...");
    let result = client.featured_playlists(limit).await;
    pb.finish_and_clear();

    print_playlists(&or_exit(result));
}

pub async fn releases(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching new releases...");
    let result = client.new_releases(limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}

pub async fn categories(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching categories...");
    let result = client.categories(limit).await;
    pb.finish_and_clear();

    print_categories(&or_exit(result));
}

pub async fn playlist(client: &SpotifyClient, playlist_id: &str, limit: u32) {
    let pb = spinner("Fetching playlist tracks...");
    let result = client.playlist_tracks(playlist_id, limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}
