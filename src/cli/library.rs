use super::{or_exit, print_playlists, print_tracks, spinner};
use crate::spotify::SpotifyClient;

pub async fn saved(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching saved tracks...");
    let result = client.saved_tracks(limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}

pub async fn top(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching top tracks...");
    let result = client.top_tracks(limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}

pub async fn recent(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching recently played tracks...");
    let result = client.recently_played(limit).await;
    pb.finish_and_clear();

    print_tracks(&or_exit(result));
}

pub async fn playlists(client: &SpotifyClient, limit: u32) {
    let pb = spinner("Fetching your playlists...");
    let result = client.user_playlists(limit).await;
    pb.finish_and_clear();

    print_playlists(&or_exit(result));
}
