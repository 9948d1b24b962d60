//! Synthetic catalog data for when Spotify cannot be reached.
//!
//! Every function is pure: the same arguments always produce the same
//! items. Ids are sequential (`fallback-track-1`, `fallback-track-2`, ...),
//! names come from fixed tables in round-robin order, and every item
//! carries at least one artwork URL so callers can render fallback data
//! exactly like upstream data.

use crate::types::{Album, Artist, Category, Image, Playlist, Track};

/// Tracks considered by [`search_tracks`] before filtering.
pub const SEARCH_POOL_SIZE: usize = 50;

const ARTWORK_PHOTOS: [&str; 3] = [
    "photo-1488590528505-98d2b5aba04b",
    "photo-1605810230434-7631ac76ec81",
    "photo-1649972904349-6e44c42644a7",
];

const TRACK_TITLES: [&str; 10] = [
    "Synthwave Dreams",
    "Midnight Drive",
    "Summer Memories",
    "Urban Flow",
    "Neon Skyline",
    "Golden Hour",
    "Echoes",
    "Paper Planes",
    "Slow Motion",
    "Northern Lights",
];

const ARTISTS: [&str; 6] = [
    "Electronic Artist",
    "Night Cruiser",
    "Sunshine Band",
    "City Sounds",
    "The Lowlights",
    "Velvet Static",
];

const ALBUMS: [&str; 5] = [
    "Neon Nights",
    "Urban Lights",
    "Golden Days",
    "Metropolitan",
    "Afterglow",
];

const PLAYLISTS: [(&str, &str); 6] = [
    ("Today's Top Hits", "The hottest tracks right now"),
    ("Chill Vibes", "Relaxing music to unwind"),
    ("Workout Energy", "Power your fitness routine"),
    ("Indie Mix", "Fresh indie tracks you'll love"),
    ("Focus Flow", "Tune out distractions and get in the zone"),
    ("Throwback Classics", "Hits from the past decades"),
];

const GENRES: [&str; 11] = [
    "Pop",
    "Hip-Hop",
    "Rock",
    "Electronic",
    "Latin",
    "Indie",
    "R&B",
    "K-pop",
    "Metal",
    "Jazz",
    "Classical",
];

/// Between 2:30 and 4:59, varying per position.
const BASE_DURATION_MS: u64 = 150_000;

fn artwork(index: usize) -> Vec<Image> {
    let photo = ARTWORK_PHOTOS[index % ARTWORK_PHOTOS.len()];
    vec![Image {
        url: format!("https://images.unsplash.com/{photo}?auto=format&fit=crop&w=300&h=300"),
        width: Some(300),
        height: Some(300),
    }]
}

/// Appends the round to a table entry once the table has wrapped around.
fn cycled(table: &[&str], index: usize) -> String {
    let name = table[index % table.len()];
    match index / table.len() {
        0 => name.to_string(),
        round => format!("{name} {}", round + 1),
    }
}

fn track(index: usize) -> Track {
    let n = index + 1;
    let album_index = index % ALBUMS.len();
    Track {
        id: format!("fallback-track-{n}"),
        name: cycled(&TRACK_TITLES, index),
        artists: vec![Artist {
            id: Some(format!("fallback-artist-{}", index % ARTISTS.len() + 1)),
            name: ARTISTS[index % ARTISTS.len()].to_string(),
        }],
        album: Album {
            id: Some(format!("fallback-album-{}", album_index + 1)),
            name: ALBUMS[album_index].to_string(),
            images: artwork(index),
        },
        duration_ms: BASE_DURATION_MS + (index as u64 * 37_000) % 150_000,
        preview_url: None,
    }
}

pub fn tracks(count: usize) -> Vec<Track> {
    (0..count).map(track).collect()
}

pub fn playlists(count: usize) -> Vec<Playlist> {
    let names = PLAYLISTS.map(|(name, _)| name);
    (0..count)
        .map(|index| Playlist {
            id: format!("fallback-playlist-{}", index + 1),
            name: cycled(&names, index),
            description: PLAYLISTS[index % PLAYLISTS.len()].1.to_string(),
            images: artwork(index),
            tracks_total: 20 + (index as u32 * 7) % 80,
        })
        .collect()
}

pub fn categories(count: usize) -> Vec<Category> {
    (0..count)
        .map(|index| Category {
            id: format!("fallback-category-{}", index + 1),
            name: cycled(&GENRES, index),
            icons: artwork(index),
        })
        .collect()
}

/// Case-insensitive match of `query` against the track title, its artists
/// and its album. A blank query matches everything.
pub fn matches(track: &Track, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    track.name.to_lowercase().contains(&query)
        || track.album.name.to_lowercase().contains(&query)
        || track
            .artists
            .iter()
            .any(|artist| artist.name.to_lowercase().contains(&query))
}

/// Up to `count` synthetic tracks matching `query`.
///
/// The result may be shorter than `count`, or empty, when few synthetic
/// tracks match.
pub fn search_tracks(query: &str, count: usize) -> Vec<Track> {
    tracks(SEARCH_POOL_SIZE.max(count))
        .into_iter()
        .filter(|track| matches(track, query))
        .take(count)
        .collect()
}
