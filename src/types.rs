use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub state: String,
    pub token: Option<Token>,
}

/// A playlist on the source catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlaylist {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

/// A playable track on the source catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTrack {
    pub title: String,
    pub artist: String,
}

impl SourceTrack {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Human readable `title - artist` used in reports.
    pub fn describe(&self) -> String {
        if self.artist.is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.artist)
        }
    }
}

/// One position of a source playlist.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistEntry {
    Track(SourceTrack),
    /// The referenced track no longer resolves to playable content.
    Absent,
}

/// One page of a paginated listing. `next` is an opaque cursor for the following page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DestinationPlaylist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub id: String,
}

/// Result filter for a destination search. Only songs are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Song,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub playlist: String,
    pub outcome: String,
    pub found: String,
    pub unmatched: usize,
}

// Spotify Web API payloads

/// A page of the Web API. Items can be `null`, e.g. for playlists that are no longer available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<Option<T>>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub owner: PlaylistOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}
