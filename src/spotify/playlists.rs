use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::{
    catalog::SourceCatalog,
    config::SpotifyConfig,
    error::CatalogError,
    http,
    management::TokenManager,
    types::{
        CurrentUserResponse, Page, Paging, Playlist, PlaylistEntry, PlaylistTrackItem,
        SourcePlaylist, SourceTrack,
    },
};

const PLAYLISTS_PAGE_SIZE: u32 = 50;
const TRACKS_PAGE_SIZE: u32 = 100;

/// Authenticated Spotify Web API client.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    /// Opens a session from the cached token. Fails with [`CatalogError::Auth`]
    /// if `plmigrate auth` has not been run yet.
    pub async fn connect(spotify: &SpotifyConfig) -> Result<Self, CatalogError> {
        let tokens = TokenManager::load(spotify.clone()).await?;
        Ok(Self {
            http: Client::new(),
            api_url: spotify.api_url.trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let token = self.tokens.lock().await.get_valid_token().await?;
        let response = http::send(self.http.get(url).bearer_auth(token)).await?;
        Ok(response.json::<T>().await?)
    }
}

impl SourceCatalog for SpotifyClient {
    async fn current_user_id(&self) -> Result<String, CatalogError> {
        let url = format!("{}/me", self.api_url);
        let me: CurrentUserResponse = self.get(&url).await?;
        Ok(me.id)
    }

    async fn list_user_playlists(
        &self,
        cursor: Option<&str>,
    ) -> Result<Page<SourcePlaylist>, CatalogError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{uri}/me/playlists?limit={limit}",
                uri = self.api_url,
                limit = PLAYLISTS_PAGE_SIZE
            ),
        };

        let page: Paging<Playlist> = self.get(&url).await?;
        Ok(playlist_page(page))
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<PlaylistEntry>, CatalogError> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{uri}/playlists/{id}/tracks?limit={limit}",
                uri = self.api_url,
                id = playlist_id,
                limit = TRACKS_PAGE_SIZE
            ),
        };

        let page: Paging<PlaylistTrackItem> = self.get(&url).await?;
        Ok(track_page(page))
    }
}

/// Converts a page of `/me/playlists`, dropping `null` entries.
pub fn playlist_page(page: Paging<Playlist>) -> Page<SourcePlaylist> {
    Page {
        items: page
            .items
            .into_iter()
            .flatten()
            .map(|p| SourcePlaylist {
                id: p.id,
                name: p.name,
                owner_id: p.owner.id,
            })
            .collect(),
        next: page.next,
    }
}

/// Converts a page of playlist tracks. A `null` item keeps its position as absent.
pub fn track_page(page: Paging<PlaylistTrackItem>) -> Page<PlaylistEntry> {
    Page {
        items: page
            .items
            .into_iter()
            .map(|item| item.map_or(PlaylistEntry::Absent, playlist_entry))
            .collect(),
        next: page.next,
    }
}

/// Maps a playlist item to an entry. Removed tracks come back as `null` or without a name.
pub fn playlist_entry(item: PlaylistTrackItem) -> PlaylistEntry {
    match item.track {
        Some(track) if !track.name.trim().is_empty() => {
            let artist = track
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default();
            PlaylistEntry::Track(SourceTrack::new(track.name, artist))
        }
        _ => PlaylistEntry::Absent,
    }
}
