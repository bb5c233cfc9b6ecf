//! Catalog client seams.
//!
//! The transfer core only talks to the streaming services through these two
//! traits. [`crate::spotify::SpotifyClient`] and [`crate::ytmusic::YtMusicClient`]
//! are the production implementations; tests use in-memory fakes.
//!
//! Both traits are used through generics, never as trait objects.
#![allow(async_fn_in_trait)]

use crate::{
    error::CatalogError,
    types::{DestinationPlaylist, MediaKind, Page, PlaylistEntry, SearchMatch, SourcePlaylist},
};

/// The streaming service playlists are read from.
pub trait SourceCatalog {
    /// Identifier of the authenticated user.
    async fn current_user_id(&self) -> Result<String, CatalogError>;

    /// One page of the playlists in the user's library, including followed ones.
    ///
    /// `cursor` is `None` for the first page and the previous page's `next` afterwards.
    async fn list_user_playlists(
        &self,
        cursor: Option<&str>,
    ) -> Result<Page<SourcePlaylist>, CatalogError>;

    /// One page of the entries of a playlist, in playlist order.
    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<PlaylistEntry>, CatalogError>;
}

/// The streaming service playlists are created on.
pub trait DestinationCatalog {
    async fn list_library_playlists(&self) -> Result<Vec<DestinationPlaylist>, CatalogError>;

    /// Searches the catalog. Results are in the service's ranking order.
    async fn search(&self, query: &str, kind: MediaKind)
    -> Result<Vec<SearchMatch>, CatalogError>;

    /// Creates an empty playlist and returns its identifier.
    async fn create_playlist(&self, name: &str, description: &str)
    -> Result<String, CatalogError>;

    /// Appends items to a playlist in one call. Callers respect the batch limit.
    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError>;
}
