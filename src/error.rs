//! Error types shared by the catalog clients and the transfer core.
//!
//! [`CatalogError`] is what a catalog client returns for a single request.
//! [`TransferError`] classifies a catalog failure by the transfer step it
//! happened in, which decides whether the run, the playlist or only a single
//! track is affected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Session or token is missing, invalid or expired.
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api responded with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub fn is_auth(&self) -> bool {
        matches!(self, CatalogError::Auth(_))
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    /// Invalid session on either catalog. Aborts the run.
    #[error("{0}")]
    Auth(#[source] CatalogError),
    /// Source playlists could not be listed. Aborts the run.
    #[error("cannot list source playlists: {0}")]
    Enumeration(#[source] CatalogError),
    /// Tracks of one source playlist could not be listed.
    #[error("cannot list playlist tracks: {0}")]
    Tracks(#[source] CatalogError),
    /// Search for a single track failed.
    #[error("search failed: {0}")]
    Search(#[source] CatalogError),
    /// Playlist creation failed, including the retry with a sanitized name.
    #[error("cannot create playlist '{name}': {source}")]
    Creation { name: String, source: CatalogError },
    /// A batch could not be added. Earlier batches stay in the playlist.
    #[error("adding tracks to {playlist_id} stopped after {added} tracks: {source}")]
    AddItems {
        playlist_id: String,
        added: usize,
        source: CatalogError,
    },
}

impl TransferError {
    /// Wraps a catalog error, promoting authentication failures to [`TransferError::Auth`].
    pub fn classify(err: CatalogError, wrap: fn(CatalogError) -> TransferError) -> Self {
        if err.is_auth() {
            TransferError::Auth(err)
        } else {
            wrap(err)
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, TransferError::Auth(_) | TransferError::Enumeration(_))
    }
}
