//! # Spotify Integration Module
//!
//! The source catalog: everything plmigrate reads from Spotify.
//!
//! - [`auth`] - Authorization Code flow with PKCE. Opens the consent page,
//!   receives the code on the local callback server and exchanges it for a
//!   token that [`crate::management::TokenManager`] caches and refreshes.
//! - [`playlists`] - [`SpotifyClient`], the [`crate::catalog::SourceCatalog`]
//!   implementation over the Web API.
//!
//! ## API Coverage
//!
//! - `GET /me` - identifier of the authenticated user
//! - `GET /me/playlists` - playlists in the user's library, 50 per page
//! - `GET /playlists/{id}/tracks` - playlist entries, 100 per page
//! - `POST /api/token` - code exchange and token refresh
//!
//! Pagination follows the `next` URL returned with every page; the URL is
//! handed to callers as an opaque cursor.

pub mod auth;
pub mod playlists;

pub use playlists::SpotifyClient;
