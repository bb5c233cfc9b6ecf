//! # CLI Module
//!
//! User-facing commands. Each one builds the clients it needs from the
//! [`crate::config::Config`] loaded at startup and reports through the
//! console macros.
//!
//! - [`auth`] - Spotify authorization (PKCE) and token caching
//! - [`list_playlists`] - Spotify playlists owned by the current user
//! - [`transfer`] - Migrate owned playlists to YouTube Music
//!
//! ```bash
//! plmigrate auth
//! plmigrate playlists
//! plmigrate transfer --playlist "Road Trip"
//! ```

mod auth;
mod playlists;
mod transfer;

pub use auth::auth;
pub use playlists::list_playlists;
pub use transfer::transfer;
