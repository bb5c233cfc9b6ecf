//! # API Module
//!
//! HTTP endpoints of the local server started during `plmigrate auth`.
//!
//! - [`callback`] - Receives the authorization code from Spotify, checks the
//!   `state` parameter and exchanges the code (plus PKCE verifier) for a token.
//! - [`health`] - Reports status and version, handy to check the redirect URI
//!   points at the running server.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
