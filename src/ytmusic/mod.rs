//! # YouTube Music Integration Module
//!
//! The destination catalog, spoken to over the InnerTube API that the YouTube
//! Music web client uses (`https://music.youtube.com/youtubei/v1`).
//!
//! - [`auth`] - Browser-session and OAuth request authentication, selected by
//!   configuration.
//! - [`parse`] - Request bodies and response parsing.
//!
//! ## Endpoints
//!
//! - `browse` (`FEmusic_liked_playlists`) - library playlists, with continuations
//! - `search` - catalog search filtered to songs
//! - `playlist/create` - create a private playlist
//! - `browse/edit_playlist` - append videos to a playlist

pub mod auth;
pub mod parse;

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    catalog::DestinationCatalog,
    config::DestinationAuth,
    error::CatalogError,
    http,
    types::{DestinationPlaylist, MediaKind, SearchMatch},
};
use auth::YtAuth;

const API_URL: &str = "https://music.youtube.com/youtubei/v1";
/// Upper bound on continuation requests when listing the library.
const MAX_LIBRARY_PAGES: usize = 50;

/// Authenticated YouTube Music client.
pub struct YtMusicClient {
    http: Client,
    auth: Mutex<YtAuth>,
    language: String,
}

impl YtMusicClient {
    /// Loads the credentials selected by `config`. Fails with [`CatalogError::Auth`]
    /// if the credential file is missing or unusable.
    pub async fn connect(config: &DestinationAuth) -> Result<Self, CatalogError> {
        Ok(Self {
            http: Client::new(),
            auth: Mutex::new(YtAuth::load(config).await?),
            language: "en".to_string(),
        })
    }

    async fn post(
        &self,
        endpoint: &str,
        mut body: Value,
        query: &[(&str, &str)],
    ) -> Result<Value, CatalogError> {
        let headers = self.auth.lock().await.headers(&self.http).await?;
        let date = Utc::now().format("%Y%m%d").to_string();
        body["context"] = parse::context(&date, &self.language);

        let request = self
            .http
            .post(format!("{}/{}", API_URL, endpoint))
            .query(&[("alt", "json")])
            .query(query)
            .headers(headers)
            .json(&body);

        let response = http::send(request).await?;
        Ok(response.json::<Value>().await?)
    }
}

impl DestinationCatalog for YtMusicClient {
    async fn list_library_playlists(&self) -> Result<Vec<DestinationPlaylist>, CatalogError> {
        let body = serde_json::json!({ "browseId": parse::LIBRARY_PLAYLISTS_BROWSE_ID });
        let mut response = self.post("browse", body, &[]).await?;
        let mut playlists = parse::library_playlists(&response);

        for _ in 0..MAX_LIBRARY_PAGES {
            let Some(token) = parse::continuation_token(&response) else {
                break;
            };
            let query = [
                ("ctoken", token.as_str()),
                ("continuation", token.as_str()),
                ("type", "next"),
            ];
            response = self.post("browse", serde_json::json!({}), &query).await?;
            playlists.extend(parse::library_playlists(&response));
        }

        Ok(playlists)
    }

    async fn search(
        &self,
        query: &str,
        kind: MediaKind,
    ) -> Result<Vec<SearchMatch>, CatalogError> {
        let response = self
            .post("search", parse::search_body(query, kind), &[])
            .await?;
        Ok(parse::search_results(&response))
    }

    async fn create_playlist(&self, name: &str, description: &str) -> Result<String, CatalogError> {
        let response = self
            .post(
                "playlist/create",
                parse::create_playlist_body(name, description),
                &[],
            )
            .await?;

        parse::created_playlist_id(&response).ok_or_else(|| {
            CatalogError::Decode(format!("no playlistId in create response for '{}'", name))
        })
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        if item_ids.is_empty() {
            return Ok(());
        }

        let response = self
            .post(
                "browse/edit_playlist",
                parse::add_items_body(playlist_id, item_ids),
                &[],
            )
            .await?;

        match parse::edit_status(&response).as_deref() {
            Some("STATUS_SUCCEEDED") => Ok(()),
            other => Err(CatalogError::Api {
                status: 200,
                message: format!("edit_playlist returned {}", other.unwrap_or("no status")),
            }),
        }
    }
}
