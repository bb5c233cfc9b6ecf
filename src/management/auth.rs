use std::path::PathBuf;

use chrono::Utc;

use crate::{config, config::SpotifyConfig, error::CatalogError, spotify, types::Token};

/// Seconds before the real expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Owns the cached Spotify token and keeps it fresh.
pub struct TokenManager {
    token: Token,
    spotify: SpotifyConfig,
}

impl TokenManager {
    pub fn new(token: Token, spotify: SpotifyConfig) -> Self {
        TokenManager { token, spotify }
    }

    /// Loads the token written by `plmigrate auth`.
    pub async fn load(spotify: SpotifyConfig) -> Result<Self, CatalogError> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path).await.map_err(|e| {
            CatalogError::Auth(format!(
                "no cached Spotify token at {} ({}). Please run plmigrate auth",
                path.display(),
                e
            ))
        })?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self { token, spotify })
    }

    pub async fn persist(&self) -> Result<(), CatalogError> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    /// Returns an access token, refreshing and persisting it first if it is about to expire.
    pub async fn get_valid_token(&mut self) -> Result<String, CatalogError> {
        if self.is_expired() {
            let mut new_token = spotify::auth::refresh_token(&self.spotify, &self.token.refresh_token)
                .await
                .map_err(|e| CatalogError::Auth(format!("cannot refresh Spotify token: {}", e)))?;
            // Spotify does not always rotate the refresh token
            if new_token.refresh_token.is_empty() {
                new_token.refresh_token = self.token.refresh_token.clone();
            }
            self.token = new_token;
            if let Err(e) = self.persist().await {
                crate::warning!("Failed to save refreshed token: {}", e);
            }
        }

        Ok(self.token.access_token.clone())
    }

    fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    pub fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}
