//! Configuration management for plmigrate.
//!
//! Configuration is read once at startup from environment variables. Values
//! can be placed in a `.env` file either in the working directory or in the
//! platform-specific local data directory:
//!
//! - Linux: `~/.local/share/plmigrate/.env`
//! - macOS: `~/Library/Application Support/plmigrate/.env`
//! - Windows: `%LOCALAPPDATA%/plmigrate/.env`
//!
//! Environment variables that are already set take precedence over both files.
//! All missing required values are reported together, before any API call.

use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_SCOPE: &str = "playlist-read-private playlist-read-collaborative";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_BROWSER_FILE: &str = "browser.json";
pub const DEFAULT_OAUTH_FILE: &str = "oauth.json";

#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
}

/// How requests to YouTube Music are authenticated.
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationAuth {
    /// Request headers (including cookies) copied from a logged-in browser session.
    Browser { headers_file: PathBuf },
    /// OAuth token file, refreshed with the given client credentials.
    OAuth {
        token_file: PathBuf,
        client_id: String,
        client_secret: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub server_addr: String,
    pub destination: DestinationAuth,
}

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the raw value for a key.
    ///
    /// Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut missing: Vec<&'static str> = Vec::new();
        let mut required = |key: &'static str| match get(key) {
            Some(v) => v,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let client_id = required("SPOTIFY_CLIENT_ID");
        let client_secret = required("SPOTIFY_CLIENT_SECRET");
        let redirect_uri = required("SPOTIFY_REDIRECT_URI");

        let destination = match get("YTMUSIC_AUTH")
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            None | Some("browser") => DestinationAuth::Browser {
                headers_file: PathBuf::from(
                    get("YTMUSIC_BROWSER_FILE").unwrap_or_else(|| DEFAULT_BROWSER_FILE.into()),
                ),
            },
            Some("oauth") => DestinationAuth::OAuth {
                token_file: PathBuf::from(
                    get("YTMUSIC_OAUTH_FILE").unwrap_or_else(|| DEFAULT_OAUTH_FILE.into()),
                ),
                client_id: required("YTMUSIC_OAUTH_CLIENT_ID"),
                client_secret: required("YTMUSIC_OAUTH_CLIENT_SECRET"),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "YTMUSIC_AUTH",
                    value: other.to_string(),
                });
            }
        };

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Config {
            spotify: SpotifyConfig {
                client_id,
                client_secret,
                redirect_uri,
                scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SPOTIFY_SCOPE.into()),
                api_url: get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.into()),
                auth_url: get("SPOTIFY_API_AUTH_URL")
                    .unwrap_or_else(|| DEFAULT_SPOTIFY_AUTH_URL.into()),
                token_url: get("SPOTIFY_API_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.into()),
            },
            server_addr: get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into()),
            destination,
        })
    }
}

/// Loads `.env` files from the working directory and the local data directory.
///
/// Creates `<data_local_dir>/plmigrate` if needed. Missing `.env` files are not
/// an error, the values may come from the real environment.
pub async fn load_env() -> crate::Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    // dotenv never overrides variables that are already set, so the working
    // directory file wins over the data directory file.
    load_env_file(Path::new(".env"))?;
    load_env_file(&path)
}

/// Loads one `.env` file. A missing file is skipped, a malformed one is an error.
pub fn load_env_file(path: &Path) -> crate::Res<()> {
    match dotenv::from_path(path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("cannot read {}: {}", path.display(), e).into()),
    }
}

/// Returns `<data_local_dir>/plmigrate`, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("plmigrate");
    path
}
