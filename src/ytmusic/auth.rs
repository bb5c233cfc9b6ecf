use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::{config::DestinationAuth, error::CatalogError, http, warning};

pub const ORIGIN: &str = "https://music.youtube.com";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:88.0) Gecko/20100101 Firefox/88.0";
/// Headers from a browser dump that must not be replayed.
const SKIPPED_HEADERS: [&str; 5] = [
    "authorization",
    "content-length",
    "host",
    "accept-encoding",
    "content-encoding",
];

/// Request authentication for YouTube Music.
pub enum YtAuth {
    Browser(BrowserSession),
    OAuth(OAuthSession),
}

impl YtAuth {
    pub async fn load(config: &DestinationAuth) -> Result<Self, CatalogError> {
        match config {
            DestinationAuth::Browser { headers_file } => {
                let raw = read_credentials(headers_file).await?;
                Ok(YtAuth::Browser(BrowserSession::from_json(&raw)?))
            }
            DestinationAuth::OAuth {
                token_file,
                client_id,
                client_secret,
            } => {
                let raw = read_credentials(token_file).await?;
                let token: OAuthToken = serde_json::from_str(&raw).map_err(|e| {
                    CatalogError::Auth(format!("invalid token file {}: {}", token_file.display(), e))
                })?;
                Ok(YtAuth::OAuth(OAuthSession {
                    token,
                    path: token_file.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                }))
            }
        }
    }

    /// Headers for the next request. May refresh an OAuth token first.
    pub async fn headers(&mut self, http: &Client) -> Result<HeaderMap, CatalogError> {
        let now = Utc::now().timestamp();
        match self {
            YtAuth::Browser(session) => session.headers(now),
            YtAuth::OAuth(session) => session.headers(http, now).await,
        }
    }
}

async fn read_credentials(path: &Path) -> Result<String, CatalogError> {
    async_fs::read_to_string(path).await.map_err(|e| {
        CatalogError::Auth(format!(
            "cannot read YouTube Music credentials {}: {}",
            path.display(),
            e
        ))
    })
}

/// Headers captured from a logged-in browser. The SAPISID cookie signs every request.
pub struct BrowserSession {
    headers: HeaderMap,
    sapisid: String,
}

impl BrowserSession {
    /// Parses a JSON object of header names to values.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let dump: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| CatalogError::Auth(format!("invalid browser headers file: {}", e)))?;

        let mut headers = HeaderMap::new();
        for (key, value) in dump {
            let key = key.to_lowercase();
            let Some(value) = value.as_str() else {
                continue;
            };
            if SKIPPED_HEADERS.contains(&key.as_str()) {
                continue;
            }
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warning!("Ignoring malformed browser header {}", key),
            }
        }

        let cookie = headers
            .get("cookie")
            .and_then(|c| c.to_str().ok())
            .ok_or_else(|| CatalogError::Auth("browser headers contain no cookie".into()))?;
        let sapisid = sapisid_from_cookie(cookie).ok_or_else(|| {
            CatalogError::Auth("cookie lacks __Secure-3PAPISID, log in again and re-export".into())
        })?;

        Ok(Self { headers, sapisid })
    }

    pub fn headers(&self, now: i64) -> Result<HeaderMap, CatalogError> {
        let mut headers = base_headers();
        headers.extend(self.headers.clone());
        headers.insert(
            AUTHORIZATION,
            header_value(&sapisid_hash(&self.sapisid, ORIGIN, now))?,
        );
        Ok(headers)
    }
}

pub fn sapisid_from_cookie(cookie: &str) -> Option<String> {
    let pairs: Vec<(&str, &str)> = cookie
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .collect();

    ["__Secure-3PAPISID", "SAPISID"].iter().find_map(|wanted| {
        pairs
            .iter()
            .find(|(name, _)| name == wanted)
            .map(|(_, value)| value.to_string())
    })
}

/// `SAPISIDHASH {ts}_{sha1("{ts} {sapisid} {origin}")}`
pub fn sapisid_hash(sapisid: &str, origin: &str, timestamp: i64) -> String {
    let digest = Sha1::digest(format!("{} {} {}", timestamp, sapisid, origin).as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    format!("SAPISIDHASH {}_{}", timestamp, hex)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Unix timestamp the access token expires at.
    #[serde(default)]
    pub expires_at: i64,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
    scope: Option<String>,
    token_type: Option<String>,
}

pub struct OAuthSession {
    token: OAuthToken,
    path: PathBuf,
    client_id: String,
    client_secret: String,
}

impl OAuthSession {
    fn is_expired(&self, now: i64) -> bool {
        now + 60 >= self.token.expires_at
    }

    async fn headers(&mut self, http: &Client, now: i64) -> Result<HeaderMap, CatalogError> {
        if self.is_expired(now) {
            self.refresh(http, now).await?;
        }

        let mut headers = base_headers();
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", self.token.access_token))?,
        );
        headers.insert("x-goog-request-time", header_value(&now.to_string())?);
        Ok(headers)
    }

    async fn refresh(&mut self, http: &Client, now: i64) -> Result<(), CatalogError> {
        let request = http.post(GOOGLE_TOKEN_URL).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", self.token.refresh_token.as_str()),
        ]);

        let res: RefreshResponse = http::send(request)
            .await
            .map_err(|e| CatalogError::Auth(format!("cannot refresh YouTube Music token: {}", e)))?
            .json()
            .await?;

        self.token.access_token = res.access_token;
        self.token.expires_at = now + res.expires_in;
        if res.scope.is_some() {
            self.token.scope = res.scope;
        }
        if res.token_type.is_some() {
            self.token.token_type = res.token_type;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        if let Err(e) = async_fs::write(&self.path, json).await {
            warning!("Failed to save refreshed token to {}: {}", self.path.display(), e);
        }
        Ok(())
    }
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("origin", HeaderValue::from_static(ORIGIN));
    headers.insert("x-origin", HeaderValue::from_static(ORIGIN));
    headers
}

fn header_value(value: &str) -> Result<HeaderValue, CatalogError> {
    HeaderValue::from_str(value).map_err(|e| CatalogError::Auth(format!("invalid header: {}", e)))
}
