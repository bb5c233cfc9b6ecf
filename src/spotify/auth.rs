use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyConfig,
    error, http,
    error::CatalogError,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// How long to wait for the browser to hit the callback.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

impl From<TokenResponse> for Token {
    fn from(res: TokenResponse) -> Self {
        Token {
            access_token: res.access_token,
            refresh_token: res.refresh_token.unwrap_or_default(),
            scope: res.scope.unwrap_or_default(),
            expires_in: res.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the Authorization Code flow with PKCE and caches the resulting token.
///
/// Starts the local callback server, opens the Spotify consent page in the
/// browser and waits up to a minute for the callback to deliver a token.
pub async fn auth(
    spotify: &SpotifyConfig,
    server_addr: &str,
    shared_state: Arc<Mutex<Option<PkceToken>>>,
) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let server_state = Arc::clone(&shared_state);
    let server_config = Arc::new(spotify.clone());
    let addr = server_addr.to_string();
    tokio::spawn(async move {
        start_api_server(&addr, server_state, server_config).await;
    });

    let auth_url = utils::build_authorize_url(spotify, &code_challenge, &state);

    // verifier must be in place before the browser can call back
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            state,
            token: None,
        });
    }

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(t) => {
            let token_manager = TokenManager::new(t, spotify.clone());
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save token to cache: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(token) = &pkce_token.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

pub async fn refresh_token(spotify: &SpotifyConfig, refresh_token: &str) -> Result<Token, CatalogError> {
    let request = Client::new()
        .post(&spotify.token_url)
        .basic_auth(&spotify.client_id, Some(&spotify.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", spotify.client_id.as_str()),
        ]);

    let res = http::send(request).await?;
    Ok(res.json::<TokenResponse>().await?.into())
}

pub async fn exchange_code_pkce(
    spotify: &SpotifyConfig,
    code: &str,
    verifier: &str,
) -> Result<Token, CatalogError> {
    let request = Client::new()
        .post(&spotify.token_url)
        .basic_auth(&spotify.client_id, Some(&spotify.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", spotify.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", spotify.redirect_uri.as_str()),
        ]);

    let res = http::send(request).await?;
    Ok(res.json::<TokenResponse>().await?.into())
}
