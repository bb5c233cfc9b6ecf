use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::config::SpotifyConfig;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier() -> String {
    random_alphanumeric(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value echoed back by the authorization server to tie the callback to this run.
pub fn generate_state() -> String {
    random_alphanumeric(16)
}

/// Builds the Spotify consent page URL with all query parameters encoded.
pub fn build_authorize_url(spotify: &SpotifyConfig, code_challenge: &str, state: &str) -> String {
    let params = [
        ("client_id", spotify.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", spotify.redirect_uri.as_str()),
        ("code_challenge_method", "S256"),
        ("code_challenge", code_challenge),
        ("state", state),
        ("scope", spotify.scope.as_str()),
    ];

    match Url::parse_with_params(&spotify.auth_url, &params) {
        Ok(url) => url.to_string(),
        Err(_) => format!(
            "{}?{}",
            spotify.auth_url,
            params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&")
        ),
    }
}
