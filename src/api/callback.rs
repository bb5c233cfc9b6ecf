use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{config::SpotifyConfig, spotify, types::PkceToken, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
    Extension(spotify_config): Extension<Arc<SpotifyConfig>>,
) -> Html<&'static str> {
    if let Some(err) = params.get("error") {
        warning!("Spotify denied the authorization: {}", err);
        return Html("<h4>Authorization denied.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(pkce_state) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if params.get("state") != Some(&pkce_state.state) {
        warning!("Callback state does not match the authorization request.");
        return Html("<h4>State mismatch.</h4>");
    }

    let verifier = pkce_state.code_verifier.clone();

    match spotify::auth::exchange_code_pkce(&spotify_config, code, &verifier).await {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
