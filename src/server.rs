use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config::SpotifyConfig, error, types::PkceToken};

/// Serves `/callback` and `/health` until the process exits.
pub async fn start_api_server(
    addr: &str,
    state: Arc<Mutex<Option<PkceToken>>>,
    spotify: Arc<SpotifyConfig>,
) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(spotify));

    let addr = match SocketAddr::from_str(addr) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address {}: {}", addr, e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind callback server to {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Callback server stopped: {}", e);
    }
}
