use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tabled::Table;

use crate::{
    config::Config, error, info, spotify::SpotifyClient, transfer::enumerator,
    types::PlaylistTableRow,
};

/// Prints the Spotify playlists a transfer would pick up.
pub async fn list_playlists(config: &Config) {
    let source = match SpotifyClient::connect(&config.spotify).await {
        Ok(client) => client,
        Err(e) => error!("Cannot open Spotify session: {}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching Spotify playlists...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let playlists = enumerator::owned_playlists(&source).await;
    pb.finish_and_clear();

    let playlists = match playlists {
        Ok(playlists) => playlists,
        Err(e) => error!("{}", e),
    };

    if playlists.is_empty() {
        info!("You do not own any Spotify playlists.");
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists
        .into_iter()
        .map(|p| PlaylistTableRow {
            name: p.name,
            id: p.id,
        })
        .collect();

    println!("{}", Table::new(rows));
}
