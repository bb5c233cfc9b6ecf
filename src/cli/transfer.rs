use crate::{
    config::Config,
    error,
    spotify::SpotifyClient,
    transfer::{DEFAULT_DESCRIPTION, Orchestrator, TransferOptions},
    ytmusic::YtMusicClient,
};

/// Runs a transfer with the production clients. Exits with code 1 if any
/// playlist failed or the run was aborted.
pub async fn transfer(config: &Config, only: Vec<String>, description: Option<String>) {
    let source = match SpotifyClient::connect(&config.spotify).await {
        Ok(client) => client,
        Err(e) => error!("Cannot open Spotify session: {}", e),
    };

    let destination = match YtMusicClient::connect(&config.destination).await {
        Ok(client) => client,
        Err(e) => error!("Cannot open YouTube Music session: {}", e),
    };

    let options = TransferOptions {
        description: description.unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        only,
    };

    match Orchestrator::new(&source, &destination, options).run().await {
        Ok(report) => {
            if report.failed() > 0 {
                std::process::exit(1);
            }
        }
        Err(e) => error!("{}", e),
    }
}
