//! Spotify to YouTube Music playlist migration library
//!
//! This library migrates the playlists a user owns on Spotify to YouTube Music.
//! Every track is matched by searching the destination catalog for its title and
//! primary artist, and the playlist is recreated on the destination unless a
//! playlist with the same name already exists there.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `catalog` - Traits for the source and destination catalog clients
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loading from environment variables and `.env` files
//! - `error` - Error types for catalog clients and the transfer core
//! - `http` - Shared request sending with retry of transient failures
//! - `management` - Token caching for the Spotify session
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client (source catalog)
//! - `transfer` - Track matching and playlist transfer core
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `ytmusic` - YouTube Music client (destination catalog)
//!
//! # Example
//!
//! ```
//! use plmigrate::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> plmigrate::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     cli::transfer(&config, Vec::new(), None).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod management;
pub mod server;
pub mod spotify;
pub mod transfer;
pub mod types;
pub mod utils;
pub mod ytmusic;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI plumbing where any error is simply reported to the user.
/// The transfer core uses the typed errors from [`error`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} playlists to process", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal errors: invalid configuration, an expired session or a
/// source library that cannot be listed. Code after this macro does not run.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a failure message with a red cross without exiting.
///
/// Used for playlist-level failures that are reported while the run goes on
/// with the next playlist.
#[macro_export]
macro_rules! failure {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "x".red().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Could not fetch YouTube Music playlists: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
