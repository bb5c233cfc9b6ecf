use std::collections::HashSet;

use crate::{catalog::DestinationCatalog, types::DestinationPlaylist, warning};

/// True iff a playlist named `name` (ignoring case) is in `existing`.
pub fn playlist_exists(name: &str, existing: &[DestinationPlaylist]) -> bool {
    let wanted = name.to_lowercase();
    existing.iter().any(|p| p.name.to_lowercase() == wanted)
}

/// Lists destination playlists. A failed listing is treated as an empty library.
pub async fn existing_playlists<D: DestinationCatalog>(destination: &D) -> Vec<DestinationPlaylist> {
    match destination.list_library_playlists().await {
        Ok(playlists) => playlists,
        Err(e) => {
            warning!("Could not fetch YouTube Music playlists: {}", e);
            warning!("Will proceed without duplicate checking");
            Vec::new()
        }
    }
}

/// Decides whether a playlist has to be skipped because it already exists.
///
/// The destination library is listed again for every check. Names created
/// earlier in the same run are remembered as well, since a fresh playlist may
/// not show up in the listing right away.
#[derive(Debug, Default)]
pub struct DuplicateGuard {
    created: HashSet<String>,
}

impl DuplicateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_duplicate<D: DestinationCatalog>(&self, destination: &D, name: &str) -> bool {
        if self.created.contains(&name.to_lowercase()) {
            return true;
        }

        let existing = existing_playlists(destination).await;
        playlist_exists(name, &existing)
    }

    pub fn remember(&mut self, name: &str) {
        self.created.insert(name.to_lowercase());
    }
}
