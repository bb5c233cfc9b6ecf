use crate::{
    catalog::DestinationCatalog,
    error::TransferError,
    types::{MediaKind, PlaylistEntry, SourceTrack},
};

use super::report::Reporter;

/// Outcome of resolving all entries of one playlist.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Resolution {
    /// Destination identifiers in source order.
    pub matched: Vec<String>,
    /// `title - artist` of tracks without a match, in source order.
    pub unmatched: Vec<String>,
    /// Entries skipped because of an absent-track marker.
    pub absent: usize,
}

impl Resolution {
    /// Tracks that were searched for, i.e. everything but absent entries.
    pub fn processed(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

pub fn search_query(track: &SourceTrack) -> String {
    format!("{} {}", track.title, track.artist).trim().to_string()
}

/// Searches the destination for one track. The first result is taken as the match.
pub async fn resolve<D: DestinationCatalog>(
    destination: &D,
    track: &SourceTrack,
) -> Result<Option<String>, TransferError> {
    let results = destination
        .search(&search_query(track), MediaKind::Song)
        .await
        .map_err(TransferError::Search)?;

    Ok(results.into_iter().next().map(|m| m.id))
}

/// Resolves entries one after the other. A failing search only marks its track unmatched.
pub async fn resolve_all<D: DestinationCatalog>(
    destination: &D,
    entries: &[PlaylistEntry],
    reporter: &Reporter,
) -> Resolution {
    let mut resolution = Resolution::default();
    let total = entries.len();
    let pb = reporter.search_progress(total as u64);

    for (i, entry) in entries.iter().enumerate() {
        pb.inc(1);
        let PlaylistEntry::Track(track) = entry else {
            resolution.absent += 1;
            continue;
        };

        pb.set_message(format!("Searching {}/{}: {}", i + 1, total, track.describe()));

        match resolve(destination, track).await {
            Ok(Some(id)) => resolution.matched.push(id),
            Ok(None) => resolution.unmatched.push(track.describe()),
            Err(e) => {
                pb.suspend(|| reporter.search_failed(track, &e));
                resolution.unmatched.push(track.describe());
            }
        }
    }

    pb.finish_and_clear();
    resolution
}
