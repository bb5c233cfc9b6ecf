//! # Transfer Module
//!
//! Moves playlists from the source to the destination catalog:
//!
//! ```text
//! enumerator ──▶ for each playlist:
//!                  guard ──▶ skip, or
//!                  enumerator (tracks) ──▶ resolver ──▶ builder
//!                report (progress lines, summary)
//! ```
//!
//! Playlists are processed one at a time, and the tracks of a playlist are
//! searched one at a time. A track failure never fails its playlist, and a
//! playlist failure never stops the run, except for authentication failures.

pub mod builder;
pub mod enumerator;
pub mod guard;
pub mod report;
pub mod resolver;

use crate::{
    catalog::{DestinationCatalog, SourceCatalog},
    error::TransferError,
    types::SourcePlaylist,
};

use guard::DuplicateGuard;
use report::Reporter;

pub const DEFAULT_DESCRIPTION: &str = "Imported from Spotify";

#[derive(Debug)]
pub enum Outcome {
    Success,
    SkippedDuplicate,
    Failed(TransferError),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::SkippedDuplicate => "skipped",
            Outcome::Failed(_) => "failed",
        }
    }
}

/// What happened to one source playlist.
#[derive(Debug)]
pub struct TransferResult {
    pub playlist: String,
    pub destination_id: Option<String>,
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
    pub absent: usize,
    pub outcome: Outcome,
}

impl TransferResult {
    fn new(playlist: &str, outcome: Outcome) -> Self {
        Self {
            playlist: playlist.to_string(),
            destination_id: None,
            matched: Vec::new(),
            unmatched: Vec::new(),
            absent: 0,
            outcome,
        }
    }

    pub fn processed(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub results: Vec<TransferResult>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Success))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedDuplicate))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// The error that stopped the run early, if any.
    pub fn aborted(&self) -> Option<&TransferError> {
        match self.results.last().map(|r| &r.outcome) {
            Some(Outcome::Failed(err)) if err.is_fatal() => Some(err),
            _ => None,
        }
    }

    pub fn get(&self, playlist: &str) -> Option<&TransferResult> {
        self.results.iter().find(|r| r.playlist == playlist)
    }
}

#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub description: String,
    /// Restrict the run to these source playlist names (ignoring case). Empty means all.
    pub only: Vec<String>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            only: Vec::new(),
        }
    }
}

/// Drives a transfer run over borrowed catalog clients.
pub struct Orchestrator<'a, S, D> {
    source: &'a S,
    destination: &'a D,
    options: TransferOptions,
    reporter: Reporter,
}

impl<'a, S: SourceCatalog, D: DestinationCatalog> Orchestrator<'a, S, D> {
    pub fn new(source: &'a S, destination: &'a D, options: TransferOptions) -> Self {
        Self {
            source,
            destination,
            options,
            reporter: Reporter::new(),
        }
    }

    /// Transfers every owned source playlist.
    ///
    /// Fails only if the source playlists cannot be listed. An authentication
    /// failure during a playlist ends the run early; the report then holds the
    /// results up to and including that playlist.
    pub async fn run(&self) -> Result<RunReport, TransferError> {
        let mut playlists = enumerator::owned_playlists(self.source).await?;
        if !self.options.only.is_empty() {
            let wanted: Vec<String> = self.options.only.iter().map(|n| n.to_lowercase()).collect();
            playlists.retain(|p| wanted.contains(&p.name.to_lowercase()));
        }

        self.reporter.playlists_found(playlists.len());

        let mut guard = DuplicateGuard::new();
        let mut report = RunReport::default();

        for playlist in &playlists {
            let result = self.transfer_playlist(playlist, &mut guard).await;
            self.reporter.finished(&result);

            let fatal = matches!(&result.outcome, Outcome::Failed(err) if err.is_fatal());
            report.results.push(result);
            if fatal {
                break;
            }
        }

        self.reporter.summary(&report);
        Ok(report)
    }

    async fn transfer_playlist(
        &self,
        playlist: &SourcePlaylist,
        guard: &mut DuplicateGuard,
    ) -> TransferResult {
        let name = playlist.name.as_str();

        if guard.is_duplicate(self.destination, name).await {
            self.reporter.skipped(name);
            return TransferResult::new(name, Outcome::SkippedDuplicate);
        }

        self.reporter.transferring(name);

        let entries = match enumerator::playlist_entries(self.source, &playlist.id).await {
            Ok(entries) => entries,
            Err(err) => return TransferResult::new(name, Outcome::Failed(err)),
        };
        self.reporter.tracks_found(entries.len());

        let resolution = resolver::resolve_all(self.destination, &entries, &self.reporter).await;
        self.reporter.resolution(&resolution);

        let built = builder::build(
            self.destination,
            guard,
            name,
            &self.options.description,
            &resolution.matched,
            &self.reporter,
        )
        .await;

        let mut result = TransferResult {
            playlist: name.to_string(),
            destination_id: None,
            matched: resolution.matched,
            unmatched: resolution.unmatched,
            absent: resolution.absent,
            outcome: Outcome::Success,
        };

        match built {
            Ok(None) => result.outcome = Outcome::SkippedDuplicate,
            Ok(Some(built)) => {
                guard.remember(name);
                guard.remember(&built.name);
                result.destination_id = Some(built.id);
            }
            Err(err) => {
                if let TransferError::AddItems { playlist_id, .. } = &err {
                    guard.remember(name);
                    result.destination_id = Some(playlist_id.clone());
                }
                result.outcome = Outcome::Failed(err);
            }
        }

        result
    }
}
