use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error::{CatalogError, TransferError},
    failure, info, success,
    types::{SourceTrack, SummaryTableRow},
    warning,
};

use super::{Outcome, RunReport, TransferResult, resolver::Resolution};

/// How many unmatched tracks are listed per playlist.
pub const UNMATCHED_PREVIEW: usize = 5;

/// Lines listing the first unmatched tracks, plus a notice for the rest.
pub fn unmatched_preview(unmatched: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = unmatched
        .iter()
        .take(UNMATCHED_PREVIEW)
        .map(|t| format!("  - {}", t))
        .collect();

    if unmatched.len() > UNMATCHED_PREVIEW {
        lines.push(format!(
            "  ... and {} more",
            unmatched.len() - UNMATCHED_PREVIEW
        ));
    }
    lines
}

pub fn summary_rows(report: &RunReport) -> Vec<SummaryTableRow> {
    report
        .results
        .iter()
        .map(|r| SummaryTableRow {
            playlist: r.playlist.clone(),
            outcome: r.outcome.label().to_string(),
            found: match r.outcome {
                Outcome::SkippedDuplicate => "-".to_string(),
                _ => format!("{}/{}", r.matched.len(), r.processed()),
            },
            unmatched: r.unmatched.len(),
        })
        .collect()
}

/// Console output of a transfer run. Never influences control flow.
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn playlists_found(&self, count: usize) {
        info!("Found {} playlists to process", count);
    }

    pub fn skipped(&self, name: &str) {
        info!("Skipping '{}' - already exists in YouTube Music", name);
    }

    pub fn transferring(&self, name: &str) {
        info!("Transferring playlist: {}", name);
    }

    pub fn tracks_found(&self, count: usize) {
        info!("Found {} tracks in Spotify playlist", count);
    }

    pub fn search_progress(&self, total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb
    }

    pub fn search_failed(&self, track: &SourceTrack, err: &TransferError) {
        warning!("Error searching {}: {}", track.describe(), err);
    }

    pub fn resolution(&self, resolution: &Resolution) {
        info!(
            "Successfully found {}/{} tracks on YouTube Music",
            resolution.matched.len(),
            resolution.processed()
        );
        if resolution.absent > 0 {
            info!(
                "Skipped {} unavailable tracks",
                resolution.absent
            );
        }

        if !resolution.unmatched.is_empty() {
            warning!("Could not find {} tracks:", resolution.unmatched.len());
            for line in unmatched_preview(&resolution.unmatched) {
                println!("    {}", line);
            }
        }
    }

    pub fn creation_retry(&self, name: &str, err: &CatalogError) {
        warning!(
            "Error creating playlist '{}' (trying with sanitized name): {}",
            name,
            err
        );
    }

    pub fn batch_added(&self, number: usize, size: usize) {
        info!("Added batch {} ({} tracks)", number, size);
    }

    pub fn finished(&self, result: &TransferResult) {
        match &result.outcome {
            Outcome::Success => success!("Successfully transferred '{}'", result.playlist),
            Outcome::SkippedDuplicate => {}
            Outcome::Failed(err) => failure!("Failed to transfer '{}': {}", result.playlist, err),
        }
    }

    pub fn summary(&self, report: &RunReport) {
        if report.results.is_empty() {
            info!("Nothing to transfer.");
            return;
        }

        println!("{}", Table::new(summary_rows(report)));
        info!(
            "{} transferred, {} skipped, {} failed",
            report.succeeded(),
            report.skipped(),
            report.failed()
        );
        if let Some(err) = report.aborted() {
            failure!("Run aborted: {}", err);
        }
    }
}
