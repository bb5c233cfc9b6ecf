use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use plmigrate::catalog::{DestinationCatalog, SourceCatalog};
use plmigrate::error::{CatalogError, TransferError};
use plmigrate::transfer::builder::{self, BATCH_LIMIT, FALLBACK_NAME};
use plmigrate::transfer::guard::{self, DuplicateGuard};
use plmigrate::transfer::report::Reporter;
use plmigrate::transfer::{Orchestrator, Outcome, TransferOptions, enumerator, resolver};
use plmigrate::types::{
    DestinationPlaylist, MediaKind, Page, PlaylistEntry, SearchMatch, SourcePlaylist, SourceTrack,
};

// Serves `items` in pages of `page_size`, the cursor being the start index.
fn paginate<T: Clone>(items: &[T], cursor: Option<&str>, page_size: usize) -> Page<T> {
    let start = cursor.map(|c| c.parse::<usize>().unwrap()).unwrap_or(0);
    let end = (start + page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        next: (end < items.len()).then(|| end.to_string()),
    }
}

struct FakeSource {
    user_id: String,
    playlists: Vec<SourcePlaylist>,
    tracks: HashMap<String, Vec<PlaylistEntry>>,
    page_size: usize,
    auth_expired: bool,
    failing_playlists: HashSet<String>,
}

impl FakeSource {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            playlists: Vec::new(),
            tracks: HashMap::new(),
            page_size: 2,
            auth_expired: false,
            failing_playlists: HashSet::new(),
        }
    }

    fn with_playlist(mut self, id: &str, name: &str, owner: &str, entries: Vec<PlaylistEntry>) -> Self {
        self.playlists.push(SourcePlaylist {
            id: id.to_string(),
            name: name.to_string(),
            owner_id: owner.to_string(),
        });
        self.tracks.insert(id.to_string(), entries);
        self
    }
}

impl SourceCatalog for FakeSource {
    async fn current_user_id(&self) -> Result<String, CatalogError> {
        if self.auth_expired {
            return Err(CatalogError::Auth("token expired".into()));
        }
        Ok(self.user_id.clone())
    }

    async fn list_user_playlists(
        &self,
        cursor: Option<&str>,
    ) -> Result<Page<SourcePlaylist>, CatalogError> {
        Ok(paginate(&self.playlists, cursor, self.page_size))
    }

    async fn list_playlist_tracks(
        &self,
        playlist_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<PlaylistEntry>, CatalogError> {
        if self.failing_playlists.contains(playlist_id) {
            return Err(CatalogError::Api {
                status: 500,
                message: "internal error".into(),
            });
        }
        let entries = self.tracks.get(playlist_id).cloned().unwrap_or_default();
        Ok(paginate(&entries, cursor, self.page_size))
    }
}

#[derive(Default)]
struct FakeDestination {
    library: Mutex<Vec<DestinationPlaylist>>,
    listing_fails: bool,
    // created playlists show up in the listing
    exposes_created: bool,
    results: HashMap<String, Vec<SearchMatch>>,
    failing_queries: HashSet<String>,
    ascii_only_names: bool,
    rejected_names: HashSet<String>,
    session_expired_on_create: bool,
    session_expired_on_add: bool,
    fail_add_call: Option<usize>,
    searches: Mutex<Vec<String>>,
    creations: Mutex<Vec<String>>,
    additions: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeDestination {
    fn with_library(names: &[&str]) -> Self {
        let dest = Self::default();
        dest.library.lock().unwrap().extend(names.iter().enumerate().map(|(i, n)| {
            DestinationPlaylist {
                id: format!("existing{}", i),
                name: n.to_string(),
            }
        }));
        dest
    }

    fn with_result(mut self, query: &str, ids: &[&str]) -> Self {
        self.results.insert(
            query.to_string(),
            ids.iter()
                .map(|id| SearchMatch { id: id.to_string() })
                .collect(),
        );
        self
    }

    fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    fn creations(&self) -> Vec<String> {
        self.creations.lock().unwrap().clone()
    }

    fn additions(&self) -> Vec<(String, Vec<String>)> {
        self.additions.lock().unwrap().clone()
    }
}

impl DestinationCatalog for FakeDestination {
    async fn list_library_playlists(&self) -> Result<Vec<DestinationPlaylist>, CatalogError> {
        if self.listing_fails {
            return Err(CatalogError::Api {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(self.library.lock().unwrap().clone())
    }

    async fn search(&self, query: &str, kind: MediaKind) -> Result<Vec<SearchMatch>, CatalogError> {
        assert_eq!(kind, MediaKind::Song);
        self.searches.lock().unwrap().push(query.to_string());
        if self.failing_queries.contains(query) {
            return Err(CatalogError::Decode("garbled response".into()));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn create_playlist(&self, name: &str, _description: &str) -> Result<String, CatalogError> {
        let mut creations = self.creations.lock().unwrap();
        creations.push(name.to_string());
        if self.session_expired_on_create {
            return Err(CatalogError::Auth("401 Unauthorized".into()));
        }
        if self.rejected_names.contains(name) || (self.ascii_only_names && !name.is_ascii()) {
            return Err(CatalogError::Api {
                status: 400,
                message: "invalid title".into(),
            });
        }

        let id = format!("PL{}", creations.len());
        if self.exposes_created {
            self.library.lock().unwrap().push(DestinationPlaylist {
                id: id.clone(),
                name: name.to_string(),
            });
        }
        Ok(id)
    }

    async fn add_items(&self, playlist_id: &str, item_ids: &[String]) -> Result<(), CatalogError> {
        let mut additions = self.additions.lock().unwrap();
        additions.push((playlist_id.to_string(), item_ids.to_vec()));
        if self.session_expired_on_add {
            return Err(CatalogError::Auth("401 Unauthorized".into()));
        }
        if self.fail_add_call == Some(additions.len() - 1) {
            return Err(CatalogError::Api {
                status: 500,
                message: "backend error".into(),
            });
        }
        Ok(())
    }
}

fn track(title: &str, artist: &str) -> PlaylistEntry {
    PlaylistEntry::Track(SourceTrack::new(title, artist))
}

fn road_trip() -> Vec<PlaylistEntry> {
    vec![
        track("Highway to Hell", "AC/DC"),
        PlaylistEntry::Absent,
        track("Born to Run", "Bruce Springsteen"),
    ]
}

#[tokio::test]
async fn test_enumerator_excludes_playlists_owned_by_others() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Mine", "me", vec![])
        .with_playlist("p2", "Followed", "someone", vec![])
        .with_playlist("p3", "Collab", "friend", vec![])
        .with_playlist("p4", "Also Mine", "me", vec![]);

    let playlists = enumerator::owned_playlists(&source).await.unwrap();
    let names: Vec<&str> = playlists.iter().map(|p| p.name.as_str()).collect();

    assert_eq!(names, vec!["Mine", "Also Mine"]);
}

#[tokio::test]
async fn test_playlist_entries_follow_cursor_in_order() {
    let entries: Vec<PlaylistEntry> = (0..5).map(|i| track(&format!("t{}", i), "a")).collect();
    let source = FakeSource::new("me").with_playlist("p1", "Five", "me", entries.clone());

    let fetched = enumerator::playlist_entries(&source, "p1").await.unwrap();

    assert_eq!(fetched, entries);
}

#[test]
fn test_playlist_exists_ignores_case() {
    let existing = vec![DestinationPlaylist {
        id: "1".into(),
        name: "ROAD TRIP".into(),
    }];

    assert!(guard::playlist_exists("Road Trip", &existing));
    assert!(guard::playlist_exists("road trip", &existing));
    assert!(!guard::playlist_exists("Road Trips", &existing));
    assert!(!guard::playlist_exists("Road Trip", &[]));
}

#[tokio::test]
async fn test_guard_treats_failed_listing_as_no_duplicates() {
    let destination = FakeDestination {
        listing_fails: true,
        ..FakeDestination::with_library(&["Road Trip"])
    };

    assert!(!DuplicateGuard::new().is_duplicate(&destination, "Road Trip").await);
}

#[tokio::test]
async fn test_guard_remembers_created_names() {
    let destination = FakeDestination::default();
    let mut guard = DuplicateGuard::new();

    assert!(!guard.is_duplicate(&destination, "Chill").await);
    guard.remember("Chill");
    assert!(guard.is_duplicate(&destination, "CHILL").await);
}

#[tokio::test]
async fn test_absent_tracks_are_neither_searched_nor_counted() {
    let destination = FakeDestination::default().with_result("Born to Run Bruce Springsteen", &["v1"]);
    let entries = vec![PlaylistEntry::Absent, track("Born to Run", "Bruce Springsteen")];

    let resolution = resolver::resolve_all(&destination, &entries, &Reporter::new()).await;

    assert_eq!(destination.searches(), vec!["Born to Run Bruce Springsteen"]);
    assert_eq!(resolution.matched, vec!["v1"]);
    assert!(resolution.unmatched.is_empty());
    assert_eq!(resolution.absent, 1);
    assert_eq!(resolution.processed(), 1);
}

#[tokio::test]
async fn test_resolver_takes_first_result_only() {
    let destination = FakeDestination::default().with_result("Song Artist", &["first", "second"]);

    let id = resolver::resolve(&destination, &SourceTrack::new("Song", "Artist"))
        .await
        .unwrap();

    assert_eq!(id.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_empty_results_and_search_errors_are_unmatched() {
    let mut destination = FakeDestination::default().with_result("Found Artist", &["v1"]);
    destination.failing_queries.insert("Broken Artist".to_string());
    let entries = vec![
        track("Found", "Artist"),
        track("Missing", "Artist"),
        track("Broken", "Artist"),
    ];

    let resolution = resolver::resolve_all(&destination, &entries, &Reporter::new()).await;

    assert_eq!(resolution.matched, vec!["v1"]);
    assert_eq!(resolution.unmatched, vec!["Missing - Artist", "Broken - Artist"]);
    assert_eq!(resolution.processed(), 3);
    // no retry on empty results
    assert_eq!(destination.searches().len(), 3);
}

#[tokio::test]
async fn test_builder_adds_in_batches_of_limit() {
    let destination = FakeDestination::default();
    let ids: Vec<String> = (0..250).map(|i| format!("v{}", i)).collect();

    let added = builder::add_in_batches(&destination, "PL1", &ids, &Reporter::new())
        .await
        .unwrap();

    let additions = destination.additions();
    let sizes: Vec<usize> = additions.iter().map(|(_, batch)| batch.len()).collect();
    assert_eq!(added, 250);
    assert_eq!(sizes, vec![BATCH_LIMIT, BATCH_LIMIT, 50]);
    assert_eq!(additions[0].1[0], "v0");
    assert_eq!(additions[1].1[0], "v100");
    assert_eq!(additions[2].1[49], "v249");
}

#[tokio::test]
async fn test_builder_stops_at_failing_batch_without_rollback() {
    let destination = FakeDestination {
        fail_add_call: Some(1),
        ..Default::default()
    };
    let ids: Vec<String> = (0..250).map(|i| format!("v{}", i)).collect();

    let err = builder::add_in_batches(&destination, "PL1", &ids, &Reporter::new())
        .await
        .unwrap_err();

    match err {
        TransferError::AddItems {
            playlist_id, added, ..
        } => {
            assert_eq!(playlist_id, "PL1");
            assert_eq!(added, 100);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(destination.additions().len(), 2);
}

#[tokio::test]
async fn test_road_trip_is_created_with_resolvable_tracks() {
    let source = FakeSource::new("me").with_playlist("p1", "Road Trip", "me", road_trip());
    let destination = FakeDestination::default()
        .with_result("Highway to Hell AC/DC", &["hth"])
        .with_result("Born to Run Bruce Springsteen", &["btr"]);

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Road Trip"]);
    assert_eq!(
        destination.additions(),
        vec![("PL1".to_string(), vec!["hth".to_string(), "btr".to_string()])]
    );

    let result = report.get("Road Trip").unwrap();
    assert!(matches!(result.outcome, Outcome::Success));
    assert_eq!(result.destination_id.as_deref(), Some("PL1"));
    assert_eq!(result.matched.len(), 2);
    assert_eq!(result.absent, 1);
    assert!(result.unmatched.is_empty());
}

#[tokio::test]
async fn test_existing_playlist_is_skipped() {
    let source = FakeSource::new("me").with_playlist("p1", "Road Trip", "me", road_trip());
    let destination = FakeDestination::with_library(&["ROAD TRIP"]);

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert!(destination.creations().is_empty());
    assert!(destination.searches().is_empty());
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.get("Road Trip").unwrap().outcome.label(), "skipped");
}

#[tokio::test]
async fn test_unsupported_name_is_retried_sanitized() {
    let source = FakeSource::new("me").with_playlist("p1", "🎶🎧", "me", vec![]);
    let destination = FakeDestination {
        ascii_only_names: true,
        ..Default::default()
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["🎶🎧", FALLBACK_NAME]);
    assert_eq!(report.succeeded(), 1);
}

#[tokio::test]
async fn test_playlist_without_matches_is_still_created() {
    let source = FakeSource::new("me").with_playlist("p1", "Obscure", "me", vec![track("Nobody", "Knows")]);
    let destination = FakeDestination::default();

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Obscure"]);
    assert!(destination.additions().is_empty());
    let result = report.get("Obscure").unwrap();
    assert!(matches!(result.outcome, Outcome::Success));
    assert_eq!(result.unmatched, vec!["Nobody - Knows"]);
}

#[tokio::test]
async fn test_same_name_is_created_once_per_run() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Chill", "me", vec![])
        .with_playlist("p2", "chill", "me", vec![]);
    let destination = FakeDestination::default();

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Chill"]);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.skipped(), 1);
}

#[tokio::test]
async fn test_listing_is_queried_before_every_playlist() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Chill", "me", vec![])
        .with_playlist("p2", "Focus", "me", vec![]);
    let destination = FakeDestination {
        exposes_created: true,
        ..Default::default()
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert_eq!(destination.library.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_playlist_does_not_stop_the_run() {
    let mut source = FakeSource::new("me")
        .with_playlist("p1", "Broken", "me", vec![track("a", "b")])
        .with_playlist("p2", "Fine", "me", vec![]);
    source.failing_playlists.insert("p1".to_string());
    let destination = FakeDestination::default();

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert!(matches!(
        report.get("Broken").unwrap().outcome,
        Outcome::Failed(TransferError::Tracks(_))
    ));
    assert!(matches!(report.get("Fine").unwrap().outcome, Outcome::Success));
    assert!(report.aborted().is_none());
    assert_eq!(destination.creations(), vec!["Fine"]);
}

#[tokio::test]
async fn test_expired_source_session_aborts_before_any_call() {
    let mut source = FakeSource::new("me").with_playlist("p1", "Road Trip", "me", road_trip());
    source.auth_expired = true;
    let destination = FakeDestination::default();

    let err = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Auth(_)));
    assert!(err.is_fatal());
    assert!(destination.searches().is_empty());
    assert!(destination.creations().is_empty());
}

#[tokio::test]
async fn test_only_filter_limits_the_run() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Road Trip", "me", vec![])
        .with_playlist("p2", "Gym", "me", vec![]);
    let destination = FakeDestination::default();
    let options = TransferOptions {
        only: vec!["gym".to_string()],
        ..Default::default()
    };

    let report = Orchestrator::new(&source, &destination, options)
        .run()
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(destination.creations(), vec!["Gym"]);
}

#[tokio::test]
async fn test_sanitized_fallback_name_is_created_once() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "🎶", "me", vec![])
        .with_playlist("p2", "🎧", "me", vec![]);
    let destination = FakeDestination {
        ascii_only_names: true,
        ..Default::default()
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["🎶", FALLBACK_NAME, "🎧"]);
    assert!(matches!(report.get("🎶").unwrap().outcome, Outcome::Success));
    assert!(matches!(
        report.get("🎧").unwrap().outcome,
        Outcome::SkippedDuplicate
    ));
}

#[tokio::test]
async fn test_sanitized_name_already_in_library_is_skipped() {
    let source = FakeSource::new("me").with_playlist("p1", "🎶🎧", "me", vec![]);
    let destination = FakeDestination {
        ascii_only_names: true,
        ..FakeDestination::with_library(&["imported playlist"])
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["🎶🎧"]);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_expired_session_on_create_aborts_remaining_playlists() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Road Trip", "me", vec![])
        .with_playlist("p2", "Gym", "me", vec![]);
    let destination = FakeDestination {
        session_expired_on_create: true,
        ..Default::default()
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    // no retry with a sanitized name after an auth failure
    assert_eq!(destination.creations(), vec!["Road Trip"]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.aborted(), Some(TransferError::Auth(_))));
    assert!(report.get("Gym").is_none());
}

#[tokio::test]
async fn test_expired_session_on_add_aborts_remaining_playlists() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Road Trip", "me", road_trip())
        .with_playlist("p2", "Gym", "me", vec![]);
    let destination = FakeDestination {
        session_expired_on_add: true,
        ..FakeDestination::default().with_result("Highway to Hell AC/DC", &["hth"])
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Road Trip"]);
    assert!(report.aborted().is_some_and(|err| err.is_fatal()));
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.get("Road Trip").unwrap().matched, vec!["hth"]);
}

#[tokio::test]
async fn test_rejected_sanitized_name_fails_only_its_playlist() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Banned", "me", vec![])
        .with_playlist("p2", "Fine", "me", vec![]);
    let mut destination = FakeDestination::default();
    destination.rejected_names.insert("Banned".to_string());

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Banned", "Banned", "Fine"]);
    match &report.get("Banned").unwrap().outcome {
        Outcome::Failed(TransferError::Creation { name, .. }) => assert_eq!(name, "Banned"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(matches!(report.get("Fine").unwrap().outcome, Outcome::Success));
    assert!(report.aborted().is_none());
}

#[tokio::test]
async fn test_failed_listing_during_run_creates_playlists_anyway() {
    let source = FakeSource::new("me")
        .with_playlist("p1", "Road Trip", "me", vec![])
        .with_playlist("p2", "Gym", "me", vec![]);
    let destination = FakeDestination {
        listing_fails: true,
        ..FakeDestination::with_library(&["Road Trip"])
    };

    let report = Orchestrator::new(&source, &destination, TransferOptions::default())
        .run()
        .await
        .unwrap();

    assert_eq!(destination.creations(), vec!["Road Trip", "Gym"]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.skipped(), 0);
}
