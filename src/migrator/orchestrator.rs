use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::call::bounded;
use crate::catalog::{Playlist, Track};
use crate::error::{AppError, Result};
use crate::migrator::ledger::FailureLedger;
use crate::migrator::report::{MigrationReport, PlaylistOutcome};
use crate::snapshot::{SnapshotStore, SnapshotUnit};
use crate::youtube::{DestinationPlaylist, MediaKind, PlaylistDestination};

pub const MIGRATED_DESCRIPTION: &str = "Migrated from Spotify";

const SEARCH_KIND: MediaKind = MediaKind::Video;
const SEARCH_RESULTS: u32 = 1;

enum TrackStatus {
    Added,
    NotFound,
}

struct TrackTally {
    added: usize,
    failed: usize,
    interrupted: bool,
}

/// Recreates snapshot playlists on the destination, one playlist and one
/// track at a time.
pub struct PlaylistMigrator<D> {
    destination: D,
    cancel: CancellationToken,
    call_timeout: Duration,
    show_progress: bool,
}

impl<D: PlaylistDestination> PlaylistMigrator<D> {
    pub fn new(destination: D, cancel: CancellationToken, call_timeout: Duration) -> Self {
        Self {
            destination,
            cancel,
            call_timeout,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run one reconciliation pass over `units`. Per-playlist and per-track
    /// failures never abort the pass; a cancelled pass returns what it has
    /// accumulated so far.
    pub async fn migrate(&self, store: &SnapshotStore, units: &[SnapshotUnit]) -> MigrationReport {
        let mut report = MigrationReport::default();

        info!("Starting migration of {} snapshot units", units.len());

        let pb = self.progress_bar(
            units.len(),
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        );

        for unit in units {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            pb.set_message(unit.file_name());
            let interrupted = self.migrate_unit(store, unit, &mut report).await;
            pb.inc(1);

            if interrupted {
                report.cancelled = true;
                break;
            }
        }

        pb.finish_and_clear();

        if report.cancelled {
            warn!("Migration cancelled before all playlists were processed");
        }

        report
    }

    // Returns true when the run was cancelled while handling this unit.
    async fn migrate_unit(
        &self,
        store: &SnapshotStore,
        unit: &SnapshotUnit,
        report: &mut MigrationReport,
    ) -> bool {
        info!("Migrating playlist from file: {}", unit.file_name());

        let playlist = match store.read(unit) {
            Ok(playlist) => playlist,
            Err(e) => {
                warn!("Could not read {}: {}. Skipping.", unit.file_name(), e);
                report.playlists.push(skipped(unit, format!("unreadable snapshot: {}", e)));
                return false;
            }
        };

        if playlist.name.is_empty() {
            warn!("Playlist name is empty in {}. Skipping.", unit.file_name());
            report.playlists.push(skipped(unit, "empty playlist name".into()));
            return false;
        }

        let created = match bounded(
            &self.cancel,
            self.call_timeout,
            self.destination
                .create_playlist(&playlist.name, MIGRATED_DESCRIPTION),
        )
        .await
        {
            Ok(created) => created,
            Err(AppError::Cancelled) => return true,
            Err(e) => {
                warn!(
                    "Could not create destination playlist for {}: {}. Skipping.",
                    playlist.name, e
                );
                report
                    .playlists
                    .push(skipped(unit, format!("playlist creation failed: {}", e)));
                return false;
            }
        };

        info!(
            "Created destination playlist: {} (ID: {})",
            created.title, created.id
        );

        let tally = self
            .migrate_tracks(&created, &playlist, &mut report.ledger)
            .await;

        info!(
            "Playlist migration completed: {} - {}/{} tracks added",
            playlist.name,
            tally.added,
            playlist.tracks.len()
        );

        report.playlists.push(PlaylistOutcome::Migrated {
            source_name: playlist.name.clone(),
            playlist_id: created.id,
            total_tracks: playlist.tracks.len(),
            added: tally.added,
            failed: tally.failed,
        });

        tally.interrupted
    }

    async fn migrate_tracks(
        &self,
        created: &DestinationPlaylist,
        playlist: &Playlist,
        ledger: &mut FailureLedger,
    ) -> TrackTally {
        let mut tally = TrackTally {
            added: 0,
            failed: 0,
            interrupted: false,
        };

        let pb = self.progress_bar(
            playlist.tracks.len(),
            "  {spinner:.green} [{bar:30.cyan/blue}] {pos}/{len}",
        );

        for track in &playlist.tracks {
            match self.migrate_track(&created.id, track).await {
                Ok(TrackStatus::Added) => {
                    debug!("Added '{}' to '{}'", track.name, created.title);
                    tally.added += 1;
                }
                Ok(TrackStatus::NotFound) => {
                    warn!(
                        "No results found for '{}', not added to '{}'",
                        track.search_query(),
                        created.title
                    );
                    ledger.record(&created.id, track.clone());
                    tally.failed += 1;
                }
                Err(AppError::Cancelled) => {
                    tally.interrupted = true;
                    break;
                }
                Err(e) => {
                    warn!(
                        "Could not add track '{}' to playlist '{}': {}",
                        track.search_query(),
                        created.title,
                        e
                    );
                    ledger.record(&created.id, track.clone());
                    tally.failed += 1;
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        tally
    }

    async fn migrate_track(&self, playlist_id: &str, track: &Track) -> Result<TrackStatus> {
        let query = track.search_query();
        debug!("Searching for track: {}", query);

        let hits = bounded(
            &self.cancel,
            self.call_timeout,
            self.destination.search(&query, SEARCH_KIND, SEARCH_RESULTS),
        )
        .await?;

        // The top-ranked hit is taken as the match without comparing titles.
        let Some(hit) = hits.into_iter().next() else {
            return Ok(TrackStatus::NotFound);
        };

        bounded(
            &self.cancel,
            self.call_timeout,
            self.destination.add_item(playlist_id, &hit.id),
        )
        .await?;

        Ok(TrackStatus::Added)
    }

    fn progress_bar(&self, len: usize, template: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

fn skipped(unit: &SnapshotUnit, reason: String) -> PlaylistOutcome {
    PlaylistOutcome::Skipped {
        unit: unit.file_name(),
        reason,
    }
}
