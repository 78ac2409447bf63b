use colored::Colorize;

use crate::migrator::ledger::FailureLedger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistOutcome {
    Skipped {
        unit: String,
        reason: String,
    },
    Migrated {
        source_name: String,
        playlist_id: String,
        total_tracks: usize,
        added: usize,
        failed: usize,
    },
}

/// Result of one reconciliation pass.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub ledger: FailureLedger,
    pub playlists: Vec<PlaylistOutcome>,
    pub cancelled: bool,
}

impl MigrationReport {
    pub fn migrated_count(&self) -> usize {
        self.playlists
            .iter()
            .filter(|p| matches!(p, PlaylistOutcome::Migrated { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.playlists.len() - self.migrated_count()
    }

    pub fn print_summary(&self) {
        let (total_tracks, total_added) = self
            .playlists
            .iter()
            .filter_map(|p| match p {
                PlaylistOutcome::Migrated {
                    total_tracks, added, ..
                } => Some((*total_tracks, *added)),
                PlaylistOutcome::Skipped { .. } => None,
            })
            .fold((0, 0), |(t, a), (pt, pa)| (t + pt, a + pa));

        println!();
        println!("{}", "=".repeat(60));
        println!("{}", "MIGRATION SUMMARY".bold());
        println!("{}", "=".repeat(60));
        println!("Playlists migrated: {}", self.migrated_count());
        println!("Playlists skipped: {}", self.skipped_count());
        println!("Tracks added: {}", total_added.to_string().green());
        println!("Tracks failed: {}", self.ledger.len().to_string().red());
        println!("Tracks processed: {}", total_tracks);
        println!("{}", "=".repeat(60));

        if !self.playlists.is_empty() {
            println!("\nPlaylist breakdown:");
        }
        for outcome in &self.playlists {
            match outcome {
                PlaylistOutcome::Migrated {
                    source_name,
                    total_tracks,
                    added,
                    failed,
                    ..
                } => {
                    let counts = format!("{}/{}", added, total_tracks);
                    let counts = if *failed == 0 {
                        counts.green()
                    } else {
                        counts.yellow()
                    };
                    println!("  {}: {}", source_name, counts);
                }
                PlaylistOutcome::Skipped { unit, reason } => {
                    println!("  {}: {} ({})", unit, "skipped".red(), reason);
                }
            }
        }

        if self.cancelled {
            println!(
                "\n{}",
                "Migration was interrupted; remaining playlists were not processed.".yellow()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let report = MigrationReport {
            ledger: FailureLedger::new(),
            playlists: vec![
                PlaylistOutcome::Skipped {
                    unit: "broken.json".into(),
                    reason: "decode failed".into(),
                },
                PlaylistOutcome::Migrated {
                    source_name: "Road Trip".into(),
                    playlist_id: "PL1".into(),
                    total_tracks: 2,
                    added: 2,
                    failed: 0,
                },
            ],
            cancelled: false,
        };

        assert_eq!(report.migrated_count(), 1);
        assert_eq!(report.skipped_count(), 1);
    }
}
