use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Track;
use crate::error::Result;

/// Tracks that could not be found or added, keyed by the id of the
/// destination playlist they were meant for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureLedger {
    failures: BTreeMap<String, Vec<Track>>,
}

impl FailureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, playlist_id: &str, track: Track) {
        self.failures
            .entry(playlist_id.to_string())
            .or_default()
            .push(track);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total number of failed tracks across all playlists.
    pub fn len(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    pub fn failures_for(&self, playlist_id: &str) -> Option<&[Track]> {
        self.failures.get(playlist_id).map(Vec::as_slice)
    }

    pub fn playlist_ids(&self) -> impl Iterator<Item = &str> {
        self.failures.keys().map(String::as_str)
    }

    /// Write the ledger to `path`. An empty ledger writes nothing at all and
    /// returns `false`.
    pub fn persist(&self, path: &Path) -> Result<bool> {
        if self.is_empty() {
            info!("No tracks failed to migrate.");
            return Ok(false);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        info!(
            "Failed tracks ({}) saved to {}",
            self.len(),
            path.display()
        );
        Ok(true)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}
