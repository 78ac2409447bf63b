use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::catalog::Playlist;
use crate::error::{AppError, Result};

const SNAPSHOT_EXTENSION: &str = "json";

// Leaves room for the extension, a collision suffix and the temp file
// decoration within the usual 255 byte file name limit.
const MAX_STEM_BYTES: usize = 200;

/// One persisted playlist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotUnit {
    path: PathBuf,
}

impl SnapshotUnit {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Directory of snapshot units, one JSON file per source playlist.
pub struct SnapshotStore {
    dir: PathBuf,
    // Case-folded stems, so names differing only in case do not clobber
    // each other on case-insensitive filesystems.
    written: HashSet<String>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: HashSet::new(),
        }
    }

    /// Persist a playlist as a self-contained unit. The file is fully written
    /// to a temporary sibling and then renamed, so earlier units are never at
    /// risk and a crash never leaves a truncated unit behind.
    pub fn write(&mut self, playlist: &Playlist) -> Result<SnapshotUnit> {
        fs::create_dir_all(&self.dir)?;

        let stem = self.claim_stem(&playlist.name);
        let file_name = format!("{}.{}", stem, SNAPSHOT_EXTENSION);
        let path = self.dir.join(&file_name);
        let tmp_path = self.dir.join(format!(".{}.tmp", file_name));

        let json = serde_json::to_string_pretty(playlist)?;
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            fs::remove_file(&tmp_path).ok();
            return Err(e.into());
        }

        debug!(
            "Wrote snapshot {} ({} tracks)",
            path.display(),
            playlist.tracks.len()
        );

        Ok(SnapshotUnit { path })
    }

    /// Enumerate persisted units in file name order. Anything that is not a
    /// regular `.json` file is ignored.
    pub fn list_units(&self) -> Result<Vec<SnapshotUnit>> {
        let mut units = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION) {
                continue;
            }

            units.push(SnapshotUnit { path });
        }

        units.sort_by(|a, b| a.path.cmp(&b.path));

        info!("Found {} snapshot units in {}", units.len(), self.dir.display());
        Ok(units)
    }

    pub fn read(&self, unit: &SnapshotUnit) -> Result<Playlist> {
        let data = fs::read(&unit.path)?;
        serde_json::from_slice(&data).map_err(|source| AppError::Decode {
            path: unit.path.clone(),
            source,
        })
    }

    // Pick a file stem for this playlist that no earlier write of this store used.
    fn claim_stem(&mut self, name: &str) -> String {
        let base = sanitize_name(name);
        let mut stem = base.clone();
        let mut n = 2;

        while self.written.contains(&stem.to_lowercase()) {
            stem = format!("{} ({})", base, n);
            n += 1;
        }

        if stem != base {
            warn!(
                "Playlist name '{}' collides with an earlier playlist, saving as '{}'",
                name, stem
            );
        }

        self.written.insert(stem.to_lowercase());
        stem
    }
}

/// Make a playlist name safe to use as a single file name component.
/// Overlong names are cut on a character boundary.
pub fn sanitize_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.len() > MAX_STEM_BYTES {
        let mut end = MAX_STEM_BYTES;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }

    match cleaned.as_str() {
        "" | "." | ".." => format!("_{}", cleaned),
        _ => cleaned,
    }
}
