use crate::error::Result;
use crate::io;
use crate::paths;
use crate::snapshot::Snapshot;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Which persisted representations of the snapshot exist on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStatus {
    pub plain_present: bool,
    pub compressed_present: bool,
}

/// Reads and writes the base snapshot document.
///
/// Two representations are kept for backward-compatible external readers:
/// pretty-printed JSON and a gzip of the same bytes. The compressed form is
/// preferred on load. The pair is not written atomically as a unit — each
/// file is write-temp-then-rename on its own, and callers must tolerate a
/// window where only one of the two has been refreshed.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    plain_path: PathBuf,
    gz_path: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: &Path) -> Self {
        Self {
            plain_path: paths::metadata_path(root),
            gz_path: paths::metadata_gz_path(root),
        }
    }

    /// Load the raw snapshot document, or `None` when no usable snapshot
    /// exists. Malformed JSON and gzip failures degrade to `None` rather
    /// than failing: a fresh start is always preferable to refusing to run.
    ///
    /// The raw [`Value`] is returned (not a typed snapshot) so the caller's
    /// validate-or-repair stage sees the candidate exactly as persisted.
    pub fn load(&self) -> Result<Option<Value>> {
        if let Some(doc) = self.load_compressed() {
            return Ok(Some(doc));
        }
        if let Some(doc) = self.load_plain() {
            return Ok(Some(doc));
        }
        Ok(None)
    }

    fn load_compressed(&self) -> Option<Value> {
        if !self.gz_path.exists() {
            return None;
        }
        let result = std::fs::File::open(&self.gz_path).and_then(|f| {
            let mut text = String::new();
            GzDecoder::new(f).read_to_string(&mut text)?;
            Ok(text)
        });
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %self.gz_path.display(), error = %e, "unreadable compressed snapshot, falling back");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %self.gz_path.display(), error = %e, "malformed compressed snapshot, falling back");
                None
            }
        }
    }

    fn load_plain(&self) -> Option<Value> {
        if !self.plain_path.exists() {
            return None;
        }
        let text = match std::fs::read_to_string(&self.plain_path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %self.plain_path.display(), error = %e, "unreadable snapshot, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(path = %self.plain_path.display(), error = %e, "malformed snapshot, treating as absent");
                None
            }
        }
    }

    /// Persist both representations: plain pretty-printed JSON, then a gzip
    /// of the same bytes. An I/O failure between the two writes leaves the
    /// earlier one in place; availability of at least one representation is
    /// favored over atomicity.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        io::atomic_write(&self.plain_path, json.as_bytes())?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes())?;
        let compressed = encoder.finish()?;
        io::atomic_write(&self.gz_path, &compressed)?;
        Ok(())
    }

    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            plain_present: self.plain_path.exists(),
            compressed_present: self.gz_path.exists(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
