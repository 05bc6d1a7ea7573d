use crate::compact;
use crate::config::StoreConfig;
use crate::delta::{self, Delta, DeltaOp};
use crate::error::{CtxError, Result};
use crate::journal::DeltaJournal;
use crate::paths;
use crate::snapshot::Snapshot;
use crate::store::{SnapshotStore, StoreStatus};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Combined view of the store for status reporting.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceStatus {
    pub journal_len: usize,
    pub compact_threshold: usize,
    #[serde(flatten)]
    pub snapshot: StoreStatus,
}

/// Facade over snapshot store, delta journal, and compactor.
///
/// One owned handle per process; operations run to completion before the
/// CLI exits. Single-writer by design: two processes sharing the same
/// snapshot/journal pair can lose or double-apply deltas, and nothing here
/// guards against that.
#[derive(Debug)]
pub struct MetadataService {
    root: PathBuf,
    store: SnapshotStore,
    journal: DeltaJournal,
    config: StoreConfig,
}

impl MetadataService {
    /// Open the store rooted at `root`. Fails with [`CtxError::NotInitialized`]
    /// when the store directory does not exist.
    pub fn open(root: &Path) -> Result<Self> {
        if !paths::ctx_dir(root).is_dir() {
            return Err(CtxError::NotInitialized);
        }
        let config = StoreConfig::load_or_default(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            store: SnapshotStore::new(root),
            journal: DeltaJournal::new(root),
            config,
        })
    }

    /// Create the store directory with a default config and snapshot.
    /// Idempotent: existing files are left alone.
    pub fn init(root: &Path) -> Result<Self> {
        crate::io::ensure_dir(&paths::ctx_dir(root))?;
        if !paths::config_path(root).exists() {
            StoreConfig::default().save(root)?;
        }
        let service = Self::open(root)?;
        if service.store.load()?.is_none() {
            service.store.save(&Snapshot::default_now())?;
        }
        Ok(service)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Load the current logical snapshot: base document (or default), with
    /// every pending delta folded in, validated or repaired.
    ///
    /// Pending deltas are always applied — even to a freshly defaulted
    /// snapshot — so they are never silently dropped. Journal corruption is
    /// the one failure surfaced here: the caller decides between proceeding
    /// with the unfolded base and losing pending updates, or aborting.
    pub fn load_metadata(&self) -> Result<Snapshot> {
        let now = Utc::now();
        let base = match self.store.load()? {
            Some(doc) => doc,
            None => {
                warn!("no snapshot found, substituting default");
                Snapshot::default_at(now).to_value()
            }
        };
        let deltas = self.journal.read_all()?;
        let folded = delta::fold(base, &deltas);
        let (snapshot, violations) = crate::validate::validate_or_repair(&folded, now);
        for v in &violations {
            warn!(violation = %v, "snapshot repaired on load");
        }
        Ok(snapshot)
    }

    /// Load the raw persisted candidate without folding or repair, for
    /// inspection by the `check` path. `None` when no snapshot exists.
    pub fn load_raw(&self) -> Result<Option<Value>> {
        self.store.load()
    }

    /// Record one logical update as a journal delta, then compact
    /// synchronously once the journal has reached the configured threshold.
    pub fn update(&self, field: &str, value: Value, op: DeltaOp) -> Result<()> {
        paths::validate_field_path(field)?;
        let delta = Delta::new(op, field, value);
        self.journal.append(&delta)?;

        let len = self.journal.len();
        if len >= self.config.compact_threshold {
            info!(journal_len = len, "journal reached threshold, compacting");
            self.compact_now()?;
        }
        Ok(())
    }

    /// Force compaction regardless of the threshold.
    pub fn compact_now(&self) -> Result<Snapshot> {
        compact::compact(&self.store, &self.journal)
    }

    /// Persist a snapshot directly, bypassing the journal. Used by the
    /// repair path after a damaged candidate has been rebuilt.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.store.save(snapshot)
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            journal_len: self.journal.len(),
            compact_threshold: self.config.compact_threshold,
            snapshot: self.store.status(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
