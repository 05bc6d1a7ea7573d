use crate::delta;
use crate::error::Result;
use crate::journal::DeltaJournal;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::validate;
use chrono::Utc;
use tracing::{info, warn};

/// Fold the journal into a new snapshot and truncate the journal.
///
/// Ordering is load-bearing: load, replay, finalize, persist, then truncate.
/// A corrupt journal aborts before anything is written. A failure during
/// persist or truncate leaves the journal intact so a retry can re-fold —
/// the snapshot may already have been overwritten, which is an accepted
/// at-least-once risk, not masked here.
pub fn compact(store: &SnapshotStore, journal: &DeltaJournal) -> Result<Snapshot> {
    let now = Utc::now();

    // 1. Load the current snapshot, or start from the default.
    let base = match store.load()? {
        Some(doc) => doc,
        None => {
            warn!("no snapshot found, compacting onto a fresh default");
            Snapshot::default_at(now).to_value()
        }
    };

    // 2. Replay every pending delta. Corruption propagates and the journal
    //    stays untouched.
    let deltas = journal.read_all()?;
    let replayed = deltas.len();
    let folded = delta::fold(base, &deltas);

    // 3. Finalize: repair guarantees a well-formed snapshot, then stamp the
    //    session boundary.
    let (mut snapshot, violations) = validate::validate_or_repair(&folded, now);
    if !violations.is_empty() {
        for v in &violations {
            warn!(violation = %v, "repaired folded snapshot");
        }
    }
    snapshot.last_updated = now;
    snapshot.essential.session_count += 1;
    snapshot.trim_history();

    // 4. Persist, then 5. truncate.
    store.save(&snapshot)?;
    journal.truncate()?;

    info!(
        deltas = replayed,
        session_count = snapshot.essential.session_count,
        "compacted journal into snapshot"
    );
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
