use crate::output::print_json;
use anyhow::Context;
use ctxstore_core::service::MetadataService;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let service = MetadataService::open(root).context("failed to open store")?;
    let pending = service.status().journal_len;
    let snapshot = service.compact_now().context("compaction failed")?;

    if json {
        return print_json(&snapshot);
    }

    println!("Compacted {pending} delta(s) into snapshot");
    println!("Sessions: {}", snapshot.essential.session_count);
    println!("Updated: {}", snapshot.last_updated.to_rfc3339());
    Ok(())
}
