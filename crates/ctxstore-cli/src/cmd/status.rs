use crate::output::print_json;
use anyhow::Context;
use ctxstore_core::service::MetadataService;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let service = MetadataService::open(root).context("failed to open store")?;
    let status = service.status();

    if json {
        return print_json(&status);
    }

    println!("Root: {}", root.display());
    println!("Pending deltas: {}", status.journal_len);
    println!("Compaction threshold: {}", status.compact_threshold);
    println!(
        "Snapshot: {}",
        match (status.snapshot.plain_present, status.snapshot.compressed_present) {
            (true, true) => "plain + compressed",
            (true, false) => "plain only",
            (false, true) => "compressed only",
            (false, false) => "absent",
        }
    );
    Ok(())
}
