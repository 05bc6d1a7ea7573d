use anyhow::Context;
use ctxstore_core::service::MetadataService;
use ctxstore_core::paths;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing ctxstore in: {}", root.display());

    let existed = paths::config_path(root).exists();
    let service = MetadataService::init(root).context("failed to initialize store")?;

    let label = if existed { "exists: " } else { "created:" };
    println!("  {label} {}/{}", paths::CTX_DIR, paths::CONFIG_FILE);

    let status = service.status();
    if status.snapshot.plain_present {
        println!("  snapshot: {}/{}", paths::CTX_DIR, paths::METADATA_FILE);
    }
    println!(
        "  compaction threshold: {} deltas",
        service.config().compact_threshold
    );
    Ok(())
}
