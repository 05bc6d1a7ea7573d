use crate::output::print_json;
use anyhow::Context;
use ctxstore_core::service::MetadataService;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let service = MetadataService::open(root).context("failed to open store")?;
    let snapshot = service
        .load_metadata()
        .context("failed to load metadata (a corrupt journal can be deleted manually to recover)")?;

    if json {
        return print_json(&snapshot);
    }

    println!("Last session: {}", snapshot.essential.last_session);
    println!("Stack: {}", snapshot.essential.stack);
    println!("Sessions: {}", snapshot.essential.session_count);
    println!("Updated: {}", snapshot.last_updated.to_rfc3339());
    if snapshot.essential.projects.is_empty() {
        println!("Projects: none");
    } else {
        println!("Projects:");
        for p in &snapshot.essential.projects {
            println!("  - {p}");
        }
    }
    if !snapshot.session_history.is_empty() {
        println!("Recent sessions:");
        for entry in &snapshot.session_history {
            println!(
                "  {} [{}] {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.session_type,
                entry.summary
            );
        }
    }
    Ok(())
}
