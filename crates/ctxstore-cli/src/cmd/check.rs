use crate::output::print_json;
use anyhow::Context;
use ctxstore_core::service::MetadataService;
use ctxstore_core::validate;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let service = MetadataService::open(root).context("failed to open store")?;

    let Some(candidate) = service.load_raw().context("failed to read snapshot")? else {
        println!("No snapshot found; writing a fresh default");
        let snapshot = validate::repair(&serde_json::Value::Null);
        service
            .save_snapshot(&snapshot)
            .context("failed to write default snapshot")?;
        return Ok(());
    };

    match validate::validate(&candidate) {
        Ok(snapshot) => {
            if json {
                #[derive(serde::Serialize)]
                struct CheckOutput {
                    valid: bool,
                    version: u32,
                }
                return print_json(&CheckOutput {
                    valid: true,
                    version: snapshot.version,
                });
            }
            println!("Snapshot is valid (schema v{})", snapshot.version);
            Ok(())
        }
        Err(errors) => {
            println!("Snapshot is invalid:");
            for e in &errors {
                println!("  - {e}");
            }
            let repaired = validate::repair(&candidate);
            service
                .save_snapshot(&repaired)
                .context("failed to write repaired snapshot")?;
            println!("Repaired and saved (schema v{})", repaired.version);
            if json {
                return print_json(&repaired);
            }
            Ok(())
        }
    }
}
