use anyhow::Context;
use ctxstore_core::delta::DeltaOp;
use ctxstore_core::service::MetadataService;
use serde_json::Value;
use std::path::Path;

pub fn run(root: &Path, field: &str, value: &str, op: &str) -> anyhow::Result<()> {
    let op: DeltaOp = op.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    // JSON first so numbers, booleans, arrays, and objects come through
    // typed; anything unparseable is recorded as a plain string.
    let value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let service = MetadataService::open(root).context("failed to open store")?;
    service
        .update(field, value, op)
        .with_context(|| format!("failed to record {} on '{field}'", op.as_str()))?;

    let status = service.status();
    println!(
        "Recorded {} on '{field}' ({} pending)",
        op.as_str(),
        status.journal_len
    );
    Ok(())
}
