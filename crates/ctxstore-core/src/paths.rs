use crate::error::{CtxError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory and file constants
// ---------------------------------------------------------------------------

pub const CTX_DIR: &str = ".ctxstore";

/// Plain-text snapshot, pretty-printed JSON.
pub const METADATA_FILE: &str = "context-metadata.json";
/// Gzip of the same JSON bytes.
pub const METADATA_GZ_FILE: &str = "context-metadata.json.gz";
/// Newline-delimited JSON, one delta per line.
pub const DELTAS_FILE: &str = "context-deltas.jsonl";

pub const CONFIG_FILE: &str = "config.yaml";

/// Root names a delta field path may address. The first path segment selects
/// the subtree; anything else is rejected before a delta is recorded.
///
/// `sessionHistory` is deliberately not addressable: it is an array managed
/// by compaction, and a sub-key write could only clobber it.
pub const KNOWN_ROOTS: [&str; 1] = ["essential"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn ctx_dir(root: &Path) -> PathBuf {
    root.join(CTX_DIR)
}

pub fn metadata_path(root: &Path) -> PathBuf {
    ctx_dir(root).join(METADATA_FILE)
}

pub fn metadata_gz_path(root: &Path) -> PathBuf {
    ctx_dir(root).join(METADATA_GZ_FILE)
}

pub fn deltas_path(root: &Path) -> PathBuf {
    ctx_dir(root).join(DELTAS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    ctx_dir(root).join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Field path validation
// ---------------------------------------------------------------------------

static FIELD_RE: OnceLock<Regex> = OnceLock::new();

fn field_re() -> &'static Regex {
    FIELD_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+(\.[A-Za-z0-9_\-]+)*$").unwrap())
}

/// Validate a delta field path: dot-separated identifier segments whose first
/// segment names a known root subtree.
pub fn validate_field_path(field: &str) -> Result<()> {
    if field.is_empty() || field.len() > 256 || !field_re().is_match(field) {
        return Err(CtxError::InvalidFieldPath(field.to_string()));
    }
    let mut parts = field.split('.');
    let root = parts.next().unwrap_or("");
    if !KNOWN_ROOTS.contains(&root) {
        return Err(CtxError::UnknownRoot {
            root: root.to_string(),
            field: field.to_string(),
            known: "essential",
        });
    }
    // The root alone addresses nothing: a mutation needs a target segment.
    if parts.next().is_none() {
        return Err(CtxError::InvalidFieldPath(field.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_field_paths() {
        for field in [
            "essential.lastSession",
            "essential.sessionCount",
            "essential.projects",
            "essential.customField",
            "essential.nested.deep-key_1",
        ] {
            validate_field_path(field).unwrap_or_else(|_| panic!("expected valid: {field}"));
        }
    }

    #[test]
    fn bare_root_rejected() {
        assert!(matches!(
            validate_field_path("essential"),
            Err(CtxError::InvalidFieldPath(_))
        ));
    }

    #[test]
    fn invalid_field_paths() {
        for field in ["", ".", "essential.", ".lastSession", "essential..x", "a b"] {
            assert!(
                matches!(validate_field_path(field), Err(CtxError::InvalidFieldPath(_))),
                "expected invalid: {field}"
            );
        }
    }

    #[test]
    fn unknown_root_rejected() {
        assert!(matches!(
            validate_field_path("metadata.lastSession"),
            Err(CtxError::UnknownRoot { .. })
        ));
        // The history array is compaction-managed, never a delta target.
        assert!(matches!(
            validate_field_path("sessionHistory.recent"),
            Err(CtxError::UnknownRoot { .. })
        ));
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            metadata_path(root),
            PathBuf::from("/tmp/proj/.ctxstore/context-metadata.json")
        );
        assert_eq!(
            deltas_path(root),
            PathBuf::from("/tmp/proj/.ctxstore/context-deltas.jsonl")
        );
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.ctxstore/config.yaml")
        );
    }
}
