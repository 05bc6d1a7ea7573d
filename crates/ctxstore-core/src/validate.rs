use crate::snapshot::{HistoryEntry, Snapshot, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

// ---------------------------------------------------------------------------
// FieldError
// ---------------------------------------------------------------------------

/// One structural violation found while checking a candidate document.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub expected: &'static str,
    pub found: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

fn type_name(v: Option<&Value>) -> String {
    match v {
        None => "missing".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(_)) => "boolean".to_string(),
        Some(Value::Number(_)) => "number".to_string(),
        Some(Value::String(s)) if s.is_empty() => "empty string".to_string(),
        Some(Value::String(_)) => "string".to_string(),
        Some(Value::Array(_)) => "array".to_string(),
        Some(Value::Object(_)) => "object".to_string(),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Check a candidate document against the snapshot schema, collecting every
/// violation rather than stopping at the first.
///
/// Succeeds only when zero violations are found; on failure the caller is
/// expected to fall back to [`repair`].
pub fn validate(candidate: &Value) -> std::result::Result<Snapshot, Vec<FieldError>> {
    let mut errors = Vec::new();

    let obj = candidate.as_object();
    if obj.is_none() {
        errors.push(FieldError {
            field: "document".to_string(),
            expected: "object",
            found: type_name(Some(candidate)),
        });
    }

    let get = |key: &str| obj.and_then(|o| o.get(key));

    if !matches!(get("version"), Some(Value::Number(_))) {
        errors.push(FieldError {
            field: "version".to_string(),
            expected: "number",
            found: type_name(get("version")),
        });
    }
    if !matches!(get("lastUpdated"), Some(Value::String(_))) {
        errors.push(FieldError {
            field: "lastUpdated".to_string(),
            expected: "string",
            found: type_name(get("lastUpdated")),
        });
    }

    let essential = get("essential").and_then(|v| v.as_object());
    if essential.is_none() {
        errors.push(FieldError {
            field: "essential".to_string(),
            expected: "object",
            found: type_name(get("essential")),
        });
    }
    let get_ess = |key: &str| essential.and_then(|o| o.get(key));

    if !matches!(get_ess("lastSession"), Some(Value::String(s)) if !s.is_empty()) {
        errors.push(FieldError {
            field: "essential.lastSession".to_string(),
            expected: "non-empty string",
            found: type_name(get_ess("lastSession")),
        });
    }
    if !matches!(get_ess("stack"), Some(Value::String(s)) if !s.is_empty()) {
        errors.push(FieldError {
            field: "essential.stack".to_string(),
            expected: "non-empty string",
            found: type_name(get_ess("stack")),
        });
    }
    if !matches!(get_ess("projects"), Some(Value::Array(_))) {
        errors.push(FieldError {
            field: "essential.projects".to_string(),
            expected: "array",
            found: type_name(get_ess("projects")),
        });
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Shape checks passed; the typed decode can still trip on details the
    // checks don't cover (a non-string project entry, an unparseable
    // timestamp). That is still a validation failure, not an I/O one.
    match serde_json::from_value::<Snapshot>(candidate.clone()) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => Err(vec![FieldError {
            field: "document".to_string(),
            expected: "well-formed snapshot",
            found: e.to_string(),
        }]),
    }
}

// ---------------------------------------------------------------------------
// repair
// ---------------------------------------------------------------------------

/// Lenient reconstruction: build a default snapshot, then salvage each field
/// from the candidate that individually passes its own type check. Never
/// fails, even for `null` or garbage input. `version` is always forced to
/// the current schema constant and `lastUpdated` to `now`.
pub fn repair_at(candidate: &Value, now: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::default_at(now);

    if let Some(essential) = candidate.get("essential").and_then(|v| v.as_object()) {
        if let Some(s) = essential.get("lastSession").and_then(|v| v.as_str()) {
            if !s.is_empty() {
                snapshot.essential.last_session = s.to_string();
            }
        }
        if let Some(s) = essential.get("stack").and_then(|v| v.as_str()) {
            if !s.is_empty() {
                snapshot.essential.stack = s.to_string();
            }
        }
        if let Some(items) = essential.get("projects").and_then(|v| v.as_array()) {
            snapshot.essential.projects = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
        if let Some(n) = essential.get("sessionCount").and_then(|v| v.as_u64()) {
            snapshot.essential.session_count = n;
        }
        // Non-schema keys are carried verbatim, not discarded.
        for (key, value) in essential {
            if !matches!(
                key.as_str(),
                "lastSession" | "stack" | "projects" | "sessionCount"
            ) {
                snapshot.essential.extra.insert(key.clone(), value.clone());
            }
        }
    }

    if let Some(entries) = candidate.get("sessionHistory").and_then(|v| v.as_array()) {
        snapshot.session_history = entries
            .iter()
            .filter_map(|v| serde_json::from_value::<HistoryEntry>(v.clone()).ok())
            .collect();
        snapshot.trim_history();
    }

    snapshot.version = SCHEMA_VERSION;
    snapshot.last_updated = now;
    snapshot
}

/// [`repair_at`] with the current wall clock.
pub fn repair(candidate: &Value) -> Snapshot {
    repair_at(candidate, Utc::now())
}

/// Validate, falling back to repair on any violation. Returns the snapshot
/// and the violations that triggered repair (empty when the candidate was
/// already well-formed).
pub fn validate_or_repair(candidate: &Value, now: DateTime<Utc>) -> (Snapshot, Vec<FieldError>) {
    match validate(candidate) {
        Ok(snapshot) => (snapshot, Vec::new()),
        Err(errors) => (repair_at(candidate, now), errors),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
