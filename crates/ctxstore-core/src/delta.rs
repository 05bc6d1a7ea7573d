use crate::paths::KNOWN_ROOTS;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaOp {
    Set,
    Add,
    Remove,
}

impl DeltaOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaOp::Set => "set",
            DeltaOp::Add => "add",
            DeltaOp::Remove => "remove",
        }
    }
}

impl std::str::FromStr for DeltaOp {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "set" => Ok(DeltaOp::Set),
            "add" => Ok(DeltaOp::Add),
            "remove" => Ok(DeltaOp::Remove),
            other => Err(format!("unknown op '{other}': expected set, add, or remove")),
        }
    }
}

/// One recorded incremental mutation. Immutable once appended; journal order
/// is application order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub timestamp: DateTime<Utc>,
    pub op: DeltaOp,
    pub field: String,
    pub value: Value,
}

impl Delta {
    pub fn new(op: DeltaOp, field: impl Into<String>, value: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            op,
            field: field.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Applier
// ---------------------------------------------------------------------------

/// Apply one delta to a snapshot document. Pure and total: a path whose root
/// is not a known subtree, or that names no target beneath it, leaves the
/// document unchanged.
///
/// The final path segment is the mutation target; intermediate segments
/// descend one level each, replacing missing or non-object values with an
/// empty object.
pub fn apply(mut doc: Value, delta: &Delta) -> Value {
    apply_in_place(&mut doc, delta);
    doc
}

fn apply_in_place(doc: &mut Value, delta: &Delta) {
    let mut segments = delta.field.split('.');
    let Some(root) = segments.next() else {
        return;
    };
    if !KNOWN_ROOTS.contains(&root) {
        return;
    }
    let rest: Vec<&str> = segments.collect();
    let Some((last, intermediate)) = rest.split_last() else {
        return;
    };

    let mut parent = match doc {
        Value::Object(m) => m,
        _ => return,
    };
    // Descend through the root and every intermediate segment, replacing
    // missing or non-object values with an empty object.
    for seg in std::iter::once(root).chain(intermediate.iter().copied()) {
        let entry = parent
            .entry(seg.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        parent = match entry {
            Value::Object(m) => m,
            _ => return, // never taken: ensured an object above
        };
    }

    match delta.op {
        DeltaOp::Set => {
            parent.insert(last.to_string(), delta.value.clone());
        }
        DeltaOp::Add => match parent.get_mut(*last) {
            Some(Value::Array(items)) => items.push(delta.value.clone()),
            Some(target @ Value::Number(_)) => {
                *target = accumulate(target, &delta.value);
            }
            _ => {
                parent.insert(last.to_string(), delta.value.clone());
            }
        },
        DeltaOp::Remove => {
            parent.remove(*last);
        }
    }
}

/// Numeric accumulate for `add` on a number-shaped target. Integer arithmetic
/// is preserved when both sides are integers; a non-numeric value, or a sum
/// that is not representable as JSON (overflow to infinity), falls back to
/// assignment so a counter can never become `null`.
fn accumulate(target: &Value, value: &Value) -> Value {
    if let (Some(a), Some(b)) = (target.as_i64(), value.as_i64()) {
        return Value::from(a.saturating_add(b));
    }
    if let (Some(a), Some(b)) = (target.as_f64(), value.as_f64()) {
        let sum = a + b;
        if sum.is_finite() {
            return Value::from(sum);
        }
    }
    value.clone()
}

/// Replay an ordered sequence of deltas: a pure left-fold over [`apply`].
pub fn fold<'a, I>(doc: Value, deltas: I) -> Value
where
    I: IntoIterator<Item = &'a Delta>,
{
    deltas.into_iter().fold(doc, apply)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "version": 3,
            "lastUpdated": "2026-01-01T00:00:00Z",
            "essential": {
                "lastSession": "none",
                "stack": "rust",
                "projects": [],
                "sessionCount": 0
            }
        })
    }

    fn delta(op: DeltaOp, field: &str, value: Value) -> Delta {
        Delta::new(op, field, value)
    }

    #[test]
    fn set_overwrites_unconditionally() {
        let doc = apply(base(), &delta(DeltaOp::Set, "essential.stack", json!("typescript")));
        assert_eq!(doc["essential"]["stack"], json!("typescript"));

        // Type changes are allowed.
        let doc = apply(doc, &delta(DeltaOp::Set, "essential.stack", json!(42)));
        assert_eq!(doc["essential"]["stack"], json!(42));
    }

    #[test]
    fn add_appends_to_array() {
        let doc = apply(
            base(),
            &delta(DeltaOp::Add, "essential.projects", json!("iron-tracker")),
        );
        let doc = apply(doc, &delta(DeltaOp::Add, "essential.projects", json!("b")));
        assert_eq!(doc["essential"]["projects"], json!(["iron-tracker", "b"]));
    }

    #[test]
    fn add_accumulates_number() {
        let mut doc = base();
        doc["essential"]["sessionCount"] = json!(3);
        let doc = apply(doc, &delta(DeltaOp::Add, "essential.sessionCount", json!(2)));
        assert_eq!(doc["essential"]["sessionCount"], json!(5));
    }

    #[test]
    fn add_never_yields_null_on_overflow() {
        let mut doc = base();
        doc["essential"]["sessionCount"] = json!(1e308);
        let doc = apply(
            doc,
            &delta(DeltaOp::Add, "essential.sessionCount", json!(1e308)),
        );
        // Non-representable sum falls back to assignment.
        assert_eq!(doc["essential"]["sessionCount"], json!(1e308));

        let mut doc = base();
        doc["essential"]["sessionCount"] = json!(i64::MAX);
        let doc = apply(doc, &delta(DeltaOp::Add, "essential.sessionCount", json!(1)));
        assert_eq!(doc["essential"]["sessionCount"], json!(i64::MAX));
    }

    #[test]
    fn add_on_absent_target_assigns() {
        let doc = apply(base(), &delta(DeltaOp::Add, "essential.newField", json!("x")));
        assert_eq!(doc["essential"]["newField"], json!("x"));
    }

    #[test]
    fn add_on_string_target_falls_back_to_set() {
        let doc = apply(base(), &delta(DeltaOp::Add, "essential.lastSession", json!("s2")));
        assert_eq!(doc["essential"]["lastSession"], json!("s2"));
    }

    #[test]
    fn remove_deletes_key() {
        let doc = apply(base(), &delta(DeltaOp::Remove, "essential.stack", json!(null)));
        assert!(doc["essential"].get("stack").is_none());
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let doc = apply(base(), &delta(DeltaOp::Remove, "essential.nothing", json!(null)));
        assert_eq!(doc, base());
    }

    #[test]
    fn unknown_root_is_noop() {
        let doc = apply(base(), &delta(DeltaOp::Set, "metadata.stack", json!("x")));
        assert_eq!(doc, base());
    }

    #[test]
    fn history_root_is_noop_on_replay() {
        // A hand-edited journal line addressing the history array must not
        // clobber it into an object.
        let mut doc = base();
        doc["sessionHistory"] = json!([{
            "timestamp": "2026-01-01T00:00:00Z",
            "sessionType": "work",
            "summary": "s0"
        }]);
        let out = apply(doc.clone(), &delta(DeltaOp::Set, "sessionHistory.recent", json!("x")));
        assert_eq!(out, doc);
    }

    #[test]
    fn bare_root_is_noop() {
        let doc = apply(base(), &delta(DeltaOp::Set, "essential", json!("x")));
        assert_eq!(doc, base());
    }

    #[test]
    fn intermediate_segments_create_objects() {
        let doc = apply(
            base(),
            &delta(DeltaOp::Set, "essential.prefs.editor.theme", json!("dark")),
        );
        assert_eq!(doc["essential"]["prefs"]["editor"]["theme"], json!("dark"));
    }

    #[test]
    fn non_object_intermediate_is_replaced() {
        let mut doc = base();
        doc["essential"]["prefs"] = json!("scalar");
        let doc = apply(doc, &delta(DeltaOp::Set, "essential.prefs.theme", json!("dark")));
        assert_eq!(doc["essential"]["prefs"]["theme"], json!("dark"));
    }

    #[test]
    fn fold_is_deterministic() {
        let deltas = vec![
            delta(DeltaOp::Add, "essential.projects", json!("a")),
            delta(DeltaOp::Add, "essential.sessionCount", json!(1)),
            delta(DeltaOp::Set, "essential.lastSession", json!("s9")),
            delta(DeltaOp::Remove, "essential.stack", json!(null)),
        ];
        let first = fold(base(), &deltas);
        let second = fold(base(), &deltas);
        assert_eq!(first, second);
        assert_eq!(first["essential"]["projects"], json!(["a"]));
        assert_eq!(first["essential"]["sessionCount"], json!(1));
    }

    #[test]
    fn delta_wire_shape() {
        let d = delta(DeltaOp::Add, "essential.projects", json!("x"));
        let line = serde_json::to_string(&d).unwrap();
        assert!(line.contains("\"op\":\"add\""));
        assert!(line.contains("\"field\":\"essential.projects\""));
        let parsed: Delta = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, d);
    }
}
