use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema version stamped on every repaired or compacted snapshot.
pub const SCHEMA_VERSION: u32 = 3;

/// Most recent history entries retained after finalize/repair.
pub const HISTORY_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub session_type: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Essential {
    #[serde(default = "default_last_session")]
    pub last_session: String,
    #[serde(default = "default_stack")]
    pub stack: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub session_count: u64,
    /// Non-schema fields written through the generic update path. Carried
    /// verbatim so a journaled write is never dropped at compaction.
    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

fn default_last_session() -> String {
    "none".to_string()
}

fn default_stack() -> String {
    "unknown".to_string()
}

impl Default for Essential {
    fn default() -> Self {
        Self {
            last_session: default_last_session(),
            stack: default_stack(),
            projects: Vec::new(),
            session_count: 0,
            extra: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The durable base state: either fully well-formed per the schema, or it
/// does not exist. Repair runs before any write-back from untrusted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub essential: Essential,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_history: Vec<HistoryEntry>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl Snapshot {
    /// Fresh default snapshot stamped with the given time.
    pub fn default_at(now: DateTime<Utc>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            last_updated: now,
            essential: Essential::default(),
            session_history: Vec::new(),
        }
    }

    pub fn default_now() -> Self {
        Self::default_at(Utc::now())
    }

    /// Drop all but the most recent [`HISTORY_LIMIT`] history entries.
    pub fn trim_history(&mut self) {
        if self.session_history.len() > HISTORY_LIMIT {
            let excess = self.session_history.len() - HISTORY_LIMIT;
            self.session_history.drain(..excess);
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
