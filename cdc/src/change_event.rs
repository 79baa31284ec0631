use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque, monotonic token identifying a point in the source's change stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePosition {
    /// MySQL binlog coordinate: `(file, log_pos)`.
    MySql { file: String, log_pos: u32 },
    /// PostgreSQL log coordinate: `(log_file_basename, wall_timestamp)`.
    Postgres { log_file: String, wall_time: chrono::DateTime<chrono::FixedOffset> },
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePosition::MySql { file, log_pos } => write!(f, "{file}:{log_pos}"),
            SourcePosition::Postgres { log_file, wall_time } => write!(f, "{log_file}@{wall_time}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Insert,
    Update,
    Delete,
}

/// A single row-level change, produced by a reader and handed to a [`crate::sink::Sink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub source_position: SourcePosition,
    pub wall_time: chrono::DateTime<chrono::FixedOffset>,
    pub database: String,
    pub table: String,
    pub query_type: QueryType,
    /// PK column name -> value. For UPDATE, the pre-image PK.
    pub primary_key: BTreeMap<String, Value>,
    /// Non-PK columns declared in the catalog's `keys` list; empty when none are declared.
    pub extracted_keys: BTreeMap<String, Value>,
    /// Postgres only: the unparsed SQL line, kept for auditing.
    pub raw_statement: Option<String>,
}

impl ChangeEvent {
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}
