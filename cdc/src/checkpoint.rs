use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::warn;
use common::err::CResult;

/// Durable resume-state, shared by both readers. The tuple is written atomically:
/// either all three fields are the most recently emitted values, or the file on
/// disk still holds the previous (equally valid) snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// MySQL: decimal string of the 32-bit `log_pos`. Absent for Postgres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_binlog_position: Option<String>,
    /// Postgres: `YYYY-MM-DD HH:MM:SS.mmm ±HH`. Absent for MySQL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_log_datetime: Option<String>,
    pub last_log_file: String,

    /// Legacy field from a prior implementation. Never written; ignored on load.
    #[serde(default, skip_serializing)]
    #[allow(dead_code)]
    cached_logs: Option<serde_json::Value>,
}

impl Checkpoint {
    pub fn binlog_position(&self) -> Option<u32> {
        self.last_binlog_position.as_ref().and_then(|s| s.parse().ok())
    }

    pub fn with_binlog_position(file: String, log_pos: u32) -> Self {
        Checkpoint {
            last_binlog_position: Some(log_pos.to_string()),
            last_log_datetime: None,
            last_log_file: file,
            cached_logs: None,
        }
    }

    pub fn with_log_datetime(file: String, datetime: String) -> Self {
        Checkpoint {
            last_binlog_position: None,
            last_log_datetime: Some(datetime),
            last_log_file: file,
            cached_logs: None,
        }
    }
}

/// Loads and atomically persists a [`Checkpoint`] at a fixed path.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        CheckpointStore { path: path.into() }
    }

    /// Returns the zero-valued checkpoint if the file is absent or malformed.
    /// Never fails the caller.
    pub fn load(&self) -> Checkpoint {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(checkpoint) => checkpoint,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "checkpoint file is malformed, starting from zero value");
                    Checkpoint::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Checkpoint::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "could not read checkpoint file, starting from zero value");
                Checkpoint::default()
            }
        }
    }

    /// Writes the checkpoint atomically: serialize to a sibling temp file, then
    /// rename over the destination, so an interrupted write never leaves a
    /// truncated file.
    pub fn save(&self, checkpoint: &Checkpoint) -> CResult<()> {
        let content = serde_json::to_vec_pretty(checkpoint)?;

        let tmp_path = tmp_sibling(&self.path);
        fs::write(&tmp_path, &content)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{file_name}.tmp"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_loads_as_zero_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        assert_eq!(store.load(), Checkpoint::default());
    }

    #[test]
    fn malformed_file_loads_as_zero_value_and_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, b"not json").unwrap();

        let store = CheckpointStore::new(path);
        assert_eq!(store.load(), Checkpoint::default());
    }

    #[test]
    fn round_trips_mysql_shaped_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));

        let checkpoint = Checkpoint::with_binlog_position("mysql-bin.000003".into(), 4096);
        store.save(&checkpoint).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, checkpoint);
        assert_eq!(loaded.binlog_position(), Some(4096));
    }

    #[test]
    fn save_never_leaves_a_partial_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        let store = CheckpointStore::new(&path);

        store.save(&Checkpoint::with_log_datetime("postgres.log".into(), "2025-03-14 10:15:30.123 +07".into())).unwrap();

        assert!(!path.with_file_name("checkpoint.json.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn cached_logs_is_ignored_on_load_and_never_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, br#"{"last_log_file":"a.log","cached_logs":["stale"]}"#).unwrap();

        let store = CheckpointStore::new(&path);
        let loaded = store.load();
        store.save(&loaded).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("cached_logs"));
    }
}
