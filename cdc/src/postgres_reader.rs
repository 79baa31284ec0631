use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, warn};

use common::err::decode_error::ReError;
use common::err::CResult;

use crate::catalog::TableCatalog;
use crate::change_event::{ChangeEvent, QueryType, SourcePosition};
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::mysql_reader::ReaderControl;
use crate::pg_parser;
use crate::sink::Sink;

/// Re-scan cadence: how often the latest log file is re-read from the resumption point.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Safety-net cadence: forces a poll even if nothing else would have triggered one, for
/// clocks that skew or directories whose mtime granularity hides updates.
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(600);

/// The PostgreSQL statement-log tailer (C6): watches a directory for the newest `.log`
/// file, resumes from the last acknowledged timestamp, and parses filtered INSERT/UPDATE/
/// DELETE statements out of the server's statement-logging output.
pub struct PostgresLogTailer {
    log_dir: PathBuf,
    database: String,
    filter_tables: Vec<String>,
    catalog: Arc<TableCatalog>,
    checkpoint_store: CheckpointStore,
    sink: Arc<dyn Sink>,
    control: Arc<ReaderControl>,
    last_resync: Instant,
}

impl PostgresLogTailer {
    /// Fails fast if the 27-byte hour-only-offset timestamp format does not round-trip,
    /// per the validation probe required at construction.
    pub fn new(
        log_dir: PathBuf,
        database: String,
        filter_tables: Vec<String>,
        catalog: Arc<TableCatalog>,
        checkpoint_store: CheckpointStore,
        sink: Arc<dyn Sink>,
        control: Arc<ReaderControl>,
    ) -> CResult<Self> {
        pg_parser::validate_timestamp_format().map_err(ReError::String)?;
        Ok(PostgresLogTailer {
            log_dir,
            database,
            filter_tables,
            catalog,
            checkpoint_store,
            sink,
            control,
            last_resync: Instant::now(),
        })
    }

    /// Polls on `POLL_INTERVAL` (and forces a poll every `RESYNC_INTERVAL`) until
    /// cancelled. Each poll flushes a checkpoint as soon as it emits at least one event.
    pub async fn run(&mut self) -> CResult<()> {
        while !self.control.is_cancelled() {
            if let Err(err) = self.poll_once().await {
                warn!(error = %err, "postgres log poll failed, will retry next cadence");
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }

    async fn poll_once(&mut self) -> CResult<()> {
        if self.control.is_paused() {
            return Ok(());
        }

        let forced_resync = self.last_resync.elapsed() >= RESYNC_INTERVAL;
        if forced_resync {
            self.last_resync = Instant::now();
        }

        let checkpoint = self.checkpoint_store.load();
        let path = latest_log_file(&self.log_dir)?;
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        // The predicate is always `wall_time > checkpoint.last_timestamp`, file rollover
        // included — when the latest file is new, its timestamps are after the checkpoint
        // anyway, so every line in it ends up admitted.
        let threshold = checkpoint.last_log_datetime.as_deref().and_then(pg_parser::parse_timestamp);

        let content = fs::read_to_string(&path)?;
        let mut last_seen: Option<DateTime<FixedOffset>> = None;
        let mut emitted = 0u32;

        for line in content.lines() {
            let Some(wall_time) = pg_parser::parse_timestamp(line) else {
                debug!(line_len = line.len(), "line does not begin with a recognizable timestamp, skipping");
                continue;
            };

            if let Some(threshold) = threshold {
                if wall_time <= threshold {
                    continue;
                }
            }

            let message = pg_parser::message_of(line);
            if let Some(event) = self.parse_event(message, wall_time, line, &file_name) {
                deliver_with_backoff(self.sink.as_ref(), event).await;
                emitted += 1;
                last_seen = Some(wall_time);
            }
        }

        if let Some(last_seen) = last_seen {
            let checkpoint = Checkpoint::with_log_datetime(file_name, pg_parser::format_timestamp(&last_seen));
            if let Err(err) = self.checkpoint_store.save(&checkpoint) {
                warn!(error = %err, "checkpoint write failed; progress will be re-saved on next successful poll");
            } else {
                let _ = self.sink.checkpointed(&checkpoint.last_log_file).await;
            }
        }

        debug!(emitted, forced_resync, "postgres log poll complete");
        Ok(())
    }

    fn parse_event(&self, message: &str, wall_time: DateTime<FixedOffset>, raw_line: &str, file_name: &str) -> Option<ChangeEvent> {
        let (query_type, table) = pg_parser::classify_statement(message, &self.filter_tables)?;
        let entry = self.catalog.get(&table);
        let primary_key_cols = entry.map(|e| e.primary_key.as_slice()).unwrap_or(&[]);
        let key_cols = entry.map(|e| e.keys.as_slice()).unwrap_or(&[]);

        let (primary_key, extracted_keys) = match query_type {
            QueryType::Insert => {
                let pairs = pg_parser::parse_insert_columns_values(message);
                let values: BTreeMap<String, String> = pairs.into_iter().collect();
                (select_columns(&values, primary_key_cols), select_columns(&values, key_cols))
            }
            QueryType::Update | QueryType::Delete => {
                let values = pg_parser::extract_where_columns(message, primary_key_cols);
                (to_json_map(values), BTreeMap::new())
            }
        };

        if primary_key.is_empty() {
            warn!(table, "postgres statement parsed with an empty primary key map");
        }

        Some(ChangeEvent {
            source_position: SourcePosition::Postgres { log_file: file_name.to_string(), wall_time },
            wall_time,
            database: self.database.clone(),
            table,
            query_type,
            primary_key,
            extracted_keys,
            raw_statement: Some(raw_line.to_string()),
        })
    }
}

/// Sink-refused retry: 100ms, 200ms, 400ms, capped at 5s. Mirrors the MySQL reader's
/// backoff policy; never drops the event.
async fn deliver_with_backoff(sink: &dyn Sink, event: ChangeEvent) {
    let mut delay = Duration::from_millis(100);
    loop {
        match sink.deliver(event.clone()).await {
            Ok(()) => return,
            Err(err) => {
                warn!(error = %err, delay_ms = delay.as_millis(), "sink refused event, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(5));
            }
        }
    }
}

fn select_columns(values: &BTreeMap<String, String>, columns: &[String]) -> BTreeMap<String, serde_json::Value> {
    columns
        .iter()
        .filter_map(|c| values.get(c).map(|v| (c.clone(), serde_json::Value::from(v.clone()))))
        .collect()
}

fn to_json_map(values: BTreeMap<String, String>) -> BTreeMap<String, serde_json::Value> {
    values.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect()
}

/// Scans `dir` non-recursively for `.log` files and returns the most recently modified.
pub fn latest_log_file(dir: &Path) -> CResult<PathBuf> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    let entries = fs::read_dir(dir).map_err(|err| ReError::String(format!("cannot read log directory {}: {err}", dir.display())))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| ReError::String(format!("no .log files found in {}", dir.display())))
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    use crate::catalog::{CatalogEntry, TableCatalog};
    use crate::sink::InMemorySink;

    fn sample_catalog() -> Arc<TableCatalog> {
        Arc::new(TableCatalog::new(vec![CatalogEntry {
            table_name: "users".to_string(),
            keys: vec!["name".to_string()],
            primary_key: vec!["id".to_string()],
        }]))
    }

    fn write_log(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn latest_log_file_picks_most_recently_modified() {
        let dir = tempfile::tempdir().unwrap();
        write_log(dir.path(), "a.log", "old");
        std::thread::sleep(Duration::from_millis(10));
        let newest = write_log(dir.path(), "b.log", "new");

        assert_eq!(latest_log_file(dir.path()).unwrap(), newest);
    }

    #[test]
    fn latest_log_file_errors_when_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_log_file(dir.path()).is_err());
    }

    #[tokio::test]
    async fn insert_line_emits_event_with_pk_and_extracted_keys() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "postgres.log",
            "2025-03-14 10:15:30.123 +07 LOG:  statement: INSERT INTO \"public\".\"users\" (\"id\",\"name\") VALUES ('1','alice')\n",
        );

        let sink = Arc::new(InMemorySink::new());
        let checkpoint_store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        let control = ReaderControl::new();

        let mut tailer = PostgresLogTailer::new(
            dir.path().to_path_buf(),
            "db".to_string(),
            vec!["users".to_string()],
            sample_catalog(),
            checkpoint_store,
            sink.clone(),
            control,
        )
        .unwrap();

        tailer.poll_once().await.unwrap();

        let events = sink.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].primary_key.get("id"), Some(&serde_json::json!("1")));
        assert_eq!(events[0].extracted_keys.get("name"), Some(&serde_json::json!("alice")));
        assert_eq!(events[0].query_type, QueryType::Insert);
    }

    #[tokio::test]
    async fn restart_resumption_only_emits_lines_after_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "postgres.log",
            concat!(
                "2025-03-14 09:00:00.000 +07 LOG:  statement: INSERT INTO \"users\" (\"id\",\"name\") VALUES ('1','a')\n",
                "2025-03-14 10:00:00.000 +07 LOG:  statement: INSERT INTO \"users\" (\"id\",\"name\") VALUES ('2','b')\n",
                "2025-03-14 10:15:30.123 +07 LOG:  statement: INSERT INTO \"users\" (\"id\",\"name\") VALUES ('3','c')\n",
                "2025-03-14 10:16:00.000 +07 LOG:  statement: INSERT INTO \"users\" (\"id\",\"name\") VALUES ('4','d')\n",
                "2025-03-14 10:17:00.000 +07 LOG:  statement: INSERT INTO \"users\" (\"id\",\"name\") VALUES ('5','e')\n",
            ),
        );

        let checkpoint_path = dir.path().join("checkpoint.json");
        let checkpoint_store = CheckpointStore::new(&checkpoint_path);
        checkpoint_store
            .save(&Checkpoint::with_log_datetime("postgres.log".to_string(), "2025-03-14 10:00:00.000 +07".to_string()))
            .unwrap();

        let sink = Arc::new(InMemorySink::new());
        let control = ReaderControl::new();
        let mut tailer = PostgresLogTailer::new(
            dir.path().to_path_buf(),
            "db".to_string(),
            vec!["users".to_string()],
            sample_catalog(),
            checkpoint_store,
            sink.clone(),
            control,
        )
        .unwrap();

        tailer.poll_once().await.unwrap();
        assert_eq!(sink.len(), 3);

        tailer.poll_once().await.unwrap();
        assert_eq!(sink.len(), 3, "second poll with no new lines should emit nothing more");
    }

    #[tokio::test]
    async fn update_line_extracts_pk_from_where_clause() {
        let dir = tempfile::tempdir().unwrap();
        write_log(
            dir.path(),
            "postgres.log",
            "2025-03-14 10:15:30.123 +07 LOG:  statement: UPDATE \"users\" SET \"name\"='b' WHERE \"id\" = 7\n",
        );

        let sink = Arc::new(InMemorySink::new());
        let checkpoint_store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        let control = ReaderControl::new();
        let mut tailer = PostgresLogTailer::new(
            dir.path().to_path_buf(),
            "db".to_string(),
            vec!["users".to_string()],
            sample_catalog(),
            checkpoint_store,
            sink.clone(),
            control,
        )
        .unwrap();

        tailer.poll_once().await.unwrap();

        let events = sink.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].query_type, QueryType::Update);
        assert_eq!(events[0].primary_key.get("id"), Some(&serde_json::json!("7")));
    }
}
