use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::TimeZone;
use tracing::{error, warn};

use binlog::events::event::Event;
use binlog::row::row_data::RowData;
use common::config::BinlogConfig;
use common::err::decode_error::ReError;
use common::err::CResult;
use connection::binlog::binlog_options::BinlogOptions;
use connection::conn::binlog_connection::{BinlogConnection, IBinlogConnection};
use connection::conn::connection::{Connection, IConnection};
use connection::conn::connection_options::ConnectionOptions;

use crate::catalog::TableCatalog;
use crate::change_event::{ChangeEvent, QueryType, SourcePosition};
use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::pk_resolver::{MySqlPkSource, PkResolver};
use crate::sink::Sink;
use crate::table_id_map::TableIdMap;
use crate::value_convert;

/// Upper bound on a single streaming window before the session is torn down and a
/// checkpoint flushed, per the design's bounded-duplicate-replay policy.
pub const WINDOW_DURATION: Duration = Duration::from_secs(10);

/// `Opening -> Streaming -> Closing -> [restart]`, with `Failed` reached only when the
/// session cannot even open (bad credentials, replication denied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Opening,
    Streaming,
    Closing,
    Failed,
}

/// Cooperative controls shared between a reader's blocking session thread and the
/// scheduler that owns it. Checked at every suspension point, never held across one.
#[derive(Debug, Default)]
pub struct ReaderControl {
    cancelled: AtomicBool,
    paused: AtomicBool,
}

impl ReaderControl {
    pub fn new() -> Arc<Self> {
        Arc::new(ReaderControl::default())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

/// The MySQL binlog reader (C5): a long-lived replication session, run synchronously on
/// a dedicated blocking thread because the underlying decoder context (`LogContext`,
/// `BinlogOptions`) is built on `Rc`/`RefCell` and cannot cross an async task boundary.
/// The scheduler drives it via `tokio::task::spawn_blocking`.
pub struct MySqlBinlogReader {
    config: BinlogConfig,
    filter_tables: HashSet<String>,
    catalog: Arc<TableCatalog>,
    checkpoint_store: CheckpointStore,
    sink: Arc<dyn Sink>,
    control: Arc<ReaderControl>,
    state: ReaderState,
}

impl MySqlBinlogReader {
    pub fn new(
        config: BinlogConfig,
        catalog: Arc<TableCatalog>,
        checkpoint_store: CheckpointStore,
        sink: Arc<dyn Sink>,
        control: Arc<ReaderControl>,
    ) -> Self {
        let filter_tables = config.filter_tables.iter().cloned().collect();
        MySqlBinlogReader {
            config,
            filter_tables,
            catalog,
            checkpoint_store,
            sink,
            control,
            state: ReaderState::Opening,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Runs windowed sessions until cancelled. Intended to be the body of a
    /// `tokio::task::spawn_blocking` closure; everything here is synchronous.
    pub fn run(&mut self) -> CResult<()> {
        while !self.control.is_cancelled() {
            match self.run_one_window() {
                Ok(()) => {}
                Err(err) => {
                    self.state = ReaderState::Failed;
                    error!(error = %err, "mysql binlog session failed, will retry next window");
                    std::thread::sleep(Duration::from_millis(500));
                }
            }
        }
        Ok(())
    }

    fn connection_options(&self, binlog: BinlogOptions) -> ConnectionOptions {
        let mut options = ConnectionOptions::new_with_binlog(
            self.config.host.clone(),
            self.config.port as i16,
            self.config.username.clone(),
            self.config.password.clone(),
            binlog,
        );
        options.database = Some(self.config.dbname.clone());
        options.server_id = self.config.server_id;
        options.blocking = true;
        options
    }

    fn starting_position(&self, checkpoint: &Checkpoint) -> CResult<(String, u64)> {
        if checkpoint.last_log_file.is_empty() || checkpoint.binlog_position().unwrap_or(0) == 0 {
            self.query_master_status()
        } else {
            Ok((checkpoint.last_log_file.clone(), checkpoint.binlog_position().unwrap_or(0) as u64))
        }
    }

    /// `SHOW MASTER STATUS` adoption: the "start from current HEAD" policy used when no
    /// checkpoint exists yet.
    fn query_master_status(&self) -> CResult<(String, u64)> {
        let options = self.connection_options(BinlogOptions::from_end());
        let mut conn = Connection::new(options);
        conn.try_connect()?;

        let rows = conn.query("SHOW MASTER STATUS".to_string())?;
        let row = rows.first().ok_or_else(|| {
            ReError::String("SHOW MASTER STATUS returned no rows; is binary logging enabled?".to_string())
        })?;
        let cells = row.as_slice();
        let file = cells.first().cloned().unwrap_or_default();
        let position: u64 = cells.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
        Ok((file, position))
    }

    fn run_one_window(&mut self) -> CResult<()> {
        self.state = ReaderState::Opening;
        let checkpoint = self.checkpoint_store.load();
        let (file, position) = self.starting_position(&checkpoint)?;

        let mut pk_resolver = PkResolver::new(MySqlPkSource::new({
            let options = self.connection_options(BinlogOptions::from_position(file.clone(), position));
            let mut conn = Connection::new(options);
            conn.try_connect()?;
            conn
        }));

        let options = self.connection_options(BinlogOptions::from_position(file.clone(), position));
        let mut binlog_conn = BinlogConnection::new(&options);
        let events = binlog_conn.binlog()?;

        self.state = ReaderState::Streaming;
        let mut table_map = TableIdMap::new();
        let mut current_file = file;
        let mut current_position = position;
        let deadline = Instant::now() + WINDOW_DURATION;

        for batch in events {
            if self.control.is_cancelled() {
                break;
            }

            let batch = match batch {
                Ok(batch) => batch,
                Err(err) => {
                    warn!(error = %err, "binlog read error, ending window early");
                    break;
                }
            };

            for event in batch {
                match event {
                    Event::Rotate(rotate) => {
                        current_file = rotate.get_file_name();
                        current_position = rotate.get_binlog_position();
                    }
                    Event::TableMap(ref table_map_event) => {
                        current_position = table_map_event.header().get_log_pos() as u64;
                        table_map.record(table_map_event);
                    }
                    Event::WriteRows(write_rows) => {
                        current_position = write_rows.header().get_log_pos() as u64;
                        let when = write_rows.header().when;
                        self.handle_rows(
                            &table_map,
                            write_rows.table_id,
                            QueryType::Insert,
                            write_rows.rows.into_iter().map(|row| (row, None)),
                            &current_file,
                            current_position,
                            when,
                            &mut pk_resolver,
                        )?;
                    }
                    Event::UpdateRows(update_rows) => {
                        current_position = update_rows.header().get_log_pos() as u64;
                        let when = update_rows.header().when;
                        self.handle_rows(
                            &table_map,
                            update_rows.table_id,
                            QueryType::Update,
                            update_rows
                                .rows
                                .into_iter()
                                .map(|pair| (pair.before_update, Some(pair.after_update))),
                            &current_file,
                            current_position,
                            when,
                            &mut pk_resolver,
                        )?;
                    }
                    Event::DeleteRows(delete_rows) => {
                        current_position = delete_rows.header.get_log_pos() as u64;
                        let when = delete_rows.header.when;
                        self.handle_rows(
                            &table_map,
                            delete_rows.table_id,
                            QueryType::Delete,
                            delete_rows.rows.into_iter().map(|row| (row, None)),
                            &current_file,
                            current_position,
                            when,
                            &mut pk_resolver,
                        )?;
                    }
                    _ => {}
                }
            }

            if Instant::now() >= deadline {
                break;
            }
        }

        self.state = ReaderState::Closing;
        drop(binlog_conn);

        let checkpoint = Checkpoint::with_binlog_position(current_file, current_position as u32);
        if let Err(err) = self.checkpoint_store.save(&checkpoint) {
            warn!(error = %err, "checkpoint write failed; progress will be re-saved on next successful window");
        } else {
            let _ = futures_executor::block_on(self.sink.checkpointed(&checkpoint.last_log_file));
        }

        Ok(())
    }

    /// `rows` pairs a pre-image with an optional post-image (`Some` only for UPDATE).
    /// For UPDATE the emitted PK is always taken from the pre-image, per spec.
    fn handle_rows(
        &self,
        table_map: &TableIdMap,
        table_id: u64,
        query_type: QueryType,
        rows: impl Iterator<Item = (RowData, Option<RowData>)>,
        file: &str,
        log_pos: u64,
        when: u32,
        pk_resolver: &mut PkResolver<MySqlPkSource<Connection>>,
    ) -> CResult<()> {
        let Some((database, table)) = table_map.lookup(table_id) else {
            warn!(table_id, "rows event for unknown table_id, dropping");
            return Ok(());
        };

        if !self.filter_tables.contains(table) {
            return Ok(());
        }

        let schema = pk_resolver.schema(database, table)?;
        let key_columns = self.catalog.keys(table);
        // `Header.when` is the event's own creation time, not processing time — using it
        // (rather than `Utc::now()`) keeps `wall_time` identical across an at-least-once
        // replay of the same event after a window restart.
        let wall_time: chrono::DateTime<chrono::FixedOffset> = chrono::Utc.timestamp_opt(when as i64, 0).unwrap().into();

        for (pre_image, _post_image) in rows {
            let primary_key = extract_primary_key(&schema.columns, &schema.primary_key, &pre_image);
            let extracted_keys = extract_primary_key(&schema.columns, key_columns, &pre_image);

            let event = ChangeEvent {
                source_position: SourcePosition::MySql { file: file.to_string(), log_pos: log_pos as u32 },
                wall_time,
                database: database.clone(),
                table: table.clone(),
                query_type,
                primary_key,
                extracted_keys,
                raw_statement: None,
            };

            if !self.control.is_paused() {
                deliver_with_backoff(self.sink.as_ref(), event);
            }
        }

        Ok(())
    }
}

/// Picks `wanted` columns (by name) out of a positional row, used for both `primary_key`
/// and `extracted_keys` — they differ only in which catalog-declared column list is passed.
fn extract_primary_key(
    columns: &[String],
    wanted: &[String],
    row: &RowData,
) -> BTreeMap<String, serde_json::Value> {
    let cells = row.get_cells();
    let mut extracted = BTreeMap::new();
    for column in wanted {
        let Some(index) = columns.iter().position(|c| c == column) else {
            continue;
        };
        if let Some(Some(value)) = cells.get(index) {
            extracted.insert(column.clone(), value_convert::to_json(value));
        }
    }
    extracted
}

/// Sink-refused retry: 100ms, 200ms, 400ms, capped at 5s. Never drops the event.
fn deliver_with_backoff(sink: &dyn Sink, event: ChangeEvent) {
    let mut delay = Duration::from_millis(100);
    loop {
        let outcome = futures_executor::block_on(sink.deliver(event.clone()));
        match outcome {
            Ok(()) => return,
            Err(err) => {
                warn!(error = %err, delay_ms = delay.as_millis(), "sink refused event, retrying");
                std::thread::sleep(delay);
                delay = (delay * 2).min(Duration::from_secs(5));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use common::binlog::column::column_value::SrcColumnValue;

    #[test]
    fn extracts_pk_by_positional_column_index() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let pk = vec!["id".to_string()];
        let row = RowData::new_with_cells(vec![
            Some(SrcColumnValue::Int(1)),
            Some(SrcColumnValue::String("a".into())),
        ]);

        let result = extract_primary_key(&columns, &pk, &row);
        assert_eq!(result.get("id"), Some(&serde_json::json!(1)));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn missing_pk_column_is_skipped_not_panicked() {
        let columns = vec!["id".to_string()];
        let pk = vec!["id".to_string(), "tenant_id".to_string()];
        let row = RowData::new_with_cells(vec![Some(SrcColumnValue::Int(9))]);

        let result = extract_primary_key(&columns, &pk, &row);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("id"), Some(&serde_json::json!(9)));
    }

    #[test]
    fn extracts_declared_keys_same_way_as_primary_key() {
        let columns = vec!["id".to_string(), "name".to_string(), "email".to_string()];
        let keys = vec!["name".to_string()];
        let row = RowData::new_with_cells(vec![
            Some(SrcColumnValue::Int(1)),
            Some(SrcColumnValue::String("a".into())),
            Some(SrcColumnValue::String("a@example.com".into())),
        ]);

        let result = extract_primary_key(&columns, &keys, &row);
        assert_eq!(result.get("name"), Some(&serde_json::json!("a")));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn null_pk_cell_is_skipped() {
        let columns = vec!["id".to_string()];
        let pk = vec!["id".to_string()];
        let row = RowData::new_with_cells(vec![None]);

        let result = extract_primary_key(&columns, &pk, &row);
        assert!(result.is_empty());
    }
}
