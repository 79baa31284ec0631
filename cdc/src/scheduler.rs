use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use common::config::{Config, SourceKind};
use common::err::CResult;

use crate::catalog::TableCatalog;
use crate::checkpoint::CheckpointStore;
use crate::mysql_reader::{MySqlBinlogReader, ReaderControl};
use crate::postgres_reader::PostgresLogTailer;
use crate::sink::Sink;

/// A running reader's cancellation handle and its background task.
struct ReaderHandle {
    control: Arc<ReaderControl>,
    task: tokio::task::JoinHandle<()>,
}

impl ReaderHandle {
    fn pause(&self) {
        self.control.pause();
    }

    fn resume(&self) {
        self.control.resume();
    }

    async fn stop(self) {
        self.control.cancel();
        if let Err(err) = self.task.await {
            warn!(error = %err, "reader task panicked while stopping");
        }
    }
}

/// Owns the reader task(s) implied by `Config.dbtype` (C8). Exactly one reader runs at a
/// time — a `Config` names a single source — started as a `tokio::task::spawn_blocking`
/// session for MySQL (whose replication session is `!Send`) or a plain `tokio::spawn` task
/// for PostgreSQL (which is async end to end).
pub struct Scheduler {
    config: Config,
    catalog: Arc<TableCatalog>,
    sink: Arc<dyn Sink>,
    reader: Option<ReaderHandle>,
}

impl Scheduler {
    pub fn new(config: Config, catalog: Arc<TableCatalog>, sink: Arc<dyn Sink>) -> Self {
        Scheduler { config, catalog, sink, reader: None }
    }

    /// Begins polling. A `dbtype` that does not activate the core (Microsoft SQL Server,
    /// MongoDB) is accepted but starts no reader.
    pub fn start(&mut self) -> CResult<()> {
        if self.reader.is_some() {
            warn!("start() called while a reader is already running; ignoring");
            return Ok(());
        }

        if !self.config.dbtype.activates_core() {
            info!("dbtype does not activate the CDC core, scheduler is idle");
            return Ok(());
        }

        let control = ReaderControl::new();
        let checkpoint_store = CheckpointStore::new(self.config.state_file.clone());

        let task = match self.config.dbtype {
            SourceKind::MySQL => self.spawn_mysql(control.clone(), checkpoint_store),
            SourceKind::PostgreSQL => self.spawn_postgres(control.clone(), checkpoint_store)?,
            _ => unreachable!("activates_core() already filtered this case"),
        };

        self.reader = Some(ReaderHandle { control, task });
        Ok(())
    }

    fn spawn_mysql(&self, control: Arc<ReaderControl>, checkpoint_store: CheckpointStore) -> tokio::task::JoinHandle<()> {
        let binlog_config = self.config.to_binlog_config();
        let catalog = self.catalog.clone();
        let sink = self.sink.clone();

        tokio::task::spawn_blocking(move || {
            let mut reader = MySqlBinlogReader::new(binlog_config, catalog, checkpoint_store, sink, control);
            if let Err(err) = reader.run() {
                error!(error = %err, "mysql binlog reader exited");
            }
        })
    }

    fn spawn_postgres(&self, control: Arc<ReaderControl>, checkpoint_store: CheckpointStore) -> CResult<tokio::task::JoinHandle<()>> {
        let log_dir = PathBuf::from(&self.config.log_file_path);
        let database = self.config.dbname.clone();
        let filter_tables = self.config.filter_tables.clone();
        let catalog = self.catalog.clone();
        let sink = self.sink.clone();

        let mut tailer = PostgresLogTailer::new(log_dir, database, filter_tables, catalog, checkpoint_store, sink, control)?;

        Ok(tokio::spawn(async move {
            if let Err(err) = tailer.run().await {
                error!(error = %err, "postgres log tailer exited");
            }
        }))
    }

    /// Readers may still drain internal buffers but stop emitting until [`Self::resume`].
    pub fn pause(&self) {
        if let Some(reader) = &self.reader {
            reader.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(reader) = &self.reader {
            reader.resume();
        }
    }

    /// Cancels the running reader and awaits its task. Each reader flushes its own
    /// checkpoint before a window/poll cycle ends, so no extra flush is needed here.
    pub async fn stop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop().await;
        }
    }

    /// `stop(); start(new_config)`, in-process — never restarts the host.
    pub async fn reconfigure(&mut self, new_config: Config) -> CResult<()> {
        self.stop().await;
        self.config = new_config;
        self.start()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sink::InMemorySink;

    #[tokio::test]
    async fn idle_dbtype_starts_no_reader() {
        let mut config = Config::default();
        config.dbtype = SourceKind::MongoDb;

        let mut scheduler = Scheduler::new(config, Arc::new(TableCatalog::default()), Arc::new(InMemorySink::new()));
        scheduler.start().unwrap();
        assert!(scheduler.reader.is_none());

        scheduler.stop().await;
    }

    #[tokio::test]
    async fn pause_and_resume_are_no_ops_without_a_running_reader() {
        let mut config = Config::default();
        config.dbtype = SourceKind::MongoDb;
        let mut scheduler = Scheduler::new(config, Arc::new(TableCatalog::default()), Arc::new(InMemorySink::new()));
        scheduler.start().unwrap();

        scheduler.pause();
        scheduler.resume();
        scheduler.stop().await;
    }
}
