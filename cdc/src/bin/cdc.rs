use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use cdc::catalog::read_catalog;
use cdc::pg_parser::validate_timestamp_format;
use cdc::scheduler::Scheduler;
use cdc::sink::{InMemorySink, Sink, StdoutSink};
use common::config::read_config;
use common::err::CResult;
use common::log::tracing_factory::TracingFactory;

#[derive(Parser, Debug, Clone)]
#[command(name = "cdc")]
#[command(version = "0.1.0")]
#[command(author = "rust-us")]
#[command(about = "CDC ingestion engine: MySQL binlog + PostgreSQL log tailer")]
pub struct CliArgs {
    /// Path to the connection/filter configuration file (JSON)
    #[arg(short, long, help = "Path to loaded configuration file", value_name = "FILE")]
    pub config: PathBuf,

    /// Path to the table-catalog file (JSON)
    #[arg(long, help = "Path to the table catalog file", value_name = "FILE")]
    pub catalog: PathBuf,

    /// Validates config, catalog, and (for Postgres) the timestamp-format probe, then exits
    /// without connecting to any source.
    #[arg(long, help = "validate configuration without connecting to a source", default_value_t = false)]
    pub dry_run: bool,

    /// Writes events to stdout as JSON lines instead of only to the in-memory sink.
    #[arg(long, help = "print events to stdout as JSON lines", default_value_t = false)]
    pub stdout_sink: bool,

    #[arg(short, long, help = "enable debug logging", default_value_t = false)]
    pub debug: bool,
}

#[tokio::main]
async fn main() -> CResult<()> {
    let args = CliArgs::parse();
    TracingFactory::init_log(args.debug);

    let config = read_config(&args.config)?;
    let catalog = Arc::new(read_catalog(&args.catalog)?);

    if args.dry_run {
        if config.dbtype == common::config::SourceKind::PostgreSQL {
            validate_timestamp_format().map_err(common::err::decode_error::ReError::String)?;
        }
        println!("config and catalog are valid; dry run complete, not connecting to a source");
        return Ok(());
    }

    let sink: Arc<dyn Sink> = if args.stdout_sink { Arc::new(StdoutSink) } else { Arc::new(InMemorySink::new()) };

    let mut scheduler = Scheduler::new(config, catalog, sink);
    scheduler.start()?;

    tokio::signal::ctrl_c().await.ok();
    scheduler.stop().await;

    Ok(())
}
