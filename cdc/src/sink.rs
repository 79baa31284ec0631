use std::sync::Mutex;
use async_trait::async_trait;
use tracing::info;
use common::err::CResult;

use crate::change_event::ChangeEvent;

/// Delivery endpoint for a reader's change stream.
///
/// `deliver` is called once per event, in the reader's own emission order; a reader never
/// parallelizes calls to its own sink, so a sink only needs to serialize across readers if
/// it is shared between them. `checkpointed` is called after a checkpoint write succeeds,
/// so the sink can acknowledge everything up to and including that point.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn deliver(&self, event: ChangeEvent) -> CResult<()>;

    async fn checkpointed(&self, source_label: &str) -> CResult<()> {
        let _ = source_label;
        Ok(())
    }
}

/// Writes each event as a JSON line to stdout. Useful for `--dry-run` and manual inspection.
pub struct StdoutSink;

#[async_trait]
impl Sink for StdoutSink {
    async fn deliver(&self, event: ChangeEvent) -> CResult<()> {
        let line = serde_json::to_string(&event)?;
        println!("{line}");
        Ok(())
    }

    async fn checkpointed(&self, source_label: &str) -> CResult<()> {
        info!(source = source_label, "checkpoint written");
        Ok(())
    }
}

/// Accumulates every delivered event in memory, in arrival order. Used by tests and by
/// embedders that want to drain events themselves rather than push them further downstream.
#[derive(Default)]
pub struct InMemorySink {
    events: Mutex<Vec<ChangeEvent>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        InMemorySink { events: Mutex::new(Vec::new()) }
    }

    pub fn drain(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn deliver(&self, event: ChangeEvent) -> CResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;
    use chrono::{FixedOffset, TimeZone};
    use crate::change_event::{QueryType, SourcePosition};

    fn sample_event() -> ChangeEvent {
        ChangeEvent {
            source_position: SourcePosition::MySql { file: "mysql-bin.000003".into(), log_pos: 4096 },
            wall_time: FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            database: "db".into(),
            table: "users".into(),
            query_type: QueryType::Insert,
            primary_key: BTreeMap::from([("id".to_string(), serde_json::json!(1))]),
            extracted_keys: BTreeMap::new(),
            raw_statement: None,
        }
    }

    #[tokio::test]
    async fn in_memory_sink_preserves_arrival_order() {
        let sink = InMemorySink::new();
        let mut first = sample_event();
        first.primary_key.insert("id".into(), serde_json::json!(1));
        let mut second = sample_event();
        second.primary_key.insert("id".into(), serde_json::json!(2));

        sink.deliver(first).await.unwrap();
        sink.deliver(second).await.unwrap();

        let drained = sink.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].primary_key["id"], serde_json::json!(1));
        assert_eq!(drained[1].primary_key["id"], serde_json::json!(2));
        assert!(sink.is_empty());
    }
}
