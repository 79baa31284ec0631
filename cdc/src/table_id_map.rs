use std::collections::HashMap;

use binlog::events::protocol::table_map_event::TableMapEvent;

/// Tracks `table_id -> (database, table)` for the lifetime of one binlog session.
///
/// A `TableMapEvent` always precedes the `RowsEvent`s that reference its `table_id`
/// (per the replication protocol), so this map only ever grows within a session and is
/// rebuilt from scratch on every reconnect.
#[derive(Debug, Default)]
pub struct TableIdMap {
    tables: HashMap<u64, (String, String)>,
}

impl TableIdMap {
    pub fn new() -> Self {
        TableIdMap { tables: HashMap::new() }
    }

    pub fn record(&mut self, event: &TableMapEvent) {
        self.tables.insert(event.get_table_id(), (event.get_database_name(), event.table_name.clone()));
    }

    pub fn lookup(&self, table_id: u64) -> Option<&(String, String)> {
        self.tables.get(&table_id)
    }
}
