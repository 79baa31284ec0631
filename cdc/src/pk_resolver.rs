use std::sync::{Arc, Mutex};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::warn;
use common::err::decode_error::ReError;
use common::err::CResult;
use connection::conn::connection::IConnection;

use crate::catalog::TableCatalog;

/// A table's column order and primary-key column names, as needed to turn a positional
/// binlog row (or a text-log statement) into named `primary_key`/`extracted_keys` maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    /// All columns in `ORDINAL_POSITION` order. Empty for sources where row values are
    /// already addressed by name (the Postgres log tailer).
    pub columns: Vec<String>,
    /// Ordered primary-key column names.
    pub primary_key: Vec<String>,
}

impl TableSchema {
    /// Index of `column` within `columns`, used to pick its value out of a positional row.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Looks up a table's schema once; the resolver above adds the single-populator cache on
/// top. Implemented once per source kind.
pub trait PkSource {
    fn fetch_schema(&mut self, database: &str, table: &str) -> CResult<TableSchema>;
}

/// Queries `INFORMATION_SCHEMA.COLUMNS` over an already-authenticated MySQL connection.
pub struct MySqlPkSource<C: IConnection> {
    conn: C,
}

impl<C: IConnection> MySqlPkSource<C> {
    pub fn new(conn: C) -> Self {
        MySqlPkSource { conn }
    }
}

impl<C: IConnection> PkSource for MySqlPkSource<C> {
    fn fetch_schema(&mut self, database: &str, table: &str) -> CResult<TableSchema> {
        let sql = format!(
            "SELECT COLUMN_NAME, COLUMN_KEY FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' \
             ORDER BY ORDINAL_POSITION",
            escape_literal(database),
            escape_literal(table),
        );

        let rows = self.conn.query(sql)?;
        let mut columns = Vec::with_capacity(rows.len());
        let mut primary_key = Vec::new();
        for row in rows {
            let cells = row.as_slice();
            let name = match cells.first() {
                Some(name) => name.clone(),
                None => continue,
            };
            if cells.get(1).map(|k| k.as_str()) == Some("PRI") {
                primary_key.push(name.clone());
            }
            columns.push(name);
        }

        Ok(TableSchema { columns, primary_key })
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Reads the primary key straight out of the table catalog; Postgres has no equivalent
/// of `INFORMATION_SCHEMA` available to the log tailer, so the catalog is authoritative
/// and row values are already addressed by column name, not position.
pub struct PostgresPkSource {
    catalog: Arc<TableCatalog>,
}

impl PostgresPkSource {
    pub fn new(catalog: Arc<TableCatalog>) -> Self {
        PostgresPkSource { catalog }
    }
}

impl PkSource for PostgresPkSource {
    fn fetch_schema(&mut self, _database: &str, table: &str) -> CResult<TableSchema> {
        Ok(TableSchema {
            columns: Vec::new(),
            primary_key: self.catalog.primary_key(table).to_vec(),
        })
    }
}

/// Resolves and caches each table's schema, guaranteeing that concurrent lookups of the
/// same table collapse into a single populating call.
pub struct PkResolver<S: PkSource> {
    source: Mutex<S>,
    cache: DashMap<String, Arc<OnceCell<TableSchema>>>,
}

impl<S: PkSource> PkResolver<S> {
    pub fn new(source: S) -> Self {
        PkResolver {
            source: Mutex::new(source),
            cache: DashMap::new(),
        }
    }

    pub fn schema(&self, database: &str, table: &str) -> CResult<TableSchema> {
        let key = format!("{database}.{table}");
        let cell = self
            .cache
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let schema = cell.get_or_try_init(|| {
            let mut source = self
                .source
                .lock()
                .map_err(|_| ReError::String("pk source lock poisoned".to_string()))?;
            let schema = source.fetch_schema(database, table)?;
            if schema.primary_key.is_empty() {
                warn!(database, table, "no primary key columns found for table");
            }
            Ok::<TableSchema, ReError>(schema)
        })?;

        Ok(schema.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::catalog::{CatalogEntry, TableCatalog};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl PkSource for CountingSource {
        fn fetch_schema(&mut self, _database: &str, _table: &str) -> CResult<TableSchema> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TableSchema { columns: vec!["id".into(), "name".into()], primary_key: vec!["id".to_string()] })
        }
    }

    #[test]
    fn repeated_lookups_populate_only_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = PkResolver::new(CountingSource { calls: calls.clone() });

        for _ in 0..5 {
            assert_eq!(resolver.schema("db", "users").unwrap().primary_key, vec!["id".to_string()]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_tables_populate_independently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = PkResolver::new(CountingSource { calls: calls.clone() });

        resolver.schema("db", "users").unwrap();
        resolver.schema("db", "orders").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn column_index_locates_primary_key_position() {
        let schema = TableSchema { columns: vec!["id".into(), "name".into()], primary_key: vec!["id".to_string()] };
        assert_eq!(schema.column_index("name"), Some(1));
        assert_eq!(schema.column_index("missing"), None);
    }

    #[test]
    fn postgres_source_reads_from_catalog() {
        let catalog = Arc::new(TableCatalog::new(vec![CatalogEntry {
            table_name: "orders".into(),
            keys: vec![],
            primary_key: vec!["tenant_id".into(), "order_id".into()],
        }]));
        let resolver = PkResolver::new(PostgresPkSource::new(catalog));

        assert_eq!(
            resolver.schema("public", "orders").unwrap().primary_key,
            vec!["tenant_id".to_string(), "order_id".to_string()]
        );
    }
}
