use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use common::err::CResult;

/// A single table's declared columns of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub table_name: String,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub primary_key: Vec<String>,
}

/// Ordered sequence of per-table column declarations, indexed by table name for O(1) lookup.
///
/// Order of `entries` is preserved on load (composite-key column order matters), while
/// `by_name` only ever maps into it.
#[derive(Debug, Clone, Default)]
pub struct TableCatalog {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
}

impl TableCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.table_name.clone(), i))
            .collect();
        TableCatalog { entries, by_name }
    }

    pub fn get(&self, table_name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(table_name).map(|&i| &self.entries[i])
    }

    pub fn primary_key(&self, table_name: &str) -> &[String] {
        self.get(table_name).map(|e| e.primary_key.as_slice()).unwrap_or(&[])
    }

    pub fn keys(&self, table_name: &str) -> &[String] {
        self.get(table_name).map(|e| e.keys.as_slice()).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

pub fn read_catalog<P: AsRef<Path>>(path: P) -> CResult<TableCatalog> {
    let content = std::fs::read_to_string(path)?;
    let entries: Vec<CatalogEntry> = serde_json::from_str(&content)?;
    Ok(TableCatalog::new(entries))
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> TableCatalog {
        TableCatalog::new(vec![
            CatalogEntry { table_name: "users".into(), keys: vec!["name".into()], primary_key: vec!["id".into()] },
            CatalogEntry { table_name: "orders".into(), keys: vec![], primary_key: vec!["tenant_id".into(), "order_id".into()] },
        ])
    }

    #[test]
    fn looks_up_by_table_name() {
        let catalog = sample();
        assert_eq!(catalog.primary_key("users"), &["id".to_string()]);
        assert_eq!(catalog.keys("users"), &["name".to_string()]);
    }

    #[test]
    fn preserves_composite_key_order() {
        let catalog = sample();
        assert_eq!(catalog.primary_key("orders"), &["tenant_id".to_string(), "order_id".to_string()]);
    }

    #[test]
    fn unknown_table_yields_empty_slices() {
        let catalog = sample();
        assert!(catalog.primary_key("missing").is_empty());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn parses_documented_catalog_shape() {
        let json = r#"[{"table_name":"users","keys":["name"],"primary_key":["id"]}]"#;
        let entries: Vec<CatalogEntry> = serde_json::from_str(json).unwrap();
        let catalog = TableCatalog::new(entries);
        assert_eq!(catalog.primary_key("users"), &["id".to_string()]);
    }
}
