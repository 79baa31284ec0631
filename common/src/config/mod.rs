mod load_style;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::load_style::LoadStyle;
use crate::err::decode_error::ReError;

/// Replication `server_id` used when no override is configured.
pub const DEFAULT_SERVER_ID: u32 = 100;

/// MySQL's documented default replication port. `Config.port` is always
/// authoritative for the connection; this constant exists only so callers
/// can detect and log the case where a config disagrees with it.
pub const MYSQL_DEFAULT_PORT: u16 = 3306;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum SourceKind {
    #[serde(rename = "MySQL")]
    MySQL,
    #[serde(rename = "PostgreSQL")]
    PostgreSQL,
    #[serde(rename = "Microsoft SQL Server")]
    MsSql,
    #[serde(rename = "MongoDB")]
    MongoDb,
}

impl PartialEq for SourceKind {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}
impl Eq for SourceKind {}

impl SourceKind {
    /// Only MySQL and PostgreSQL drive a CDC reader; the rest are accepted
    /// by the config file format but do not activate the core.
    pub fn activates_core(&self) -> bool {
        matches!(self, SourceKind::MySQL | SourceKind::PostgreSQL)
    }
}

/// The connection, filter, and path configuration read from the config file
/// described in the external-interfaces section: `dbtype`, `host`, `port`,
/// `username`, `password`, `dbname`, `log_file_path`, `state_file`,
/// `filter_tables`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dbtype: SourceKind,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub dbname: String,

    /// Directory holding PostgreSQL `.log` files. Unused for MySQL.
    pub log_file_path: String,

    /// Path to the checkpoint file (C3).
    pub state_file: String,

    #[serde(default)]
    pub filter_tables: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dbtype: SourceKind::MySQL,
            host: "127.0.0.1".to_string(),
            port: MYSQL_DEFAULT_PORT,
            username: "root".to_string(),
            password: String::new(),
            dbname: String::new(),
            log_file_path: String::new(),
            state_file: "state.json".to_string(),
            filter_tables: vec![],
        }
    }
}

impl Config {
    /// Rejects configs that cannot possibly connect to anything. Does not
    /// reject an empty `filter_tables` — a reader with nothing to filter
    /// simply never emits, which is valid.
    pub fn validate(&self) -> Result<(), ReError> {
        if self.host.is_empty() {
            return Err(ReError::ConfigFileParseErr(
                "config.host must not be empty".to_string(),
            ));
        }
        if self.dbtype == SourceKind::MySQL && self.port != MYSQL_DEFAULT_PORT {
            warn!(
                port = self.port,
                "config.port differs from MySQL's conventional 3306; \
                 honoring config.port (an earlier implementation ignored it)"
            );
        }
        Ok(())
    }

    pub fn to_binlog_config(&self) -> BinlogConfig {
        BinlogConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            server_id: DEFAULT_SERVER_ID,
            dbname: self.dbname.clone(),
            filter_tables: self.filter_tables.clone(),
        }
    }
}

/// The slice of `Config` the MySQL binlog reader (C5) actually needs to open a
/// replication session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinlogConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub server_id: u32,
    pub dbname: String,
    pub filter_tables: Vec<String>,
}

/// Wraps a parsed `Config` with how it was produced, mirroring the
/// load-style tag the host crate keeps alongside its own config structs.
#[derive(Debug, Serialize, Deserialize)]
pub struct FConfig {
    config: Config,
    load_style: LoadStyle,
}

impl Default for FConfig {
    fn default() -> Self {
        FConfig {
            config: Config::default(),
            load_style: LoadStyle::Default,
        }
    }
}

impl FConfig {
    pub fn new(config: Config) -> Self {
        FConfig {
            config,
            load_style: LoadStyle::Json,
        }
    }

    pub fn get_config(self) -> Config {
        self.config
    }

    pub fn get_load_style(&self) -> LoadStyle {
        self.load_style
    }
}

/// Reads and validates the config file at `path`.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config, ReError> {
    let mut file = File::open(path.as_ref())?;
    let mut s = String::new();
    file.read_to_string(&mut s)?;

    let config: Config = serde_json::from_str(&s)
        .map_err(|e| ReError::ConfigFileParseErr(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_documented_config_shape() {
        let raw = r#"{
            "dbtype": "PostgreSQL",
            "host": "10.0.0.5",
            "port": 5432,
            "username": "cdc",
            "password": "secret",
            "dbname": "app",
            "log_file_path": "/var/log/postgresql",
            "state_file": "/var/lib/cdc/state.json",
            "filter_tables": ["users", "orders"]
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.dbtype, SourceKind::PostgreSQL);
        assert_eq!(config.filter_tables, vec!["users", "orders"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_host() {
        let mut config = Config::default();
        config.host.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn mysql_port_mismatch_is_non_fatal() {
        let mut config = Config::default();
        config.port = 3307;
        assert!(config.validate().is_ok());
    }
}
