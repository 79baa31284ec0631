use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use lazy_static::lazy_static;
use common::column::column_type::ColumnType;
use crate::events::protocol::table_map_event::TableMapEvent;

lazy_static! {
    pub static ref TABLE_MAP: Arc<Mutex<HashMap<u64, Vec<ColumnType >>>> =
        Arc::new(Mutex::new(HashMap::new()));

    pub static ref TABLE_MAP_META: Arc<Mutex<HashMap<u64, Vec<u16 >>>> =
        Arc::new(Mutex::new(HashMap::new()));

    pub static ref TABLE_MAP_EVENT: Arc<Mutex<HashMap<u64, TableMapEvent>>> =
        Arc::new(Mutex::new(HashMap::new()));
}
