pub mod binlog_events;
pub mod binlog_options;
pub mod starting_strategy;
