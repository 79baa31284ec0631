pub mod log_event;
pub mod rows_log_event;
