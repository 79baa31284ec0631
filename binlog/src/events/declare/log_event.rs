pub use crate::events::log_event::LogEvent;
