use chrono::TimeZone;
use common::binlog::column::column_value::{Date, DateTime, SrcColumnValue, Time};
use serde_json::Value;

/// Converts a decoded binlog column value into the JSON representation carried by a
/// [`crate::change_event::ChangeEvent`]'s `primary_key`/`extracted_keys` maps.
///
/// Numeric and string types map directly; temporal types are rendered as their
/// conventional textual form rather than as component structs, so a downstream
/// consumer sees the same shape it would from the Postgres tailer's text-parsed values.
pub fn to_json(value: &SrcColumnValue) -> Value {
    match value {
        SrcColumnValue::TinyInt(v) => Value::from(*v),
        SrcColumnValue::SmallInt(v) => Value::from(*v),
        SrcColumnValue::MediumInt(v) => Value::from(*v),
        SrcColumnValue::Int(v) => Value::from(*v),
        SrcColumnValue::BigInt(v) => Value::from(*v),
        SrcColumnValue::Float(v) => serde_json::json!(v),
        SrcColumnValue::Double(v) => serde_json::json!(v),
        SrcColumnValue::Decimal(v) => Value::from(v.clone()),
        SrcColumnValue::String(v) => Value::from(v.clone()),
        SrcColumnValue::Bit(bits) => Value::from(bits.clone()),
        SrcColumnValue::Enum(v) => Value::from(*v),
        SrcColumnValue::Set(v) => Value::from(*v),
        SrcColumnValue::Blob(bytes) => Value::from(hex::encode(bytes)),
        SrcColumnValue::Year(v) => Value::from(*v),
        SrcColumnValue::Date(date) => Value::from(format_date(date)),
        SrcColumnValue::Time(time) => Value::from(format_time(time)),
        SrcColumnValue::DateTime(dt) => Value::from(format_datetime(dt)),
        SrcColumnValue::Timestamp(millis) => Value::from(format_timestamp_millis(*millis)),
    }
}

fn format_date(date: &Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year, date.month, date.day)
}

fn format_time(time: &Time) -> String {
    format!("{:03}:{:02}:{:02}.{:03}", time.hour, time.minute, time.second, time.millis)
}

fn format_datetime(dt: &DateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        dt.year, dt.month, dt.day, dt.hour, dt.minute, dt.second, dt.millis
    )
}

fn format_timestamp_millis(millis: u64) -> String {
    match chrono::Utc.timestamp_millis_opt(millis as i64).single() {
        Some(dt) => dt.to_rfc3339(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integers_and_strings_convert_directly() {
        assert_eq!(to_json(&SrcColumnValue::Int(7)), serde_json::json!(7));
        assert_eq!(to_json(&SrcColumnValue::String("alice".into())), serde_json::json!("alice"));
        assert_eq!(to_json(&SrcColumnValue::BigInt(9999999999)), serde_json::json!(9999999999u64));
    }

    #[test]
    fn blob_renders_as_hex() {
        assert_eq!(to_json(&SrcColumnValue::Blob(vec![0xde, 0xad])), serde_json::json!("dead"));
    }

    #[test]
    fn date_renders_as_iso_date() {
        let date = Date { year: 2025, month: 3, day: 14 };
        assert_eq!(to_json(&SrcColumnValue::Date(date)), serde_json::json!("2025-03-14"));
    }

    #[test]
    fn datetime_renders_with_millis() {
        let dt = DateTime { year: 2025, month: 3, day: 14, hour: 10, minute: 15, second: 30, millis: 123 };
        assert_eq!(to_json(&SrcColumnValue::DateTime(dt)), serde_json::json!("2025-03-14 10:15:30.123"));
    }
}
