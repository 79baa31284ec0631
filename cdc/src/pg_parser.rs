use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::change_event::QueryType;

/// `YYYY-MM-DD HH:MM:SS.mmm ±HH` — exactly 27 bytes, hour-only offset with no colon.
pub const TIMESTAMP_LEN: usize = 27;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2}):(\d{2})\.(\d{3}) ([+-])(\d{2})$").unwrap()
});

static INSERT_COLUMNS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\(([^()]*)\)\s*VALUES\s*\(([^()]*)\)"#).unwrap());

/// Parses a leading 27-byte Postgres log timestamp. Returns `None` if the line is too
/// short or the prefix does not match the expected shape, per the format validated once
/// by [`validate_timestamp_format`] at tailer startup.
pub fn parse_timestamp(line: &str) -> Option<DateTime<FixedOffset>> {
    if line.len() < TIMESTAMP_LEN {
        return None;
    }
    let prefix = line.get(0..TIMESTAMP_LEN)?;
    let caps = TIMESTAMP_RE.captures(prefix)?;

    let naive = NaiveDateTime::parse_from_str(&prefix[..23], "%Y-%m-%d %H:%M:%S%.3f").ok()?;
    let sign: i32 = if &caps[8] == "-" { -1 } else { 1 };
    let hours: i32 = caps[9].parse().ok()?;
    let offset = FixedOffset::east_opt(sign * hours * 3600)?;
    Some(offset.from_local_datetime(&naive).single()?)
}

/// The message portion of a log line: everything after the 27-byte timestamp prefix.
pub fn message_of(line: &str) -> &str {
    if line.len() <= TIMESTAMP_LEN {
        ""
    } else {
        line[TIMESTAMP_LEN..].trim_start()
    }
}

/// Renders a timestamp back into the 27-byte Postgres log format, for checkpoint storage.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    let offset_hours = dt.offset().local_minus_utc() / 3600;
    let sign = if offset_hours < 0 { '-' } else { '+' };
    format!("{} {}{:02}", dt.format("%Y-%m-%d %H:%M:%S%.3f"), sign, offset_hours.abs())
}

/// Confirms the 27-byte hour-only-offset timestamp shape round-trips exactly. Called once
/// at tailer construction; a failure here means the surrounding chrono/regex behavior has
/// drifted from the documented format and the tailer must refuse to start rather than
/// silently skip every line.
pub fn validate_timestamp_format() -> Result<(), String> {
    const PROBE: &str = "2025-03-14 10:15:30.123 +07";
    let parsed = parse_timestamp(PROBE).ok_or_else(|| format!("probe timestamp `{PROBE}` did not parse"))?;
    let rendered = format_timestamp(&parsed);
    if rendered != PROBE {
        return Err(format!("probe timestamp round-trip mismatch: `{PROBE}` -> `{rendered}`"));
    }
    Ok(())
}

/// Which catalog table (if any) this log message names, and the query type implied by
/// the matched pattern. The first table in `filter_tables` with a match wins.
pub fn classify_statement(message: &str, filter_tables: &[String]) -> Option<(QueryType, String)> {
    for table in filter_tables {
        if contains_any(message, &[format!(r#"INSERT INTO "public"."{table}""#), format!(r#"INSERT INTO "{table}""#)]) {
            return Some((QueryType::Insert, table.clone()));
        }
        if contains_any(message, &[format!(r#"UPDATE "public"."{table}""#), format!(r#"UPDATE "{table}""#)]) {
            return Some((QueryType::Update, table.clone()));
        }
        if contains_any(message, &[format!(r#"DELETE FROM "public"."{table}""#), format!(r#"DELETE FROM "{table}""#)]) {
            return Some((QueryType::Delete, table.clone()));
        }
    }
    None
}

fn contains_any(message: &str, needles: &[String]) -> bool {
    needles.iter().any(|needle| message.contains(needle.as_str()))
}

/// `INSERT INTO "public"."t" ("id","name") VALUES ('1','alice')` -> `[("id","1"),("name","alice")]`,
/// by positional zip of the column list against the values list.
pub fn parse_insert_columns_values(message: &str) -> Vec<(String, String)> {
    let caps = match INSERT_COLUMNS_RE.captures(message) {
        Some(caps) => caps,
        None => return Vec::new(),
    };
    let columns = split_trim(&caps[1], '"');
    let values = split_trim(&caps[2], '\'');
    columns.into_iter().zip(values).collect()
}

fn split_trim(list: &str, quote: char) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().trim_matches(quote).to_string())
        .collect()
}

/// For UPDATE/DELETE: for each `col`, finds the first `"col" =` in `message` and takes
/// the next whitespace-delimited token as its value. Columns with no match are omitted
/// rather than failing the whole extraction.
pub fn extract_where_columns(message: &str, columns: &[String]) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    for column in columns {
        let needle = format!(r#""{column}" ="#);
        if let Some(start) = message.find(&needle) {
            let rest = message[start + needle.len()..].trim_start();
            let token = rest.split_whitespace().next().unwrap_or("");
            if !token.is_empty() {
                found.insert(column.clone(), token.trim_matches('\'').to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timestamp_round_trips() {
        validate_timestamp_format().unwrap();
    }

    #[test]
    fn parses_negative_offset() {
        let dt = parse_timestamp("2025-03-14 10:15:30.123 -05").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn short_or_malformed_lines_do_not_parse() {
        assert!(parse_timestamp("too short").is_none());
        assert!(parse_timestamp("2025-03-14T10:15:30.123Z garbage....").is_none());
    }

    #[test]
    fn message_starts_after_timestamp_prefix() {
        let line = "2025-03-14 10:15:30.123 +07 LOG: statement: INSERT INTO \"public\".\"users\" (\"id\") VALUES ('1')";
        assert_eq!(message_of(line), "LOG: statement: INSERT INTO \"public\".\"users\" (\"id\") VALUES ('1')");
    }

    #[test]
    fn classifies_insert_with_schema_qualifier() {
        let message = r#"LOG: statement: INSERT INTO "public"."users" ("id","name") VALUES ('1','alice')"#;
        let (query_type, table) = classify_statement(message, &["users".to_string()]).unwrap();
        assert_eq!(query_type, QueryType::Insert);
        assert_eq!(table, "users");
    }

    #[test]
    fn classifies_update_without_schema_qualifier() {
        let message = r#"LOG: statement: UPDATE "users" SET "name"='b' WHERE "id" = 7"#;
        let (query_type, _) = classify_statement(message, &["users".to_string()]).unwrap();
        assert_eq!(query_type, QueryType::Update);
    }

    #[test]
    fn unmatched_table_classifies_as_none() {
        assert!(classify_statement("LOG: statement: INSERT INTO \"other\" (\"id\") VALUES ('1')", &["users".to_string()]).is_none());
    }

    #[test]
    fn insert_zips_columns_and_values_positionally() {
        let message = r#"INSERT INTO "public"."users" ("id","name") VALUES ('1','alice')"#;
        let pairs = parse_insert_columns_values(message);
        assert_eq!(pairs, vec![("id".to_string(), "1".to_string()), ("name".to_string(), "alice".to_string())]);
    }

    #[test]
    fn where_clause_extracts_named_columns() {
        let message = r#"UPDATE "users" SET "name"='b' WHERE "id" = 7"#;
        let found = extract_where_columns(message, &["id".to_string()]);
        assert_eq!(found.get("id"), Some(&"7".to_string()));
    }

    #[test]
    fn missing_where_column_is_skipped_not_panicked() {
        let message = r#"DELETE FROM "users" WHERE "id" = 7"#;
        let found = extract_where_columns(message, &["id".to_string(), "tenant_id".to_string()]);
        assert_eq!(found.len(), 1);
        assert!(!found.contains_key("tenant_id"));
    }
}
