//! Encoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings. Reads map NULL to the empty string — the natural-key
//! logic treats the two alike, as does the grid.

use atheneum_core::record::Record;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Result;

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// Build a [`Record`] from a row selected with `columns` in order.
/// NULLs become empty strings.
pub fn row_to_record(
  row: &rusqlite::Row<'_>,
  columns: &[&'static str],
) -> rusqlite::Result<Record> {
  let mut record = Record::new();
  for (idx, name) in columns.iter().enumerate() {
    let value: Option<String> = row.get(idx)?;
    record.insert(name, value.unwrap_or_default());
  }
  Ok(record)
}

/// Legal ad hoc identifier: ASCII letter or underscore first, then
/// letters, digits, underscores. Registry identifiers always pass; this
/// guards the ad hoc column add/drop path.
pub fn valid_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
    _ => return false,
  }
  chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
