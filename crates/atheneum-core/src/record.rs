//! Records, write attribution, and save outcomes.
//!
//! A record is the flat `column → string` mapping the presentation layer
//! hands back on every form submission. The engine interprets it against
//! the schema registry; nothing here knows about SQL.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Record ──────────────────────────────────────────────────────────────────

/// A flat column-to-value mapping for one row of one table.
///
/// Values are strings throughout — the storage layer stores TEXT columns
/// and the form layer submits strings. An absent column and an
/// empty-string value are distinct: absent columns are left untouched on
/// update, empty strings overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, String>);

impl Record {
  pub fn new() -> Self { Self::default() }

  /// Builder-style insert, convenient in tests and import code.
  pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
    self.0.insert(column.to_owned(), value.into());
    self
  }

  pub fn insert(&mut self, column: &str, value: impl Into<String>) {
    self.0.insert(column.to_owned(), value.into());
  }

  pub fn get(&self, column: &str) -> Option<&str> {
    self.0.get(column).map(String::as_str)
  }

  /// The value for `column`, treating absence as the empty string.
  pub fn value_or_empty(&self, column: &str) -> &str {
    self.get(column).unwrap_or("")
  }

  /// True when the column is absent or holds an empty string.
  pub fn is_blank(&self, column: &str) -> bool {
    self.value_or_empty(column).is_empty()
  }

  pub fn contains(&self, column: &str) -> bool { self.0.contains_key(column) }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(String, String)> for Record {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Actor ───────────────────────────────────────────────────────────────────

/// The identity stamped into every write as `uid`.
///
/// Supplied by the hosting environment (OS login, config override) and
/// treated as an opaque attribution string — this is not authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub uid: String,
}

impl Actor {
  pub fn new(uid: impl Into<String>) -> Self { Self { uid: uid.into() } }
}

// ─── SystemStamp ─────────────────────────────────────────────────────────────

/// The `id`/`ts`/`uid` triple generated for a new row, or the `ts`/`uid`
/// refresh applied on update. `id` is never regenerated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStamp {
  pub id:  Uuid,
  pub ts:  DateTime<Utc>,
  pub uid: String,
}

impl SystemStamp {
  pub fn generate(actor: &Actor) -> Self {
    Self { id: Uuid::new_v4(), ts: Utc::now(), uid: actor.uid.clone() }
  }
}

// ─── SaveOutcome ─────────────────────────────────────────────────────────────

/// What a write operation actually did. `Unchanged` and `Skipped` mean
/// zero statements were issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
  /// A new row was created.
  Inserted { id: Uuid },
  /// An existing row was updated; `columns` lists the changed columns
  /// (system-stamp refreshes are not listed).
  Updated { id: Uuid, columns: Vec<String> },
  /// A matching row exists and every submitted value already matches it.
  Unchanged { id: Uuid },
  /// The input could not address a row (no natural key, or unknown id);
  /// nothing was written.
  Skipped,
}

impl SaveOutcome {
  pub fn wrote(&self) -> bool {
    matches!(self, Self::Inserted { .. } | Self::Updated { .. })
  }

  pub fn id(&self) -> Option<Uuid> {
    match self {
      Self::Inserted { id } | Self::Updated { id, .. } | Self::Unchanged { id } => {
        Some(*id)
      }
      Self::Skipped => None,
    }
  }
}

// ─── LinkedPair ──────────────────────────────────────────────────────────────

/// The two rows created by a successful `link`: the child entity and the
/// relation row pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPair {
  pub child_id:    Uuid,
  pub relation_id: Uuid,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_and_blank_are_distinguishable() {
    let r = Record::new().with("name", "Ada").with("url", "");
    assert!(r.contains("url"));
    assert!(!r.contains("tags"));
    assert!(r.is_blank("url"));
    assert!(r.is_blank("tags"));
    assert!(!r.is_blank("name"));
  }

  #[test]
  fn record_serde_is_a_flat_map() {
    let r = Record::new().with("name", "Ada").with("note", "x");
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#"{"name":"Ada","note":"x"}"#);
    let back: Record = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
  }

  #[test]
  fn outcome_reports_writes() {
    let id = Uuid::new_v4();
    assert!(SaveOutcome::Inserted { id }.wrote());
    assert!(!SaveOutcome::Unchanged { id }.wrote());
    assert!(!SaveOutcome::Skipped.wrote());
    assert_eq!(SaveOutcome::Skipped.id(), None);
  }
}
