//! Table identifiers and typed cross-table references.
//!
//! Every table name a caller can mention is a [`TableId`] variant. SQL is
//! only ever built from the `as_str` form of a parsed variant, so raw
//! caller strings never reach a statement.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::{Error, Result};

// ─── TableId ─────────────────────────────────────────────────────────────────

/// The closed registry of known tables.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum TableId {
  Entity,
  Relation,
  Person,
  Org,
  Project,
  Work,
  Note,
  Task,
}

impl TableId {
  /// The SQL-level table name. Also the serde representation.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Entity => "entity",
      Self::Relation => "relation",
      Self::Person => "person",
      Self::Org => "org",
      Self::Project => "project",
      Self::Work => "work",
      Self::Note => "note",
      Self::Task => "task",
    }
  }

  /// Resolve a caller-supplied table name against the registry.
  pub fn parse(name: &str) -> Result<Self> {
    Self::iter()
      .find(|t| t.as_str() == name)
      .ok_or_else(|| Error::UnknownTable(name.to_owned()))
  }

  /// All tables, in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// Tables that can stand on either side of a relation — everything
  /// except the relation table itself.
  pub fn referable() -> impl Iterator<Item = Self> {
    Self::iter().filter(|t| *t != Self::Relation)
  }
}

impl std::fmt::Display for TableId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── KeyColumn ───────────────────────────────────────────────────────────────

/// The columns a reference is allowed to point at.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum KeyColumn {
  Id,
  Name,
  Url,
}

impl KeyColumn {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Id => "id",
      Self::Name => "name",
      Self::Url => "url",
    }
  }

  pub fn parse(name: &str) -> Result<Self> {
    Self::iter()
      .find(|k| k.as_str() == name)
      .ok_or_else(|| Error::UnknownKeyColumn(name.to_owned()))
  }
}

impl std::fmt::Display for KeyColumn {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── RefSpec ─────────────────────────────────────────────────────────────────

/// A tagged reference to one entity row: table + key column + key value.
///
/// Replaces the raw `(ref_tab, ref_key, ref_val)` string triple at every
/// API seam; the triple layout survives only as storage columns. There is
/// no engine-level referential integrity behind a `RefSpec` — resolution
/// happens at read time and a dangling reference yields an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefSpec {
  pub table: TableId,
  pub key:   KeyColumn,
  pub value: String,
}

impl RefSpec {
  pub fn new(table: TableId, key: KeyColumn, value: impl Into<String>) -> Self {
    Self { table, key, value: value.into() }
  }

  /// A reference with an empty key value cannot match anything.
  pub fn is_complete(&self) -> bool { !self.value.is_empty() }
}
