//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `atheneum-store-sqlite`). Higher layers (`atheneum-api`,
//! `atheneum-csv`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  record::{Actor, LinkedPair, Record, SaveOutcome},
  table::{RefSpec, TableId},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// An equality-style predicate on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMatch {
  /// `column = value`
  Equals(String),
  /// `column = '' OR column IS NULL` — the "no value" grid filter.
  BlankOrNull,
}

/// Parameters for [`RecordStore::list_records`].
///
/// Column names are validated against the schema registry before any SQL
/// is built; an unknown name is a configuration error, not a silent skip.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
  /// Per-column predicates, ANDed together.
  pub columns:    Vec<(String, ColumnMatch)>,
  /// Restrict to rows whose object reference columns match this spec.
  pub object_ref: Option<RefSpec>,
  /// Order by this visible column; ignored if the column is not visible
  /// for the table (mirrors the grid's behaviour for stale settings).
  pub order_by:   Option<String>,
  pub descending: bool,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

impl RecordFilter {
  pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
    self
      .columns
      .push((column.to_owned(), ColumnMatch::Equals(value.into())));
    self
  }

  pub fn blank(mut self, column: &str) -> Self {
    self.columns.push((column.to_owned(), ColumnMatch::BlankOrNull));
    self
  }

  pub fn object(mut self, object_ref: RefSpec) -> Self {
    self.object_ref = Some(object_ref);
    self
  }

  pub fn order_by(mut self, column: &str) -> Self {
    self.order_by = Some(column.to_owned());
    self
  }

  pub fn newest_first(mut self, column: &str) -> Self {
    self.order_by = Some(column.to_owned());
    self.descending = true;
    self
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Atheneum record-store backend.
///
/// Identity resolution is by natural key (`name`, `url`); writes stamp
/// the system columns from the supplied [`Actor`]. All methods return
/// `Send` futures so the trait can be used in multi-threaded async
/// runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Upsert/Resolution Engine ──────────────────────────────────────────

  /// Insert-or-update resolved by natural key.
  ///
  /// Zero writes when no natural-key column is populated (`Skipped`) or
  /// when every submitted visible column already matches the stored row
  /// (`Unchanged`). Calling twice with identical input writes once.
  fn upsert(
    &self,
    table: TableId,
    record: Record,
    actor: Actor,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + '_;

  /// Write editable columns of the row identified by `id`.
  ///
  /// With `update_changed` only differing values are written; otherwise
  /// every editable column present in `record` is. Unknown `id` is a
  /// silent no-op (`Skipped`).
  fn update_by_id(
    &self,
    table: TableId,
    id: Uuid,
    record: Record,
    update_changed: bool,
    actor: Actor,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + '_;

  /// Remove exactly one row. Returns `false` when no row matched; does
  /// not cascade to relation rows.
  fn delete_by_id(
    &self,
    table: TableId,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The sidebar quick-add path: insert only when the (`name`, `url`)
  /// pair is absent, taking non-empty editable columns; never updates.
  fn quick_add(
    &self,
    table: TableId,
    record: Record,
    actor: Actor,
  ) -> impl Future<Output = Result<SaveOutcome, Self::Error>> + Send + '_;

  // ── Relation Store ────────────────────────────────────────────────────

  /// Create a child entity row and the relation row linking `object_ref`
  /// to it, as one transaction.
  fn link(
    &self,
    child_table: TableId,
    child: Record,
    object_ref: RefSpec,
    rel_type: String,
    actor: Actor,
  ) -> impl Future<Output = Result<LinkedPair, Self::Error>> + Send + '_;

  /// Delete the relation row(s) matching the full link identity; the
  /// child entity row is left untouched. Returns the number removed.
  fn unlink(
    &self,
    child_table: TableId,
    rel_type: String,
    object_ref: RefSpec,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// All subject rows linked under (`rel_type`, `object_ref`) whose
  /// subject table is `child_table`. Two-phase: relation rows first,
  /// then the child table by collected key values.
  fn children_of(
    &self,
    rel_type: String,
    object_ref: RefSpec,
    child_table: TableId,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_by_id(
    &self,
    table: TableId,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  fn list_records(
    &self,
    table: TableId,
    filter: RecordFilter,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Distinct non-null values of one column, ordered, prefixed with the
  /// blank placeholder — the reference-picker query.
  fn distinct_values(
    &self,
    table: TableId,
    column: String,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Registry tables that exist in the underlying database file.
  fn list_tables(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Ad hoc schema evolution ───────────────────────────────────────────

  /// Add a TEXT column if it does not already exist.
  fn add_column(
    &self,
    table: TableId,
    column: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Drop a column if it exists.
  fn drop_column(
    &self,
    table: TableId,
    column: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
