//! Error types for `atheneum-core`.

use thiserror::Error;

use crate::table::TableId;

#[derive(Debug, Error)]
pub enum Error {
  /// A record is missing a field the registry marks as required.
  #[error("missing required field: {0}")]
  MissingRequired(&'static str),

  /// A caller named a table outside the closed registry. This is a
  /// programming or configuration defect, not user input.
  #[error("unknown table: {0:?}")]
  UnknownTable(String),

  /// A caller named a column the registry does not declare for the table.
  #[error("unknown column {column:?} in table {table}")]
  UnknownColumn { table: TableId, column: String },

  /// A caller named a reference key column outside id/name/url.
  #[error("unknown key column: {0:?}")]
  UnknownKeyColumn(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
