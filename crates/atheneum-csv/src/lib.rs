//! Tabular import/export for the Atheneum record store.
//!
//! Export renders any table as a UTF-8 CSV dump with a header row, in
//! grid column order. Import routes every row through the store's upsert
//! path, column by column, so re-importing a file never duplicates rows.

pub mod error;
pub mod export;
pub mod import;

pub use error::{Error, Result};
pub use export::export_table;
pub use import::{ImportSummary, import_table};
