//! Full-table CSV dumps.

use atheneum_core::{
  registry,
  store::{RecordFilter, RecordStore},
  table::TableId,
};

use crate::{Error, Result};

/// Render every row of `table` as CSV: header row first, then one line
/// per row, columns in grid display order, UTF-8 throughout.
pub async fn export_table<S>(store: &S, table: TableId) -> Result<String>
where
  S: RecordStore,
{
  let schema = registry::table_schema(table);
  let columns = schema.grid_columns();

  let rows = store
    .list_records(table, RecordFilter::default())
    .await
    .map_err(Error::store)?;

  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(&columns)?;
  for row in &rows {
    writer.write_record(columns.iter().map(|c| row.value_or_empty(c)))?;
  }

  let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
  Ok(String::from_utf8(bytes)?)
}
