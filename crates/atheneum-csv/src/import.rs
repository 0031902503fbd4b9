//! CSV import routed through the upsert path.
//!
//! Headers are matched against the target table's editable columns;
//! unrecognised headers are ignored so exports from newer schemas still
//! load. Each row becomes one `upsert` call — de-duplication by natural
//! key applies exactly as it does for form submissions.

use atheneum_core::{
  record::{Actor, Record, SaveOutcome},
  registry,
  store::RecordStore,
  table::TableId,
};
use serde::Serialize;

use crate::{Error, Result};

/// Per-outcome row counts for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
  pub skipped:   usize,
}

impl ImportSummary {
  pub fn total(&self) -> usize {
    self.inserted + self.updated + self.unchanged + self.skipped
  }
}

/// Import CSV `data` into `table`. Every row goes through `upsert`, so
/// rows whose natural key already exists update in place and repeated
/// imports are idempotent.
pub async fn import_table<S>(
  store: &S,
  table: TableId,
  data: &[u8],
  actor: &Actor,
) -> Result<ImportSummary>
where
  S: RecordStore,
{
  let schema = registry::table_schema(table);

  let mut reader = csv::Reader::from_reader(data);
  let keep: Vec<(usize, String)> = reader
    .headers()?
    .iter()
    .enumerate()
    .filter(|(_, name)| schema.column(name).is_some_and(|c| c.editable))
    .map(|(idx, name)| (idx, name.to_owned()))
    .collect();

  let mut summary = ImportSummary::default();
  for row in reader.records() {
    let row = row?;
    let mut record = Record::new();
    for (idx, name) in &keep {
      if let Some(value) = row.get(*idx) {
        record.insert(name, value);
      }
    }

    let outcome = store
      .upsert(table, record, actor.clone())
      .await
      .map_err(Error::store)?;
    match outcome {
      SaveOutcome::Inserted { .. } => summary.inserted += 1,
      SaveOutcome::Updated { .. } => summary.updated += 1,
      SaveOutcome::Unchanged { .. } => summary.unchanged += 1,
      SaveOutcome::Skipped => summary.skipped += 1,
    }
  }
  Ok(summary)
}
