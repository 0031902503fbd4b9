//! Handler for reference-picker values.
//!
//! `GET /tables/:table/columns/:column/values` returns the distinct
//! non-null values of one column, ordered, with a leading blank entry —
//! what a `ref_val` select widget is populated from.

use atheneum_core::{registry, store::RecordStore};
use axum::{
  Json,
  extract::{Path, State},
};

use crate::{ApiState, error::ApiError, meta::parse_table};

/// `GET /tables/:table/columns/:column/values`
pub async fn values<S>(
  State(state): State<ApiState<S>>,
  Path((table, column)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  // Validate here so an unknown column reads as a 400, not a store error.
  registry::table_schema(table).require_column(&column)?;

  let values = state
    .store
    .distinct_values(table, column)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(values))
}
