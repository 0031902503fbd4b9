//! Handlers for `/tables/:table/records` — the form-submission path.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/tables/:table/records` | Grid listing with column filters |
//! | `POST`   | `/tables/:table/records` | Upsert by natural key |
//! | `GET`    | `/tables/:table/records/:id` | 404 if not found |
//! | `PUT`    | `/tables/:table/records/:id` | `?update_changed=false` writes all |
//! | `DELETE` | `/tables/:table/records/:id` | Silent no-op on unknown id |
//! | `POST`   | `/tables/:table/quick-add` | Insert-only sidebar path |
//!
//! List query parameters other than the reserved ones are treated as
//! column filters: `?org=Cornell` matches equality, `?org=` matches
//! blank-or-null. Unknown columns are configuration errors (400).

use std::collections::BTreeMap;

use atheneum_core::{
  record::{Record, SaveOutcome},
  registry,
  store::{RecordFilter, RecordStore},
  table::{KeyColumn, RefSpec, TableId},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, meta::parse_table};

const RESERVED_PARAMS: [&str; 7] =
  ["order_by", "desc", "limit", "offset", "ref_tab", "ref_key", "ref_val"];

/// Mirror the engine's validation order so the failure surfaces as 422
/// before the opaque store boundary.
pub(crate) fn validate_submission_for(
  table: TableId,
  record: &Record,
) -> Result<(), ApiError> {
  let schema = registry::table_schema(table);
  let keyed = schema.natural_key_columns().any(|c| !record.is_blank(c.name));
  if keyed {
    for spec in schema.required_columns() {
      if record.is_blank(spec.name) {
        return Err(ApiError::Validation(format!(
          "missing required field: {}",
          spec.name,
        )));
      }
    }
  }
  Ok(())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tables/:table/records`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Path(table): Path<String>,
  Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Record>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let schema = registry::table_schema(table);

  let mut filter = RecordFilter::default();
  for (name, value) in &params {
    if RESERVED_PARAMS.contains(&name.as_str()) {
      continue;
    }
    schema.require_column(name)?;
    filter = if value.is_empty() {
      filter.blank(name)
    } else {
      filter.eq(name, value.clone())
    };
  }

  if let (Some(tab), Some(key), Some(val)) = (
    params.get("ref_tab"),
    params.get("ref_key"),
    params.get("ref_val"),
  ) {
    filter.object_ref = Some(RefSpec::new(
      TableId::parse(tab)?,
      KeyColumn::parse(key)?,
      val.clone(),
    ));
  }

  if let Some(order) = params.get("order_by") {
    filter.order_by = Some(order.clone());
    filter.descending = params.get("desc").is_some_and(|d| d == "true");
  }
  if let Some(limit) = params.get("limit") {
    filter.limit = limit.parse().ok();
    if let Some(offset) = params.get("offset") {
      filter.offset = offset.parse().ok();
    }
  }

  let rows = state
    .store
    .list_records(table, filter)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Save (upsert) ────────────────────────────────────────────────────────────

/// `POST /tables/:table/records` — body: a flat column→value map.
pub async fn save<S>(
  State(state): State<ApiState<S>>,
  Path(table): Path<String>,
  Json(record): Json<Record>,
) -> Result<Json<SaveOutcome>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  validate_submission_for(table, &record)?;

  let outcome = state
    .store
    .upsert(table, record, state.actor.clone())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /tables/:table/records/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path((table, id)): Path<(String, Uuid)>,
) -> Result<Json<Record>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let record = state
    .store
    .get_by_id(table, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("{table} record {id}")))?;
  Ok(Json(record))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
pub struct UpdateParams {
  /// When `false`, every submitted editable column is written whether it
  /// changed or not. Defaults to `true` (change-only).
  pub update_changed: Option<bool>,
}

/// `PUT /tables/:table/records/:id`
pub async fn update_one<S>(
  State(state): State<ApiState<S>>,
  Path((table, id)): Path<(String, Uuid)>,
  Query(params): Query<UpdateParams>,
  Json(record): Json<Record>,
) -> Result<Json<SaveOutcome>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let outcome = state
    .store
    .update_by_id(
      table,
      id,
      record,
      params.update_changed.unwrap_or(true),
      state.actor.clone(),
    )
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /tables/:table/records/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path((table, id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let deleted = state
    .store
    .delete_by_id(table, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "deleted": deleted })))
}

// ─── Quick add ───────────────────────────────────────────────────────────────

/// `POST /tables/:table/quick-add`
pub async fn quick_add<S>(
  State(state): State<ApiState<S>>,
  Path(table): Path<String>,
  Json(record): Json<Record>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  validate_submission_for(table, &record)?;

  let outcome = state
    .store
    .quick_add(table, record, state.actor.clone())
    .await
    .map_err(ApiError::store)?;
  let status = match outcome {
    SaveOutcome::Inserted { .. } => StatusCode::CREATED,
    _ => StatusCode::OK,
  };
  Ok((status, Json(outcome)))
}
