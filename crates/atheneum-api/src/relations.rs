//! Handlers for `/links` — the relation store boundary.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/links` | Create child entity + relation row together |
//! | `DELETE` | `/links` | Remove the relation row only |
//! | `GET`    | `/links/children` | Resolve subjects of an object |

use atheneum_core::{
  record::{LinkedPair, Record},
  store::RecordStore,
  table::{KeyColumn, RefSpec, TableId},
};
use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, records::validate_submission_for};

// ─── Link ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub child_table: String,
  pub child:       Record,
  pub object:      RefBody,
  pub rel_type:    String,
}

/// The wire shape of a reference: plain strings, validated into a
/// [`RefSpec`] before any query is built.
#[derive(Debug, Deserialize)]
pub struct RefBody {
  pub table: String,
  pub key:   String,
  pub value: String,
}

impl RefBody {
  pub fn resolve(&self) -> Result<RefSpec, ApiError> {
    Ok(RefSpec::new(
      TableId::parse(&self.table)?,
      KeyColumn::parse(&self.key)?,
      self.value.clone(),
    ))
  }
}

/// `POST /links`
pub async fn link<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<LinkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let child_table = TableId::parse(&body.child_table)?;
  let object_ref = body.object.resolve()?;
  validate_submission_for(child_table, &body.child)?;

  let pair: LinkedPair = state
    .store
    .link(
      child_table,
      body.child,
      object_ref,
      body.rel_type,
      state.actor.clone(),
    )
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(pair)))
}

// ─── Unlink ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UnlinkBody {
  pub child_table: String,
  pub rel_type:    String,
  pub object:      RefBody,
  pub subject_id:  Uuid,
}

/// `DELETE /links` — removes the relation row(s); the child entity stays.
pub async fn unlink<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<UnlinkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let child_table = TableId::parse(&body.child_table)?;
  let object_ref = body.object.resolve()?;

  let removed = state
    .store
    .unlink(child_table, body.rel_type, object_ref, body.subject_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "removed": removed })))
}

// ─── Children ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChildrenParams {
  pub rel_type:    String,
  pub ref_tab:     String,
  pub ref_key:     String,
  pub ref_val:     String,
  pub child_table: String,
}

/// `GET /links/children`
pub async fn children<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ChildrenParams>,
) -> Result<Json<Vec<Record>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let object_ref = RefSpec::new(
    TableId::parse(&params.ref_tab)?,
    KeyColumn::parse(&params.ref_key)?,
    params.ref_val,
  );
  let child_table = TableId::parse(&params.child_table)?;

  let rows = state
    .store
    .children_of(params.rel_type, object_ref, child_table)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
