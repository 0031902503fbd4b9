//! Handlers for CSV export and import.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tables/:table/export` | Full dump, `text/csv`, UTF-8 |
//! | `POST` | `/tables/:table/import` | Body: CSV text; rows go through upsert |

use atheneum_core::store::RecordStore;
use atheneum_csv::{ImportSummary, export_table, import_table};
use axum::{
  Json,
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};

use crate::{ApiState, error::ApiError, meta::parse_table};

/// `GET /tables/:table/export`
pub async fn export<S>(
  State(state): State<ApiState<S>>,
  Path(table): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let body = export_table(state.store.as_ref(), table).await?;
  Ok((
    [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
    body,
  ))
}

/// `POST /tables/:table/import`
pub async fn import<S>(
  State(state): State<ApiState<S>>,
  Path(table): Path<String>,
  body: String,
) -> Result<Json<ImportSummary>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let table = parse_table(&table)?;
  let summary =
    import_table(state.store.as_ref(), table, body.as_bytes(), &state.actor)
      .await?;
  Ok(Json(summary))
}
