//! Handlers for schema metadata — what the grid-and-form UI renders from.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tables` | Registry tables present in the database |
//! | `GET`  | `/tables/:table/schema` | Full column metadata |

use atheneum_core::{
  options,
  registry,
  schema::{FormRegion, WidgetKind},
  store::RecordStore,
  table::TableId,
};
use axum::{Json, extract::{Path, State}};
use serde::Serialize;

use crate::{ApiState, error::ApiError};

pub(crate) fn parse_table(name: &str) -> Result<TableId, ApiError> {
  Ok(TableId::parse(name)?)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /tables`
pub async fn list_tables<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: RecordStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tables = state.store.list_tables().await.map_err(ApiError::store)?;
  Ok(Json(tables))
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ColumnMeta {
  pub name:        &'static str,
  pub label:       String,
  pub widget:      WidgetKind,
  pub region:      FormRegion,
  pub order:       u8,
  pub natural_key: bool,
  pub required:    bool,
  pub system:      bool,
  pub visible:     bool,
  pub editable:    bool,
  pub clickable:   bool,
  /// Static select options; `None` for free-text columns and for the
  /// dynamic `ref_val` picker.
  pub options:     Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TableMeta {
  pub table:             &'static str,
  pub visible_columns:   Vec<&'static str>,
  pub editable_columns:  Vec<&'static str>,
  pub clickable_columns: Vec<&'static str>,
  /// Visible columns in grid display order.
  pub grid_columns:      Vec<&'static str>,
  /// The three form regions, each independently ordered.
  pub regions:           [Vec<&'static str>; 3],
  pub columns:           Vec<ColumnMeta>,
}

/// `GET /tables/:table/schema`
pub async fn table_schema<S>(
  State(_state): State<ApiState<S>>,
  Path(table): Path<String>,
) -> Result<Json<TableMeta>, ApiError>
where
  S: RecordStore,
{
  let table = parse_table(&table)?;
  let schema = registry::table_schema(table);

  let columns = schema
    .columns
    .iter()
    .map(|c| ColumnMeta {
      name:        c.name,
      label:       c.label_text(),
      widget:      c.widget,
      region:      c.region,
      order:       c.order,
      natural_key: c.natural_key,
      required:    c.required,
      system:      c.system,
      visible:     c.visible,
      editable:    c.editable,
      clickable:   c.clickable,
      options:     match c.widget {
        WidgetKind::Select => options::static_options(c.name),
        _ => None,
      },
    })
    .collect();

  let regions = [FormRegion::Left, FormRegion::Middle, FormRegion::Right]
    .map(|r| schema.region_columns(r).iter().map(|c| c.name).collect());

  Ok(Json(TableMeta {
    table: table.as_str(),
    visible_columns: schema.visible_columns().map(|c| c.name).collect(),
    editable_columns: schema.editable_columns().map(|c| c.name).collect(),
    clickable_columns: schema.clickable_columns().map(|c| c.name).collect(),
    grid_columns: schema.grid_columns(),
    regions,
    columns,
  }))
}
