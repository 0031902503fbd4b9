//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::{collections::BTreeMap, path::Path};

use atheneum_core::{
  record::{Actor, LinkedPair, Record, SaveOutcome, SystemStamp},
  registry::{self, TableSchema},
  store::{ColumnMatch, RecordFilter, RecordStore},
  table::{KeyColumn, RefSpec, TableId},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode_uuid, encode_dt, encode_uuid, row_to_record, valid_identifier},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Atheneum record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Internal SQL helpers ──────────────────────────────────────────────────

  /// Select the visible columns of rows matching `where_sql` (already
  /// prefixed with ` WHERE ` or empty). `tail` carries ORDER BY/LIMIT.
  async fn select_visible(
    &self,
    schema: &'static TableSchema,
    where_sql: String,
    params: Vec<String>,
    tail: String,
  ) -> Result<Vec<Record>> {
    let columns: Vec<&'static str> =
      schema.visible_columns().map(|c| c.name).collect();
    let sql = format!(
      "SELECT {} FROM {}{}{}",
      columns.join(", "),
      schema.table.as_str(),
      where_sql,
      tail,
    );

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            row_to_record(row, &columns)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn insert_row(
    &self,
    table: TableId,
    columns: Vec<&'static str>,
    values: Vec<String>,
  ) -> Result<()> {
    let sql = insert_sql(table, &columns);
    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// `UPDATE ... SET <assignments>, ts = ?, uid = ? WHERE id = ?`.
  async fn update_row(
    &self,
    table: TableId,
    id: Uuid,
    assignments: Vec<(&'static str, String)>,
    actor: &Actor,
  ) -> Result<()> {
    let mut set_parts: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();
    for (name, value) in assignments {
      set_parts.push(format!("{name} = ?"));
      params.push(value);
    }
    set_parts.push("ts = ?".to_owned());
    params.push(encode_dt(Utc::now()));
    set_parts.push("uid = ?".to_owned());
    params.push(actor.uid.clone());
    params.push(encode_uuid(id));

    let sql = format!(
      "UPDATE {} SET {} WHERE id = ?",
      table.as_str(),
      set_parts.join(", "),
    );
    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Statement builders ──────────────────────────────────────────────────────

fn insert_sql(table: TableId, columns: &[&'static str]) -> String {
  let placeholders = vec!["?"; columns.len()].join(", ");
  format!(
    "INSERT INTO {} ({}) VALUES ({})",
    table.as_str(),
    columns.join(", "),
    placeholders,
  )
}

/// The insert column set for a new row: system stamps plus every visible
/// column the record carries.
fn insert_columns(
  schema: &TableSchema,
  record: &Record,
  stamp: &SystemStamp,
) -> (Vec<&'static str>, Vec<String>) {
  let mut columns = Vec::new();
  let mut values = Vec::new();
  for spec in schema.visible_columns() {
    if spec.system {
      columns.push(spec.name);
      values.push(match spec.name {
        "id" => encode_uuid(stamp.id),
        "ts" => encode_dt(stamp.ts),
        _ => stamp.uid.clone(),
      });
    } else if record.contains(spec.name) {
      columns.push(spec.name);
      values.push(record.value_or_empty(spec.name).to_owned());
    }
  }
  (columns, values)
}

/// Natural-key predicate: equality on populated key columns. Returns
/// `None` when no key column is populated — the unkeyed no-op case.
fn natural_key_predicate(
  schema: &TableSchema,
  record: &Record,
) -> Option<(String, Vec<String>)> {
  let mut parts = Vec::new();
  let mut params = Vec::new();
  for spec in schema.natural_key_columns() {
    if !record.is_blank(spec.name) {
      parts.push(format!("{} = ?", spec.name));
      params.push(record.value_or_empty(spec.name).to_owned());
    }
  }
  if parts.is_empty() {
    return None;
  }
  Some((format!(" WHERE {}", parts.join(" AND ")), params))
}

fn validate_required(schema: &TableSchema, record: &Record) -> Result<()> {
  for spec in schema.required_columns() {
    if record.is_blank(spec.name) {
      return Err(atheneum_core::Error::MissingRequired(spec.name).into());
    }
  }
  Ok(())
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Upsert/Resolution Engine ──────────────────────────────────────────────

  async fn upsert(
    &self,
    table: TableId,
    record: Record,
    actor: Actor,
  ) -> Result<SaveOutcome> {
    let schema = registry::table_schema(table);

    // Unkeyed input never creates a row.
    let Some((where_sql, params)) = natural_key_predicate(schema, &record)
    else {
      return Ok(SaveOutcome::Skipped);
    };
    validate_required(schema, &record)?;

    // With legacy duplicates present, the first row by insertion order
    // wins — matching the grid's selection.
    let existing = self
      .select_visible(schema, where_sql, params, " ORDER BY rowid LIMIT 1".into())
      .await?
      .into_iter()
      .next();

    match existing {
      None => {
        let stamp = SystemStamp::generate(&actor);
        let (columns, values) = insert_columns(schema, &record, &stamp);
        self.insert_row(table, columns, values).await?;
        Ok(SaveOutcome::Inserted { id: stamp.id })
      }
      Some(old) => {
        let id = decode_uuid(old.value_or_empty("id"))?;
        let changed: Vec<&'static str> = schema
          .visible_columns()
          .filter(|c| !c.system && !c.natural_key)
          .filter(|c| record.contains(c.name))
          .filter(|c| {
            record.value_or_empty(c.name) != old.value_or_empty(c.name)
          })
          .map(|c| c.name)
          .collect();
        if changed.is_empty() {
          return Ok(SaveOutcome::Unchanged { id });
        }
        let assignments: Vec<(&'static str, String)> = changed
          .iter()
          .map(|name| (*name, record.value_or_empty(name).to_owned()))
          .collect();
        self.update_row(table, id, assignments, &actor).await?;
        Ok(SaveOutcome::Updated {
          id,
          columns: changed.iter().map(|n| (*n).to_owned()).collect(),
        })
      }
    }
  }

  async fn update_by_id(
    &self,
    table: TableId,
    id: Uuid,
    record: Record,
    update_changed: bool,
    actor: Actor,
  ) -> Result<SaveOutcome> {
    let schema = registry::table_schema(table);

    let Some(old) = self
      .select_visible(
        schema,
        " WHERE id = ?".into(),
        vec![encode_uuid(id)],
        String::new(),
      )
      .await?
      .into_iter()
      .next()
    else {
      // Unknown id is a silent no-op, consistent with idempotent intent.
      return Ok(SaveOutcome::Skipped);
    };

    let assignments: Vec<(&'static str, String)> = schema
      .editable_columns()
      .filter(|c| record.contains(c.name))
      .filter(|c| {
        !update_changed
          || record.value_or_empty(c.name) != old.value_or_empty(c.name)
      })
      .map(|c| (c.name, record.value_or_empty(c.name).to_owned()))
      .collect();
    if assignments.is_empty() {
      return Ok(SaveOutcome::Unchanged { id });
    }

    let columns = assignments.iter().map(|(n, _)| (*n).to_owned()).collect();
    self.update_row(table, id, assignments, &actor).await?;
    Ok(SaveOutcome::Updated { id, columns })
  }

  async fn delete_by_id(&self, table: TableId, id: Uuid) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", table.as_str());
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![id_str])?))
      .await?;
    Ok(removed > 0)
  }

  async fn quick_add(
    &self,
    table: TableId,
    record: Record,
    actor: Actor,
  ) -> Result<SaveOutcome> {
    let schema = registry::table_schema(table);
    if schema.natural_key_columns().all(|c| record.is_blank(c.name)) {
      return Ok(SaveOutcome::Skipped);
    }
    validate_required(schema, &record)?;

    // Exact match on the full (name, url) pair; a blank half matches
    // blank-or-null so re-adding a url-less row stays a no-op.
    let mut parts = Vec::new();
    let mut params = Vec::new();
    for spec in schema.natural_key_columns() {
      if record.is_blank(spec.name) {
        parts.push(format!("({0} = '' OR {0} IS NULL)", spec.name));
      } else {
        parts.push(format!("{} = ?", spec.name));
        params.push(record.value_or_empty(spec.name).to_owned());
      }
    }
    let where_sql = format!(" WHERE {}", parts.join(" AND "));
    let existing = self
      .select_visible(schema, where_sql, params, " ORDER BY rowid LIMIT 1".into())
      .await?
      .into_iter()
      .next();

    if let Some(row) = existing {
      let id = decode_uuid(row.value_or_empty("id"))?;
      return Ok(SaveOutcome::Unchanged { id });
    }

    let stamp = SystemStamp::generate(&actor);
    let mut columns: Vec<&'static str> = vec!["id", "ts", "uid"];
    let mut values = vec![
      encode_uuid(stamp.id),
      encode_dt(stamp.ts),
      stamp.uid.clone(),
    ];
    for spec in schema.editable_columns() {
      if !record.is_blank(spec.name) {
        columns.push(spec.name);
        values.push(record.value_or_empty(spec.name).to_owned());
      }
    }
    self.insert_row(table, columns, values).await?;
    Ok(SaveOutcome::Inserted { id: stamp.id })
  }

  // ── Relation Store ────────────────────────────────────────────────────────

  async fn link(
    &self,
    child_table: TableId,
    child: Record,
    object_ref: RefSpec,
    rel_type: String,
    actor: Actor,
  ) -> Result<LinkedPair> {
    let child_schema = registry::table_schema(child_table);
    validate_required(child_schema, &child)?;

    let child_stamp = SystemStamp::generate(&actor);
    let rel_stamp = SystemStamp::generate(&actor);

    let (child_cols, child_vals) =
      insert_columns(child_schema, &child, &child_stamp);
    let child_sql = insert_sql(child_table, &child_cols);

    let rel_cols: Vec<&'static str> = vec![
      "id",
      "ts",
      "uid",
      "rel_type",
      "ref_tab",
      "ref_key",
      "ref_val",
      "ref_tab_sub",
      "ref_key_sub",
      "ref_val_sub",
    ];
    let rel_vals = vec![
      encode_uuid(rel_stamp.id),
      encode_dt(rel_stamp.ts),
      rel_stamp.uid.clone(),
      rel_type,
      object_ref.table.as_str().to_owned(),
      object_ref.key.as_str().to_owned(),
      object_ref.value,
      child_table.as_str().to_owned(),
      KeyColumn::Id.as_str().to_owned(),
      encode_uuid(child_stamp.id),
    ];
    let rel_sql = insert_sql(TableId::Relation, &rel_cols);

    // Child row and relation row commit or roll back together.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&child_sql, rusqlite::params_from_iter(child_vals))?;
        tx.execute(&rel_sql, rusqlite::params_from_iter(rel_vals))?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(LinkedPair { child_id: child_stamp.id, relation_id: rel_stamp.id })
  }

  async fn unlink(
    &self,
    child_table: TableId,
    rel_type: String,
    object_ref: RefSpec,
    subject_id: Uuid,
  ) -> Result<usize> {
    let sql = format!(
      "DELETE FROM {}
       WHERE rel_type = ? AND ref_tab = ? AND ref_key = ? AND ref_val = ?
         AND ref_tab_sub = ? AND ref_key_sub = ? AND ref_val_sub = ?",
      TableId::Relation.as_str(),
    );
    let params = vec![
      rel_type,
      object_ref.table.as_str().to_owned(),
      object_ref.key.as_str().to_owned(),
      object_ref.value,
      child_table.as_str().to_owned(),
      KeyColumn::Id.as_str().to_owned(),
      encode_uuid(subject_id),
    ];
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?)
      })
      .await?;
    Ok(removed)
  }

  async fn children_of(
    &self,
    rel_type: String,
    object_ref: RefSpec,
    child_table: TableId,
  ) -> Result<Vec<Record>> {
    // Phase 1: collect subject key values from the relation table.
    let sql = format!(
      "SELECT ref_key_sub, ref_val_sub FROM {}
       WHERE rel_type = ? AND ref_tab = ? AND ref_key = ? AND ref_val = ?
         AND ref_tab_sub = ?",
      TableId::Relation.as_str(),
    );
    let params = vec![
      rel_type,
      object_ref.table.as_str().to_owned(),
      object_ref.key.as_str().to_owned(),
      object_ref.value,
      child_table.as_str().to_owned(),
    ];
    let pairs: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key_column, key_value) in pairs {
      grouped.entry(key_column).or_default().push(key_value);
    }
    if grouped.is_empty() {
      return Ok(Vec::new());
    }

    // Phase 2: fetch child rows by collected key values, one IN list per
    // subject key column. Key columns are validated, not interpolated.
    let child_schema = registry::table_schema(child_table);
    let mut or_parts = Vec::new();
    let mut params = Vec::new();
    for (key_column, values) in grouped {
      let key = KeyColumn::parse(&key_column)?;
      let placeholders = vec!["?"; values.len()].join(", ");
      or_parts.push(format!("{} IN ({})", key.as_str(), placeholders));
      params.extend(values);
    }
    let where_sql = format!(" WHERE {}", or_parts.join(" OR "));

    self
      .select_visible(child_schema, where_sql, params, " ORDER BY name".into())
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_by_id(&self, table: TableId, id: Uuid) -> Result<Option<Record>> {
    let schema = registry::table_schema(table);
    Ok(
      self
        .select_visible(
          schema,
          " WHERE id = ?".into(),
          vec![encode_uuid(id)],
          String::new(),
        )
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn list_records(
    &self,
    table: TableId,
    filter: RecordFilter,
  ) -> Result<Vec<Record>> {
    let schema = registry::table_schema(table);

    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    for (name, predicate) in &filter.columns {
      let spec = schema.require_column(name)?;
      match predicate {
        ColumnMatch::Equals(value) => {
          where_parts.push(format!("{} = ?", spec.name));
          params.push(value.clone());
        }
        ColumnMatch::BlankOrNull => {
          where_parts.push(format!("({0} = '' OR {0} IS NULL)", spec.name));
        }
      }
    }

    if let Some(object_ref) = &filter.object_ref {
      for column in ["ref_tab", "ref_key", "ref_val"] {
        schema.require_column(column)?;
      }
      where_parts.push("ref_tab = ?".to_owned());
      params.push(object_ref.table.as_str().to_owned());
      where_parts.push("ref_key = ?".to_owned());
      params.push(object_ref.key.as_str().to_owned());
      where_parts.push("ref_val = ?".to_owned());
      params.push(object_ref.value.clone());
    }

    let where_sql = if where_parts.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", where_parts.join(" AND "))
    };

    let mut tail = String::new();
    if let Some(order) = &filter.order_by {
      // A stale or hidden order column is ignored, like the grid does.
      if let Some(spec) = schema.column(order).filter(|c| c.visible) {
        tail.push_str(&format!(" ORDER BY {}", spec.name));
        if filter.descending {
          tail.push_str(" DESC");
        }
      }
    }
    if let Some(limit) = filter.limit {
      tail.push_str(&format!(" LIMIT {limit}"));
      if let Some(offset) = filter.offset {
        tail.push_str(&format!(" OFFSET {offset}"));
      }
    }

    self.select_visible(schema, where_sql, params, tail).await
  }

  async fn distinct_values(
    &self,
    table: TableId,
    column: String,
  ) -> Result<Vec<String>> {
    let schema = registry::table_schema(table);
    let spec = schema.require_column(&column)?;

    let sql = format!(
      "SELECT DISTINCT {0} FROM {1} WHERE {0} IS NOT NULL ORDER BY {0}",
      spec.name,
      table.as_str(),
    );
    let rows: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    let mut values = vec![String::new()];
    values.extend(rows);
    Ok(values)
  }

  async fn list_tables(&self) -> Result<Vec<String>> {
    let names: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(
      names
        .into_iter()
        .filter(|name| TableId::parse(name).is_ok())
        .collect(),
    )
  }

  // ── Ad hoc schema evolution ───────────────────────────────────────────────

  async fn add_column(&self, table: TableId, column: String) -> Result<()> {
    if !valid_identifier(&column) {
      return Err(Error::InvalidIdentifier(column));
    }
    let table_name = table.as_str();
    self
      .conn
      .call(move |conn| {
        if !column_exists(conn, table_name, &column)? {
          conn.execute_batch(&format!(
            "ALTER TABLE {table_name} ADD COLUMN {column} TEXT",
          ))?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn drop_column(&self, table: TableId, column: String) -> Result<()> {
    if !valid_identifier(&column) {
      return Err(Error::InvalidIdentifier(column));
    }
    let table_name = table.as_str();
    self
      .conn
      .call(move |conn| {
        if column_exists(conn, table_name, &column)? {
          conn.execute_batch(&format!(
            "ALTER TABLE {table_name} DROP COLUMN {column}",
          ))?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn column_exists(
  conn: &rusqlite::Connection,
  table: &str,
  column: &str,
) -> rusqlite::Result<bool> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
    rusqlite::params![table, column],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}
