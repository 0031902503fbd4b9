//! The schema registry: one static [`TableSchema`] per table, resolved at
//! compile time and interpreted at startup — never per render.
//!
//! Column placement uses three form regions; within a region the `order`
//! value sorts ascending. System columns sit at the high end of the right
//! region so generated forms always show them last.

use crate::{
  Error, Result,
  schema::{ColumnSpec, FormRegion, WidgetKind},
  table::TableId,
};

// ─── TableSchema ─────────────────────────────────────────────────────────────

/// The full column metadata for one table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
  pub table:   TableId,
  pub columns: &'static [ColumnSpec],
}

impl TableSchema {
  pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
    self.columns.iter().find(|c| c.name == name)
  }

  /// Like [`Self::column`] but an unknown name is a configuration error.
  pub fn require_column(&self, name: &str) -> Result<&'static ColumnSpec> {
    self.column(name).ok_or_else(|| Error::UnknownColumn {
      table:  self.table,
      column: name.to_owned(),
    })
  }

  pub fn visible_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.visible)
  }

  pub fn editable_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.editable)
  }

  pub fn clickable_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.clickable)
  }

  pub fn system_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.system)
  }

  pub fn natural_key_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.natural_key)
  }

  pub fn required_columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
    self.columns.iter().filter(|c| c.required && !c.system)
  }

  /// The visible columns assigned to `region`, ordered for form layout.
  pub fn region_columns(&self, region: FormRegion) -> Vec<&'static ColumnSpec> {
    let mut cols: Vec<_> = self
      .visible_columns()
      .filter(|c| c.region == region)
      .collect();
    cols.sort_by_key(|c| (c.order, c.name));
    cols
  }

  /// Visible column names in grid display order: identifying columns
  /// first, then the body, then discriminator/reference/system columns.
  pub fn grid_columns(&self) -> Vec<&'static str> {
    const FRONT: [&str; 3] = ["name", "url", "note"];
    const BACK: [&str; 7] =
      ["entity_type", "ref_tab", "ref_key", "ref_val", "id", "ts", "uid"];

    let visible: Vec<&'static str> =
      self.visible_columns().map(|c| c.name).collect();
    let mut front = vec![];
    let mut middle = vec![];
    let mut back = vec![];
    for name in visible {
      if FRONT.contains(&name) {
        front.push(name);
      } else if BACK.contains(&name) {
        back.push(name);
      } else {
        middle.push(name);
      }
    }
    front.sort_by_key(|n| FRONT.iter().position(|f| f == n));
    back.sort_by_key(|n| BACK.iter().position(|b| b == n));
    front.into_iter().chain(middle).chain(back).collect()
  }
}

// ─── Column declarations ─────────────────────────────────────────────────────

use FormRegion::{Left, Middle, Right};
use WidgetKind::{DateInput, Select, TextArea, TimeInput};

const fn col(name: &'static str, region: FormRegion, order: u8) -> ColumnSpec {
  ColumnSpec::new(name, region, order)
}

const fn id_col() -> ColumnSpec {
  col("id", Right, 97).system().required()
}
const fn ts_col() -> ColumnSpec {
  col("ts", Right, 98).system()
}
const fn uid_col() -> ColumnSpec {
  col("uid", Right, 99).system().label("UID")
}

static ENTITY_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("tags", Left, 3),
  col("entity_type", Middle, 2).widget(Select),
  col("note", Middle, 3).widget(TextArea),
  col("ref_tab", Right, 1).widget(Select).label("Ref Table"),
  col("ref_key", Right, 2).widget(Select).label("Ref Column"),
  col("ref_val", Right, 3).widget(Select).label("Ref Value"),
  id_col(),
  ts_col(),
  uid_col(),
];

static RELATION_COLUMNS: &[ColumnSpec] = &[
  col("ref_tab", Left, 2).widget(Select).label("Object Table"),
  col("ref_key", Left, 3).widget(Select).label("Object Column"),
  col("ref_val", Left, 4).label("Object Value"),
  col("ref_tab_sub", Middle, 1).widget(Select).label("Subject Table"),
  col("ref_key_sub", Middle, 2).widget(Select).label("Subject Column"),
  col("ref_val_sub", Middle, 3).label("Subject Value"),
  col("props", Right, 2).widget(TextArea),
  col("rel_type", Right, 3).label("Relation Type"),
  id_col(),
  ts_col(),
  uid_col(),
];

static PERSON_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("research_area", Left, 3),
  col("job_title", Left, 4),
  col("tags", Left, 5),
  col("department", Left, 6),
  col("email", Middle, 1),
  col("cell_phone", Middle, 2).label("Cell"),
  col("office_address", Middle, 3),
  col("note", Middle, 4).widget(TextArea),
  col("person_type", Right, 2).widget(Select),
  col("award", Right, 3),
  col("org", Right, 4),
  col("phd_univ", Right, 5),
  col("phd_year", Right, 6),
  id_col(),
  ts_col(),
  uid_col(),
];

static ORG_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("tags", Left, 3),
  col("org_type", Middle, 2).widget(Select),
  col("note", Middle, 3).widget(TextArea),
  col("ref_tab", Right, 1).widget(Select).label("Ref Table"),
  col("ref_key", Right, 2).widget(Select).label("Ref Column"),
  col("ref_val", Right, 3).widget(Select).label("Ref Value"),
  id_col(),
  ts_col(),
  uid_col(),
];

static PROJECT_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("tags", Left, 3),
  col("project_type", Middle, 2).widget(Select),
  col("note", Middle, 3).widget(TextArea),
  col("ref_tab", Right, 1).widget(Select).label("Ref Table"),
  col("ref_key", Right, 2).widget(Select).label("Ref Column"),
  col("ref_val", Right, 3).widget(Select).label("Ref Value"),
  id_col(),
  ts_col(),
  uid_col(),
];

static WORK_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("summary", Left, 3).widget(TextArea),
  col("authors", Middle, 1),
  col("tags", Middle, 2),
  col("note", Middle, 3).widget(TextArea),
  col("work_type", Right, 2).widget(Select),
  col("award", Right, 3),
  id_col(),
  ts_col(),
  uid_col(),
];

static NOTE_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("tags", Left, 3),
  col("note_type", Middle, 2).widget(Select),
  col("note", Middle, 3).widget(TextArea),
  col("ref_tab", Right, 1).widget(Select).label("Ref Table"),
  col("ref_key", Right, 2).widget(Select).label("Ref Column"),
  col("ref_val", Right, 3).widget(Select).label("Ref Value"),
  id_col(),
  ts_col(),
  uid_col(),
];

static TASK_COLUMNS: &[ColumnSpec] = &[
  col("name", Left, 1).natural_key().required(),
  col("url", Left, 2).natural_key().clickable(),
  col("priority", Left, 3).widget(Select),
  col("note", Left, 4).widget(TextArea),
  col("tags", Left, 5),
  col("task_status", Middle, 1).widget(Select),
  col("due_date", Middle, 2).widget(DateInput),
  col("alert_date", Middle, 3).widget(DateInput),
  col("alert_time", Middle, 4).widget(TimeInput),
  col("alert_to", Middle, 5).label("Alert To (cell or email)"),
  col("alert_msg", Middle, 6),
  col("ref_tab", Right, 2).widget(Select).label("Ref Table"),
  col("ref_key", Right, 3).widget(Select).label("Ref Column"),
  col("ref_val", Right, 4).widget(Select).label("Ref Value"),
  col("done_date", Right, 5).widget(DateInput).label("Completion Date"),
  id_col(),
  ts_col(),
  uid_col(),
];

// ─── Lookup ──────────────────────────────────────────────────────────────────

static ENTITY: TableSchema =
  TableSchema { table: TableId::Entity, columns: ENTITY_COLUMNS };
static RELATION: TableSchema =
  TableSchema { table: TableId::Relation, columns: RELATION_COLUMNS };
static PERSON: TableSchema =
  TableSchema { table: TableId::Person, columns: PERSON_COLUMNS };
static ORG: TableSchema =
  TableSchema { table: TableId::Org, columns: ORG_COLUMNS };
static PROJECT: TableSchema =
  TableSchema { table: TableId::Project, columns: PROJECT_COLUMNS };
static WORK: TableSchema =
  TableSchema { table: TableId::Work, columns: WORK_COLUMNS };
static NOTE: TableSchema =
  TableSchema { table: TableId::Note, columns: NOTE_COLUMNS };
static TASK: TableSchema =
  TableSchema { table: TableId::Task, columns: TASK_COLUMNS };

/// The schema for a known table.
pub fn table_schema(table: TableId) -> &'static TableSchema {
  match table {
    TableId::Entity => &ENTITY,
    TableId::Relation => &RELATION,
    TableId::Person => &PERSON,
    TableId::Org => &ORG,
    TableId::Project => &PROJECT,
    TableId::Work => &WORK,
    TableId::Note => &NOTE,
    TableId::Task => &TASK,
  }
}

/// Resolve a caller-supplied table name to its schema.
pub fn resolve(name: &str) -> Result<&'static TableSchema> {
  Ok(table_schema(TableId::parse(name)?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_table_has_system_columns() {
    for table in TableId::all() {
      let schema = table_schema(table);
      let sys: Vec<_> = schema.system_columns().map(|c| c.name).collect();
      assert_eq!(sys, ["id", "ts", "uid"], "table {table}");
      assert!(schema.system_columns().all(|c| !c.editable));
    }
  }

  #[test]
  fn entity_tables_key_on_name_and_url() {
    for table in TableId::referable() {
      let schema = table_schema(table);
      let keys: Vec<_> = schema.natural_key_columns().map(|c| c.name).collect();
      assert_eq!(keys, ["name", "url"], "table {table}");
    }
  }

  #[test]
  fn relation_has_no_natural_key() {
    assert_eq!(table_schema(TableId::Relation).natural_key_columns().count(), 0);
  }

  #[test]
  fn required_non_system_is_name_only() {
    let schema = table_schema(TableId::Person);
    let req: Vec<_> = schema.required_columns().map(|c| c.name).collect();
    assert_eq!(req, ["name"]);
  }

  #[test]
  fn regions_sort_by_order() {
    let schema = table_schema(TableId::Task);
    let middle: Vec<_> = schema
      .region_columns(FormRegion::Middle)
      .iter()
      .map(|c| c.name)
      .collect();
    assert_eq!(
      middle,
      ["task_status", "due_date", "alert_date", "alert_time", "alert_to", "alert_msg"]
    );
  }

  #[test]
  fn grid_order_fronts_identity_and_backs_references() {
    let cols = table_schema(TableId::Note).grid_columns();
    assert_eq!(&cols[..3], &["name", "url", "note"]);
    assert_eq!(
      &cols[cols.len() - 6..],
      &["ref_tab", "ref_key", "ref_val", "id", "ts", "uid"]
    );
  }

  #[test]
  fn unknown_column_is_configuration_error() {
    let err = table_schema(TableId::Work).require_column("phd_year").unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { .. }));
  }

  #[test]
  fn labels_resolve_with_overrides() {
    let schema = table_schema(TableId::Person);
    assert_eq!(schema.column("cell_phone").unwrap().label_text(), "Cell");
    assert_eq!(schema.column("job_title").unwrap().label_text(), "Job Title");
    assert_eq!(schema.column("uid").unwrap().label_text(), "UID");
    assert_eq!(schema.column("ts").unwrap().label_text(), "Timestamp");
  }
}
