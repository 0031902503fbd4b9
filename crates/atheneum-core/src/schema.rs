//! Column metadata — the typed replacement for the string-keyed property
//! maps that drive the grid-and-form UI.
//!
//! A [`ColumnSpec`] carries every behavioural flag the presentation layer
//! and the upsert engine interpret: visibility, editability, natural-key
//! participation, widget kind, and form placement. Specs are `const`-built
//! so the whole registry resolves at startup.

use serde::{Deserialize, Serialize};

/// Columns the engine owns: generated at creation, refreshed on write,
/// never editable through the form layer.
pub const SYSTEM_COLUMNS: [&str; 3] = ["id", "ts", "uid"];

// ─── Widget kinds ────────────────────────────────────────────────────────────

/// How the form layer should render a column.
///
/// `DateInput`/`TimeInput` also tell the engine the submitted value is
/// pre-formatted by the widget and must be bound verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
  TextInput,
  TextArea,
  DateInput,
  TimeInput,
  /// Options come from [`crate::options::static_options`] when static,
  /// or from the distinct-values picker query when reference-driven.
  Select,
}

// ─── Form regions ────────────────────────────────────────────────────────────

/// The three logical columns of the generated form. Each region is an
/// independently ordered list.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FormRegion {
  Left,
  Middle,
  Right,
}

// ─── ColumnSpec ──────────────────────────────────────────────────────────────

/// Static description of one column of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
  pub name:        &'static str,
  /// Explicit label override; derived from the name when `None`.
  pub label:       Option<&'static str>,
  pub widget:      WidgetKind,
  pub region:      FormRegion,
  /// Position within the region; regions sort ascending on this.
  pub order:       u8,
  /// Participates in the (name, url) de-duplication key.
  pub natural_key: bool,
  pub required:    bool,
  /// Engine-owned: immutable after creation (`id`) or engine-refreshed
  /// (`ts`, `uid`).
  pub system:      bool,
  pub visible:     bool,
  pub editable:    bool,
  /// Rendered as a hyperlink in the grid.
  pub clickable:   bool,
}

impl ColumnSpec {
  pub const fn new(name: &'static str, region: FormRegion, order: u8) -> Self {
    Self {
      name,
      label: None,
      widget: WidgetKind::TextInput,
      region,
      order,
      natural_key: false,
      required: false,
      system: false,
      visible: true,
      editable: true,
      clickable: false,
    }
  }

  pub const fn label(mut self, text: &'static str) -> Self {
    self.label = Some(text);
    self
  }

  pub const fn widget(mut self, kind: WidgetKind) -> Self {
    self.widget = kind;
    self
  }

  pub const fn natural_key(mut self) -> Self {
    self.natural_key = true;
    self
  }

  pub const fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub const fn system(mut self) -> Self {
    self.system = true;
    self.editable = false;
    self
  }

  pub const fn clickable(mut self) -> Self {
    self.clickable = true;
    self
  }

  /// The human-readable label: explicit override, else derived.
  pub fn label_text(&self) -> String {
    match self.label {
      Some(text) => text.to_owned(),
      None => derive_label(self.name),
    }
  }
}

// ─── Label derivation ────────────────────────────────────────────────────────

/// Turn a column name into a form label.
///
/// Splits on `_` and title-cases each segment. Single-word names get the
/// acronym treatment for `id`/`url`, and `ts` reads as "Timestamp". The
/// literal `ts_created` is special-cased.
pub fn derive_label(column: &str) -> String {
  if column == "ts_created" {
    return "Created At".to_owned();
  }

  if !column.contains('_') {
    return match column.to_ascii_uppercase().as_str() {
      "URL" | "ID" => column.to_ascii_uppercase(),
      "TS" => "Timestamp".to_owned(),
      _ => capitalize(column),
    };
  }

  column
    .split('_')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(capitalize)
    .collect::<Vec<_>>()
    .join(" ")
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    None => String::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_special_cases() {
    assert_eq!(derive_label("ts_created"), "Created At");
    assert_eq!(derive_label("url"), "URL");
    assert_eq!(derive_label("id"), "ID");
    assert_eq!(derive_label("ts"), "Timestamp");
  }

  #[test]
  fn label_single_word() {
    assert_eq!(derive_label("name"), "Name");
    assert_eq!(derive_label("tags"), "Tags");
  }

  #[test]
  fn label_compound_words() {
    assert_eq!(derive_label("job_title"), "Job Title");
    assert_eq!(derive_label("phd_univ"), "Phd Univ");
    assert_eq!(derive_label("ref_tab_sub"), "Ref Tab Sub");
  }

  #[test]
  fn label_ignores_empty_segments() {
    assert_eq!(derive_label("a__b"), "A B");
  }

  #[test]
  fn explicit_label_wins() {
    let spec = ColumnSpec::new("rel_type", FormRegion::Right, 3)
      .label("Relation Type");
    assert_eq!(spec.label_text(), "Relation Type");
  }

  #[test]
  fn system_implies_not_editable() {
    let spec = ColumnSpec::new("id", FormRegion::Right, 97).system();
    assert!(spec.system);
    assert!(!spec.editable);
    assert!(spec.visible);
  }
}
