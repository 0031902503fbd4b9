//! Static option lists for `Select` columns.
//!
//! Every list leads with an empty string so a form with no row selected
//! renders the unset state. The `ref_val` picker is the one dynamic
//! select — its options come from the store's distinct-values query.

use crate::table::TableId;

pub const ENTITY_TYPES: &[&str] = &["", "research_group", "award"];

pub const WORK_TYPES: &[&str] = &[
  "",
  "profile",
  "publication",
  "paper",
  "preprint",
  "thesis",
  "conference",
  "talk",
  "poster",
  "course",
  "book",
  "documentation",
  "tutorial",
  "project",
  "startup",
  "company",
  "other",
];

pub const PERSON_TYPES: &[&str] = &[
  "",
  "faculty",
  "team-lead",
  "researcher",
  "postdoc",
  "staff",
  "student",
  "other",
];

pub const NOTE_TYPES: &[&str] = &[
  "",
  "journal",
  "resource",
  "idea",
  "information",
  "news",
  "reminder",
  "other",
];

pub const ORG_TYPES: &[&str] = &[
  "",
  "university",
  "school",
  "company",
  "government",
  "non-profit",
  "other",
];

pub const PROJECT_TYPES: &[&str] =
  &["", "work", "personal", "open-source", "other"];

pub const TASK_STATUS: &[&str] =
  &["", "In Progress", "Pending", "Completed", "Canceled"];

pub const PRIORITY: &[&str] =
  &["", "Urgent", "Important-1", "Important-2", "Important-3"];

pub const KEY_COLUMNS: &[&str] = &["", "id", "name", "url"];

/// The static options for a column, if it has any. Reference-table
/// pickers (`ref_tab`, `ref_tab_sub`) are computed rather than listed so
/// they stay in lockstep with the table registry.
pub fn static_options(column: &str) -> Option<Vec<String>> {
  let fixed: &[&str] = match column {
    "entity_type" => ENTITY_TYPES,
    "work_type" => WORK_TYPES,
    "person_type" => PERSON_TYPES,
    "note_type" => NOTE_TYPES,
    "org_type" => ORG_TYPES,
    "project_type" => PROJECT_TYPES,
    "task_status" => TASK_STATUS,
    "priority" => PRIORITY,
    "ref_key" | "ref_key_sub" => KEY_COLUMNS,
    "ref_tab" | "ref_tab_sub" => return Some(referable_tables()),
    _ => return None,
  };
  Some(fixed.iter().map(|s| (*s).to_owned()).collect())
}

/// Blank placeholder plus every table that can sit on either side of a
/// relation, sorted by name.
fn referable_tables() -> Vec<String> {
  let mut tables: Vec<String> =
    TableId::referable().map(|t| t.as_str().to_owned()).collect();
  tables.sort();
  let mut options = vec![String::new()];
  options.append(&mut tables);
  options
}
