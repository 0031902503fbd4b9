//! Integration tests for `SqliteStore` against an in-memory database.

use atheneum_core::{
  record::{Actor, Record, SaveOutcome},
  store::{RecordFilter, RecordStore},
  table::{KeyColumn, RefSpec, TableId},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn actor() -> Actor { Actor::new("tester") }

fn ada() -> Record {
  Record::new()
    .with("name", "Ada")
    .with("url", "ada.edu")
    .with("job_title", "Professor")
}

fn ada_ref() -> RefSpec {
  RefSpec::new(TableId::Person, KeyColumn::Url, "ada.edu")
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_inserts_then_is_idempotent() {
  let s = store().await;

  let first = s.upsert(TableId::Person, ada(), actor()).await.unwrap();
  let id = match first {
    SaveOutcome::Inserted { id } => id,
    other => panic!("expected insert, got {other:?}"),
  };

  // Identical input: zero writes the second time.
  let second = s.upsert(TableId::Person, ada(), actor()).await.unwrap();
  assert_eq!(second, SaveOutcome::Unchanged { id });

  let rows = s
    .list_records(TableId::Person, RecordFilter::default())
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("job_title"), Some("Professor"));
}

#[tokio::test]
async fn upsert_dedupes_on_natural_key() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  let revised = ada().with("job_title", "Dean");
  let outcome = s.upsert(TableId::Person, revised, actor()).await.unwrap();
  match outcome {
    SaveOutcome::Updated { columns, .. } => {
      assert_eq!(columns, ["job_title"]);
    }
    other => panic!("expected update, got {other:?}"),
  }

  let rows = s
    .list_records(TableId::Person, RecordFilter::default())
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("job_title"), Some("Dean"));
}

#[tokio::test]
async fn upsert_unkeyed_input_is_a_noop() {
  let s = store().await;

  let record = Record::new().with("name", "").with("url", "").with("tags", "x");
  let outcome = s.upsert(TableId::Person, record, actor()).await.unwrap();
  assert_eq!(outcome, SaveOutcome::Skipped);

  let rows = s
    .list_records(TableId::Person, RecordFilter::default())
    .await
    .unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn upsert_missing_name_fails_validation() {
  let s = store().await;

  let record = Record::new().with("url", "nameless.example");
  let err = s.upsert(TableId::Person, record, actor()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atheneum_core::Error::MissingRequired("name"))
  ));

  let rows = s
    .list_records(TableId::Person, RecordFilter::default())
    .await
    .unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn upsert_refreshes_write_attribution() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), Actor::new("alice")).await.unwrap();

  let revised = ada().with("job_title", "Dean");
  s.upsert(TableId::Person, revised, Actor::new("bob")).await.unwrap();

  let rows = s
    .list_records(TableId::Person, RecordFilter::default())
    .await
    .unwrap();
  assert_eq!(rows[0].get("uid"), Some("bob"));
}

#[tokio::test]
async fn upsert_relation_table_has_no_natural_key() {
  let s = store().await;

  // Relation rows are created by link, never by natural-key upsert.
  let record = Record::new().with("rel_type", "person-work");
  let outcome = s.upsert(TableId::Relation, record, actor()).await.unwrap();
  assert_eq!(outcome, SaveOutcome::Skipped);
}

// ─── Update by id ────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_by_id_writes_changed_columns_only() {
  let s = store().await;
  let record = ada().with("research_area", "Computing");
  let id = s
    .upsert(TableId::Person, record, actor())
    .await
    .unwrap()
    .id()
    .unwrap();

  let submitted = Record::new()
    .with("research_area", "Computing")
    .with("job_title", "Dean");
  let outcome = s
    .update_by_id(TableId::Person, id, submitted, true, actor())
    .await
    .unwrap();
  match outcome {
    SaveOutcome::Updated { columns, .. } => assert_eq!(columns, ["job_title"]),
    other => panic!("expected update, got {other:?}"),
  }

  let row = s.get_by_id(TableId::Person, id).await.unwrap().unwrap();
  assert_eq!(row.get("research_area"), Some("Computing"));
  assert_eq!(row.get("job_title"), Some("Dean"));
}

#[tokio::test]
async fn update_by_id_is_noop_when_nothing_changed() {
  let s = store().await;
  let id = s
    .upsert(TableId::Person, ada(), actor())
    .await
    .unwrap()
    .id()
    .unwrap();

  let outcome = s
    .update_by_id(
      TableId::Person,
      id,
      Record::new().with("job_title", "Professor"),
      true,
      actor(),
    )
    .await
    .unwrap();
  assert_eq!(outcome, SaveOutcome::Unchanged { id });
}

#[tokio::test]
async fn update_by_id_unknown_id_is_a_noop() {
  let s = store().await;
  let outcome = s
    .update_by_id(
      TableId::Person,
      Uuid::new_v4(),
      Record::new().with("job_title", "Dean"),
      true,
      actor(),
    )
    .await
    .unwrap();
  assert_eq!(outcome, SaveOutcome::Skipped);
}

#[tokio::test]
async fn update_by_id_unconditional_writes_every_submitted_column() {
  let s = store().await;
  let id = s
    .upsert(TableId::Person, ada(), actor())
    .await
    .unwrap()
    .id()
    .unwrap();

  let submitted = Record::new()
    .with("job_title", "Professor")
    .with("department", "CS");
  let outcome = s
    .update_by_id(TableId::Person, id, submitted, false, actor())
    .await
    .unwrap();
  match outcome {
    SaveOutcome::Updated { columns, .. } => {
      assert_eq!(columns.len(), 2);
      assert!(columns.contains(&"job_title".to_owned()));
      assert!(columns.contains(&"department".to_owned()));
    }
    other => panic!("expected update, got {other:?}"),
  }
}

#[tokio::test]
async fn update_by_id_never_touches_system_columns() {
  let s = store().await;
  let id = s
    .upsert(TableId::Person, ada(), actor())
    .await
    .unwrap()
    .id()
    .unwrap();

  // A submitted id/uid is ignored: those columns are not editable.
  let submitted = Record::new()
    .with("id", Uuid::new_v4().to_string())
    .with("uid", "mallory")
    .with("job_title", "Dean");
  s.update_by_id(TableId::Person, id, submitted, true, actor())
    .await
    .unwrap();

  let row = s.get_by_id(TableId::Person, id).await.unwrap().unwrap();
  assert_eq!(row.get("id"), Some(id.to_string().as_str()));
  assert_eq!(row.get("uid"), Some("tester"));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_by_id_removes_one_row_then_noops() {
  let s = store().await;
  let id = s
    .upsert(TableId::Person, ada(), actor())
    .await
    .unwrap()
    .id()
    .unwrap();

  assert!(s.delete_by_id(TableId::Person, id).await.unwrap());
  assert!(!s.delete_by_id(TableId::Person, id).await.unwrap());
  assert!(s.get_by_id(TableId::Person, id).await.unwrap().is_none());
}

// ─── Quick add ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn quick_add_inserts_once() {
  let s = store().await;

  let record = Record::new().with("name", "SysLab").with("url", "syslab.example");
  let first = s.quick_add(TableId::Org, record.clone(), actor()).await.unwrap();
  assert!(matches!(first, SaveOutcome::Inserted { .. }));

  let second = s.quick_add(TableId::Org, record, actor()).await.unwrap();
  assert!(matches!(second, SaveOutcome::Unchanged { .. }));

  let rows = s
    .list_records(TableId::Org, RecordFilter::default())
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn quick_add_skips_blank_values() {
  let s = store().await;

  let record = Record::new().with("name", "SysLab").with("org_type", "");
  s.quick_add(TableId::Org, record, actor()).await.unwrap();

  let rows = s
    .list_records(TableId::Org, RecordFilter::default())
    .await
    .unwrap();
  // Blank org_type was never written; it reads back as empty.
  assert_eq!(rows[0].get("org_type"), Some(""));
  assert_eq!(rows[0].get("name"), Some("SysLab"));
}

// ─── Link / unlink ───────────────────────────────────────────────────────────

#[tokio::test]
async fn link_creates_child_and_relation_rows() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  let paper = Record::new().with("name", "Paper X");
  let pair = s
    .link(TableId::Work, paper, ada_ref(), "person-work".into(), actor())
    .await
    .unwrap();

  let child = s.get_by_id(TableId::Work, pair.child_id).await.unwrap().unwrap();
  assert_eq!(child.get("name"), Some("Paper X"));

  let relations = s
    .list_records(
      TableId::Relation,
      RecordFilter::default().eq("rel_type", "person-work"),
    )
    .await
    .unwrap();
  assert_eq!(relations.len(), 1);
  let rel = &relations[0];
  assert_eq!(rel.get("ref_tab"), Some("person"));
  assert_eq!(rel.get("ref_key"), Some("url"));
  assert_eq!(rel.get("ref_val"), Some("ada.edu"));
  assert_eq!(rel.get("ref_tab_sub"), Some("work"));
  assert_eq!(rel.get("ref_key_sub"), Some("id"));
  assert_eq!(rel.get("ref_val_sub"), Some(pair.child_id.to_string().as_str()));
  assert_eq!(rel.get("id"), Some(pair.relation_id.to_string().as_str()));
}

#[tokio::test]
async fn link_missing_child_name_fails_validation() {
  let s = store().await;

  let err = s
    .link(
      TableId::Work,
      Record::new().with("url", "paper.example"),
      ada_ref(),
      "person-work".into(),
      actor(),
    )
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atheneum_core::Error::MissingRequired("name"))
  ));

  // The transaction left nothing behind.
  let works = s
    .list_records(TableId::Work, RecordFilter::default())
    .await
    .unwrap();
  assert!(works.is_empty());
  let relations = s
    .list_records(TableId::Relation, RecordFilter::default())
    .await
    .unwrap();
  assert!(relations.is_empty());
}

#[tokio::test]
async fn unlink_removes_only_the_relation_row() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  let paper = Record::new().with("name", "Paper X");
  let pair = s
    .link(TableId::Work, paper, ada_ref(), "person-work".into(), actor())
    .await
    .unwrap();

  let removed = s
    .unlink(TableId::Work, "person-work".into(), ada_ref(), pair.child_id)
    .await
    .unwrap();
  assert_eq!(removed, 1);

  // The child entity persists; only the link is gone.
  assert!(s.get_by_id(TableId::Work, pair.child_id).await.unwrap().is_some());
  let relations = s
    .list_records(TableId::Relation, RecordFilter::default())
    .await
    .unwrap();
  assert!(relations.is_empty());

  // Unlinking again is a no-op.
  let removed = s
    .unlink(TableId::Work, "person-work".into(), ada_ref(), pair.child_id)
    .await
    .unwrap();
  assert_eq!(removed, 0);
}

#[tokio::test]
async fn unlink_matches_the_full_link_identity() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  let pair = s
    .link(
      TableId::Work,
      Record::new().with("name", "Paper X"),
      ada_ref(),
      "person-work".into(),
      actor(),
    )
    .await
    .unwrap();

  // Wrong rel_type: nothing removed.
  let removed = s
    .unlink(TableId::Work, "person-team".into(), ada_ref(), pair.child_id)
    .await
    .unwrap();
  assert_eq!(removed, 0);
}

// ─── Children of an object ───────────────────────────────────────────────────

#[tokio::test]
async fn children_of_resolves_subjects_from_their_tables() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  for title in ["Paper A", "Paper B"] {
    s.link(
      TableId::Work,
      Record::new().with("name", title),
      ada_ref(),
      "person-work".into(),
      actor(),
    )
    .await
    .unwrap();
  }
  s.link(
    TableId::Note,
    Record::new().with("name", "Reading notes"),
    ada_ref(),
    "person-work".into(),
    actor(),
  )
  .await
  .unwrap();

  // Subjects living in different tables resolve independently.
  let works = s
    .children_of("person-work".into(), ada_ref(), TableId::Work)
    .await
    .unwrap();
  let names: Vec<_> = works.iter().map(|r| r.value_or_empty("name")).collect();
  assert_eq!(names, ["Paper A", "Paper B"]);

  let notes = s
    .children_of("person-work".into(), ada_ref(), TableId::Note)
    .await
    .unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].get("name"), Some("Reading notes"));
}

#[tokio::test]
async fn children_of_unlinked_object_is_empty() {
  let s = store().await;
  let children = s
    .children_of("person-work".into(), ada_ref(), TableId::Work)
    .await
    .unwrap();
  assert!(children.is_empty());
}

#[tokio::test]
async fn children_of_respects_rel_type() {
  let s = store().await;
  s.upsert(TableId::Person, ada(), actor()).await.unwrap();

  s.link(
    TableId::Person,
    Record::new().with("name", "Grace"),
    ada_ref(),
    "person-team".into(),
    actor(),
  )
  .await
  .unwrap();

  let team = s
    .children_of("person-team".into(), ada_ref(), TableId::Person)
    .await
    .unwrap();
  assert_eq!(team.len(), 1);

  let works = s
    .children_of("person-work".into(), ada_ref(), TableId::Person)
    .await
    .unwrap();
  assert!(works.is_empty());
}

// ─── Reference picker ────────────────────────────────────────────────────────

#[tokio::test]
async fn distinct_values_prefixes_blank_placeholder() {
  let s = store().await;

  // Empty table: just the placeholder.
  let values = s
    .distinct_values(TableId::Person, "org".into())
    .await
    .unwrap();
  assert_eq!(values, [""]);

  for (name, org) in [("Ada", "Cornell"), ("Grace", "MIT"), ("Alan", "Cornell")] {
    let record = Record::new().with("name", name).with("org", org);
    s.upsert(TableId::Person, record, actor()).await.unwrap();
  }

  let values = s
    .distinct_values(TableId::Person, "org".into())
    .await
    .unwrap();
  assert_eq!(values, ["", "Cornell", "MIT"]);
}

#[tokio::test]
async fn distinct_values_rejects_unknown_column() {
  let s = store().await;
  let err = s
    .distinct_values(TableId::Person, "nope".into())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atheneum_core::Error::UnknownColumn { .. })
  ));
}

// ─── List / filters ──────────────────────────────────────────────────────────

#[tokio::test]
async fn list_records_filters_by_discriminator() {
  let s = store().await;

  for (name, kind) in [("DB Group", "research_group"), ("Turing Award", "award")] {
    let record = Record::new().with("name", name).with("entity_type", kind);
    s.upsert(TableId::Entity, record, actor()).await.unwrap();
  }

  let groups = s
    .list_records(
      TableId::Entity,
      RecordFilter::default().eq("entity_type", "research_group"),
    )
    .await
    .unwrap();
  assert_eq!(groups.len(), 1);
  assert_eq!(groups[0].get("name"), Some("DB Group"));
}

#[tokio::test]
async fn list_records_blank_filter_matches_missing_values() {
  let s = store().await;

  s.upsert(
    TableId::Person,
    Record::new().with("name", "Ada").with("org", "Cornell"),
    actor(),
  )
  .await
  .unwrap();
  s.upsert(TableId::Person, Record::new().with("name", "Grace"), actor())
    .await
    .unwrap();

  let blank = s
    .list_records(TableId::Person, RecordFilter::default().blank("org"))
    .await
    .unwrap();
  assert_eq!(blank.len(), 1);
  assert_eq!(blank[0].get("name"), Some("Grace"));
}

#[tokio::test]
async fn list_records_orders_and_pages() {
  let s = store().await;

  for name in ["Cantor", "Abel", "Boole"] {
    s.upsert(TableId::Person, Record::new().with("name", name), actor())
      .await
      .unwrap();
  }

  let mut filter = RecordFilter::default().order_by("name");
  filter.limit = Some(2);
  let rows = s.list_records(TableId::Person, filter).await.unwrap();
  let names: Vec<_> = rows.iter().map(|r| r.value_or_empty("name")).collect();
  assert_eq!(names, ["Abel", "Boole"]);
}

#[tokio::test]
async fn list_records_rejects_unknown_filter_column() {
  let s = store().await;
  let err = s
    .list_records(TableId::Work, RecordFilter::default().eq("phd_year", "1903"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(atheneum_core::Error::UnknownColumn { .. })
  ));
}

#[tokio::test]
async fn list_records_filters_by_object_ref() {
  let s = store().await;

  let noted = Record::new()
    .with("name", "Follow up")
    .with("ref_tab", "person")
    .with("ref_key", "url")
    .with("ref_val", "ada.edu");
  s.upsert(TableId::Note, noted, actor()).await.unwrap();
  s.upsert(TableId::Note, Record::new().with("name", "Unrelated"), actor())
    .await
    .unwrap();

  let rows = s
    .list_records(TableId::Note, RecordFilter::default().object(ada_ref()))
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("name"), Some("Follow up"));
}

// ─── Table catalog / ad hoc columns ──────────────────────────────────────────

#[tokio::test]
async fn list_tables_reports_registry_tables() {
  let s = store().await;
  let tables = s.list_tables().await.unwrap();
  assert_eq!(
    tables,
    ["entity", "note", "org", "person", "project", "relation", "task", "work"]
  );
}

#[tokio::test]
async fn add_and_drop_column_round_trip() {
  let s = store().await;

  s.add_column(TableId::Person, "slack_handle".into()).await.unwrap();
  // Adding again is a no-op, not an error.
  s.add_column(TableId::Person, "slack_handle".into()).await.unwrap();

  s.drop_column(TableId::Person, "slack_handle".into()).await.unwrap();
  s.drop_column(TableId::Person, "slack_handle".into()).await.unwrap();
}

#[tokio::test]
async fn add_column_rejects_bad_identifier() {
  let s = store().await;
  let err = s
    .add_column(TableId::Person, "x; drop table person".into())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::InvalidIdentifier(_)));
}

// ─── The concrete scenario from the design notes ─────────────────────────────

#[tokio::test]
async fn ada_scenario_end_to_end() {
  let s = store().await;

  // Upsert Ada: one row created with a new id.
  let outcome = s.upsert(TableId::Person, ada(), actor()).await.unwrap();
  let id = match outcome {
    SaveOutcome::Inserted { id } => id,
    other => panic!("expected insert, got {other:?}"),
  };

  // Upsert again with a new title: same row, only job_title changes.
  let revised = ada().with("job_title", "Dean");
  let outcome = s.upsert(TableId::Person, revised, actor()).await.unwrap();
  assert_eq!(
    outcome,
    SaveOutcome::Updated { id, columns: vec!["job_title".to_owned()] }
  );

  // Link Paper X under person-work.
  let pair = s
    .link(
      TableId::Work,
      Record::new().with("name", "Paper X"),
      ada_ref(),
      "person-work".into(),
      actor(),
    )
    .await
    .unwrap();

  let children = s
    .children_of("person-work".into(), ada_ref(), TableId::Work)
    .await
    .unwrap();
  assert_eq!(children.len(), 1);
  assert_eq!(children[0].get("name"), Some("Paper X"));
  assert_eq!(
    children[0].get("id"),
    Some(pair.child_id.to_string().as_str())
  );
}
