//! SQL schema for the Atheneum SQLite store.
//!
//! Executed once at connection startup. All columns are TEXT: values
//! arrive from the form layer as strings and the natural-key semantics
//! treat NULL and '' alike on read. The (name, url) de-duplication key
//! is application-enforced, so no UNIQUE constraint appears here.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS entity (
    id          TEXT PRIMARY KEY,
    ts          TEXT,
    uid         TEXT,
    name        TEXT NOT NULL,
    url         TEXT,
    tags        TEXT,
    note        TEXT,
    entity_type TEXT,
    ref_tab     TEXT,
    ref_key     TEXT,
    ref_val     TEXT
);

-- The generic many-to-many link table. Object and subject are loose
-- (table, key column, key value) triples; integrity is caller convention.
CREATE TABLE IF NOT EXISTS relation (
    id          TEXT PRIMARY KEY,
    ts          TEXT,
    uid         TEXT,
    rel_type    TEXT,
    ref_tab     TEXT,
    ref_key     TEXT,
    ref_val     TEXT,
    ref_tab_sub TEXT,
    ref_key_sub TEXT,
    ref_val_sub TEXT,
    props       TEXT
);

CREATE TABLE IF NOT EXISTS person (
    id             TEXT PRIMARY KEY,
    ts             TEXT,
    uid            TEXT,
    name           TEXT NOT NULL,
    url            TEXT,
    tags           TEXT,
    note           TEXT,
    person_type    TEXT,
    job_title      TEXT,
    email          TEXT,
    cell_phone     TEXT,
    office_address TEXT,
    research_area  TEXT,
    department     TEXT,
    org            TEXT,
    award          TEXT,
    phd_univ       TEXT,
    phd_year       TEXT
);

CREATE TABLE IF NOT EXISTS org (
    id       TEXT PRIMARY KEY,
    ts       TEXT,
    uid      TEXT,
    name     TEXT NOT NULL,
    url      TEXT,
    tags     TEXT,
    note     TEXT,
    org_type TEXT,
    ref_tab  TEXT,
    ref_key  TEXT,
    ref_val  TEXT
);

CREATE TABLE IF NOT EXISTS project (
    id           TEXT PRIMARY KEY,
    ts           TEXT,
    uid          TEXT,
    name         TEXT NOT NULL,
    url          TEXT,
    tags         TEXT,
    note         TEXT,
    project_type TEXT,
    ref_tab      TEXT,
    ref_key      TEXT,
    ref_val      TEXT
);

CREATE TABLE IF NOT EXISTS work (
    id        TEXT PRIMARY KEY,
    ts        TEXT,
    uid       TEXT,
    name      TEXT NOT NULL,
    url       TEXT,
    tags      TEXT,
    note      TEXT,
    work_type TEXT,
    summary   TEXT,
    authors   TEXT,
    award     TEXT
);

CREATE TABLE IF NOT EXISTS note (
    id        TEXT PRIMARY KEY,
    ts        TEXT,
    uid       TEXT,
    name      TEXT NOT NULL,
    url       TEXT,
    tags      TEXT,
    note      TEXT,
    note_type TEXT,
    ref_tab   TEXT,
    ref_key   TEXT,
    ref_val   TEXT
);

CREATE TABLE IF NOT EXISTS task (
    id          TEXT PRIMARY KEY,
    ts          TEXT,
    uid         TEXT,
    name        TEXT NOT NULL,
    url         TEXT,
    tags        TEXT,
    note        TEXT,
    priority    TEXT,
    task_status TEXT,
    due_date    TEXT,
    done_date   TEXT,
    alert_date  TEXT,
    alert_time  TEXT,
    alert_to    TEXT,
    alert_msg   TEXT,
    ref_tab     TEXT,
    ref_key     TEXT,
    ref_val     TEXT
);

CREATE INDEX IF NOT EXISTS entity_name_url_idx  ON entity(name, url);
CREATE INDEX IF NOT EXISTS person_name_url_idx  ON person(name, url);
CREATE INDEX IF NOT EXISTS org_name_url_idx     ON org(name, url);
CREATE INDEX IF NOT EXISTS project_name_url_idx ON project(name, url);
CREATE INDEX IF NOT EXISTS work_name_url_idx    ON work(name, url);
CREATE INDEX IF NOT EXISTS note_name_url_idx    ON note(name, url);
CREATE INDEX IF NOT EXISTS task_name_url_idx    ON task(name, url);

CREATE INDEX IF NOT EXISTS relation_object_idx
    ON relation(rel_type, ref_tab, ref_key, ref_val);
CREATE INDEX IF NOT EXISTS relation_subject_idx
    ON relation(ref_tab_sub, ref_val_sub);

PRAGMA user_version = 1;
";
