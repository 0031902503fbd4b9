//! JSON REST API for Atheneum.
//!
//! Exposes an axum [`Router`] backed by any
//! [`atheneum_core::store::RecordStore`]. This is the presentation
//! boundary: it serves the schema metadata a grid-and-form UI renders
//! from, and routes every submitted record through the upsert engine.
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", atheneum_api::api_router(store.clone(), actor))
//! ```

pub mod error;
pub mod meta;
pub mod pickers;
pub mod records;
pub mod relations;
pub mod transfer;

use std::sync::Arc;

use atheneum_core::{record::Actor, store::RecordStore};
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

/// Shared handler state: the store plus the write-attribution actor
/// resolved by the hosting environment.
pub struct ApiState<S> {
  pub store: Arc<S>,
  pub actor: Actor,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), actor: self.actor.clone() }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>, actor: Actor) -> Router<()>
where
  S: RecordStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Schema metadata
    .route("/tables", get(meta::list_tables::<S>))
    .route("/tables/{table}/schema", get(meta::table_schema::<S>))
    // Records
    .route(
      "/tables/{table}/records",
      get(records::list::<S>).post(records::save::<S>),
    )
    .route(
      "/tables/{table}/records/{id}",
      get(records::get_one::<S>)
        .put(records::update_one::<S>)
        .delete(records::delete_one::<S>),
    )
    .route("/tables/{table}/quick-add", post(records::quick_add::<S>))
    // Reference pickers
    .route(
      "/tables/{table}/columns/{column}/values",
      get(pickers::values::<S>),
    )
    // Import/export
    .route("/tables/{table}/export", get(transfer::export::<S>))
    .route("/tables/{table}/import", post(transfer::import::<S>))
    // Relations
    .route("/links", post(relations::link::<S>).delete(relations::unlink::<S>))
    .route("/links/children", get(relations::children::<S>))
    .with_state(ApiState { store, actor })
}
