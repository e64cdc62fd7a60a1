//! JSON HTTP layer for rigclaim.
//!
//! Exposes an axum [`Router`] serving the intake wizard and the evidence
//! catalog, backed by any [`LocalStore`].

pub mod error;
pub mod etag;
pub mod evidence;
pub mod intake;
pub mod sink;

pub use error::ApiError;

use std::{
  collections::HashMap,
  path::PathBuf,
  sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
  time::Duration,
};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, patch, post, put},
};
use rigclaim_core::{
  blob::{BlobRegistry, UploadDraft},
  catalog::EvidenceCatalog,
  clock::Clock,
  config::IntakeConfig,
  store::LocalStore,
  submission::LeadSink,
};
use serde::Deserialize;
use tokio::time::{Instant, MissedTickBehavior};
use tower_http::trace::TraceLayer;
use tracing::debug;
use uuid::Uuid;

use intake::IntakeSession;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `rigclaim.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  /// Pause between a successful submit and the confirmation view.
  pub confirmation_delay_ms: u64,
  /// Largest accepted image, in decoded bytes.
  pub max_upload_bytes:      usize,
  /// Intake sessions untouched for this long are discarded.
  pub session_ttl_secs:      u64,
  pub intake:                IntakeConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      store_path:            PathBuf::from("~/.local/share/rigclaim/store.sqlite"),
      confirmation_delay_ms: 1500,
      max_upload_bytes:      10 * 1024 * 1024,
      session_ttl_secs:      30 * 60,
      intake:                IntakeConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> Duration {
    Duration::from_secs(self.session_ttl_secs)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

type Sessions = Arc<Mutex<HashMap<Uuid, IntakeSession>>>;

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: LocalStore> {
  pub catalog:  Arc<tokio::sync::Mutex<EvidenceCatalog<S>>>,
  pub draft:    Arc<tokio::sync::Mutex<UploadDraft>>,
  pub blobs:    BlobRegistry,
  pub sessions: Sessions,
  pub sink:     Arc<dyn LeadSink>,
  pub clock:    Arc<dyn Clock>,
  pub config:   Arc<ServerConfig>,
}

impl<S: LocalStore> AppState<S> {
  /// Load the evidence catalog from `store` and assemble the state.
  pub async fn new(
    store: S,
    config: ServerConfig,
    sink: Arc<dyn LeadSink>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    let blobs = BlobRegistry::new();
    let catalog =
      EvidenceCatalog::open(store, blobs.clone(), clock.clone()).await;
    let sessions = Sessions::default();
    spawn_session_sweeper(Arc::downgrade(&sessions), config.session_ttl());
    Self {
      catalog: Arc::new(tokio::sync::Mutex::new(catalog)),
      draft: Arc::new(tokio::sync::Mutex::new(UploadDraft::new())),
      blobs,
      sessions,
      sink,
      clock,
      config: Arc::new(config),
    }
  }

  /// Never held across an `.await`.
  pub fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, IntakeSession>> {
    lock(&self.sessions)
  }

  /// Discard idle intake sessions now; returns how many went.
  pub fn sweep_sessions(&self) -> usize {
    intake::evict_idle(
      &mut self.lock_sessions(),
      self.config.session_ttl(),
      Instant::now(),
    )
  }
}

fn lock(
  sessions: &Mutex<HashMap<Uuid, IntakeSession>>,
) -> MutexGuard<'_, HashMap<Uuid, IntakeSession>> {
  sessions.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Periodically discard idle sessions. Stops once the state is dropped.
fn spawn_session_sweeper(
  sessions: Weak<Mutex<HashMap<Uuid, IntakeSession>>>,
  ttl: Duration,
) {
  let period = (ttl / 2).max(Duration::from_secs(1));
  tokio::spawn(async move {
    let mut ticks = tokio::time::interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticks.tick().await;
      let Some(sessions) = sessions.upgrade() else { break };
      let evicted =
        intake::evict_idle(&mut lock(&sessions), ttl, Instant::now());
      if evicted > 0 {
        debug!(evicted, "idle intake sessions discarded");
      }
    }
  });
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the site's API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: LocalStore + Clone + 'static,
{
  // Base64 inflates by 4/3; leave room for the JSON envelope.
  let draft_limit = state.config.max_upload_bytes / 3 * 4 + 64 * 1024;

  Router::new()
    // Intake
    .route("/intake", post(intake::create::<S>))
    .route(
      "/intake/{id}",
      get(intake::get_one::<S>).delete(intake::delete_one::<S>),
    )
    .route("/intake/{id}/fields", patch(intake::update_field::<S>))
    .route("/intake/{id}/advance", post(intake::advance::<S>))
    .route("/intake/{id}/retreat", post(intake::retreat::<S>))
    .route("/intake/{id}/submit", post(intake::submit::<S>))
    // Evidence
    .route(
      "/evidence",
      get(evidence::list::<S>).post(evidence::upload::<S>),
    )
    .route("/evidence/categories", get(evidence::categories))
    .route(
      "/evidence/draft",
      put(evidence::select_draft::<S>)
        .delete(evidence::clear_draft::<S>)
        .layer(DefaultBodyLimit::max(draft_limit)),
    )
    .route("/evidence/{id}", delete(evidence::remove::<S>))
    .route("/blobs/{id}", get(evidence::blob::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
