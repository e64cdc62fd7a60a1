//! Handlers for `/intake` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/intake` | 201 + snapshot of a fresh form |
//! | `GET`    | `/intake/{id}` | 404 if not found |
//! | `DELETE` | `/intake/{id}` | cancels a pending confirmation |
//! | `PATCH`  | `/intake/{id}/fields` | Body: `{"field":"phone","value":"…"}` |
//! | `POST`   | `/intake/{id}/advance` | 422 + snapshot when the step is incomplete |
//! | `POST`   | `/intake/{id}/retreat` | |
//! | `POST`   | `/intake/{id}/submit` | 202 + payload; 422 / 409 otherwise |

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use rigclaim_core::{
  intake::Field,
  schedule::ScheduledCompletion,
  store::LocalStore,
  submission::SubmissionPayload,
  wizard::{FormSnapshot, IntakeForm},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Session ─────────────────────────────────────────────────────────────────

/// One visitor's form plus its post-submit confirmation.
pub struct IntakeSession {
  pub form:     IntakeForm,
  confirmed:    Arc<AtomicBool>,
  confirmation: Option<ScheduledCompletion>,
  last_touched: Instant,
}

impl IntakeSession {
  pub fn new(form: IntakeForm) -> Self {
    Self {
      form,
      confirmed: Arc::new(AtomicBool::new(false)),
      confirmation: None,
      last_touched: Instant::now(),
    }
  }

  pub fn touch(&mut self) { self.last_touched = Instant::now(); }

  pub fn is_idle_for(&self, ttl: Duration, now: Instant) -> bool {
    now.saturating_duration_since(self.last_touched) > ttl
  }

  /// Whether the confirmation view is showing.
  pub fn is_confirmed(&self) -> bool { self.confirmed.load(Ordering::SeqCst) }

  /// Flip to the confirmation view after `delay`. The timer only holds a weak
  /// reference, so it cannot resurrect a torn-down session.
  fn confirm_after(&mut self, delay: Duration) {
    let flag = Arc::downgrade(&self.confirmed);
    self.confirmation = Some(ScheduledCompletion::schedule(delay, move || {
      if let Some(flag) = flag.upgrade() {
        flag.store(true, Ordering::SeqCst);
      }
    }));
  }

  pub fn view(&self, id: Uuid) -> SessionView {
    SessionView {
      id,
      form: self.form.snapshot(),
      confirmed: self.is_confirmed(),
    }
  }
}

/// JSON shape of a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
  pub id:        Uuid,
  #[serde(flatten)]
  pub form:      FormSnapshot,
  pub confirmed: bool,
}

fn not_found(id: Uuid) -> ApiError {
  ApiError::NotFound(format!("intake session {id} not found"))
}

/// Look up a session and mark it as in use.
fn session_mut(
  sessions: &mut HashMap<Uuid, IntakeSession>,
  id: Uuid,
) -> Result<&mut IntakeSession, ApiError> {
  let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
  session.touch();
  Ok(session)
}

/// Drop every session untouched for longer than `ttl`, finished or not.
/// Returns how many were dropped.
pub fn evict_idle(
  sessions: &mut HashMap<Uuid, IntakeSession>,
  ttl: Duration,
  now: Instant,
) -> usize {
  let before = sessions.len();
  sessions.retain(|_, session| !session.is_idle_for(ttl, now));
  before - sessions.len()
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// `POST /intake`
pub async fn create<S>(
  State(state): State<AppState<S>>,
) -> (StatusCode, Json<SessionView>)
where
  S: LocalStore + Clone + 'static,
{
  let id = Uuid::new_v4();
  let session = IntakeSession::new(IntakeForm::new(
    state.config.intake.clone(),
    state.clock.clone(),
  ));
  let view = session.view(id);
  state.sweep_sessions();
  state.lock_sessions().insert(id, session);
  debug!(%id, "intake session created");
  (StatusCode::CREATED, Json(view))
}

/// `GET /intake/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let mut sessions = state.lock_sessions();
  let session = session_mut(&mut sessions, id)?;
  Ok(Json(session.view(id)))
}

/// `DELETE /intake/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: LocalStore + Clone + 'static,
{
  state.lock_sessions().remove(&id).ok_or_else(|| not_found(id))?;
  debug!(%id, "intake session torn down");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Editing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
  pub field: String,
  #[serde(default)]
  pub value: Value,
}

/// Render a JSON value the way a form control would submit it.
fn form_text(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

/// `PATCH /intake/{id}/fields`: body `{"field":"injurySeverity","value":7}`
pub async fn update_field<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<FieldUpdate>,
) -> Result<(StatusCode, Json<SessionView>), ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let field: Field = body.field.parse().map_err(|_| {
    ApiError::BadRequest(format!("unknown field: {}", body.field))
  })?;

  let mut sessions = state.lock_sessions();
  let session = session_mut(&mut sessions, id)?;
  let text = form_text(&body.value);
  let status = step_status(session.form.update_field(field, &text))?;
  Ok((status, Json(session.view(id))))
}

/// `POST /intake/{id}/advance`
pub async fn advance<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SessionView>), ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let mut sessions = state.lock_sessions();
  let session = session_mut(&mut sessions, id)?;
  let status = step_status(session.form.advance_step())?;
  Ok((status, Json(session.view(id))))
}

/// `POST /intake/{id}/retreat`
pub async fn retreat<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let mut sessions = state.lock_sessions();
  let session = session_mut(&mut sessions, id)?;
  session.form.retreat_step()?;
  Ok(Json(session.view(id)))
}

/// Validation failures still answer with the snapshot so the form can render
/// its messages; anything else is an error response.
fn step_status<T>(
  result: rigclaim_core::Result<T>,
) -> Result<StatusCode, ApiError> {
  match result {
    Ok(_) => Ok(StatusCode::OK),
    Err(e) if e.is_validation() => Ok(StatusCode::UNPROCESSABLE_ENTITY),
    Err(e) => Err(e.into()),
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// `POST /intake/{id}/submit`
///
/// Every valid lead is forwarded to the sink, qualified or not. A sink
/// failure is logged and does not undo the submission.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmissionPayload>), ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let payload = {
    let mut sessions = state.lock_sessions();
    let session = session_mut(&mut sessions, id)?;
    let payload = session.form.submit()?;
    session.confirm_after(Duration::from_millis(
      state.config.confirmation_delay_ms,
    ));
    payload
  };

  if let Err(e) = state.sink.forward(&payload) {
    warn!(%id, error = %e, "failed to forward lead");
  }
  Ok((StatusCode::ACCEPTED, Json(payload)))
}
