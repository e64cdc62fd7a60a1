//! Handlers for `/evidence` and `/blobs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/evidence` | ETag; `If-None-Match` → 304 |
//! | `GET`    | `/evidence/categories` | |
//! | `PUT`    | `/evidence/draft` | Body: `{"fileName","mediaType","data"}`, data base64 |
//! | `DELETE` | `/evidence/draft` | |
//! | `POST`   | `/evidence` | uploads the draft; 400 without one |
//! | `DELETE` | `/evidence/{id}` | 204 even for unknown ids |
//! | `GET`    | `/blobs/{id}` | raw bytes |

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;
use rigclaim_core::{
  blob::url_for_id,
  evidence::{
    EvidenceCategory, EvidenceMetadata, EvidenceRecord, category_options,
  },
  store::LocalStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  etag::{compute_etag, matches_if_none_match},
};

/// Path under which the bytes behind a `blob:` URL are served.
pub fn blob_href(url: &str) -> String {
  format!("/blobs/{}", url.trim_start_matches("blob:"))
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
  pub records:         Vec<EvidenceRecord>,
  pub storage_warning: Option<String>,
}

/// `GET /evidence`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Response
where
  S: LocalStore + Clone + 'static,
{
  let catalog = state.catalog.lock().await;
  let records = catalog.list_all();
  let etag = compute_etag(records);

  if matches_if_none_match(&headers, &etag) {
    return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
  }

  let listing = Listing {
    records:         records.to_vec(),
    storage_warning: catalog.storage_warning().map(str::to_owned),
  };
  ([(header::ETAG, etag)], Json(listing)).into_response()
}

#[derive(Debug, Serialize)]
pub struct CategoryOption {
  pub id:    &'static str,
  pub label: &'static str,
}

/// `GET /evidence/categories`
pub async fn categories() -> Json<Vec<CategoryOption>> {
  Json(
    category_options()
      .into_iter()
      .map(|(id, label)| CategoryOption { id, label })
      .collect(),
  )
}

// ─── Draft ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftBody {
  pub file_name:  String,
  pub media_type: String,
  /// Base64 (standard alphabet) file contents.
  pub data:       String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
  pub file_name:   String,
  pub preview_url: String,
  pub href:        String,
}

/// `PUT /evidence/draft`: select a file, replacing any earlier selection.
pub async fn select_draft<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<DraftBody>,
) -> Result<Json<DraftView>, ApiError>
where
  S: LocalStore + Clone + 'static,
{
  if !body.media_type.starts_with("image/") {
    return Err(ApiError::BadRequest(format!(
      "unsupported media type: {}",
      body.media_type
    )));
  }
  let bytes = B64
    .decode(body.data.as_bytes())
    .map_err(|e| ApiError::BadRequest(format!("invalid base64: {e}")))?;
  let limit = state.config.max_upload_bytes;
  if bytes.len() > limit {
    return Err(ApiError::PayloadTooLarge(limit));
  }

  let mut draft = state.draft.lock().await;
  let preview_url = draft
    .select(
      &state.blobs,
      body.file_name.clone(),
      Bytes::from(bytes),
      body.media_type,
    )
    .to_owned();
  Ok(Json(DraftView {
    file_name: body.file_name,
    href: blob_href(&preview_url),
    preview_url,
  }))
}

/// `DELETE /evidence/draft`
pub async fn clear_draft<S>(State(state): State<AppState<S>>) -> StatusCode
where
  S: LocalStore + Clone + 'static,
{
  state.draft.lock().await.clear();
  StatusCode::NO_CONTENT
}

// ─── Upload / remove ─────────────────────────────────────────────────────────

/// Form fields sent with an upload. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadBody {
  pub category: Option<String>,
  pub location: String,
  pub notes:    String,
  pub weather:  String,
  /// Comma-separated.
  pub tags:     String,
}

/// `POST /evidence`: record the drafted file.
pub async fn upload<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<UploadBody>,
) -> Result<(StatusCode, Json<EvidenceRecord>), ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let selected = state.draft.lock().await.take();
  let (file, file_name) = match selected {
    Some(s) => (Some(s.url), s.file_name),
    None => (None, String::new()),
  };
  let category = body
    .category
    .as_deref()
    .map(EvidenceCategory::parse)
    .unwrap_or_default();
  let metadata = EvidenceMetadata::from_form(
    &body.location,
    &body.notes,
    &body.weather,
    &body.tags,
  );

  let record = state
    .catalog
    .lock()
    .await
    .add(file, category, file_name, Some(metadata))
    .await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `DELETE /evidence/{id}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> StatusCode
where
  S: LocalStore + Clone + 'static,
{
  state.catalog.lock().await.remove(&id).await;
  StatusCode::NO_CONTENT
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

/// `GET /blobs/{id}`
pub async fn blob<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: LocalStore + Clone + 'static,
{
  let blob = state
    .blobs
    .get(&url_for_id(&id))
    .ok_or_else(|| ApiError::NotFound(format!("blob {id} not found")))?;
  Ok(([(header::CONTENT_TYPE, blob.media_type)], blob.bytes).into_response())
}
