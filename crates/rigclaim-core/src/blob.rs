//! In-process object storage for uploaded image bytes.
//!
//! Bytes are addressed by opaque `blob:<uuid>` URLs. A URL stays valid until
//! it is revoked; [`ObjectUrl`] revokes on drop unless ownership is handed
//! over with [`ObjectUrl::persist`].

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use bytes::Bytes;
use uuid::Uuid;

const SCHEME: &str = "blob:";

/// Stored bytes plus their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
  pub bytes:      Bytes,
  pub media_type: String,
}

/// Shared registry of live object URLs.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
  inner: Arc<Mutex<HashMap<String, Blob>>>,
}

impl BlobRegistry {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Blob>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Store `bytes` and return an owning handle to them.
  pub fn create(
    &self,
    bytes: impl Into<Bytes>,
    media_type: impl Into<String>,
  ) -> ObjectUrl {
    let url = format!("{SCHEME}{}", Uuid::new_v4());
    self.lock().insert(url.clone(), Blob {
      bytes:      bytes.into(),
      media_type: media_type.into(),
    });
    ObjectUrl { url, registry: self.clone(), persisted: false }
  }

  pub fn get(&self, url: &str) -> Option<Blob> { self.lock().get(url).cloned() }

  /// Release the bytes behind `url`. Returns `false` if it was not live.
  pub fn revoke(&self, url: &str) -> bool { self.lock().remove(url).is_some() }

  /// Number of live URLs.
  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }
}

/// Build the URL for a bare blob id (the part after `blob:`).
pub fn url_for_id(id: &str) -> String { format!("{SCHEME}{id}") }

// ─── Owning handle ───────────────────────────────────────────────────────────

/// An owning handle to a live object URL; revokes it when dropped.
#[derive(Debug)]
pub struct ObjectUrl {
  url:       String,
  registry:  BlobRegistry,
  persisted: bool,
}

impl ObjectUrl {
  pub fn as_str(&self) -> &str { &self.url }

  /// Give up ownership without revoking: the URL now lives until someone
  /// calls [`BlobRegistry::revoke`] on it.
  pub fn persist(mut self) -> String {
    self.persisted = true;
    std::mem::take(&mut self.url)
  }
}

impl Drop for ObjectUrl {
  fn drop(&mut self) {
    if !self.persisted {
      self.registry.revoke(&self.url);
    }
  }
}

// ─── Upload draft ────────────────────────────────────────────────────────────

/// A file that has been chosen but not yet uploaded.
#[derive(Debug)]
pub struct SelectedFile {
  pub file_name: String,
  pub url:       ObjectUrl,
}

/// The single pending file selection of an upload form.
///
/// Selecting a file replaces (and releases) the previous selection.
#[derive(Debug, Default)]
pub struct UploadDraft {
  selected: Option<SelectedFile>,
}

impl UploadDraft {
  pub fn new() -> Self { Self::default() }

  /// Select a new file; returns its preview URL.
  pub fn select(
    &mut self,
    registry: &BlobRegistry,
    file_name: impl Into<String>,
    bytes: impl Into<Bytes>,
    media_type: impl Into<String>,
  ) -> &str {
    let url = registry.create(bytes, media_type);
    let selected = self.selected.insert(SelectedFile {
      file_name: file_name.into(),
      url,
    });
    selected.url.as_str()
  }

  pub fn preview_url(&self) -> Option<&str> {
    self.selected.as_ref().map(|s| s.url.as_str())
  }

  pub fn file_name(&self) -> Option<&str> {
    self.selected.as_ref().map(|s| s.file_name.as_str())
  }

  /// Hand the selection over, leaving the draft empty.
  pub fn take(&mut self) -> Option<SelectedFile> { self.selected.take() }

  /// Discard the selection, releasing its bytes.
  pub fn clear(&mut self) { self.selected = None; }
}
