//! The evidence catalog: an ordered list of [`EvidenceRecord`]s mirrored into
//! a [`LocalStore`] under a single key.
//!
//! Every mutation rewrites the whole list. The collection is expected to stay
//! in the dozens, so there is no incremental update.
//!
//! Storage failures never surface as errors. The first failed read or write
//! switches the catalog to memory-only mode and records a warning the UI can
//! show; from then on the store is left alone.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
  Error,
  Result,
  blob::{BlobRegistry, ObjectUrl},
  clock::Clock,
  evidence::{EvidenceCategory, EvidenceMetadata, EvidenceRecord},
  store::LocalStore,
};

/// The key the serialized record list is stored under.
pub const STORAGE_KEY: &str = "oilFieldPhotos";

pub struct EvidenceCatalog<S: LocalStore> {
  store:   S,
  blobs:   BlobRegistry,
  clock:   Arc<dyn Clock>,
  records: Vec<EvidenceRecord>,
  /// Highest numeric id issued or loaded.
  last_id: u64,
  warning: Option<String>,
}

impl<S: LocalStore> EvidenceCatalog<S> {
  /// Load the catalog from `store`. An absent key is an empty catalog; an
  /// unreadable one is an empty, memory-only catalog.
  pub async fn open(
    store: S,
    blobs: BlobRegistry,
    clock: Arc<dyn Clock>,
  ) -> Self {
    let mut catalog = Self {
      store,
      blobs,
      clock,
      records: Vec::new(),
      last_id: 0,
      warning: None,
    };

    match catalog.load().await {
      Ok(records) => catalog.records = records,
      Err(e) => catalog.degrade(&e),
    }
    catalog.last_id = catalog
      .records
      .iter()
      .filter_map(|r| r.id.parse::<u64>().ok())
      .max()
      .unwrap_or(0);

    catalog
  }

  async fn load(&self) -> Result<Vec<EvidenceRecord>> {
    let raw = self
      .store
      .get(STORAGE_KEY)
      .await
      .map_err(|e| Error::StorageUnavailable(e.to_string()))?;
    match raw {
      Some(json) => Ok(serde_json::from_str(&json)?),
      None => Ok(Vec::new()),
    }
  }

  /// All records in upload order.
  pub fn list_all(&self) -> &[EvidenceRecord] { &self.records }

  pub fn get(&self, id: &str) -> Option<&EvidenceRecord> {
    self.records.iter().find(|r| r.id == id)
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Set once the catalog has fallen back to memory-only mode.
  pub fn storage_warning(&self) -> Option<&str> { self.warning.as_deref() }

  pub fn blobs(&self) -> &BlobRegistry { &self.blobs }

  /// Record a new upload. The catalog takes ownership of the file's object
  /// URL; it is released again by [`remove`](Self::remove).
  ///
  /// Fails only when no file was supplied.
  pub async fn add(
    &mut self,
    file: Option<ObjectUrl>,
    category: EvidenceCategory,
    file_name: impl Into<String>,
    metadata: Option<EvidenceMetadata>,
  ) -> Result<EvidenceRecord> {
    let Some(file) = file else {
      return Err(Error::MissingFile);
    };

    let now = self.clock.now();
    let id = self.next_id(now.timestamp_millis());
    let record = EvidenceRecord {
      id: id.to_string(),
      file_name: file_name.into(),
      binary_ref: file.persist(),
      category,
      upload_timestamp: now,
      metadata: metadata.map(|m| EvidenceMetadata {
        timestamp: m.timestamp.or(Some(now)),
        ..m
      }),
    };

    self.records.push(record.clone());
    self.persist().await;
    Ok(record)
  }

  /// Remove a record and release its bytes. Unknown ids are a no-op.
  pub async fn remove(&mut self, id: &str) -> Option<EvidenceRecord> {
    let Some(index) = self.records.iter().position(|r| r.id == id) else {
      debug!(id, "remove: no such evidence record");
      return None;
    };

    let record = self.records.remove(index);
    self.persist().await;
    self.blobs.revoke(&record.binary_ref);
    Some(record)
  }

  /// Time-derived, strictly increasing ids: never behind the clock, never
  /// repeated even when two uploads land in the same millisecond.
  ///
  /// A stored id at `u64::MAX` ends the sequence; after that the first free
  /// id from the clock onwards is used.
  fn next_id(&mut self, now_ms: i64) -> u64 {
    let now_ms = u64::try_from(now_ms).unwrap_or(0);
    match self.last_id.checked_add(1) {
      Some(next) => {
        self.last_id = now_ms.max(next);
        self.last_id
      }
      None => (now_ms..u64::MAX)
        .find(|candidate| {
          let candidate = candidate.to_string();
          !self.records.iter().any(|r| r.id == candidate)
        })
        .unwrap_or(now_ms),
    }
  }

  async fn persist(&mut self) {
    if self.warning.is_some() {
      return;
    }
    if let Err(e) = self.write().await {
      self.degrade(&e);
    }
  }

  async fn write(&self) -> Result<()> {
    let json = serde_json::to_string(&self.records)?;
    self
      .store
      .set(STORAGE_KEY, json)
      .await
      .map_err(|e| Error::StorageUnavailable(e.to_string()))
  }

  fn degrade(&mut self, error: &Error) {
    warn!(%error, "evidence storage unavailable; keeping photos in memory only");
    self.warning = Some(format!(
      "Photos can't be saved on this device right now ({error}). They will \
       be kept until you leave this page."
    ));
  }
}
