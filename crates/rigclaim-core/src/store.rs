//! The `LocalStore` trait, a client-local string key-value store, and an
//! in-memory implementation.
//!
//! The trait is implemented by storage backends (e.g.
//! `rigclaim-store-sqlite`). The evidence catalog depends on this abstraction,
//! not on any concrete backend, and owns the encoding of what it stores.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

/// Abstraction over a client-local key-value store.
///
/// Values are opaque strings. `set` replaces the whole value; there is no
/// partial update.
pub trait LocalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. A missing key is `Ok(None)`, not an error.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Overwrite the value under `key`.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A [`LocalStore`] that lives as long as the process.
///
/// Cloning is cheap; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl LocalStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_key_is_none() {
    let store = MemoryStore::new();
    assert_eq!(store.get("oilFieldPhotos").await.unwrap(), None);
  }

  #[tokio::test]
  async fn set_overwrites() {
    let store = MemoryStore::new();
    store.set("k", "[1]".into()).await.unwrap();
    store.set("k", "[2]".into()).await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[2]"));

    let clone = store.clone();
    assert_eq!(clone.get("k").await.unwrap().as_deref(), Some("[2]"));
  }
}
