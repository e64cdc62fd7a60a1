//! ETag computation for the evidence listing.
//!
//! ETags are SHA-256 hashes over the ordered (id, upload_timestamp) pairs of
//! the listed records. Order is significant: the listing is presented in
//! insertion order.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use rigclaim_core::evidence::EvidenceRecord;
use sha2::{Digest, Sha256};

/// Compute an ETag for a listing.
pub fn compute_etag(records: &[EvidenceRecord]) -> String {
  compute_etag_from_pairs(
    records.iter().map(|r| (r.id.as_str(), r.upload_timestamp)),
  )
}

/// Compute an ETag directly from (id, upload_timestamp) pairs.
pub fn compute_etag_from_pairs<'a>(
  pairs: impl IntoIterator<Item = (&'a str, DateTime<Utc>)>,
) -> String {
  let mut hasher = Sha256::new();
  for (id, ts) in pairs {
    hasher.update((id.len() as u64).to_le_bytes());
    hasher.update(id.as_bytes());
    hasher.update(ts.timestamp_micros().to_le_bytes());
  }
  let hash = hasher.finalize();
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-None-Match` header matches `etag`.
pub fn matches_if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let Some(value) = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
  else {
    return false;
  };
  value.split(',').map(str::trim).any(|candidate| {
    candidate == "*"
      || strip_etag_quotes(candidate.trim_start_matches("W/"))
        == strip_etag_quotes(etag)
  })
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_matches('"') }

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use chrono::TimeZone;

  use super::*;

  fn ts(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

  #[test]
  fn same_listing_same_etag() {
    let a = compute_etag_from_pairs([("1", ts(10)), ("2", ts(20))]);
    let b = compute_etag_from_pairs([("1", ts(10)), ("2", ts(20))]);
    assert_eq!(a, b);
    assert!(a.starts_with('"') && a.ends_with('"'));
  }

  #[test]
  fn order_and_membership_matter() {
    let base = compute_etag_from_pairs([("1", ts(10)), ("2", ts(20))]);
    let swapped = compute_etag_from_pairs([("2", ts(20)), ("1", ts(10))]);
    let shorter = compute_etag_from_pairs([("1", ts(10))]);
    assert_ne!(base, swapped);
    assert_ne!(base, shorter);
  }

  #[test]
  fn empty_listing_has_an_etag() {
    assert_eq!(compute_etag(&[]), compute_etag_from_pairs([]));
  }

  #[test]
  fn if_none_match_forms() {
    let etag = compute_etag_from_pairs([("1", ts(10))]);
    let mut headers = HeaderMap::new();
    assert!(!matches_if_none_match(&headers, &etag));

    headers.insert(
      header::IF_NONE_MATCH,
      HeaderValue::from_str(&format!("\"stale\", W/{etag}")).unwrap(),
    );
    assert!(matches_if_none_match(&headers, &etag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(matches_if_none_match(&headers, &etag));
  }
}
