//! Evidence records: photos a client documents their accident with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

// ─── Categories ──────────────────────────────────────────────────────────────

/// The photo categories offered by the upload form.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KnownCategory {
  AccidentScene,
  EquipmentFailure,
  OilRig,
  Pipeline,
  BurnInjury,
  SafetyViolation,
  Worksite,
  DrillingOperation,
  ProtectiveEquipment,
  WarningSigns,
  Environmental,
  RegulatoryEvidence,
}

impl KnownCategory {
  pub fn label(self) -> &'static str {
    match self {
      Self::AccidentScene => "Accident Scene Overview",
      Self::EquipmentFailure => "Equipment Failure",
      Self::OilRig => "Oil Rig Damage",
      Self::Pipeline => "Pipeline Issues",
      Self::BurnInjury => "Burn/Injury Evidence",
      Self::SafetyViolation => "Safety Violations",
      Self::Worksite => "Worksite Conditions",
      Self::DrillingOperation => "Drilling Operations",
      Self::ProtectiveEquipment => "PPE Usage/Failures",
      Self::WarningSigns => "Warning Signs",
      Self::Environmental => "Environmental Conditions",
      Self::RegulatoryEvidence => "Regulatory Compliance Evidence",
    }
  }
}

/// The category of an evidence record.
///
/// Records written by other versions of the site may carry categories this
/// build does not know; those are kept verbatim and labelled with their raw
/// value rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceCategory {
  Known(KnownCategory),
  Unrecognized(String),
}

impl EvidenceCategory {
  pub fn parse(raw: &str) -> Self {
    raw
      .parse::<KnownCategory>()
      .map(Self::Known)
      .unwrap_or_else(|_| Self::Unrecognized(raw.to_owned()))
  }

  /// Slug as stored.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Known(k) => <&'static str>::from(*k),
      Self::Unrecognized(raw) => raw,
    }
  }

  /// Display label; falls back to the raw value.
  pub fn label(&self) -> &str {
    match self {
      Self::Known(k) => k.label(),
      Self::Unrecognized(raw) => raw,
    }
  }

  pub fn is_known(&self) -> bool { matches!(self, Self::Known(_)) }
}

impl Default for EvidenceCategory {
  fn default() -> Self { Self::Known(KnownCategory::AccidentScene) }
}

impl From<KnownCategory> for EvidenceCategory {
  fn from(k: KnownCategory) -> Self { Self::Known(k) }
}

/// `(slug, label)` for every category the upload form offers.
pub fn category_options() -> Vec<(&'static str, &'static str)> {
  KnownCategory::iter().map(|k| (k.into(), k.label())).collect()
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_NOTES: &str = "No notes provided";

/// Optional context a client attaches to a photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceMetadata {
  pub location:  Option<String>,
  pub notes:     Option<String>,
  pub weather:   Option<String>,
  #[serde(default)]
  pub tags:      Vec<String>,
  pub timestamp: Option<DateTime<Utc>>,
}

impl EvidenceMetadata {
  /// Build from raw form inputs: blanks become `None`, and `tags` is a
  /// comma-separated list.
  pub fn from_form(
    location: &str,
    notes: &str,
    weather: &str,
    tags: &str,
  ) -> Self {
    Self {
      location:  non_blank(location),
      notes:     non_blank(notes),
      weather:   non_blank(weather),
      tags:      parse_tags(tags),
      timestamp: None,
    }
  }

  pub fn location_label(&self) -> &str {
    self.location.as_deref().unwrap_or(NOT_SPECIFIED)
  }

  pub fn weather_label(&self) -> &str {
    self.weather.as_deref().unwrap_or(NOT_SPECIFIED)
  }

  pub fn notes_label(&self) -> &str { self.notes.as_deref().unwrap_or(NO_NOTES) }
}

fn non_blank(s: &str) -> Option<String> {
  let s = s.trim();
  (!s.is_empty()).then(|| s.to_owned())
}

/// Split a comma-separated tag list, trimming and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// One uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
  /// Unique within a catalog; assigned at upload.
  pub id:               String,
  pub file_name:        String,
  /// Object URL of the image bytes.
  pub binary_ref:       String,
  pub category:         EvidenceCategory,
  pub upload_timestamp: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata:         Option<EvidenceMetadata>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_categories_parse_from_slug() {
    assert_eq!(
      EvidenceCategory::parse("burn-injury"),
      EvidenceCategory::Known(KnownCategory::BurnInjury)
    );
    assert_eq!(
      EvidenceCategory::parse("burn-injury").label(),
      "Burn/Injury Evidence"
    );
  }

  #[test]
  fn unknown_category_is_kept_verbatim() {
    let c = EvidenceCategory::parse("H2S Monitor");
    assert!(!c.is_known());
    assert_eq!(c.as_str(), "H2S Monitor");
    assert_eq!(c.label(), "H2S Monitor");
  }

  #[test]
  fn category_serialises_as_bare_string() {
    let known = EvidenceCategory::Known(KnownCategory::OilRig);
    assert_eq!(serde_json::to_value(&known).unwrap(), "oil-rig");

    let raw: EvidenceCategory = serde_json::from_str("\"crane\"").unwrap();
    assert_eq!(raw, EvidenceCategory::Unrecognized("crane".into()));
    let back: EvidenceCategory = serde_json::from_str("\"pipeline\"").unwrap();
    assert_eq!(back, KnownCategory::Pipeline.into());
  }

  #[test]
  fn options_cover_every_category_in_form_order() {
    let options = category_options();
    assert_eq!(options.len(), 12);
    assert_eq!(options[0], ("accident-scene", "Accident Scene Overview"));
    assert_eq!(options[11], (
      "regulatory-evidence",
      "Regulatory Compliance Evidence"
    ));
  }

  #[test]
  fn metadata_from_form_inputs() {
    let meta = EvidenceMetadata::from_form(
      " Midland, TX ",
      "",
      "Dusty",
      "safety violation, missing guard,, osha ",
    );
    assert_eq!(meta.location.as_deref(), Some("Midland, TX"));
    assert_eq!(meta.notes_label(), NO_NOTES);
    assert_eq!(meta.weather_label(), "Dusty");
    assert_eq!(meta.tags, vec!["safety violation", "missing guard", "osha"]);
  }

  #[test]
  fn record_json_field_names() {
    let record = EvidenceRecord {
      id:               "1760886000000".into(),
      file_name:        "derrick.jpg".into(),
      binary_ref:       "blob:abc".into(),
      category:         KnownCategory::Worksite.into(),
      upload_timestamp: "2026-10-19T15:00:00Z".parse().unwrap(),
      metadata:         None,
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["fileName"], "derrick.jpg");
    assert_eq!(json["binaryRef"], "blob:abc");
    assert_eq!(json["category"], "worksite");
    assert_eq!(json["uploadTimestamp"], "2026-10-19T15:00:00Z");
    assert!(json.get("metadata").is_none());
  }
}
