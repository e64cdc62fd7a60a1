//! The intake record (everything a prospective client tells us about their
//! accident) and the vocabulary used to address its fields.
//!
//! A record starts empty when a form is created and is filled in one field at
//! a time. Values arrive as text (form inputs) and are parsed into typed
//! fields here; whether a field is *acceptable* is decided separately by
//! [`crate::validate`].

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The value the severity slider starts at.
pub const DEFAULT_SEVERITY: u8 = 5;

/// The values the severity slider can take.
pub const SEVERITY_RANGE: RangeInclusive<u8> = 1..=10;

// ─── Steps ───────────────────────────────────────────────────────────────────

/// One page of the intake wizard.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum Step {
  /// Name, phone and email.
  Contact,
  /// What happened, when and where.
  Incident,
  /// The injury and the hidden qualification signals.
  Injury,
}

impl Step {
  pub const FIRST: Step = Step::Contact;
  pub const LAST: Step = Step::Injury;
  pub const COUNT: u8 = 3;

  /// 1-based position of the step in the wizard.
  pub fn number(self) -> u8 {
    match self {
      Self::Contact => 1,
      Self::Incident => 2,
      Self::Injury => 3,
    }
  }

  pub fn next(self) -> Option<Step> {
    match self {
      Self::Contact => Some(Self::Incident),
      Self::Incident => Some(Self::Injury),
      Self::Injury => None,
    }
  }

  pub fn prev(self) -> Option<Step> {
    match self {
      Self::Contact => None,
      Self::Incident => Some(Self::Contact),
      Self::Injury => Some(Self::Incident),
    }
  }

  /// The fields captured on this step, in display order.
  pub fn fields(self) -> &'static [Field] {
    match self {
      Self::Contact => &[Field::Name, Field::Phone, Field::Email],
      Self::Incident => &[
        Field::AccidentCategory,
        Field::AccidentCategoryOther,
        Field::IncidentDate,
        Field::IncidentTime,
        Field::Location,
        Field::Description,
        Field::JobRole,
      ],
      Self::Injury => &[
        Field::InjuryDescription,
        Field::InjurySeverity,
        Field::HasEvidence,
        Field::HasDocumentedSafetyProtocols,
        Field::ReceivedSettlementOffer,
        Field::AlreadyConsultedLegalCounsel,
      ],
    }
  }
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Addressable fields of an [`IntakeRecord`].
///
/// The string form (`"incidentDate"`, `"hasEvidence"`, …) matches the JSON
/// field names of the record, so form inputs can be routed by name.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  Name,
  Phone,
  Email,
  AccidentCategory,
  AccidentCategoryOther,
  IncidentDate,
  IncidentTime,
  Location,
  Description,
  JobRole,
  InjuryDescription,
  InjurySeverity,
  HasEvidence,
  HasDocumentedSafetyProtocols,
  ReceivedSettlementOffer,
  AlreadyConsultedLegalCounsel,
}

impl Field {
  /// The wizard step on which this field is captured.
  pub fn step(self) -> Step {
    match self {
      Self::Name | Self::Phone | Self::Email => Step::Contact,
      Self::AccidentCategory
      | Self::AccidentCategoryOther
      | Self::IncidentDate
      | Self::IncidentTime
      | Self::Location
      | Self::Description
      | Self::JobRole => Step::Incident,
      Self::InjuryDescription
      | Self::InjurySeverity
      | Self::HasEvidence
      | Self::HasDocumentedSafetyProtocols
      | Self::ReceivedSettlementOffer
      | Self::AlreadyConsultedLegalCounsel => Step::Injury,
    }
  }
}

// ─── Accident categories ─────────────────────────────────────────────────────

/// The kinds of oil-field accident the firm handles.
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
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AccidentCategory {
  ExplosionsFires,
  EquipmentFailure,
  ToxicExposure,
  FallFromHeight,
  VehicleAccident,
  DrillingFracking,
  /// Anything else; the record's `accident_category_other` must say what.
  Other,
}

impl AccidentCategory {
  pub fn label(self) -> &'static str {
    match self {
      Self::ExplosionsFires => "Explosions & Fires",
      Self::EquipmentFailure => "Equipment Failures",
      Self::ToxicExposure => "Toxic Chemical Exposure",
      Self::FallFromHeight => "Falls from Heights",
      Self::VehicleAccident => "Vehicle Accidents",
      Self::DrillingFracking => "Drilling & Fracking Injuries",
      Self::Other => "Other",
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Accumulated answers for one lead.
///
/// Text fields hold exactly what was typed; trimming happens during
/// validation. The limitation-window flag is deliberately absent: it is a
/// function of `incident_date` and the current date, computed on demand by
/// [`crate::qualify::within_limitation_window`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
  // ── Contact ─────────────────────────────────────────────────────────────
  pub name:  String,
  pub phone: String,
  pub email: String,

  // ── Incident ────────────────────────────────────────────────────────────
  pub accident_category:       Option<AccidentCategory>,
  /// Free-text accident type; required when the category is `Other`.
  pub accident_category_other: String,
  pub incident_date:           Option<NaiveDate>,
  pub incident_time:           Option<NaiveTime>,
  pub location:                String,
  pub description:             String,
  pub job_role:                String,

  // ── Injury and qualification signals ────────────────────────────────────
  pub injury_description:              String,
  pub injury_severity:                 u8,
  pub has_evidence:                    bool,
  pub has_documented_safety_protocols: bool,
  pub received_settlement_offer:       bool,
  pub already_consulted_legal_counsel: bool,
}

impl Default for IntakeRecord {
  fn default() -> Self {
    Self {
      name: String::new(),
      phone: String::new(),
      email: String::new(),
      accident_category: None,
      accident_category_other: String::new(),
      incident_date: None,
      incident_time: None,
      location: String::new(),
      description: String::new(),
      job_role: String::new(),
      injury_description: String::new(),
      injury_severity: DEFAULT_SEVERITY,
      has_evidence: false,
      has_documented_safety_protocols: false,
      received_settlement_offer: false,
      already_consulted_legal_counsel: false,
    }
  }
}

impl IntakeRecord {
  /// Parse `raw` and store it in `field`.
  ///
  /// On a parse failure the field is left as it was (dates and times are
  /// cleared, since the input no longer names one) and the user-facing
  /// message is returned.
  pub fn set(&mut self, field: Field, raw: &str) -> Result<(), String> {
    match field {
      Field::Name => self.name = raw.to_owned(),
      Field::Phone => self.phone = raw.to_owned(),
      Field::Email => self.email = raw.to_owned(),
      Field::AccidentCategory => self.set_accident_category(raw),
      Field::AccidentCategoryOther => {
        self.accident_category_other = raw.to_owned()
      }
      Field::IncidentDate => {
        self.incident_date = None;
        self.incident_date = parse_date(raw)?;
      }
      Field::IncidentTime => {
        self.incident_time = None;
        self.incident_time = parse_time(raw)?;
      }
      Field::Location => self.location = raw.to_owned(),
      Field::Description => self.description = raw.to_owned(),
      Field::JobRole => self.job_role = raw.to_owned(),
      Field::InjuryDescription => self.injury_description = raw.to_owned(),
      Field::InjurySeverity => self.injury_severity = parse_severity(raw)?,
      Field::HasEvidence => self.has_evidence = parse_flag(raw)?,
      Field::HasDocumentedSafetyProtocols => {
        self.has_documented_safety_protocols = parse_flag(raw)?
      }
      Field::ReceivedSettlementOffer => {
        self.received_settlement_offer = parse_flag(raw)?
      }
      Field::AlreadyConsultedLegalCounsel => {
        self.already_consulted_legal_counsel = parse_flag(raw)?
      }
    }
    Ok(())
  }

  /// A known category slug selects that category; any other non-empty text is
  /// taken as a free-text "other" description.
  fn set_accident_category(&mut self, raw: &str) {
    let raw = raw.trim();
    if raw.is_empty() {
      self.accident_category = None;
      return;
    }
    match raw.parse::<AccidentCategory>() {
      Ok(category) => {
        if category != AccidentCategory::Other {
          self.accident_category_other.clear();
        }
        self.accident_category = Some(category);
      }
      Err(_) => {
        self.accident_category = Some(AccidentCategory::Other);
        self.accident_category_other = raw.to_owned();
      }
    }
  }
}

// ─── Parsers ─────────────────────────────────────────────────────────────────

fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map(Some)
    .map_err(|_| "Please enter a valid date".to_owned())
}

fn parse_time(raw: &str) -> Result<Option<NaiveTime>, String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  NaiveTime::parse_from_str(raw, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    .map(Some)
    .map_err(|_| "Please enter a valid time".to_owned())
}

fn parse_severity(raw: &str) -> Result<u8, String> {
  raw
    .trim()
    .parse::<u8>()
    .ok()
    .filter(|n| SEVERITY_RANGE.contains(n))
    .ok_or_else(|| "Severity must be between 1 and 10".to_owned())
}

fn parse_flag(raw: &str) -> Result<bool, String> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "yes" | "on" | "1" => Ok(true),
    "false" | "no" | "off" | "0" | "" => Ok(false),
    _ => Err("Please answer yes or no".to_owned()),
  }
}
