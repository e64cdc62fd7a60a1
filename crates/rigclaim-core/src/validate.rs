//! Per-field validation rules for the intake form.
//!
//! Failures are data, not control flow: they are collected into a
//! [`ValidationErrors`] map keyed by field and surfaced to the user as
//! messages next to the offending input.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  config::IntakeConfig,
  intake::{AccidentCategory, Field, IntakeRecord, SEVERITY_RANGE, Step},
};

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\+\d{1,2}\s)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$")
    .expect("phone pattern compiles")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$")
    .expect("email pattern compiles")
});

// ─── Error set ───────────────────────────────────────────────────────────────

/// Field → message map of everything currently wrong with a record.
#[derive(
  Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error,
)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn single(field: Field, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.insert(field, message);
    errors
  }

  pub fn insert(&mut self, field: Field, message: impl Into<String>) {
    self.0.insert(field, message.into());
  }

  pub fn remove(&mut self, field: Field) -> Option<String> {
    self.0.remove(&field)
  }

  pub fn get(&self, field: Field) -> Option<&str> {
    self.0.get(&field).map(String::as_str)
  }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }

  /// Drop every error that belongs to `step`.
  pub fn clear_step(&mut self, step: Step) {
    self.0.retain(|field, _| field.step() != step);
  }

  /// Overwrite entries with those from `other`.
  pub fn extend(&mut self, other: ValidationErrors) { self.0.extend(other.0); }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn blank(s: &str) -> bool { s.trim().is_empty() }

/// Check a single field. Returns the user-facing message on failure.
///
/// `today` bounds the incident date (an accident cannot happen tomorrow).
pub fn check_field(
  record: &IntakeRecord,
  field: Field,
  today: NaiveDate,
  config: &IntakeConfig,
) -> Option<&'static str> {
  match field {
    Field::Name if blank(&record.name) => Some("Name is required"),
    Field::Phone if blank(&record.phone) => Some("Phone number is required"),
    Field::Phone if !PHONE.is_match(record.phone.trim()) => {
      Some("Please enter a valid phone number")
    }
    Field::Email if blank(&record.email) => Some("Email is required"),
    Field::Email if !EMAIL.is_match(record.email.trim()) => {
      Some("Please enter a valid email address")
    }
    Field::AccidentCategory if record.accident_category.is_none() => {
      Some("Accident type is required")
    }
    Field::AccidentCategoryOther
      if record.accident_category == Some(AccidentCategory::Other)
        && blank(&record.accident_category_other) =>
    {
      Some("Please describe the type of accident")
    }
    Field::IncidentDate => match record.incident_date {
      None => Some("Date of injury is required"),
      Some(date) if date > today => {
        Some("Date of injury cannot be in the future")
      }
      Some(_) => None,
    },
    Field::IncidentTime
      if config.require_incident_time && record.incident_time.is_none() =>
    {
      Some("Time of injury is required")
    }
    Field::Location if blank(&record.location) => Some("Location is required"),
    Field::Description if blank(&record.description) => {
      Some("Description is required")
    }
    Field::JobRole if blank(&record.job_role) => Some("Job role is required"),
    Field::InjuryDescription if blank(&record.injury_description) => {
      Some("Injury description is required")
    }
    Field::InjurySeverity
      if !SEVERITY_RANGE.contains(&record.injury_severity) =>
    {
      Some("Severity must be between 1 and 10")
    }
    _ => None,
  }
}

/// Validate every field captured on `step`.
pub fn validate_step(
  record: &IntakeRecord,
  step: Step,
  today: NaiveDate,
  config: &IntakeConfig,
) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  for &field in step.fields() {
    if let Some(message) = check_field(record, field, today, config) {
      errors.insert(field, message);
    }
  }
  errors
}

/// Validate the whole record, step by step.
pub fn validate_all(
  record: &IntakeRecord,
  today: NaiveDate,
  config: &IntakeConfig,
) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  let mut step = Some(Step::FIRST);
  while let Some(s) = step {
    errors.extend(validate_step(record, s, today, config));
    step = s.next();
  }
  errors
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() }

  fn contact(name: &str, phone: &str, email: &str) -> IntakeRecord {
    IntakeRecord {
      name: name.into(),
      phone: phone.into(),
      email: email.into(),
      ..IntakeRecord::default()
    }
  }

  #[test]
  fn empty_contact_step_reports_every_field() {
    let errors = validate_step(
      &IntakeRecord::default(),
      Step::Contact,
      today(),
      &IntakeConfig::default(),
    );
    assert_eq!(errors.get(Field::Name), Some("Name is required"));
    assert_eq!(errors.get(Field::Phone), Some("Phone number is required"));
    assert_eq!(errors.get(Field::Email), Some("Email is required"));
  }

  #[test]
  fn phone_shapes() {
    let config = IntakeConfig::default();
    for ok in ["(432) 555-0199", "432-555-0199", "+1 432.555.0199", "4325550199"]
    {
      let record = contact("Dale", ok, "dale@example.com");
      assert!(
        check_field(&record, Field::Phone, today(), &config).is_none(),
        "{ok}"
      );
    }
    for bad in ["555-0199", "call me", "+123 432 555 0199"] {
      let record = contact("Dale", bad, "dale@example.com");
      assert_eq!(
        check_field(&record, Field::Phone, today(), &config),
        Some("Please enter a valid phone number"),
        "{bad}"
      );
    }
  }

  #[test]
  fn email_shapes() {
    let config = IntakeConfig::default();
    let record = contact("Dale", "4325550199", "Dale.Roper@Permian-Crew.COM");
    assert!(check_field(&record, Field::Email, today(), &config).is_none());

    let record = contact("Dale", "4325550199", "dale@localhost");
    assert_eq!(
      check_field(&record, Field::Email, today(), &config),
      Some("Please enter a valid email address")
    );
  }

  #[test]
  fn whitespace_only_is_blank() {
    let record = contact("   ", "4325550199", "dale@example.com");
    let errors =
      validate_step(&record, Step::Contact, today(), &IntakeConfig::default());
    assert_eq!(errors.len(), 1);
    assert!(errors.contains(Field::Name));
  }

  #[test]
  fn other_category_requires_description() {
    let config = IntakeConfig::default();
    let mut record = IntakeRecord {
      accident_category: Some(AccidentCategory::Other),
      ..IntakeRecord::default()
    };
    assert_eq!(
      check_field(&record, Field::AccidentCategoryOther, today(), &config),
      Some("Please describe the type of accident")
    );

    record.accident_category_other = "Crane collapse".into();
    assert!(
      check_field(&record, Field::AccidentCategoryOther, today(), &config)
        .is_none()
    );

    record.accident_category = Some(AccidentCategory::VehicleAccident);
    record.accident_category_other.clear();
    assert!(
      check_field(&record, Field::AccidentCategoryOther, today(), &config)
        .is_none()
    );
  }

  #[test]
  fn incident_time_required_only_when_configured() {
    let record = IntakeRecord::default();
    let lenient = IntakeConfig::default();
    let strict = IntakeConfig { require_incident_time: true, ..lenient.clone() };

    assert!(check_field(&record, Field::IncidentTime, today(), &lenient).is_none());
    assert_eq!(
      check_field(&record, Field::IncidentTime, today(), &strict),
      Some("Time of injury is required")
    );
  }

  #[test]
  fn future_incident_date_is_rejected() {
    let config = IntakeConfig::default();
    let mut record = IntakeRecord {
      incident_date: today().succ_opt(),
      ..IntakeRecord::default()
    };
    assert_eq!(
      check_field(&record, Field::IncidentDate, today(), &config),
      Some("Date of injury cannot be in the future")
    );
    record.incident_date = Some(today());
    assert!(check_field(&record, Field::IncidentDate, today(), &config).is_none());
  }

  #[test]
  fn validate_all_spans_steps() {
    let errors =
      validate_all(&IntakeRecord::default(), today(), &IntakeConfig::default());
    assert!(errors.contains(Field::Name));
    assert!(errors.contains(Field::IncidentDate));
    assert!(errors.contains(Field::InjuryDescription));
    assert!(!errors.contains(Field::HasEvidence));
  }

  #[test]
  fn serialises_as_field_keyed_object() {
    let errors = ValidationErrors::single(Field::JobRole, "Job role is required");
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json, serde_json::json!({ "jobRole": "Job role is required" }));
    assert_eq!(errors.to_string(), "1 field(s) failed validation");
  }
}
