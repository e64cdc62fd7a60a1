//! The intake form controller: a three-step wizard over an [`IntakeRecord`].
//!
//! Navigation is an explicit state machine. [`FormState::on`] is the pure
//! transition function; [`IntakeForm`] applies the guards (step validation)
//! before asking it to move.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  Result,
  clock::Clock,
  config::IntakeConfig,
  intake::{Field, IntakeRecord, Step},
  qualify::{Signals, qualify, within_limitation_window},
  submission::SubmissionPayload,
  validate::{ValidationErrors, validate_all, validate_step},
};

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "step", rename_all = "snake_case")]
pub enum FormState {
  Editing(Step),
  /// Terminal. A new lead needs a new form.
  Submitted,
}

/// Navigation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Advance,
  Retreat,
  Submit,
}

impl FormState {
  pub const INITIAL: FormState = FormState::Editing(Step::FIRST);

  /// Where `transition` leads from `self`. Moves past either end of the
  /// wizard are clamped; `Submit` only leaves the last step.
  pub fn on(self, transition: Transition) -> FormState {
    match (self, transition) {
      (Self::Editing(step), Transition::Advance) => {
        Self::Editing(step.next().unwrap_or(step))
      }
      (Self::Editing(step), Transition::Retreat) => {
        Self::Editing(step.prev().unwrap_or(step))
      }
      (Self::Editing(Step::LAST), Transition::Submit) => Self::Submitted,
      (state, _) => state,
    }
  }

  pub fn step(self) -> Option<Step> {
    match self {
      Self::Editing(step) => Some(step),
      Self::Submitted => None,
    }
  }

  pub fn is_submitted(self) -> bool { matches!(self, Self::Submitted) }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Read-only view of a form for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
  #[serde(flatten)]
  pub state:                       FormState,
  pub total_steps:                 u8,
  pub record:                      IntakeRecord,
  pub errors:                      ValidationErrors,
  pub is_within_limitation_window: bool,
}

// ─── Controller ──────────────────────────────────────────────────────────────

pub struct IntakeForm {
  state:   FormState,
  record:  IntakeRecord,
  errors:  ValidationErrors,
  config:  IntakeConfig,
  clock:   Arc<dyn Clock>,
  payload: Option<SubmissionPayload>,
}

impl IntakeForm {
  /// A fresh, empty form on the first step.
  pub fn new(config: IntakeConfig, clock: Arc<dyn Clock>) -> Self {
    Self {
      state: FormState::INITIAL,
      record: IntakeRecord::default(),
      errors: ValidationErrors::new(),
      config,
      clock,
      payload: None,
    }
  }

  pub fn state(&self) -> FormState { self.state }

  pub fn current_step(&self) -> Option<Step> { self.state.step() }

  pub fn record(&self) -> &IntakeRecord { &self.record }

  pub fn errors(&self) -> &ValidationErrors { &self.errors }

  /// The payload produced by [`submit`](Self::submit), once submitted.
  pub fn payload(&self) -> Option<&SubmissionPayload> { self.payload.as_ref() }

  /// Recomputed from `incident_date` on every call, so it can never drift
  /// from its source.
  pub fn is_within_limitation_window(&self) -> bool {
    self.record.incident_date.is_some_and(|date| {
      within_limitation_window(
        date,
        self.clock.today(),
        self.config.limitation_years,
      )
    })
  }

  pub fn snapshot(&self) -> FormSnapshot {
    FormSnapshot {
      state:                       self.state,
      total_steps:                 Step::COUNT,
      record:                      self.record.clone(),
      errors:                      self.errors.clone(),
      is_within_limitation_window: self.is_within_limitation_window(),
    }
  }

  /// Set `field` from its textual form.
  ///
  /// A successful update clears any message previously shown for the field;
  /// a parse failure records one and is returned as
  /// [`Error::Validation`].
  pub fn update_field(&mut self, field: Field, value: &str) -> Result<()> {
    if self.state.is_submitted() {
      return Err(Error::AlreadySubmitted);
    }
    match self.record.set(field, value) {
      Ok(()) => {
        self.errors.remove(field);
        Ok(())
      }
      Err(message) => {
        self.errors.insert(field, message.clone());
        Err(ValidationErrors::single(field, message).into())
      }
    }
  }

  /// Move forward if every field on the current step validates. On failure
  /// the step is unchanged and the step's errors are both recorded and
  /// returned. Advancing from the last step stays there.
  pub fn advance_step(&mut self) -> Result<Step> {
    let step = self.editing_step()?;
    let errors =
      validate_step(&self.record, step, self.clock.today(), &self.config);

    self.errors.clear_step(step);
    if !errors.is_empty() {
      self.errors.extend(errors.clone());
      return Err(errors.into());
    }

    self.state = self.state.on(Transition::Advance);
    Ok(self.state.step().unwrap_or(step))
  }

  /// Move back one step. Entered data is kept; the first step is a floor.
  pub fn retreat_step(&mut self) -> Result<Step> {
    let step = self.editing_step()?;
    self.state = self.state.on(Transition::Retreat);
    Ok(self.state.step().unwrap_or(step))
  }

  /// Validate everything, qualify the lead, and close the form.
  ///
  /// The payload is produced for every valid record; an unqualified verdict
  /// only marks it for manual review.
  pub fn submit(&mut self) -> Result<SubmissionPayload> {
    let step = self.editing_step()?;
    if step != Step::LAST {
      return Err(Error::NotFinalStep(step.number()));
    }

    let today = self.clock.today();
    let errors = validate_all(&self.record, today, &self.config);
    if !errors.is_empty() {
      self.errors = errors.clone();
      return Err(errors.into());
    }

    let signals = Signals::from_record(&self.record, today, &self.config);
    let verdict = qualify(&signals, self.config.min_severity);
    let payload = SubmissionPayload::new(
      self.record.clone(),
      signals.within_limitation_window,
      verdict,
      self.clock.now(),
    );

    self.errors = ValidationErrors::new();
    self.state = self.state.on(Transition::Submit);
    self.payload = Some(payload.clone());
    Ok(payload)
  }

  fn editing_step(&self) -> Result<Step> {
    self.state.step().ok_or(Error::AlreadySubmitted)
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Days, NaiveDate};

  use super::*;
  use crate::{
    clock::FixedClock,
    qualify::{Priority, QualificationIssue, limitation_cutoff},
  };

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() }

  fn form() -> IntakeForm {
    IntakeForm::new(IntakeConfig::default(), Arc::new(FixedClock::on(today())))
  }

  fn fill(form: &mut IntakeForm, fields: &[(Field, &str)]) {
    for (field, value) in fields {
      form.update_field(*field, value).unwrap();
    }
  }

  fn fill_contact(form: &mut IntakeForm) {
    fill(form, &[
      (Field::Name, "Dale Roper"),
      (Field::Phone, "(432) 555-0199"),
      (Field::Email, "dale@example.com"),
    ]);
  }

  fn fill_incident(form: &mut IntakeForm, date: NaiveDate) {
    fill(form, &[
      (Field::AccidentCategory, "equipment-failure"),
      (Field::IncidentDate, &date.format("%Y-%m-%d").to_string()),
      (Field::Location, "Midland, TX"),
      (Field::Description, "Blowout preventer failed during tripping"),
      (Field::JobRole, "Floorhand"),
    ]);
  }

  fn fill_injury(form: &mut IntakeForm) {
    fill(form, &[
      (Field::InjuryDescription, "Crushed left hand"),
      (Field::InjurySeverity, "5"),
      (Field::HasEvidence, "true"),
    ]);
  }

  fn at_last_step(date: NaiveDate) -> IntakeForm {
    let mut form = form();
    fill_contact(&mut form);
    form.advance_step().unwrap();
    fill_incident(&mut form, date);
    form.advance_step().unwrap();
    form
  }

  #[test]
  fn transition_function_clamps_and_terminates() {
    let first = FormState::INITIAL;
    assert_eq!(first.on(Transition::Retreat), first);
    assert_eq!(first.on(Transition::Submit), first);

    let last = FormState::Editing(Step::LAST);
    assert_eq!(last.on(Transition::Advance), last);
    assert_eq!(last.on(Transition::Submit), FormState::Submitted);

    for t in [Transition::Advance, Transition::Retreat, Transition::Submit] {
      assert_eq!(FormState::Submitted.on(t), FormState::Submitted);
    }
  }

  #[test]
  fn advance_with_empty_required_field_stays_put() {
    let mut form = form();
    fill(&mut form, &[
      (Field::Phone, "(432) 555-0199"),
      (Field::Email, "dale@example.com"),
    ]);

    let err = form.advance_step().unwrap_err();
    assert!(matches!(err, Error::Validation(ref e) if e.contains(Field::Name)));
    assert_eq!(form.current_step(), Some(Step::Contact));
    assert_eq!(form.errors().get(Field::Name), Some("Name is required"));
  }

  #[test]
  fn fixing_a_field_clears_its_error() {
    let mut form = form();
    let _ = form.advance_step();
    assert!(form.errors().contains(Field::Name));

    form.update_field(Field::Name, "Dale Roper").unwrap();
    assert!(!form.errors().contains(Field::Name));
    assert!(form.errors().contains(Field::Phone));
  }

  #[test]
  fn retreat_keeps_entered_data_and_floors_at_step_one() {
    let mut form = form();
    fill_contact(&mut form);
    assert_eq!(form.advance_step().unwrap(), Step::Incident);
    form.update_field(Field::Location, "Odessa, TX").unwrap();

    assert_eq!(form.retreat_step().unwrap(), Step::Contact);
    assert_eq!(form.retreat_step().unwrap(), Step::Contact);
    assert_eq!(form.record().location, "Odessa, TX");
    assert_eq!(form.record().name, "Dale Roper");
  }

  #[test]
  fn advance_is_bounded_at_last_step() {
    let mut form = at_last_step(today());
    fill_injury(&mut form);
    assert_eq!(form.advance_step().unwrap(), Step::Injury);
    assert_eq!(form.current_step(), Some(Step::Injury));
  }

  #[test]
  fn window_flag_follows_incident_date() {
    let mut form = form();
    assert!(!form.is_within_limitation_window());

    let cutoff = limitation_cutoff(today(), 2);
    form
      .update_field(Field::IncidentDate, &cutoff.to_string())
      .unwrap();
    assert!(form.is_within_limitation_window());

    let day_before = cutoff.pred_opt().unwrap();
    form
      .update_field(Field::IncidentDate, &day_before.to_string())
      .unwrap();
    assert!(!form.is_within_limitation_window());
    assert!(!form.snapshot().is_within_limitation_window);
  }

  #[test]
  fn submit_requires_last_step() {
    let mut form = form();
    fill_contact(&mut form);
    assert!(matches!(form.submit(), Err(Error::NotFinalStep(1))));
    assert_eq!(form.state(), FormState::INITIAL);
  }

  #[test]
  fn submit_revalidates_every_step() {
    let mut form = at_last_step(today());
    fill_injury(&mut form);
    form.update_field(Field::Email, "").unwrap();

    let err = form.submit().unwrap_err();
    assert!(matches!(err, Error::Validation(ref e) if e.contains(Field::Email)));
    assert_eq!(form.current_step(), Some(Step::Injury));
    assert!(form.payload().is_none());
  }

  #[test]
  fn qualified_submission_closes_the_form() {
    let date = limitation_cutoff(today(), 2) + Days::new(1);
    let mut form = at_last_step(date);
    fill_injury(&mut form);

    let payload = form.submit().unwrap();
    assert!(payload.issues.is_empty());
    assert!(payload.qualified);
    assert_eq!(payload.priority, Priority::Normal);
    assert!(payload.is_within_limitation_window);
    assert_eq!(payload.record.name, "Dale Roper");
    assert_eq!(form.state(), FormState::Submitted);
    assert_eq!(form.payload(), Some(&payload));

    assert!(matches!(
      form.update_field(Field::Name, "Someone Else"),
      Err(Error::AlreadySubmitted)
    ));
    assert!(matches!(form.submit(), Err(Error::AlreadySubmitted)));
    assert!(matches!(form.retreat_step(), Err(Error::AlreadySubmitted)));
    assert_eq!(form.record().name, "Dale Roper");
  }

  #[test]
  fn unqualified_lead_still_produces_payload() {
    let three_years_ago = NaiveDate::from_ymd_opt(2023, 10, 19).unwrap();
    let mut form = at_last_step(three_years_ago);
    fill(&mut form, &[
      (Field::InjuryDescription, "Sprained wrist"),
      (Field::InjurySeverity, "1"),
      (Field::HasEvidence, "false"),
      (Field::AlreadyConsultedLegalCounsel, "true"),
      (Field::ReceivedSettlementOffer, "true"),
    ]);

    let payload = form.submit().unwrap();
    assert_eq!(payload.issues, vec![
      QualificationIssue::ExpiredClaimWindow,
      QualificationIssue::LowSeverityRating,
      QualificationIssue::AlreadyConsultedCounsel,
      QualificationIssue::LacksEvidence,
    ]);
    assert!(!payload.qualified);
    assert!(payload.needs_manual_review());
    assert_eq!(payload.priority, Priority::High);
    assert!(form.state().is_submitted());
  }

  #[test]
  fn snapshot_serialises_state_and_errors() {
    let mut form = form();
    let _ = form.advance_step();
    let json = serde_json::to_value(form.snapshot()).unwrap();
    assert_eq!(json["state"], "editing");
    assert_eq!(json["step"], "contact");
    assert_eq!(json["totalSteps"], 3);
    assert_eq!(json["errors"]["name"], "Name is required");
  }
}
