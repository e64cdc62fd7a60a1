//! Lead qualification: from the hidden signals of an intake record to a
//! verdict.
//!
//! The verdict never rejects a lead. Unqualified leads are still forwarded,
//! flagged for manual review.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{config::IntakeConfig, intake::IntakeRecord};

/// A lead with more issues than this is unqualified.
pub const MAX_TOLERATED_ISSUES: usize = 2;

// ─── Limitation window ───────────────────────────────────────────────────────

/// The earliest incident date still inside a `years`-long limitation window
/// ending `today`. A Feb 29 `today` maps to Feb 28 in non-leap years.
pub fn limitation_cutoff(today: NaiveDate, years: u32) -> NaiveDate {
  today
    .checked_sub_months(Months::new(years.saturating_mul(12)))
    .unwrap_or(NaiveDate::MIN)
}

/// `incident >= today - years`, boundary inclusive.
pub fn within_limitation_window(
  incident: NaiveDate,
  today: NaiveDate,
  years: u32,
) -> bool {
  incident >= limitation_cutoff(today, years)
}

// ─── Verdict types ───────────────────────────────────────────────────────────

/// Something about a lead that counts against it. Variants are declared in
/// the order they are reported.
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
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum QualificationIssue {
  ExpiredClaimWindow,
  LowSeverityRating,
  AlreadyConsultedCounsel,
  LacksEvidence,
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
  #[default]
  Normal,
  High,
}

/// The inputs qualification looks at, detached from the rest of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
  pub within_limitation_window:        bool,
  pub injury_severity:                 u8,
  pub has_evidence:                    bool,
  pub already_consulted_legal_counsel: bool,
  pub received_settlement_offer:       bool,
}

impl Signals {
  /// Read the signals off a record. A record without an incident date is
  /// treated as outside the window.
  pub fn from_record(
    record: &IntakeRecord,
    today: NaiveDate,
    config: &IntakeConfig,
  ) -> Self {
    Self {
      within_limitation_window:        record.incident_date.is_some_and(|d| {
        within_limitation_window(d, today, config.limitation_years)
      }),
      injury_severity:                 record.injury_severity,
      has_evidence:                    record.has_evidence,
      already_consulted_legal_counsel: record.already_consulted_legal_counsel,
      received_settlement_offer:       record.received_settlement_offer,
    }
  }
}

/// The derived assessment of a lead. Computed once, at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationVerdict {
  pub issues:    Vec<QualificationIssue>,
  pub priority:  Priority,
  pub qualified: bool,
}

impl QualificationVerdict {
  pub fn needs_manual_review(&self) -> bool { !self.qualified }
}

// ─── Algorithm ───────────────────────────────────────────────────────────────

pub fn qualify(signals: &Signals, min_severity: u8) -> QualificationVerdict {
  let mut issues = Vec::new();

  if !signals.within_limitation_window {
    issues.push(QualificationIssue::ExpiredClaimWindow);
  }
  if signals.injury_severity < min_severity {
    issues.push(QualificationIssue::LowSeverityRating);
  }
  if signals.already_consulted_legal_counsel {
    issues.push(QualificationIssue::AlreadyConsultedCounsel);
  }
  if !signals.has_evidence {
    issues.push(QualificationIssue::LacksEvidence);
  }

  let priority = if signals.received_settlement_offer {
    Priority::High
  } else {
    Priority::Normal
  };
  let qualified = issues.len() <= MAX_TOLERATED_ISSUES;

  QualificationVerdict { issues, priority, qualified }
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, Days};
  use proptest::prelude::*;

  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, 19).unwrap() }

  fn record_on(date: NaiveDate) -> IntakeRecord {
    IntakeRecord { incident_date: Some(date), ..IntakeRecord::default() }
  }

  #[test]
  fn cutoff_is_same_calendar_day_two_years_back() {
    assert_eq!(
      limitation_cutoff(today(), 2),
      NaiveDate::from_ymd_opt(2024, 10, 19).unwrap()
    );
    let leap_day = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
    assert_eq!(
      limitation_cutoff(leap_day, 2),
      NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
    );
  }

  #[test]
  fn boundary_day_is_inside_window() {
    let cutoff = limitation_cutoff(today(), 2);
    assert!(within_limitation_window(cutoff, today(), 2));
    assert!(!within_limitation_window(
      cutoff.pred_opt().unwrap(),
      today(),
      2
    ));
  }

  #[test]
  fn scenario_recent_serious_documented_claim_qualifies() {
    // Two years minus one day ago.
    let date = limitation_cutoff(today(), 2) + Days::new(1);
    let record = IntakeRecord {
      injury_severity: 5,
      has_evidence: true,
      ..record_on(date)
    };
    let signals =
      Signals::from_record(&record, today(), &IntakeConfig::default());
    let verdict = qualify(&signals, 3);

    assert!(verdict.issues.is_empty());
    assert!(verdict.qualified);
    assert_eq!(verdict.priority, Priority::Normal);
  }

  #[test]
  fn scenario_every_issue_in_order() {
    let date = today().with_year(2023).unwrap();
    let record = IntakeRecord {
      injury_severity: 1,
      has_evidence: false,
      already_consulted_legal_counsel: true,
      received_settlement_offer: true,
      ..record_on(date)
    };
    let signals =
      Signals::from_record(&record, today(), &IntakeConfig::default());
    let verdict = qualify(&signals, 3);

    assert_eq!(
      verdict.issues,
      vec![
        QualificationIssue::ExpiredClaimWindow,
        QualificationIssue::LowSeverityRating,
        QualificationIssue::AlreadyConsultedCounsel,
        QualificationIssue::LacksEvidence,
      ]
    );
    assert!(!verdict.qualified);
    assert!(verdict.needs_manual_review());
    assert_eq!(verdict.priority, Priority::High);
  }

  #[test]
  fn severity_threshold_is_configurable() {
    let signals = Signals {
      within_limitation_window:        true,
      injury_severity:                 4,
      has_evidence:                    true,
      already_consulted_legal_counsel: false,
      received_settlement_offer:       false,
    };
    assert!(qualify(&signals, 3).issues.is_empty());
    assert_eq!(
      qualify(&signals, 5).issues,
      vec![QualificationIssue::LowSeverityRating]
    );
  }

  #[test]
  fn missing_date_counts_as_expired() {
    let signals = Signals::from_record(
      &IntakeRecord::default(),
      today(),
      &IntakeConfig::default(),
    );
    assert!(!signals.within_limitation_window);
  }

  #[test]
  fn tags_serialise_kebab_case() {
    let json = serde_json::to_value(QualificationIssue::AlreadyConsultedCounsel)
      .unwrap();
    assert_eq!(json, "already-consulted-counsel");
    assert_eq!(serde_json::to_value(Priority::High).unwrap(), "high");
  }

  fn signals() -> impl Strategy<Value = Signals> {
    (any::<bool>(), 1u8..=10, any::<bool>(), any::<bool>(), any::<bool>())
      .prop_map(|(window, severity, evidence, counsel, offer)| Signals {
        within_limitation_window:        window,
        injury_severity:                 severity,
        has_evidence:                    evidence,
        already_consulted_legal_counsel: counsel,
        received_settlement_offer:       offer,
      })
  }

  proptest! {
    #[test]
    fn qualified_iff_at_most_two_issues(s in signals(), min in 1u8..=10) {
      let verdict = qualify(&s, min);
      prop_assert_eq!(verdict.qualified, verdict.issues.len() <= 2);
    }

    #[test]
    fn priority_tracks_settlement_offer_only(s in signals(), min in 1u8..=10) {
      let verdict = qualify(&s, min);
      prop_assert_eq!(
        verdict.priority == Priority::High,
        s.received_settlement_offer
      );
    }

    #[test]
    fn issues_are_reported_in_declaration_order(s in signals(), min in 1u8..=10) {
      let verdict = qualify(&s, min);
      let mut sorted = verdict.issues.clone();
      sorted.sort();
      prop_assert_eq!(sorted, verdict.issues);
    }

    #[test]
    fn window_matches_calendar_arithmetic(
      today_offset in 0i64..40_000,
      back in 0u64..2_000,
    ) {
      let today = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap()
        + chrono::Duration::days(today_offset);
      let incident = today - Days::new(back);
      let two_years_ago = today
        .with_year(today.year() - 2)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(today.year() - 2, 2, 28).unwrap());
      prop_assert_eq!(
        within_limitation_window(incident, today, 2),
        incident >= two_years_ago
      );
    }
  }
}
