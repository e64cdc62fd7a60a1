//! Lead sinks shipped with the server.

use rigclaim_core::{
  qualify::Priority,
  submission::{LeadSink, SinkError, SubmissionPayload},
};
use tracing::{debug, info};

/// Writes every finalized lead to the log.
///
/// Stand-in for a CRM integration; it never fails. Contact details only go
/// out at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLeadSink;

/// The parts of a lead that carry no personal data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadSummary {
  pub priority:      Priority,
  pub qualified:     bool,
  pub manual_review: bool,
  pub issues:        Vec<String>,
}

impl LeadSummary {
  pub fn of(payload: &SubmissionPayload) -> Self {
    Self {
      priority:      payload.priority,
      qualified:     payload.qualified,
      manual_review: payload.needs_manual_review(),
      issues:        payload.issues.iter().map(ToString::to_string).collect(),
    }
  }
}

impl LeadSink for TracingLeadSink {
  fn forward(&self, payload: &SubmissionPayload) -> Result<(), SinkError> {
    let summary = LeadSummary::of(payload);
    info!(
      priority = %summary.priority,
      qualified = summary.qualified,
      manual_review = summary.manual_review,
      issues = ?summary.issues,
      "lead forwarded"
    );
    debug!(
      name = %payload.record.name,
      email = %payload.record.email,
      phone = %payload.record.phone,
      "lead contact"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use rigclaim_core::{
    intake::IntakeRecord,
    qualify::{QualificationIssue, QualificationVerdict},
  };

  use super::*;

  fn payload() -> SubmissionPayload {
    let record = IntakeRecord {
      name: "Dale Roper".into(),
      email: "dale@example.com".into(),
      phone: "(432) 555-0187".into(),
      ..IntakeRecord::default()
    };
    SubmissionPayload::new(
      record,
      true,
      QualificationVerdict {
        issues:    vec![QualificationIssue::LacksEvidence],
        priority:  Priority::High,
        qualified: true,
      },
      Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
    )
  }

  #[test]
  fn summary_carries_no_contact_details() {
    let summary = LeadSummary::of(&payload());
    assert_eq!(summary, LeadSummary {
      priority:      Priority::High,
      qualified:     true,
      manual_review: false,
      issues:        vec!["lacks-evidence".into()],
    });

    let logged = format!("{summary:?}");
    assert!(!logged.contains("Dale Roper"), "{logged}");
    assert!(!logged.contains("dale@example.com"), "{logged}");
    assert!(!logged.contains("555-0187"), "{logged}");
  }

  #[test]
  fn forwarding_never_fails() {
    assert!(TracingLeadSink.forward(&payload()).is_ok());
  }
}
