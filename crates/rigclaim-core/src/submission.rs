//! The submission payload and the seam to whatever receives leads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  intake::IntakeRecord,
  qualify::{Priority, QualificationIssue, QualificationVerdict},
};

/// A finalized lead as handed to the lead-management integration.
///
/// Serialises to a flat JSON object: every [`IntakeRecord`] field plus the
/// derived qualification fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
  #[serde(flatten)]
  pub record:                      IntakeRecord,
  pub is_within_limitation_window: bool,
  pub issues:                      Vec<QualificationIssue>,
  pub priority:                    Priority,
  pub qualified:                   bool,
  pub submission_timestamp:        DateTime<Utc>,
}

impl SubmissionPayload {
  pub fn new(
    record: IntakeRecord,
    is_within_limitation_window: bool,
    verdict: QualificationVerdict,
    submission_timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      record,
      is_within_limitation_window,
      issues: verdict.issues,
      priority: verdict.priority,
      qualified: verdict.qualified,
      submission_timestamp,
    }
  }

  pub fn verdict(&self) -> QualificationVerdict {
    QualificationVerdict {
      issues:    self.issues.clone(),
      priority:  self.priority,
      qualified: self.qualified,
    }
  }

  pub fn needs_manual_review(&self) -> bool { !self.qualified }
}

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receiver of finalized leads (a CRM, a queue, a log).
///
/// Every payload is forwarded, qualified or not.
pub trait LeadSink: Send + Sync {
  fn forward(&self, payload: &SubmissionPayload) -> Result<(), SinkError>;
}
