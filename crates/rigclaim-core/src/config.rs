//! Tunable intake parameters.

use serde::{Deserialize, Serialize};

/// Business parameters of the intake form.
///
/// Deserialised from the `[intake]` table of the server configuration; every
/// field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
  /// Length of the limitation window, in whole years.
  pub limitation_years:      u32,
  /// Severity ratings strictly below this value raise
  /// [`QualificationIssue::LowSeverityRating`](crate::qualify::QualificationIssue).
  pub min_severity:          u8,
  /// Whether the incident step requires a time of day.
  pub require_incident_time: bool,
}

impl Default for IntakeConfig {
  fn default() -> Self {
    Self {
      limitation_years:      2,
      min_severity:          3,
      require_incident_time: false,
    }
  }
}
