//! Silent Architect classification.
//!
//! Classification is a pure function of an impact/activity pair and a
//! threshold pair. Callers that need a relaxed rule pass different
//! thresholds; there is no second code path.

use crate::config::ThresholdConfig;
use crate::error::ScoreError;
use crate::models::{ClassifiedEmployee, Employee, EmployeeRecord, RejectedRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Minimum impact and maximum activity for a Silent Architect.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub impact: f64,
    pub activity: f64,
}

impl Thresholds {
    /// The documented default: impact >= 85, activity <= 50.
    pub const fn strict() -> Self {
        Self {
            impact: 85.0,
            activity: 50.0,
        }
    }

    /// Looser variant used for demos: impact >= 70, activity <= 60.
    pub const fn relaxed() -> Self {
        Self {
            impact: 70.0,
            activity: 60.0,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::strict()
    }
}

/// Derived classification fields for one impact/activity pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub silent_architect: bool,
    pub disparity_score: f64,
}

/// Classify an impact/activity pair.
///
/// Non-finite scores are an error rather than being treated as zero.
pub fn classify(
    impact_score: f64,
    activity_score: f64,
    thresholds: &Thresholds,
) -> Result<Classification, ScoreError> {
    check_finite(impact_score, "impactScore")?;
    check_finite(activity_score, "activityScore")?;
    Ok(derive(impact_score, activity_score, thresholds))
}

fn check_finite(value: f64, field: &'static str) -> Result<(), ScoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScoreError::NotFinite { field, value })
    }
}

fn derive(impact_score: f64, activity_score: f64, thresholds: &Thresholds) -> Classification {
    Classification {
        silent_architect: is_silent_architect(impact_score, activity_score, thresholds),
        disparity_score: calculate_disparity(impact_score, activity_score),
    }
}

/// Inclusive threshold test.
pub fn is_silent_architect(impact_score: f64, activity_score: f64, thresholds: &Thresholds) -> bool {
    impact_score >= thresholds.impact && activity_score <= thresholds.activity
}

/// `impact - activity`, rounded to two decimals.
///
/// Rounds half away from zero so `calculate_disparity(a, b)` is always
/// `-calculate_disparity(b, a)`. Negative zero is normalized.
pub fn calculate_disparity(impact_score: f64, activity_score: f64) -> f64 {
    let rounded = ((impact_score - activity_score) * 100.0).round() / 100.0;
    rounded + 0.0
}

/// Attach derived fields to a validated employee.
pub fn classify_employee(employee: Employee, thresholds: &Thresholds) -> ClassifiedEmployee {
    let Classification {
        silent_architect,
        disparity_score,
    } = derive(employee.impact_score, employee.activity_score, thresholds);
    ClassifiedEmployee::new(employee, silent_architect, disparity_score)
}

/// Result of classifying a batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedBatch {
    /// Valid records in input order.
    pub employees: Vec<ClassifiedEmployee>,
    /// Records with unusable scores, in input order.
    pub rejected: Vec<RejectedRecord>,
    /// Records whose upstream flag disagreed with the local result.
    pub upstream_disagreements: usize,
}

/// Validate and classify every record with its team's thresholds.
pub fn classify_all(records: &[EmployeeRecord], config: &ThresholdConfig) -> ClassifiedBatch {
    let mut batch = ClassifiedBatch::default();

    for record in records {
        let employee = match record.validate() {
            Ok(employee) => employee,
            Err(error) => {
                warn!("Record {} ({}) has an invalid score: {}", record.id, record.name, error);
                batch.rejected.push(RejectedRecord {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    team: record.team.clone(),
                    error,
                });
                continue;
            }
        };

        let thresholds = config.for_team(&employee.team);
        let classified = classify_employee(employee, &thresholds);

        if let Some(upstream) = record.silent_architect {
            if upstream != classified.silent_architect() {
                batch.upstream_disagreements += 1;
                debug!(
                    "Upstream flag for {} was {}, recomputed as {} (impact >= {}, activity <= {})",
                    record.id,
                    upstream,
                    classified.silent_architect(),
                    thresholds.impact,
                    thresholds.activity
                );
            }
        }

        batch.employees.push(classified);
    }

    batch
}
