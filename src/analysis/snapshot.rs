//! Metrics snapshot assembly.
//!
//! `get_snapshot` runs classification once over the full record set, then
//! derives the filtered view, the organization comparison, rankings and
//! histograms from that single pass so every collection agrees.

use crate::analysis::aggregator::{self, DEFAULT_HIGH_DISPARITY_GAP};
use crate::analysis::classifier::classify_all;
use crate::analysis::distribution;
use crate::config::{SnapshotConfig, ThresholdConfig};
use crate::error::SnapshotError;
use crate::models::{ClassifiedEmployee, EmployeeRecord, Snapshot, TeamComparison, ALL_TEAMS};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Which employees a snapshot covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TeamFilter {
    /// The whole organization.
    #[default]
    All,
    /// Exact team name match.
    Team(String),
}

impl TeamFilter {
    /// Parse a selector value. The "All Teams" sentinel and blank input
    /// select everyone.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_TEAMS {
            TeamFilter::All
        } else {
            TeamFilter::Team(value.to_string())
        }
    }

    pub fn matches(&self, team: &str) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(name) => name == team,
        }
    }

    /// Team name to pass to an upstream API, if any.
    pub fn team(&self) -> Option<&str> {
        match self {
            TeamFilter::All => None,
            TeamFilter::Team(name) => Some(name),
        }
    }
}

impl From<&str> for TeamFilter {
    fn from(value: &str) -> Self {
        TeamFilter::parse(value)
    }
}

impl fmt::Display for TeamFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamFilter::All => write!(f, "{}", ALL_TEAMS),
            TeamFilter::Team(name) => write!(f, "{}", name),
        }
    }
}

/// What to do with records whose scores cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Leave them out of every aggregate and list them in `excluded`.
    #[default]
    Exclude,
    /// Fail the whole snapshot.
    Abort,
}

/// Caller-supplied snapshot parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    pub leaderboard_size: usize,
    pub disparity_size: usize,
    pub invalid_records: InvalidRecordPolicy,
    pub high_disparity_gap: f64,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            leaderboard_size: 5,
            disparity_size: 5,
            invalid_records: InvalidRecordPolicy::Exclude,
            high_disparity_gap: DEFAULT_HIGH_DISPARITY_GAP,
        }
    }
}

impl From<&SnapshotConfig> for SnapshotOptions {
    fn from(config: &SnapshotConfig) -> Self {
        Self {
            leaderboard_size: config.leaderboard_size,
            disparity_size: config.disparity_size,
            invalid_records: config.invalid_records,
            high_disparity_gap: config.high_disparity_gap,
        }
    }
}

/// Build the snapshot for one team filter.
///
/// An unknown team or an empty record set yields an empty, well-formed
/// snapshot. Only invalid records under [`InvalidRecordPolicy::Abort`]
/// produce an error.
pub fn get_snapshot(
    records: &[EmployeeRecord],
    filter: &TeamFilter,
    thresholds: &ThresholdConfig,
    options: &SnapshotOptions,
) -> Result<Snapshot, SnapshotError> {
    let batch = classify_all(records, thresholds);

    if !batch.rejected.is_empty() {
        match options.invalid_records {
            InvalidRecordPolicy::Abort => {
                return Err(SnapshotError::InvalidRecords(batch.rejected));
            }
            InvalidRecordPolicy::Exclude => {
                warn!(
                    "Excluded {} record(s) with invalid scores from all aggregates",
                    batch.rejected.len()
                );
            }
        }
    }

    if batch.upstream_disagreements > 0 {
        debug!(
            "{} upstream Silent Architect flag(s) disagreed with local thresholds",
            batch.upstream_disagreements
        );
    }

    let org_stats = aggregator::org_stats(&batch.employees);

    let employees: Vec<ClassifiedEmployee> = batch
        .employees
        .into_iter()
        .filter(|e| filter.matches(e.team()))
        .collect();

    debug!(
        "Snapshot for {}: {} of {} employees in view",
        filter,
        employees.len(),
        org_stats.total
    );

    Ok(Snapshot {
        team_filter: filter.to_string(),
        summary: aggregator::aggregate(&employees),
        leaderboard: aggregator::leaderboard(&employees, options.leaderboard_size),
        disparity_list: aggregator::disparity_list(&employees, options.disparity_size),
        org_stats,
        distribution: distribution::bucket(&employees),
        disparity_stats: aggregator::disparity_stats(&employees, options.high_disparity_gap),
        excluded: batch.rejected,
        employees,
    })
}

/// Per-team summaries over every valid record.
pub fn teams_overview(records: &[EmployeeRecord], thresholds: &ThresholdConfig) -> Vec<TeamComparison> {
    let batch = classify_all(records, thresholds);
    aggregator::team_comparison(&batch.employees)
}
