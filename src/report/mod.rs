//! Report assembly and rendering.

pub mod generator;

pub use generator::{generate_json_report, generate_markdown_report, write_report};

use crate::analysis::classifier::Thresholds;
use crate::analysis::snapshot::TeamFilter;
use crate::config::ThresholdConfig;
use crate::models::{Snapshot, TeamComparison};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// File path or API URL the records came from.
    pub source: String,
    pub team_filter: String,
    /// Thresholds applied to the selected team (the fallback for "All Teams").
    pub thresholds: Thresholds,
    /// Teams with their own threshold entry.
    pub team_overrides: BTreeMap<String, Thresholds>,
    pub tool_version: String,
}

/// A complete report: one snapshot plus the organization context around it.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub snapshot: Snapshot,
    /// Per-team summaries over the whole organization.
    pub teams: Vec<TeamComparison>,
    /// Metric weights used for the selected team.
    pub weights: BTreeMap<String, f64>,
}

impl Report {
    pub fn new(
        source: &str,
        filter: &TeamFilter,
        thresholds: &ThresholdConfig,
        snapshot: Snapshot,
        teams: Vec<TeamComparison>,
    ) -> Self {
        let (applied, weights) = match filter.team() {
            Some(team) => (thresholds.for_team(team), thresholds.weights_for(team)),
            None => (
                thresholds.default_thresholds(),
                thresholds.weights_for(crate::config::DEFAULT_TEAM_KEY),
            ),
        };

        let team_overrides = thresholds
            .teams()
            .filter(|(name, _)| *name != crate::config::DEFAULT_TEAM_KEY)
            .map(|(name, entry)| (name.to_string(), entry.silent_architect_threshold))
            .collect();

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                source: source.to_string(),
                team_filter: filter.to_string(),
                thresholds: applied,
                team_overrides,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            snapshot,
            teams,
            weights: weights.cloned().unwrap_or_default(),
        }
    }
}
