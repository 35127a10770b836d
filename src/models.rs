//! Data models for employee impact metrics.
//!
//! This module contains the record shapes received from data providers,
//! the validated and classified employee types, and the aggregate shapes
//! returned to presentation layers.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Sentinel team filter value meaning the whole organization.
pub const ALL_TEAMS: &str = "All Teams";

/// Employee identifier as sent by the provider (integer or string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployeeId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeId::Number(n) => write!(f, "{}", n),
            EmployeeId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A score exactly as it arrived on the wire.
///
/// The upstream API serializes decimal columns as strings (`"92.00"`), so
/// numeric strings are accepted. Anything else is kept so the error can
/// show what was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawScore {
    /// Convert to a finite number, naming `field` in any error.
    pub fn to_finite(&self, field: &'static str) -> Result<f64, ScoreError> {
        let value = match self {
            RawScore::Number(n) => *n,
            RawScore::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ScoreError::non_numeric(field, s.clone()))?,
            RawScore::Other(v) => return Err(ScoreError::non_numeric(field, v.to_string())),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ScoreError::NotFinite { field, value })
        }
    }
}

impl From<f64> for RawScore {
    fn from(value: f64) -> Self {
        RawScore::Number(value)
    }
}

/// Supporting counts attached to a breakdown metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownStats {
    pub count: u64,
    pub label: String,
}

/// One metric contributing to an employee's impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactBreakdown {
    /// Metric name (e.g. "Code Reviews").
    pub metric: String,
    /// Metric score on the 0-100 scale.
    pub score: f64,
    /// Human readable explanation.
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<BreakdownStats>,
}

/// Raw employee record as received from a data provider.
///
/// Scores are unvalidated. The upstream `silentArchitect` flag is kept only
/// so disagreements with the local classification can be reported; it is
/// never used as a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    pub team: String,
    #[serde(default)]
    pub impact_score: Option<RawScore>,
    #[serde(default)]
    pub activity_score: Option<RawScore>,
    #[serde(default)]
    pub impact_breakdown: Vec<ImpactBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent_architect: Option<bool>,
}

impl EmployeeRecord {
    /// Validate both scores and produce an [`Employee`].
    pub fn validate(&self) -> Result<Employee, ScoreError> {
        let impact_score = required_score(&self.impact_score, "impactScore")?;
        let activity_score = required_score(&self.activity_score, "activityScore")?;

        Ok(Employee {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            team: self.team.clone(),
            impact_score,
            activity_score,
            impact_breakdown: self.impact_breakdown.clone(),
        })
    }
}

fn required_score(raw: &Option<RawScore>, field: &'static str) -> Result<f64, ScoreError> {
    raw.as_ref()
        .ok_or_else(|| ScoreError::missing(field))?
        .to_finite(field)
}

/// An employee whose scores have been validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub role: String,
    pub team: String,
    pub impact_score: f64,
    pub activity_score: f64,
    pub impact_breakdown: Vec<ImpactBreakdown>,
}

impl Employee {
    /// The breakdown metric with the highest score.
    ///
    /// Ties go to the earliest entry. `None` for an empty breakdown.
    pub fn top_contribution(&self) -> Option<&ImpactBreakdown> {
        let mut best: Option<&ImpactBreakdown> = None;
        for item in &self.impact_breakdown {
            match best {
                Some(current) if item.score <= current.score => {}
                _ => best = Some(item),
            }
        }
        best
    }
}

/// Where an employee's disparity score falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisparityBand {
    /// Impact far below visible activity (< -10)
    Overactive,
    /// Roughly balanced (-10 to 10)
    Neutral,
    /// Impact ahead of activity (10 to 30)
    Positive,
    /// Strongly under-recognized value (>= 30)
    Efficient,
}

impl DisparityBand {
    /// Band for a disparity score.
    pub fn from_disparity(score: f64) -> Self {
        if score >= 30.0 {
            DisparityBand::Efficient
        } else if score >= 10.0 {
            DisparityBand::Positive
        } else if score >= -10.0 {
            DisparityBand::Neutral
        } else {
            DisparityBand::Overactive
        }
    }
}

impl fmt::Display for DisparityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisparityBand::Overactive => write!(f, "Overactive"),
            DisparityBand::Neutral => write!(f, "Neutral"),
            DisparityBand::Positive => write!(f, "Positive"),
            DisparityBand::Efficient => write!(f, "Efficient"),
        }
    }
}

/// An employee with derived classification fields.
///
/// Only the classifier can build one, so the derived fields always match
/// the scores they sit next to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedEmployee {
    #[serde(flatten)]
    employee: Employee,
    silent_architect: bool,
    disparity_score: f64,
    disparity_band: DisparityBand,
}

impl ClassifiedEmployee {
    pub(crate) fn new(employee: Employee, silent_architect: bool, disparity_score: f64) -> Self {
        Self {
            employee,
            silent_architect,
            disparity_score,
            disparity_band: DisparityBand::from_disparity(disparity_score),
        }
    }

    pub fn employee(&self) -> &Employee {
        &self.employee
    }

    pub fn into_employee(self) -> Employee {
        self.employee
    }

    pub fn id(&self) -> &EmployeeId {
        &self.employee.id
    }

    pub fn name(&self) -> &str {
        &self.employee.name
    }

    pub fn team(&self) -> &str {
        &self.employee.team
    }

    pub fn impact_score(&self) -> f64 {
        self.employee.impact_score
    }

    pub fn activity_score(&self) -> f64 {
        self.employee.activity_score
    }

    pub fn silent_architect(&self) -> bool {
        self.silent_architect
    }

    pub fn disparity_score(&self) -> f64 {
        self.disparity_score
    }

    pub fn disparity_band(&self) -> DisparityBand {
        self.disparity_band
    }

    /// One-line profile shown next to the employee's breakdown.
    pub fn insight_text(&self) -> &'static str {
        if self.silent_architect {
            "A classic Silent Architect profile: High impact with lower visible activity."
        } else {
            "A balanced contributor with visible and impactful work."
        }
    }
}

/// A record left out of the metrics because a score was unusable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub id: EmployeeId,
    pub name: String,
    pub team: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: ScoreError,
}

fn serialize_display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Aggregate over one team or the whole organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    /// Mean impact score, rounded half-up.
    pub avg_impact: i64,
    /// Mean activity score, rounded half-up.
    pub avg_activity: i64,
    /// Members classified as Silent Architects.
    pub silent_count: usize,
    /// Member count.
    pub total: usize,
}

/// Organization-wide averages shown next to a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgStats {
    pub avg_impact: i64,
    pub avg_activity: i64,
    pub total: usize,
}

/// One row of the team-vs-team comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamComparison {
    pub team: String,
    #[serde(flatten)]
    pub summary: TeamSummary,
}

/// Histogram bucket over the 0-100 score range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionBucket {
    /// Display label, e.g. "21-40".
    pub range: String,
    pub low: u32,
    pub high: u32,
    /// Employees whose activity score falls in this range.
    pub activity: usize,
    /// Employees whose impact score falls in this range.
    pub impact: usize,
}

/// Gap statistics for the disparity view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisparityStats {
    /// Mean disparity, one decimal place.
    pub average_gap: f64,
    /// Members whose gap exceeds the high-disparity cutoff.
    pub high_disparity_count: usize,
    pub silent_architect_count: usize,
}

/// Everything a presentation layer needs for one team filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub team_filter: String,
    pub employees: Vec<ClassifiedEmployee>,
    pub summary: TeamSummary,
    pub leaderboard: Vec<ClassifiedEmployee>,
    pub disparity_list: Vec<ClassifiedEmployee>,
    pub org_stats: OrgStats,
    pub distribution: Vec<DistributionBucket>,
    pub disparity_stats: DisparityStats,
    pub excluded: Vec<RejectedRecord>,
}

impl Snapshot {
    /// True when the view has no contributors (a valid, displayable state).
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}
