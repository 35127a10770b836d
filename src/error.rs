//! Error types for the metrics core and its collaborators.
//!
//! Computation errors (`ScoreError`, `SnapshotError`), configuration errors
//! (`ConfigError`) and data-fetch errors (`ProviderError`) are kept apart so
//! callers can tell "no data in this view" from "failed to compute" from
//! "failed to fetch".

use crate::models::RejectedRecord;
use thiserror::Error;

/// A score on an employee record could not be used for classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// The score field was absent or `null`.
    #[error("{field} is missing")]
    Missing {
        /// Wire name of the field
        field: &'static str,
    },

    /// The score was a string that does not parse as a number.
    #[error("{field} is not numeric: {value:?}")]
    NonNumeric {
        /// Wire name of the field
        field: &'static str,
        /// The offending raw value
        value: String,
    },

    /// The score parsed but is NaN or infinite.
    #[error("{field} is not a finite number: {value}")]
    NotFinite {
        /// Wire name of the field
        field: &'static str,
        /// The offending value
        value: f64,
    },
}

impl ScoreError {
    /// Create a Missing error.
    pub fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    /// Create a NonNumeric error.
    pub fn non_numeric(field: &'static str, value: impl Into<String>) -> Self {
        Self::NonNumeric {
            field,
            value: value.into(),
        }
    }
}

/// Threshold or weight configuration that cannot be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Metric weights do not add up to 1.0.
    #[error("weights for {team} sum to {sum:.3}, expected 1.0")]
    WeightSum { team: String, sum: f64 },

    /// A single weight is negative or not finite.
    #[error("weight {metric:?} for {team} is invalid: {value}")]
    InvalidWeight {
        team: String,
        metric: String,
        value: f64,
    },

    /// A threshold bound falls outside the 0-100 score domain.
    #[error("{bound} threshold for {team} must be within 0-100, got {value}")]
    ThresholdOutOfRange {
        team: String,
        bound: &'static str,
        value: f64,
    },

    /// A top-N size of zero would always produce empty lists.
    #[error("{setting} must be at least 1")]
    ZeroSize { setting: &'static str },
}

/// The snapshot could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    /// Records with invalid scores were found under the abort policy.
    #[error("{} record(s) have invalid scores; first: {}", .0.len(), first_rejection(.0))]
    InvalidRecords(Vec<RejectedRecord>),
}

fn first_rejection(rejected: &[RejectedRecord]) -> String {
    rejected
        .first()
        .map(|r| format!("{} ({})", r.id, r.error))
        .unwrap_or_default()
}

/// Fetching or decoding raw employee data failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Reading a local dataset failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload was not the expected JSON shape.
    #[error("failed to decode {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with a non-success status.
    #[error("API error {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The request did not complete in time.
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// The API host could not be reached.
    #[error("cannot connect to {url}")]
    Connect { url: String },

    /// Any other transport failure.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeId;

    #[test]
    fn test_score_error_messages() {
        assert_eq!(
            ScoreError::missing("impactScore").to_string(),
            "impactScore is missing"
        );
        assert_eq!(
            ScoreError::non_numeric("activityScore", "high").to_string(),
            "activityScore is not numeric: \"high\""
        );
        let err = ScoreError::NotFinite {
            field: "impactScore",
            value: f64::NAN,
        };
        assert!(err.to_string().contains("not a finite number"));
    }

    #[test]
    fn test_snapshot_error_names_first_record() {
        let err = SnapshotError::InvalidRecords(vec![RejectedRecord {
            id: EmployeeId::Number(7),
            name: "Sam".to_string(),
            team: "Platform".to_string(),
            error: ScoreError::missing("impactScore"),
        }]);
        let message = err.to_string();
        assert!(message.starts_with("1 record(s)"));
        assert!(message.contains("7 (impactScore is missing)"));
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::WeightSum {
            team: "Default".to_string(),
            sum: 0.9,
        };
        assert_eq!(err.to_string(), "weights for Default sum to 0.900, expected 1.0");
    }
}
