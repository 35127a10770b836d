//! ImpactLens core library.
//!
//! Classifies employees as Silent Architects (high impact, low visible
//! activity), aggregates team and organization metrics, and builds the
//! snapshot consumed by the report generator and any other presentation
//! layer.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod report;

pub use analysis::classifier::Thresholds;
pub use analysis::snapshot::{get_snapshot, InvalidRecordPolicy, SnapshotOptions, TeamFilter};
pub use config::{Config, ThresholdConfig};
pub use error::{ConfigError, ProviderError, ScoreError, SnapshotError};
pub use models::{ClassifiedEmployee, EmployeeRecord, Snapshot, ALL_TEAMS};
