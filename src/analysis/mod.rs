//! Analysis modules.
//!
//! Classification, aggregation, distribution and the snapshot facade that
//! ties them together. Everything here is synchronous and pure.

pub mod aggregator;
pub mod classifier;
pub mod distribution;
pub mod snapshot;

pub use aggregator::{aggregate, available_teams, leaderboard, org_stats, team_comparison};
pub use classifier::{classify, classify_all, Classification, Thresholds};
pub use distribution::bucket;
pub use snapshot::{get_snapshot, teams_overview, InvalidRecordPolicy, SnapshotOptions, TeamFilter};
