//! Configuration file handling.
//!
//! This module handles loading and validating configuration from
//! `.impactlens.toml` files, including per-team Silent Architect
//! thresholds and metric weights.

use crate::analysis::aggregator::DEFAULT_HIGH_DISPARITY_GAP;
use crate::analysis::classifier::Thresholds;
use crate::analysis::snapshot::InvalidRecordPolicy;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".impactlens.toml";

/// Threshold entry applied to teams without their own entry.
pub const DEFAULT_TEAM_KEY: &str = "Default";

/// Allowed distance of a weight sum from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where employee records come from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Snapshot settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Per-team thresholds and weights.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Team selected when no --team flag is given.
    #[serde(default = "default_team")]
    pub team: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            team: default_team(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "impactlens_report.md".to_string()
}

fn default_team() -> String {
    crate::models::ALL_TEAMS.to_string()
}

/// Data provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the metrics API (e.g. http://127.0.0.1:8000/api/v1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Snapshot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Number of employees on the impact leaderboard.
    #[serde(default = "default_top_n")]
    pub leaderboard_size: usize,

    /// Number of employees in the disparity list.
    #[serde(default = "default_top_n")]
    pub disparity_size: usize,

    /// What to do with records whose scores are missing or not numeric.
    #[serde(default)]
    pub invalid_records: InvalidRecordPolicy,

    /// Gap above which an employee counts as high-disparity.
    #[serde(default = "default_high_gap")]
    pub high_disparity_gap: f64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            leaderboard_size: default_top_n(),
            disparity_size: default_top_n(),
            invalid_records: InvalidRecordPolicy::default(),
            high_disparity_gap: default_high_gap(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_high_gap() -> f64 {
    DEFAULT_HIGH_DISPARITY_GAP
}

/// Thresholds and metric weights for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamThresholds {
    /// Metric name to weight. Weights sum to 1.0; empty means the entry
    /// only overrides thresholds.
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,

    #[serde(default, alias = "silentArchitectThreshold")]
    pub silent_architect_threshold: Thresholds,
}

impl TeamThresholds {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            weights: BTreeMap::new(),
            silent_architect_threshold: thresholds,
        }
    }

    fn validate(&self, team: &str) -> Result<(), ConfigError> {
        for (metric, &value) in &self.weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    team: team.to_string(),
                    metric: metric.clone(),
                    value,
                });
            }
        }

        if !self.weights.is_empty() {
            let sum: f64 = self.weights.values().sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ConfigError::WeightSum {
                    team: team.to_string(),
                    sum,
                });
            }
        }

        let bounds = [
            ("impact", self.silent_architect_threshold.impact),
            ("activity", self.silent_architect_threshold.activity),
        ];
        for (bound, value) in bounds {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange {
                    team: team.to_string(),
                    bound,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Team name to thresholds, with a `Default` fallback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdConfig {
    teams: BTreeMap<String, TeamThresholds>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let entry = TeamThresholds {
            weights: default_weights(),
            silent_architect_threshold: Thresholds::strict(),
        };
        Self {
            teams: BTreeMap::from([(DEFAULT_TEAM_KEY.to_string(), entry)]),
        }
    }
}

fn default_weights() -> BTreeMap<String, f64> {
    [
        ("Code Reviews", 0.30),
        ("Bug Fixes", 0.25),
        ("Architecture", 0.25),
        ("Feature Delivery", 0.20),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

impl ThresholdConfig {
    /// Empty mapping: every team uses the strict built-in thresholds.
    pub fn empty() -> Self {
        Self {
            teams: BTreeMap::new(),
        }
    }

    /// Add or replace a team's thresholds, keeping its weights.
    pub fn with_team(mut self, team: &str, thresholds: Thresholds) -> Self {
        self.set_thresholds(team, thresholds);
        self
    }

    pub fn set_thresholds(&mut self, team: &str, thresholds: Thresholds) {
        self.teams
            .entry(team.to_string())
            .and_modify(|entry| entry.silent_architect_threshold = thresholds)
            .or_insert_with(|| TeamThresholds::new(thresholds));
    }

    /// Replace the fallback thresholds.
    pub fn set_default_thresholds(&mut self, thresholds: Thresholds) {
        self.set_thresholds(DEFAULT_TEAM_KEY, thresholds);
    }

    /// Thresholds for a team: its own entry, else `Default`, else strict.
    pub fn for_team(&self, team: &str) -> Thresholds {
        self.teams
            .get(team)
            .or_else(|| self.teams.get(DEFAULT_TEAM_KEY))
            .map(|entry| entry.silent_architect_threshold)
            .unwrap_or_default()
    }

    /// Fallback thresholds (the `Default` entry, else strict).
    pub fn default_thresholds(&self) -> Thresholds {
        self.teams
            .get(DEFAULT_TEAM_KEY)
            .map(|entry| entry.silent_architect_threshold)
            .unwrap_or_default()
    }

    /// Metric weights for a team, falling back to `Default`.
    pub fn weights_for(&self, team: &str) -> Option<&BTreeMap<String, f64>> {
        self.teams
            .get(team)
            .filter(|entry| !entry.weights.is_empty())
            .or_else(|| self.teams.get(DEFAULT_TEAM_KEY))
            .map(|entry| &entry.weights)
            .filter(|weights| !weights.is_empty())
    }

    pub fn teams(&self) -> impl Iterator<Item = (&str, &TeamThresholds)> {
        self.teams.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Check every entry's weights and threshold bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (team, entry) in &self.teams {
            entry.validate(team)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_if_present(Path::new(CONFIG_FILE_NAME))
    }

    /// Load `path` if it exists. A file that exists but fails to parse or
    /// validate is an error.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Pick the configuration for a run: the explicit path if given, else
    /// `default_path` if present, else built-in defaults.
    pub fn resolve(explicit: Option<&Path>, default_path: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from: {}", path.display());
            return Self::load(path);
        }

        match Self::load_if_present(default_path)? {
            Some(config) => {
                info!("Loaded default config from {}", default_path.display());
                Ok(config)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Validate settings that serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot.leaderboard_size == 0 {
            return Err(ConfigError::ZeroSize {
                setting: "leaderboard_size",
            });
        }
        if self.snapshot.disparity_size == 0 {
            return Err(ConfigError::ZeroSize {
                setting: "disparity_size",
            });
        }
        self.thresholds.validate()
    }

    /// Override config values with CLI arguments (CLI takes precedence).
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref team) = args.team {
            self.general.team = team.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref url) = args.api_url {
            self.source.api_url = Some(url.clone());
        }

        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(size) = args.leaderboard_size {
            self.snapshot.leaderboard_size = size;
        }

        if let Some(size) = args.disparity_size {
            self.snapshot.disparity_size = size;
        }

        if let Some(policy) = args.on_invalid {
            self.snapshot.invalid_records = policy.into();
        }

        if args.relaxed {
            self.thresholds.set_default_thresholds(Thresholds::relaxed());
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
