//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::snapshot::InvalidRecordPolicy;
use clap::Parser;
use std::path::PathBuf;

/// ImpactLens - find the Silent Architects in your engineering org
///
/// Classifies employees by impact and visible activity, then reports team
/// summaries, leaderboards, disparity rankings and score distributions.
///
/// Examples:
///   impactlens --input fixtures/employees.json
///   impactlens --input fixtures/employees.json --team Engineering --format json
///   impactlens --api-url http://localhost:8000/api/v1 --remote-thresholds
///   impactlens --input fixtures/employees.json --list-teams
///   impactlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// JSON file with an array of employee records
    #[arg(short, long, value_name = "FILE", conflicts_with = "api_url")]
    pub input: Option<PathBuf>,

    /// Base URL of the metrics API (e.g. http://localhost:8000/api/v1)
    ///
    /// Can also be set via IMPACTLENS_API_URL or [source] api_url in .impactlens.toml.
    #[arg(long, value_name = "URL", env = "IMPACTLENS_API_URL")]
    pub api_url: Option<String>,

    /// Team to report on ("All Teams" for the whole organization)
    #[arg(short, long, value_name = "NAME")]
    pub team: Option<String>,

    /// Output file path for the report ("-" for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .impactlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of employees on the impact leaderboard
    #[arg(long, value_name = "N")]
    pub leaderboard_size: Option<usize>,

    /// Number of employees in the disparity list
    #[arg(long, value_name = "N")]
    pub disparity_size: Option<usize>,

    /// Use the relaxed Silent Architect rule (impact >= 70, activity <= 60)
    ///
    /// Replaces the fallback thresholds; teams with their own entry keep it.
    #[arg(long)]
    pub relaxed: bool,

    /// What to do with records whose scores are missing or not numeric
    #[arg(long, value_name = "POLICY")]
    pub on_invalid: Option<OnInvalid>,

    /// Exit with code 2 if any record was excluded
    ///
    /// Useful for data-quality checks in CI pipelines.
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Use the thresholds served by the API as the fallback rule
    ///
    /// Cannot be combined with --relaxed.
    #[arg(long)]
    pub remote_thresholds: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the available teams and exit
    #[arg(long)]
    pub list_teams: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .impactlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Value for --on-invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OnInvalid {
    /// Leave invalid records out and list them in the report
    Exclude,
    /// Fail the run
    Abort,
}

impl From<OnInvalid> for InvalidRecordPolicy {
    fn from(value: OnInvalid) -> Self {
        match value {
            OnInvalid::Exclude => InvalidRecordPolicy::Exclude,
            OnInvalid::Abort => InvalidRecordPolicy::Abort,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if self.remote_thresholds && self.input.is_some() {
            return Err("--remote-thresholds requires an API source, not --input".to_string());
        }

        if self.relaxed && self.remote_thresholds {
            return Err("Cannot use both --relaxed and --remote-thresholds".to_string());
        }

        if self.leaderboard_size == Some(0) {
            return Err("Leaderboard size must be at least 1".to_string());
        }

        if self.disparity_size == Some(0) {
            return Err("Disparity size must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// True when the report goes to stdout instead of a file.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            api_url: Some("http://localhost:8000/api/v1".to_string()),
            team: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            leaderboard_size: None,
            disparity_size: None,
            relaxed: false,
            on_invalid: None,
            fail_on_invalid: false,
            remote_thresholds: false,
            timeout: None,
            list_teams: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "impactlens",
            "--api-url",
            "http://localhost:8000/api/v1",
            "--team",
            "Engineering",
            "--leaderboard-size",
            "8",
            "--on-invalid",
            "abort",
            "--format",
            "json",
        ]);
        assert_eq!(args.team.as_deref(), Some("Engineering"));
        assert_eq!(args.leaderboard_size, Some(8));
        assert_eq!(args.on_invalid, Some(OnInvalid::Abort));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_input_conflicts_with_api_url() {
        let result = Args::try_parse_from([
            "impactlens",
            "--input",
            "records.json",
            "--api-url",
            "http://localhost:8000/api/v1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.api_url = Some("localhost:8000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.api_url = None;
        args.input = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sizes() {
        let mut args = make_args();
        args.leaderboard_size = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.disparity_size = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_relaxed_conflicts_with_remote_thresholds() {
        let mut args = make_args();
        args.relaxed = true;
        assert!(args.validate().is_ok());

        args.remote_thresholds = true;
        let err = args.validate().unwrap_err();
        assert!(err.contains("--relaxed"));
        assert!(err.contains("--remote-thresholds"));

        args.relaxed = false;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_on_invalid_maps_to_policy() {
        assert_eq!(
            InvalidRecordPolicy::from(OnInvalid::Abort),
            InvalidRecordPolicy::Abort
        );
        assert_eq!(
            InvalidRecordPolicy::from(OnInvalid::Exclude),
            InvalidRecordPolicy::Exclude
        );
    }

    #[test]
    fn test_stdout_output() {
        let mut args = make_args();
        assert!(!args.writes_to_stdout());
        args.output = Some(PathBuf::from("-"));
        assert!(args.writes_to_stdout());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
