//! ImpactLens - Silent Architect detection for engineering organizations
//!
//! A CLI tool that loads employee impact/activity scores from a JSON file
//! or the metrics API and generates a team metrics report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, fetch, invalid records under --on-invalid abort)
//!   2 - Records were excluded and --fail-on-invalid is set

use anyhow::{Context, Result};
use impactlens::analysis::{available_teams, get_snapshot, teams_overview, SnapshotOptions, TeamFilter};
use impactlens::cli::{Args, OutputFormat};
use impactlens::config::{Config, CONFIG_FILE_NAME};
use impactlens::models::EmployeeRecord;
use impactlens::provider::{self, ApiClient};
use impactlens::report::{self, Report};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("ImpactLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_report(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .impactlens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize thresholds, weights, and snapshot sizes.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete report workflow. Returns exit code (0 or 2).
async fn run_report(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config
        .validate()
        .context("Invalid configuration after applying command-line options")?;

    // Progress lines would corrupt a report written to stdout.
    let chatty = !args.quiet && !args.writes_to_stdout();

    let (records, source) = fetch_records(&args, &mut config, chatty).await?;

    if args.list_teams {
        for team in available_teams(&records) {
            println!("{}", team);
        }
        return Ok(0);
    }

    let filter = TeamFilter::parse(&config.general.team);
    let options = SnapshotOptions::from(&config.snapshot);

    if chatty {
        println!("🔬 Classifying {} records for {}...", records.len(), filter);
    }

    let snapshot = get_snapshot(&records, &filter, &config.thresholds, &options)
        .context("Failed to compute metrics snapshot")?;
    let teams = teams_overview(&records, &config.thresholds);

    if snapshot.is_empty() {
        warn!("No employees matched team filter '{}'", filter);
    }

    let excluded = snapshot.excluded.len();
    let summary = snapshot.summary;
    let report = Report::new(&source, &filter, &config.thresholds, snapshot, teams);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    if args.writes_to_stdout() {
        println!("{}", output);
    } else {
        let path = Path::new(&config.general.output);
        report::write_report(&output, path)?;
    }

    if chatty {
        println!("\n📊 Summary for {}:", filter);
        println!("   Employees: {}", summary.total);
        println!(
            "   Avg impact: {} | Avg activity: {}",
            summary.avg_impact, summary.avg_activity
        );
        println!("   🏛️  Silent Architects: {}", summary.silent_count);
        if excluded > 0 {
            println!("   ⚠️  Excluded records: {}", excluded);
        }
        println!("\n✅ Report saved to: {}", config.general.output);
    }

    if args.fail_on_invalid && excluded > 0 {
        eprintln!(
            "\n⛔ {} record(s) had invalid scores. Failing (exit code 2).",
            excluded
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load records from the input file or the API. Returns the records and a
/// description of where they came from.
async fn fetch_records(
    args: &Args,
    config: &mut Config,
    chatty: bool,
) -> Result<(Vec<EmployeeRecord>, String)> {
    if let Some(ref input) = args.input {
        if chatty {
            println!("📂 Loading records: {}", input.display());
        }
        let records = provider::load_records(input)
            .await
            .with_context(|| format!("Failed to load records from {}", input.display()))?;
        return Ok((records, input.display().to_string()));
    }

    let api_url = config.source.api_url.clone().with_context(|| {
        format!(
            "No data source: pass --input or --api-url, or set [source] api_url in {}",
            CONFIG_FILE_NAME
        )
    })?;

    let client = ApiClient::new(&api_url, config.source.timeout_seconds)?;

    let spinner = chatty.then(|| fetch_spinner(client.base_url()));

    // The organization comparison needs every record, so the API is never
    // asked to filter by team.
    let fetched = if args.remote_thresholds {
        client
            .fetch_all(&TeamFilter::All)
            .await
            .map(|(records, thresholds)| (records, Some(thresholds)))
    } else {
        client
            .fetch_records(&TeamFilter::All)
            .await
            .map(|records| (records, None))
    };

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let (records, remote_thresholds) =
        fetched.with_context(|| format!("Failed to fetch records from {}", api_url))?;

    if let Some(thresholds) = remote_thresholds {
        info!(
            "Using server thresholds: impact >= {}, activity <= {}",
            thresholds.impact, thresholds.activity
        );
        config.thresholds.set_default_thresholds(thresholds);
        config
            .thresholds
            .validate()
            .context("Server returned unusable thresholds")?;
    }

    Ok((records, client.base_url().to_string()))
}

fn fetch_spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Fetching records from {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load configuration from file or use defaults.
///
/// A config file that exists but is invalid fails the run, whether it was
/// passed with -c or found in the working directory.
fn load_config(args: &Args) -> Result<Config> {
    Config::resolve(args.config.as_deref(), Path::new(CONFIG_FILE_NAME))
}
