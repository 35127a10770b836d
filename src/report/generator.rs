//! Markdown report generation.
//!
//! This module renders a [`Report`] as a Markdown document or as pretty
//! JSON.

use super::{Report, ReportMetadata};
use crate::models::{
    ClassifiedEmployee, DisparityStats, DistributionBucket, OrgStats, RejectedRecord, TeamComparison,
    TeamSummary,
};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# ImpactLens Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));

    let snapshot = &report.snapshot;
    output.push_str(&generate_summary_section(
        &snapshot.team_filter,
        &snapshot.summary,
        &snapshot.org_stats,
    ));

    if snapshot.is_empty() {
        output.push_str("No contributors match this view.\n\n");
    } else {
        output.push_str(&generate_leaderboard_section(&snapshot.leaderboard));
        output.push_str(&generate_disparity_section(
            &snapshot.disparity_list,
            &snapshot.disparity_stats,
        ));
        output.push_str(&generate_silent_architects_section(&snapshot.employees));
        output.push_str(&generate_distribution_section(&snapshot.distribution));
    }

    output.push_str(&generate_team_comparison_section(&report.teams));
    output.push_str(&generate_excluded_section(&snapshot.excluded));
    output.push_str(&generate_weights_section(&report.weights));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Team:** {}\n", metadata.team_filter));
    section.push_str(&format!(
        "- **Silent Architect Rule:** impact >= {}, activity <= {}\n",
        metadata.thresholds.impact, metadata.thresholds.activity
    ));
    for (team, thresholds) in &metadata.team_overrides {
        section.push_str(&format!(
            "  - {}: impact >= {}, activity <= {}\n",
            team, thresholds.impact, thresholds.activity
        ));
    }
    section.push('\n');

    section
}

/// Generate the KPI table with the organization comparison.
fn generate_summary_section(team_filter: &str, summary: &TeamSummary, org: &OrgStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("| Metric | {} | Organization |\n", team_filter));
    section.push_str("|:---|:---:|:---:|\n");
    section.push_str(&format!(
        "| Avg Impact | {} | {} |\n",
        summary.avg_impact, org.avg_impact
    ));
    section.push_str(&format!(
        "| Avg Activity | {} | {} |\n",
        summary.avg_activity, org.avg_activity
    ));
    section.push_str(&format!(
        "| Employees | {} | {} |\n",
        summary.total, org.total
    ));
    section.push_str(&format!(
        "| Silent Architects | {} | |\n\n",
        summary.silent_count
    ));

    section
}

fn silent_badge(employee: &ClassifiedEmployee) -> &'static str {
    if employee.silent_architect() {
        "🏛️ Yes"
    } else {
        "-"
    }
}

/// Generate the impact leaderboard.
fn generate_leaderboard_section(leaderboard: &[ClassifiedEmployee]) -> String {
    let mut section = String::new();

    section.push_str("## Impact Leaderboard\n\n");
    section.push_str("| # | Name | Team | Impact | Activity | Silent Architect |\n");
    section.push_str("|:---:|:---|:---|:---:|:---:|:---:|\n");

    for (i, employee) in leaderboard.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            i + 1,
            employee.name(),
            employee.team(),
            employee.impact_score(),
            employee.activity_score(),
            silent_badge(employee)
        ));
    }
    section.push('\n');

    section
}

/// Generate the disparity list and gap statistics.
fn generate_disparity_section(list: &[ClassifiedEmployee], stats: &DisparityStats) -> String {
    let mut section = String::new();

    section.push_str("## Impact vs Activity Gap\n\n");
    section.push_str(&format!(
        "*Average gap: {:.1} | High disparity: {} | Silent Architects: {}*\n\n",
        stats.average_gap, stats.high_disparity_count, stats.silent_architect_count
    ));
    section.push_str("| # | Name | Team | Gap | Band |\n");
    section.push_str("|:---:|:---|:---|:---:|:---|\n");

    for (i, employee) in list.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {:+.2} | {} |\n",
            i + 1,
            employee.name(),
            employee.team(),
            employee.disparity_score(),
            employee.disparity_band()
        ));
    }
    section.push('\n');

    section
}

/// Generate a profile block for each Silent Architect in view.
fn generate_silent_architects_section(employees: &[ClassifiedEmployee]) -> String {
    let silent: Vec<_> = employees.iter().filter(|e| e.silent_architect()).collect();
    if silent.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Silent Architects\n\n");

    for employee in silent {
        let role = &employee.employee().role;
        if role.is_empty() {
            section.push_str(&format!("### {} ({})\n\n", employee.name(), employee.team()));
        } else {
            section.push_str(&format!(
                "### {} ({}, {})\n\n",
                employee.name(),
                role,
                employee.team()
            ));
        }
        section.push_str(&format!("{}\n\n", employee.insight_text()));

        if let Some(top) = employee.employee().top_contribution() {
            section.push_str(&format!(
                "> **Top contribution:** {} ({})",
                top.metric, top.score
            ));
            if !top.description.is_empty() {
                section.push_str(&format!(" - {}", top.description));
            }
            section.push_str("\n\n");
        }
    }

    section
}

/// Generate the score distribution table.
fn generate_distribution_section(buckets: &[DistributionBucket]) -> String {
    let mut section = String::new();

    section.push_str("## Score Distribution\n\n");
    section.push_str("| Range | Impact | Activity |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for bucket in buckets {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            bucket.range, bucket.impact, bucket.activity
        ));
    }
    section.push('\n');

    section
}

/// Generate the team-vs-team comparison.
fn generate_team_comparison_section(teams: &[TeamComparison]) -> String {
    if teams.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Team Comparison\n\n");
    section.push_str("| Team | Employees | Avg Impact | Avg Activity | Silent Architects |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|\n");

    for row in teams {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.team,
            row.summary.total,
            row.summary.avg_impact,
            row.summary.avg_activity,
            row.summary.silent_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the list of records left out of the metrics.
fn generate_excluded_section(excluded: &[RejectedRecord]) -> String {
    if excluded.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Excluded Records\n\n");
    section.push_str(&format!(
        "⚠️ {} record(s) were left out of every metric above.\n\n",
        excluded.len()
    ));
    section.push_str("| ID | Name | Team | Reason |\n");
    section.push_str("|:---|:---|:---|:---|\n");

    for record in excluded {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            record.id, record.name, record.team, record.error
        ));
    }
    section.push('\n');

    section
}

/// Generate the scoring weights table.
fn generate_weights_section(weights: &BTreeMap<String, f64>) -> String {
    if weights.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Scoring Weights\n\n");
    section.push_str("| Metric | Weight |\n");
    section.push_str("|:---|:---:|\n");

    let mut rows: Vec<_> = weights.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    for (metric, weight) in rows {
        section.push_str(&format!("| {} | {:.0}% |\n", metric, weight * 100.0));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by ImpactLens*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
