//! Team and organization aggregation.
//!
//! This module computes summaries, rankings and gap statistics over
//! classified employees. Every function is a pure function of its input
//! slice; nothing is cached between calls.

use crate::models::{
    ClassifiedEmployee, DisparityStats, EmployeeRecord, OrgStats, TeamComparison, TeamSummary,
    ALL_TEAMS,
};
use std::collections::{BTreeMap, BTreeSet};

/// Default gap above which an employee counts as high-disparity.
pub const DEFAULT_HIGH_DISPARITY_GAP: f64 = 20.0;

/// Round half-up to the nearest integer (`68.5 -> 69`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Running sums for a summary.
///
/// Partial accumulators over disjoint chunks can be merged. Counts are exact
/// in any merge order. Score sums are `f64`, so merge order only gives
/// identical averages when every score is a whole number. With fractional
/// scores the sums can differ in the last bit, which may move a mean that
/// sits exactly on `.5` to the other side of the rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryAccumulator {
    impact_sum: f64,
    activity_sum: f64,
    silent_count: usize,
    total: usize,
}

impl SummaryAccumulator {
    pub fn push(&mut self, employee: &ClassifiedEmployee) {
        self.impact_sum += employee.impact_score();
        self.activity_sum += employee.activity_score();
        if employee.silent_architect() {
            self.silent_count += 1;
        }
        self.total += 1;
    }

    pub fn merge(mut self, other: SummaryAccumulator) -> Self {
        self.impact_sum += other.impact_sum;
        self.activity_sum += other.activity_sum;
        self.silent_count += other.silent_count;
        self.total += other.total;
        self
    }

    /// Finish into a summary. An empty accumulator yields all zeros.
    pub fn finish(&self) -> TeamSummary {
        if self.total == 0 {
            return TeamSummary::default();
        }

        let count = self.total as f64;
        TeamSummary {
            avg_impact: round_half_up(self.impact_sum / count),
            avg_activity: round_half_up(self.activity_sum / count),
            silent_count: self.silent_count,
            total: self.total,
        }
    }
}

impl<'a> FromIterator<&'a ClassifiedEmployee> for SummaryAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedEmployee>>(iter: I) -> Self {
        let mut acc = SummaryAccumulator::default();
        for employee in iter {
            acc.push(employee);
        }
        acc
    }
}

/// Summarize a list of employees.
pub fn aggregate(employees: &[ClassifiedEmployee]) -> TeamSummary {
    employees.iter().collect::<SummaryAccumulator>().finish()
}

/// Organization-wide averages over the unfiltered set.
pub fn org_stats(all: &[ClassifiedEmployee]) -> OrgStats {
    let summary = aggregate(all);
    OrgStats {
        avg_impact: summary.avg_impact,
        avg_activity: summary.avg_activity,
        total: summary.total,
    }
}

/// Top `n` employees by impact score, highest first.
///
/// The sort is stable: equal scores keep their input order.
pub fn leaderboard(employees: &[ClassifiedEmployee], n: usize) -> Vec<ClassifiedEmployee> {
    top_by(employees, n, |e| e.impact_score())
}

/// Top `n` employees by disparity score, highest first.
pub fn disparity_list(employees: &[ClassifiedEmployee], n: usize) -> Vec<ClassifiedEmployee> {
    top_by(employees, n, |e| e.disparity_score())
}

fn top_by<F>(employees: &[ClassifiedEmployee], n: usize, key: F) -> Vec<ClassifiedEmployee>
where
    F: Fn(&ClassifiedEmployee) -> f64,
{
    let mut sorted: Vec<ClassifiedEmployee> = employees.to_vec();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(n);
    sorted
}

/// One summary per team, ordered by team name.
pub fn team_comparison(all: &[ClassifiedEmployee]) -> Vec<TeamComparison> {
    let mut by_team: BTreeMap<&str, SummaryAccumulator> = BTreeMap::new();

    for employee in all {
        by_team.entry(employee.team()).or_default().push(employee);
    }

    by_team
        .into_iter()
        .map(|(team, acc)| TeamComparison {
            team: team.to_string(),
            summary: acc.finish(),
        })
        .collect()
}

/// Gap statistics for the disparity view.
///
/// `high_gap` is exclusive: a gap must be strictly greater to count.
pub fn disparity_stats(employees: &[ClassifiedEmployee], high_gap: f64) -> DisparityStats {
    if employees.is_empty() {
        return DisparityStats::default();
    }

    let total_gap: f64 = employees.iter().map(|e| e.disparity_score()).sum();
    let average = total_gap / employees.len() as f64;

    DisparityStats {
        average_gap: (average * 10.0).round() / 10.0 + 0.0,
        high_disparity_count: employees
            .iter()
            .filter(|e| e.disparity_score() > high_gap)
            .count(),
        silent_architect_count: employees.iter().filter(|e| e.silent_architect()).count(),
    }
}

/// Team names for a selector: the sentinel first, then sorted distinct names.
pub fn available_teams(records: &[EmployeeRecord]) -> Vec<String> {
    let names: BTreeSet<&str> = records.iter().map(|r| r.team.as_str()).collect();

    std::iter::once(ALL_TEAMS)
        .chain(names)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::{classify_employee, Thresholds};
    use crate::models::{Employee, EmployeeId, RawScore};

    fn employee(id: u64, team: &str, impact: f64, activity: f64) -> ClassifiedEmployee {
        classify_employee(
            Employee {
                id: EmployeeId::Number(id),
                name: format!("Employee {}", id),
                role: "Engineer".to_string(),
                team: team.to_string(),
                impact_score: impact,
                activity_score: activity,
                impact_breakdown: Vec::new(),
            },
            &Thresholds::strict(),
        )
    }

    fn ids(employees: &[ClassifiedEmployee]) -> Vec<String> {
        employees.iter().map(|e| e.id().to_string()).collect()
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(
            aggregate(&[]),
            TeamSummary {
                avg_impact: 0,
                avg_activity: 0,
                silent_count: 0,
                total: 0
            }
        );
    }

    #[test]
    fn test_aggregate_scenario() {
        let employees = vec![
            employee(1, "Engineering", 92.0, 45.0),
            employee(2, "Engineering", 45.0, 85.0),
        ];
        let summary = aggregate(&employees);
        assert_eq!(summary.avg_impact, 69);
        assert_eq!(summary.avg_activity, 65);
        assert_eq!(summary.silent_count, 1);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(68.5), 69);
        assert_eq!(round_half_up(68.49), 68);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(0.0), 0);
    }

    #[test]
    fn test_mean_is_bounded_by_scores() {
        let employees = vec![
            employee(1, "A", 12.3, 0.0),
            employee(2, "A", 77.7, 0.0),
            employee(3, "A", 41.0, 0.0),
            employee(4, "A", 55.5, 0.0),
        ];
        let avg = aggregate(&employees).avg_impact as f64;
        assert!(avg >= 12.3 - 0.5 && avg <= 77.7 + 0.5);
    }

    #[test]
    fn test_accumulator_merge_matches_single_pass() {
        let employees = vec![
            employee(1, "A", 90.0, 40.0),
            employee(2, "A", 30.0, 70.0),
            employee(3, "B", 60.0, 20.0),
            employee(4, "B", 86.0, 50.0),
        ];
        let left: SummaryAccumulator = employees[..1].iter().collect();
        let right: SummaryAccumulator = employees[1..].iter().collect();

        assert_eq!(left.merge(right).finish(), aggregate(&employees));
        assert_eq!(right.merge(left).finish(), aggregate(&employees));
    }

    #[test]
    fn test_accumulator_merge_fractional_scores_keeps_counts() {
        let employees = vec![
            employee(1, "A", 0.1, 90.0),
            employee(2, "A", 0.2, 10.0),
            employee(3, "B", 0.3, 20.0),
            employee(4, "B", 88.4, 45.5),
        ];
        let single: SummaryAccumulator = employees.iter().collect();
        let left: SummaryAccumulator = employees[..2].iter().collect();
        let right: SummaryAccumulator = employees[2..].iter().collect();

        for merged in [left.merge(right), right.merge(left)] {
            assert_eq!(merged.total, single.total);
            assert_eq!(merged.silent_count, single.silent_count);
            assert!((merged.impact_sum - single.impact_sum).abs() < 1e-9);
            assert!((merged.activity_sum - single.activity_sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_leaderboard_is_stable() {
        let employees = vec![
            employee(1, "A", 70.0, 10.0),
            employee(2, "A", 90.0, 10.0),
            employee(3, "A", 70.0, 20.0),
            employee(4, "A", 90.0, 30.0),
            employee(5, "A", 50.0, 30.0),
        ];

        let board = leaderboard(&employees, 4);
        assert_eq!(ids(&board), vec!["2", "4", "1", "3"]);
        assert_eq!(ids(&leaderboard(&board, 4)), ids(&board));
    }

    #[test]
    fn test_leaderboard_size_is_a_parameter() {
        let employees: Vec<_> = (0..10)
            .map(|i| employee(i, "A", i as f64 * 10.0, 0.0))
            .collect();
        assert_eq!(leaderboard(&employees, 5).len(), 5);
        assert_eq!(leaderboard(&employees, 8).len(), 8);
        assert_eq!(leaderboard(&employees, 50).len(), 10);
        assert_eq!(leaderboard(&employees, 5)[0].impact_score(), 90.0);
    }

    #[test]
    fn test_disparity_list_orders_by_gap() {
        let employees = vec![
            employee(1, "A", 50.0, 50.0),
            employee(2, "A", 95.0, 30.0),
            employee(3, "A", 45.0, 85.0),
            employee(4, "A", 92.0, 45.0),
        ];
        let list = disparity_list(&employees, 3);
        assert_eq!(ids(&list), vec!["2", "4", "1"]);
    }

    #[test]
    fn test_team_comparison_is_sorted_by_team() {
        let employees = vec![
            employee(1, "Product", 88.0, 90.0),
            employee(2, "Engineering", 92.0, 45.0),
            employee(3, "Engineering", 45.0, 85.0),
            employee(4, "Design", 95.0, 30.0),
        ];
        let rows = team_comparison(&employees);
        let teams: Vec<_> = rows.iter().map(|r| r.team.as_str()).collect();
        assert_eq!(teams, vec!["Design", "Engineering", "Product"]);
        assert_eq!(rows[1].summary.avg_impact, 69);
        assert_eq!(rows[0].summary.silent_count, 1);
    }

    #[test]
    fn test_disparity_stats() {
        let employees = vec![
            employee(1, "A", 92.0, 45.0),
            employee(2, "A", 45.0, 85.0),
            employee(3, "A", 95.0, 30.0),
        ];
        let stats = disparity_stats(&employees, DEFAULT_HIGH_DISPARITY_GAP);
        assert_eq!(stats.average_gap, 24.0);
        assert_eq!(stats.high_disparity_count, 2);
        assert_eq!(stats.silent_architect_count, 2);

        assert_eq!(disparity_stats(&[], 20.0), DisparityStats::default());
    }

    #[test]
    fn test_available_teams() {
        let record = |team: &str| EmployeeRecord {
            id: EmployeeId::Number(1),
            name: "X".to_string(),
            role: String::new(),
            team: team.to_string(),
            impact_score: Some(RawScore::from(1.0)),
            activity_score: Some(RawScore::from(1.0)),
            impact_breakdown: Vec::new(),
            silent_architect: None,
        };
        let teams = available_teams(&[record("Product"), record("Design"), record("Product")]);
        assert_eq!(teams, vec!["All Teams", "Design", "Product"]);
    }
}
