//! Score distribution histograms.

use crate::models::{ClassifiedEmployee, DistributionBucket};

/// Inclusive `(low, high)` bounds of the five histogram buckets.
pub const BUCKET_BOUNDS: [(u32, u32); 5] = [(0, 20), (21, 40), (41, 60), (61, 80), (81, 100)];

/// Bucket index for a score.
///
/// A score belongs to the first bucket whose upper bound it does not
/// exceed, so 20 lands in "0-20" and 20.5 in "21-40". Scores above 80
/// (including anything over 100) land in the last bucket, negative scores
/// in the first.
pub fn bucket_index(score: f64) -> usize {
    BUCKET_BOUNDS
        .iter()
        .position(|&(_, high)| score <= f64::from(high))
        .unwrap_or(BUCKET_BOUNDS.len() - 1)
}

/// Count impact and activity scores per bucket.
///
/// Always returns all five buckets in ascending order.
pub fn bucket(employees: &[ClassifiedEmployee]) -> Vec<DistributionBucket> {
    let mut impact = [0usize; BUCKET_BOUNDS.len()];
    let mut activity = [0usize; BUCKET_BOUNDS.len()];

    for employee in employees {
        impact[bucket_index(employee.impact_score())] += 1;
        activity[bucket_index(employee.activity_score())] += 1;
    }

    BUCKET_BOUNDS
        .iter()
        .enumerate()
        .map(|(i, &(low, high))| DistributionBucket {
            range: format!("{}-{}", low, high),
            low,
            high,
            activity: activity[i],
            impact: impact[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::{classify_employee, Thresholds};
    use crate::models::{Employee, EmployeeId};

    fn employee(impact: f64, activity: f64) -> ClassifiedEmployee {
        classify_employee(
            Employee {
                id: EmployeeId::Number(1),
                name: "Test".to_string(),
                role: String::new(),
                team: "Engineering".to_string(),
                impact_score: impact,
                activity_score: activity,
                impact_breakdown: Vec::new(),
            },
            &Thresholds::strict(),
        )
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(20.0), 0);
        assert_eq!(bucket_index(20.5), 1);
        assert_eq!(bucket_index(21.0), 1);
        assert_eq!(bucket_index(40.0), 1);
        assert_eq!(bucket_index(60.0), 2);
        assert_eq!(bucket_index(80.0), 3);
        assert_eq!(bucket_index(81.0), 4);
        assert_eq!(bucket_index(100.0), 4);
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        assert_eq!(bucket_index(-15.0), 0);
        assert_eq!(bucket_index(250.0), 4);
    }

    #[test]
    fn test_impact_scenario() {
        let employees = vec![
            employee(0.0, 50.0),
            employee(20.0, 50.0),
            employee(21.0, 50.0),
            employee(100.0, 50.0),
        ];
        let buckets = bucket(&employees);
        let impact: Vec<usize> = buckets.iter().map(|b| b.impact).collect();
        assert_eq!(impact, vec![2, 1, 0, 0, 1]);
    }

    #[test]
    fn test_empty_input_keeps_all_buckets() {
        let buckets = bucket(&[]);
        let ranges: Vec<&str> = buckets.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(ranges, vec!["0-20", "21-40", "41-60", "61-80", "81-100"]);
        assert!(buckets.iter().all(|b| b.impact == 0 && b.activity == 0));
    }

    #[test]
    fn test_every_employee_counted_once_per_score() {
        let employees: Vec<_> = (0..=25)
            .map(|i| employee(i as f64 * 4.0, 100.0 - i as f64 * 4.0))
            .collect();
        let buckets = bucket(&employees);
        assert_eq!(buckets.iter().map(|b| b.impact).sum::<usize>(), employees.len());
        assert_eq!(buckets.iter().map(|b| b.activity).sum::<usize>(), employees.len());
    }

    #[test]
    fn test_scores_land_independently() {
        let buckets = bucket(&[employee(92.0, 45.0)]);
        assert_eq!(buckets[4].impact, 1);
        assert_eq!(buckets[2].activity, 1);
        assert_eq!(buckets[4].activity, 0);
    }
}
