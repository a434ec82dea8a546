//! Metrics engine: scalar and grouped aggregates over any row subset.
//! Pure functions of their input; a snapshot is produced fresh each time
//! and never mutated in place.

use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

use crate::dataset::ResourceRecord;

/// Aggregate figures for a dataset view at a point in time.
///
/// Rows whose `Tagged` value is anything other than exactly "Yes" or "No"
/// are excluded from both the tagged and untagged buckets, so
/// `tagged_resources + untagged_resources <= total_resources`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_resources: usize,
    pub tagged_resources: usize,
    pub untagged_resources: usize,
    /// tagged / total × 100; 0 when the view is empty.
    pub tagging_rate: f64,
    pub total_cost: f64,
    pub tagged_cost: f64,
    pub untagged_cost: f64,
    /// untagged cost / total cost × 100; 0 when total cost is 0.
    pub untagged_cost_pct: f64,
    /// Mean completeness score across all rows; 0 when the view is empty.
    pub avg_completeness: f64,
}

impl MetricsSnapshot {
    pub fn compute<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a ResourceRecord>,
    {
        let mut total_resources = 0usize;
        let mut tagged_resources = 0usize;
        let mut untagged_resources = 0usize;
        let mut total_cost = 0.0f64;
        let mut tagged_cost = 0.0f64;
        let mut untagged_cost = 0.0f64;
        let mut score_sum = 0.0f64;

        for record in rows {
            total_resources += 1;
            let cost = record.cost_or_zero();
            total_cost += cost;
            score_sum += f64::from(record.tag_completeness_score);

            if record.is_tagged_yes() {
                tagged_resources += 1;
                tagged_cost += cost;
            } else if record.is_tagged_no() {
                untagged_resources += 1;
                untagged_cost += cost;
            }
        }

        Self {
            total_resources,
            tagged_resources,
            untagged_resources,
            tagging_rate: rate(tagged_resources as f64, total_resources as f64),
            total_cost,
            tagged_cost,
            untagged_cost,
            untagged_cost_pct: rate(untagged_cost, total_cost),
            avg_completeness: if total_resources == 0 {
                0.0
            } else {
                score_sum / total_resources as f64
            },
        }
    }
}

/// x / denominator × 100, with x/0 defined as 0.
fn rate(x: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        x / denominator * 100.0
    } else {
        0.0
    }
}

/// The categorical columns grouped rollups are offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupBy {
    Department,
    Service,
    Environment,
}

impl GroupBy {
    fn key<'a>(&self, record: &'a ResourceRecord) -> Option<&'a str> {
        match self {
            GroupBy::Department => record.department.as_deref(),
            GroupBy::Service => record.service.as_deref(),
            GroupBy::Environment => record.environment.as_deref(),
        }
    }
}

/// One group of a rollup: count, cost sum and per-group tagging rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRollup {
    pub key: String,
    pub resource_count: usize,
    pub total_cost: f64,
    pub tagging_rate: f64,
}

#[derive(Default)]
struct GroupAccumulator {
    count: usize,
    cost: f64,
    tagged: usize,
}

/// Group a view by one categorical column. Rows whose group key is absent
/// are excluded from the rollup. Result is sorted by cost sum descending,
/// key ascending as tie-break, for presentation consumers.
pub fn rollup<'a, I>(rows: I, group: GroupBy) -> Vec<GroupRollup>
where
    I: IntoIterator<Item = &'a ResourceRecord>,
{
    let mut groups: HashMap<String, GroupAccumulator> = HashMap::new();

    for record in rows {
        let Some(key) = group.key(record) else {
            continue;
        };
        let acc = groups.entry(key.to_string()).or_default();
        acc.count += 1;
        acc.cost += record.cost_or_zero();
        if record.is_tagged_yes() {
            acc.tagged += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| GroupRollup {
            key,
            resource_count: acc.count,
            total_cost: acc.cost,
            tagging_rate: rate(acc.tagged as f64, acc.count as f64),
        })
        .sorted_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::loader::load_str;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn base() -> Dataset {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,100,No,,,,,
R2,S3,us-west-2,50,Yes,Eng,X,Prod,bob,CC1
";
        load_str(csv).unwrap().dataset
    }

    #[test]
    fn snapshot_matches_reference_scenario() {
        let m = MetricsSnapshot::compute(base().iter());

        assert_eq!(m.total_resources, 2);
        assert_eq!(m.tagged_resources, 1);
        assert_eq!(m.untagged_resources, 1);
        assert!(approx(m.total_cost, 150.0));
        assert!(approx(m.tagged_cost, 50.0));
        assert!(approx(m.untagged_cost, 100.0));
        assert!(approx(m.tagging_rate, 50.0));
        assert!((m.untagged_cost_pct - 66.67).abs() < 0.01);
        assert!(approx(m.avg_completeness, 2.5));
    }

    #[test]
    fn empty_view_yields_all_zero_snapshot() {
        let m = MetricsSnapshot::compute(std::iter::empty());

        assert_eq!(m.total_resources, 0);
        assert!(approx(m.tagging_rate, 0.0));
        assert!(approx(m.untagged_cost_pct, 0.0));
        assert!(approx(m.avg_completeness, 0.0));
    }

    #[test]
    fn non_yes_no_tagged_values_are_excluded_from_both_buckets() {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,100,Unknown,,,,,
R2,S3,us-west-2,50,Yes,,,,,
R3,S3,us-west-2,25,,,,,,
";
        let ds = load_str(csv).unwrap().dataset;
        let m = MetricsSnapshot::compute(ds.iter());

        assert_eq!(m.total_resources, 3);
        assert_eq!(m.tagged_resources, 1);
        assert_eq!(m.untagged_resources, 0);
        assert!(m.tagged_resources + m.untagged_resources <= m.total_resources);
        assert!(approx(m.total_cost, 175.0));
        assert!(approx(m.untagged_cost, 0.0));
    }

    #[test]
    fn missing_cost_counts_as_zero_in_sums() {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,,No,,,,,
R2,S3,us-west-2,50,Yes,,,,,
";
        let ds = load_str(csv).unwrap().dataset;
        let m = MetricsSnapshot::compute(ds.iter());

        assert!(approx(m.total_cost, 50.0));
        assert!(approx(m.untagged_cost, 0.0));
        assert!(approx(m.untagged_cost_pct, 0.0));
    }

    #[test]
    fn rollup_sorts_by_cost_descending() {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,10,Yes,Eng,,,,
R2,EC2,us-east-1,200,No,Finance,,,,
R3,S3,us-west-2,30,Yes,Eng,,,,
R4,RDS,us-east-1,5,No,,,,,
";
        let ds = load_str(csv).unwrap().dataset;
        let groups = rollup(ds.iter(), GroupBy::Department);

        // R4 has no department and is excluded from this rollup.
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Finance");
        assert_eq!(groups[0].resource_count, 1);
        assert!(approx(groups[0].total_cost, 200.0));
        assert!(approx(groups[0].tagging_rate, 0.0));

        assert_eq!(groups[1].key, "Eng");
        assert_eq!(groups[1].resource_count, 2);
        assert!(approx(groups[1].total_cost, 40.0));
        assert!(approx(groups[1].tagging_rate, 100.0));
    }

    #[test]
    fn rollup_by_service_covers_every_row_with_a_service() {
        let ds = base();
        let groups = rollup(ds.iter(), GroupBy::Service);
        let total: usize = groups.iter().map(|g| g.resource_count).sum();
        assert_eq!(total, ds.len());
    }

    #[test]
    fn rollup_tie_break_is_key_ascending() {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,10,Yes,,,Prod,,
R2,S3,us-east-1,10,Yes,,,Dev,,
";
        let ds = load_str(csv).unwrap().dataset;
        let groups = rollup(ds.iter(), GroupBy::Environment);
        assert_eq!(groups[0].key, "Dev");
        assert_eq!(groups[1].key, "Prod");
    }
}
