//! Typed resource inventory: one record per cloud resource, plus the
//! dataset-level views the filter and remediation engines work against.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::schema;

/// One row of the inventory. Absent values (blank or whitespace-only cells
/// in the source) are `None`, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_id: String,
    pub service: Option<String>,
    pub region: Option<String>,
    pub monthly_cost: Option<f64>,
    /// Independent ingestion-supplied flag. Only exact "Yes"/"No" count as
    /// tagged/untagged in metrics; any other value is carried through as-is.
    pub tagged: Option<String>,
    pub department: Option<String>,
    pub project: Option<String>,
    pub environment: Option<String>,
    pub owner: Option<String>,
    pub cost_center: Option<String>,
    /// Count of present tag fields, 0..=5. Derived; recomputed whenever
    /// tag fields change.
    pub tag_completeness_score: u8,
    pub tag_completeness_pct: f64,
}

impl ResourceRecord {
    /// The five governance tag fields, in schema order.
    pub fn tag_fields(&self) -> [&Option<String>; 5] {
        [
            &self.department,
            &self.project,
            &self.environment,
            &self.owner,
            &self.cost_center,
        ]
    }

    /// Recompute the derived completeness columns from the current tag
    /// field presence.
    pub fn recompute_completeness(&mut self) {
        let score = self.tag_fields().iter().filter(|f| f.is_some()).count() as u8;
        self.tag_completeness_score = score;
        self.tag_completeness_pct = f64::from(score) / schema::TAG_FIELDS.len() as f64 * 100.0;
    }

    pub fn is_tagged_yes(&self) -> bool {
        self.tagged.as_deref() == Some("Yes")
    }

    pub fn is_tagged_no(&self) -> bool {
        self.tagged.as_deref() == Some("No")
    }

    /// Cost contribution for summation: absent cost counts as zero. The
    /// loader surfaces absent costs separately.
    pub fn cost_or_zero(&self) -> f64 {
        self.monthly_cost.unwrap_or(0.0)
    }
}

/// An in-memory inventory. Row order is irrelevant to every computation in
/// this crate; uniqueness is by `resource_id` after duplicate removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<ResourceRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceRecord> {
        self.records.iter()
    }

    /// Rows offered on the remediation edit surface: exactly those with
    /// `Tagged = No`.
    pub fn untagged(&self) -> Vec<&ResourceRecord> {
        self.records.iter().filter(|r| r.is_tagged_no()).collect()
    }

    /// Index from resource id to the positions of every row carrying it.
    /// Duplicate ids (possible when upstream uniqueness was violated) map
    /// to multiple positions.
    pub fn index_by_id(&self) -> HashMap<&str, Vec<usize>> {
        let mut index: HashMap<&str, Vec<usize>> = HashMap::new();
        for (pos, record) in self.records.iter().enumerate() {
            index.entry(record.resource_id.as_str()).or_default().push(pos);
        }
        index
    }

    /// Sorted distinct present values of one column, for filter dropdowns.
    pub fn distinct_values<F>(&self, column: F) -> Vec<String>
    where
        F: Fn(&ResourceRecord) -> Option<&str>,
    {
        self.records
            .iter()
            .filter_map(|r| column(r))
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ResourceRecord {
        ResourceRecord {
            resource_id: id.to_string(),
            service: Some("EC2".to_string()),
            region: Some("us-east-1".to_string()),
            monthly_cost: Some(10.0),
            tagged: Some("No".to_string()),
            department: None,
            project: None,
            environment: None,
            owner: None,
            cost_center: None,
            tag_completeness_score: 0,
            tag_completeness_pct: 0.0,
        }
    }

    #[test]
    fn completeness_counts_only_present_tag_fields() {
        let mut r = record("R1");
        r.department = Some("Eng".to_string());
        r.owner = Some("alice".to_string());
        r.recompute_completeness();
        assert_eq!(r.tag_completeness_score, 2);
        assert!((r.tag_completeness_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn completeness_full_and_empty() {
        let mut r = record("R1");
        r.recompute_completeness();
        assert_eq!(r.tag_completeness_score, 0);

        r.department = Some("Eng".to_string());
        r.project = Some("X".to_string());
        r.environment = Some("Prod".to_string());
        r.owner = Some("bob".to_string());
        r.cost_center = Some("CC1".to_string());
        r.recompute_completeness();
        assert_eq!(r.tag_completeness_score, 5);
        assert!((r.tag_completeness_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn untagged_view_returns_only_no_rows() {
        let mut tagged = record("R2");
        tagged.tagged = Some("Yes".to_string());
        let mut odd = record("R3");
        odd.tagged = Some("Unknown".to_string());
        let ds = Dataset::new(vec![record("R1"), tagged, odd]);

        let untagged = ds.untagged();
        assert_eq!(untagged.len(), 1);
        assert_eq!(untagged[0].resource_id, "R1");
    }

    #[test]
    fn index_by_id_groups_duplicate_ids() {
        let ds = Dataset::new(vec![record("R1"), record("R2"), record("R1")]);
        let index = ds.index_by_id();
        assert_eq!(index["R1"], vec![0, 2]);
        assert_eq!(index["R2"], vec![1]);
    }

    #[test]
    fn distinct_values_sorts_and_dedups() {
        let mut a = record("R1");
        a.region = Some("us-west-2".to_string());
        let b = record("R2");
        let mut c = record("R3");
        c.region = None;
        let ds = Dataset::new(vec![a, b.clone(), b, c]);

        let regions = ds.distinct_values(|r| r.region.as_deref());
        assert_eq!(regions, vec!["us-east-1".to_string(), "us-west-2".to_string()]);
    }
}
