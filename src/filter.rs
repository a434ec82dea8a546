//! Filter engine: a conjunction of optional equality predicates over the
//! categorical columns, producing a read-only view of a dataset.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dataset::{Dataset, ResourceRecord};

/// Reserved sentinel meaning "unconstrained" for a filterable column.
/// Distinguishable from any real category value by convention with the
/// data producers.
pub const ALL: &str = "All";

/// Equality predicates over the four filterable columns. `None` means
/// unconstrained; predicates compose by logical AND with exact string
/// equality (no case folding, no partial match).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub service: Option<String>,
    pub region: Option<String>,
    pub department: Option<String>,
    pub environment: Option<String>,
}

impl FilterSet {
    /// Build a filter from UI-style selections where the `"All"` sentinel
    /// (or an empty selection) means unconstrained.
    pub fn from_selections(
        service: &str,
        region: &str,
        department: &str,
        environment: &str,
    ) -> Self {
        Self {
            service: selection(service),
            region: selection(region),
            department: selection(department),
            environment: selection(environment),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.service.is_none()
            && self.region.is_none()
            && self.department.is_none()
            && self.environment.is_none()
    }

    pub fn matches(&self, record: &ResourceRecord) -> bool {
        column_matches(&self.service, &record.service)
            && column_matches(&self.region, &record.region)
            && column_matches(&self.department, &record.department)
            && column_matches(&self.environment, &record.environment)
    }

    /// Apply the conjunction to a dataset, returning a read-only view.
    /// An empty result is well-defined, not an error; it is logged so the
    /// caller can distinguish "no matches" from meaningful zeros.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a ResourceRecord> {
        let view: Vec<&ResourceRecord> =
            dataset.iter().filter(|r| self.matches(r)).collect();
        if view.is_empty() && !dataset.is_empty() {
            warn!(filter = ?self, "filter matched zero resources");
        }
        view
    }
}

fn selection(value: &str) -> Option<String> {
    if value == ALL || value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn column_matches(predicate: &Option<String>, value: &Option<String>) -> bool {
    match predicate {
        None => true,
        Some(required) => value.as_deref() == Some(required.as_str()),
    }
}

/// Dropdown options for one filterable column: the sorted distinct present
/// values, with the `"All"` sentinel prepended.
pub fn filter_options<F>(dataset: &Dataset, column: F) -> Vec<String>
where
    F: Fn(&ResourceRecord) -> Option<&str>,
{
    let mut options = vec![ALL.to_string()];
    options.extend(dataset.distinct_values(column));
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;

    fn base() -> Dataset {
        let csv = "\
ResourceID,Service,Region,MonthlyCostUSD,Tagged,Department,Project,Environment,Owner,CostCenter
R1,EC2,us-east-1,100,No,,,,,
R2,S3,us-west-2,50,Yes,Eng,X,Prod,bob,CC1
R3,EC2,us-west-2,25,Yes,Finance,,Dev,,
";
        load_str(csv).unwrap().dataset
    }

    #[test]
    fn all_sentinel_is_unconstrained() {
        let filter = FilterSet::from_selections(ALL, ALL, ALL, ALL);
        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&base()).len(), 3);
    }

    #[test]
    fn predicates_compose_by_and() {
        let ds = base();
        let filter = FilterSet::from_selections("EC2", "us-west-2", ALL, ALL);
        let view = filter.apply(&ds);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].resource_id, "R3");
    }

    #[test]
    fn equality_is_exact_no_case_folding() {
        let filter = FilterSet::from_selections("ec2", ALL, ALL, ALL);
        assert!(filter.apply(&base()).is_empty());
    }

    #[test]
    fn absent_column_value_never_matches_a_concrete_predicate() {
        let ds = base();
        let filter = FilterSet::from_selections(ALL, ALL, "Eng", ALL);
        let view = filter.apply(&ds);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].resource_id, "R2");
    }

    #[test]
    fn zero_matches_is_an_empty_view_not_an_error() {
        let filter = FilterSet::from_selections(ALL, "eu-central-1", ALL, ALL);
        assert!(filter.apply(&base()).is_empty());
    }

    #[test]
    fn options_prepend_the_all_sentinel() {
        let options = filter_options(&base(), |r| r.department.as_deref());
        assert_eq!(options, vec!["All", "Eng", "Finance"]);
    }
}
