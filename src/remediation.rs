//! Remediation merge engine: applies operator-supplied tag edits to a base
//! dataset and produces a new dataset plus a before/after comparison.
//!
//! The merge never mutates the base dataset, so the "before" metrics stay
//! computable after the merge. Edits overwrite exactly the six editable
//! columns (the five tag fields and the `Tagged` flag); id, service, region
//! and cost are read-only on the edit surface and are never touched here,
//! even if an edit carries them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{Result, TagScopeError};
use crate::metrics::MetricsSnapshot;
use crate::schema;

/// A partial row update keyed by resource id, covering only the editable
/// columns. `None` on a tag field means the edit sets that field to absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEdit {
    pub resource_id: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub cost_center: Option<String>,
    pub tagged: String,
}

impl TagEdit {
    /// Apply the ingestion absent-value convention to the edit itself:
    /// blank or whitespace-only values are absent.
    fn normalized(&self) -> TagEdit {
        TagEdit {
            resource_id: self.resource_id.trim().to_string(),
            department: normalize(&self.department),
            project: normalize(&self.project),
            environment: normalize(&self.environment),
            owner: normalize(&self.owner),
            cost_center: normalize(&self.cost_center),
            tagged: self.tagged.trim().to_string(),
        }
    }

    /// Enum constraints on edited values. The collaborator UI constrains
    /// its input widgets, but the engine re-validates independently.
    fn validate(&self) -> Result<()> {
        if !schema::TAGGED_OPTIONS.contains(&self.tagged.as_str()) {
            return Err(TagScopeError::Validation {
                resource_id: self.resource_id.clone(),
                field: schema::TAGGED.to_string(),
                value: self.tagged.clone(),
                allowed: schema::TAGGED_OPTIONS.join(", "),
            });
        }
        if let Some(environment) = &self.environment {
            if !schema::ENVIRONMENT_OPTIONS.contains(&environment.as_str()) {
                return Err(TagScopeError::Validation {
                    resource_id: self.resource_id.clone(),
                    field: schema::ENVIRONMENT.to_string(),
                    value: environment.clone(),
                    allowed: schema::ENVIRONMENT_OPTIONS.join(", "),
                });
            }
        }
        Ok(())
    }
}

/// Merge edits into a copy of `base`. Validation is atomic: if any edit
/// fails its enum constraints the whole merge is rejected and no dataset
/// is produced.
///
/// Each edit applies to every row whose `resource_id` matches (duplicate
/// ids get the same edit applied to each occurrence; an id with no match
/// is a no-op). Completeness is recomputed for every row of the merged
/// dataset so the derived columns stay consistent dataset-wide.
pub fn apply_edits(base: &Dataset, edits: &[TagEdit]) -> Result<Dataset> {
    let edits: Vec<TagEdit> = edits.iter().map(TagEdit::normalized).collect();
    for edit in &edits {
        edit.validate()?;
    }

    let index = base.index_by_id();
    let mut merged = base.clone();

    for edit in &edits {
        let Some(positions) = index.get(edit.resource_id.as_str()) else {
            debug!(resource_id = %edit.resource_id, "edit references no known resource");
            continue;
        };
        for &pos in positions {
            let record = &mut merged.records[pos];
            record.department = edit.department.clone();
            record.project = edit.project.clone();
            record.environment = edit.environment.clone();
            record.owner = edit.owner.clone();
            record.cost_center = edit.cost_center.clone();
            record.tagged = Some(edit.tagged.clone());
        }
    }

    for record in &mut merged.records {
        record.recompute_completeness();
    }

    Ok(merged)
}

/// The remediated dataset together with its before/after snapshots.
#[derive(Debug, Clone)]
pub struct RemediationOutcome {
    pub dataset: Dataset,
    pub before: MetricsSnapshot,
    pub after: MetricsSnapshot,
}

/// One before/after pair for chart consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub metric: &'static str,
    pub before: f64,
    pub after: f64,
}

impl RemediationOutcome {
    /// Untagged-resource reduction; positive when remediation helped.
    pub fn untagged_resource_delta(&self) -> i64 {
        self.before.untagged_resources as i64 - self.after.untagged_resources as i64
    }

    /// Untagged-cost reduction in dollars; positive when remediation helped.
    pub fn untagged_cost_delta(&self) -> f64 {
        self.before.untagged_cost - self.after.untagged_cost
    }

    /// Average completeness change; positive when remediation helped.
    pub fn completeness_delta(&self) -> f64 {
        self.after.avg_completeness - self.before.avg_completeness
    }

    /// Display variants floor negative deltas at zero: an edit that worsens
    /// tagging is shown as "no improvement", never as a negative
    /// improvement magnitude. The raw deltas above keep their sign.
    pub fn display_untagged_resource_reduction(&self) -> i64 {
        self.untagged_resource_delta().max(0)
    }

    pub fn display_untagged_cost_reduction(&self) -> f64 {
        self.untagged_cost_delta().max(0.0)
    }

    pub fn display_completeness_improvement(&self) -> f64 {
        self.completeness_delta().max(0.0)
    }

    pub fn comparison_rows(&self) -> Vec<ComparisonRow> {
        vec![
            ComparisonRow {
                metric: "Untagged Resources",
                before: self.before.untagged_resources as f64,
                after: self.after.untagged_resources as f64,
            },
            ComparisonRow {
                metric: "Untagged Cost ($)",
                before: self.before.untagged_cost,
                after: self.after.untagged_cost,
            },
            ComparisonRow {
                metric: "Tagging Rate (%)",
                before: self.before.tagging_rate,
                after: self.after.tagging_rate,
            },
        ]
    }
}

/// Full remediation workflow: merge, then snapshot both datasets.
pub fn remediate(base: &Dataset, edits: &[TagEdit]) -> Result<RemediationOutcome> {
    let dataset = apply_edits(base, edits)?;
    let before = MetricsSnapshot::compute(base.iter());
    let after = MetricsSnapshot::compute(dataset.iter());
    Ok(RemediationOutcome {
        dataset,
        before,
        after,
    })
}

fn normalize(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
