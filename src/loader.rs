//! CSV loader/normalizer: raw tabular input in, typed `Dataset` out.
//!
//! Normalization rules:
//! - blank and whitespace-only cells are absent (`None`), not empty strings
//! - exact full-row duplicates (all input columns) are dropped
//! - the two derived completeness columns are computed per row
//! - unknown columns are tolerated and ignored

use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::dataset::{Dataset, ResourceRecord};
use crate::error::{Result, TagScopeError};
use crate::schema;

/// What the loader observed while normalizing, surfaced to the caller
/// instead of being silently absorbed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Data rows read from the input, before duplicate removal.
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    /// Resource ids whose `MonthlyCostUSD` cell was blank. Their cost is
    /// treated as 0 in every summation.
    pub missing_cost_ids: Vec<String>,
}

/// A normalized dataset together with its load report.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Dataset,
    pub report: LoadReport,
}

pub fn load_path(path: impl AsRef<Path>) -> Result<LoadOutcome> {
    let file = File::open(path.as_ref())?;
    load_reader(file)
}

pub fn load_str(csv_text: &str) -> Result<LoadOutcome> {
    load_reader(csv_text.as_bytes())
}

pub fn load_reader<R: Read>(reader: R) -> Result<LoadOutcome> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let columns: HashMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    for required in schema::REQUIRED_COLUMNS {
        if !columns.contains_key(required) {
            return Err(TagScopeError::Schema(required.to_string()));
        }
    }

    let mut report = LoadReport::default();
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::new();
    let mut records = Vec::new();

    for result in rdr.records() {
        let raw = result?;
        report.rows_read += 1;

        // Normalized view of the full row, used as the duplicate key so
        // that rows differing only in surrounding whitespace collapse.
        let cells: Vec<Option<String>> = (0..headers.len())
            .map(|idx| normalize(raw.get(idx).unwrap_or("")))
            .collect();

        if !seen.insert(cells.clone()) {
            report.duplicates_dropped += 1;
            continue;
        }

        let cell = |name: &str| -> Option<String> {
            columns.get(name).and_then(|&idx| cells[idx].clone())
        };

        let resource_id = cell(schema::RESOURCE_ID).unwrap_or_default();

        let monthly_cost = match cell(schema::MONTHLY_COST) {
            Some(value) => Some(parse_cost(&resource_id, &value)?),
            None => {
                report.missing_cost_ids.push(resource_id.clone());
                None
            }
        };

        let mut record = ResourceRecord {
            resource_id,
            service: cell(schema::SERVICE),
            region: cell(schema::REGION),
            monthly_cost,
            tagged: cell(schema::TAGGED),
            department: cell(schema::DEPARTMENT),
            project: cell(schema::PROJECT),
            environment: cell(schema::ENVIRONMENT),
            owner: cell(schema::OWNER),
            cost_center: cell(schema::COST_CENTER),
            tag_completeness_score: 0,
            tag_completeness_pct: 0.0,
        };
        record.recompute_completeness();
        records.push(record);
    }

    if report.duplicates_dropped > 0 {
        debug!(dropped = report.duplicates_dropped, "removed exact duplicate rows");
    }
    for id in &report.missing_cost_ids {
        warn!(resource_id = %id, "missing MonthlyCostUSD, treating as 0");
    }

    Ok(LoadOutcome {
        dataset: Dataset::new(records),
        report,
    })
}

/// Blank and whitespace-only cells are absent.
fn normalize(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_cost(resource_id: &str, value: &str) -> Result<f64> {
    let cost: f64 = value.parse().map_err(|_| TagScopeError::InvalidNumber {
        resource_id: resource_id.to_string(),
        column: schema::MONTHLY_COST.to_string(),
        value: value.to_string(),
    })?;
    if cost < 0.0 || !cost.is_finite() {
        return Err(TagScopeError::InvalidNumber {
            resource_id: resource_id.to_string(),
            column: schema::MONTHLY_COST.to_string(),
            value: value.to_string(),
        });
    }
    Ok(cost)
}
