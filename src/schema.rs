//! Column schema for the resource inventory CSV.

/// Unique resource identifier column.
pub const RESOURCE_ID: &str = "ResourceID";
pub const SERVICE: &str = "Service";
pub const REGION: &str = "Region";
pub const MONTHLY_COST: &str = "MonthlyCostUSD";
pub const TAGGED: &str = "Tagged";
pub const DEPARTMENT: &str = "Department";
pub const PROJECT: &str = "Project";
pub const ENVIRONMENT: &str = "Environment";
pub const OWNER: &str = "Owner";
pub const COST_CENTER: &str = "CostCenter";

/// Derived columns emitted on export and ignored on load.
pub const TAG_COMPLETENESS_SCORE: &str = "TagCompletenessScore";
pub const TAG_COMPLETENESS_PCT: &str = "TagCompletenessPercentage";

/// Columns that must exist as headers in the raw input. Individual cells
/// may still be blank.
pub const REQUIRED_COLUMNS: [&str; 5] = [RESOURCE_ID, SERVICE, REGION, MONTHLY_COST, TAGGED];

/// The five governance tag fields that participate in completeness scoring.
pub const TAG_FIELDS: [&str; 5] = [DEPARTMENT, PROJECT, ENVIRONMENT, OWNER, COST_CENTER];

/// Full export column order: the load schema plus the two derived columns.
pub const EXPORT_COLUMNS: [&str; 12] = [
    RESOURCE_ID,
    SERVICE,
    REGION,
    MONTHLY_COST,
    TAGGED,
    DEPARTMENT,
    PROJECT,
    ENVIRONMENT,
    OWNER,
    COST_CENTER,
    TAG_COMPLETENESS_SCORE,
    TAG_COMPLETENESS_PCT,
];

/// Allowed values for the `Environment` field once edited.
pub const ENVIRONMENT_OPTIONS: [&str; 3] = ["Prod", "Dev", "Test"];

/// Allowed values for the `Tagged` flag once edited.
pub const TAGGED_OPTIONS: [&str; 2] = ["Yes", "No"];
