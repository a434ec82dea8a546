use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagScopeError {
    #[error("Schema error: required column '{0}' is missing from the input")]
    Schema(String),

    #[error("Validation error: resource '{resource_id}' field '{field}' has invalid value '{value}' (allowed: {allowed})")]
    Validation {
        resource_id: String,
        field: String,
        value: String,
        allowed: String,
    },

    #[error("Invalid numeric value '{value}' in column '{column}' for resource '{resource_id}'")]
    InvalidNumber {
        resource_id: String,
        column: String,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TagScopeError>;
