use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Missing column in header: {0}")]
    MissingColumn(String),

    #[error("Listing {id}: missing value for {field}")]
    MissingField { id: String, field: &'static str },

    #[error("Listing {id}: malformed currency in {field}: {value:?}")]
    MalformedCurrency {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("Listing {id}: malformed number in {field}: {value:?}")]
    MalformedNumeric {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("Listing {id}: {field} must be positive, got {value}")]
    DegenerateInput {
        id: String,
        field: &'static str,
        value: i32,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
