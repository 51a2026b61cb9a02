use std::path::PathBuf;
use thiserror::Error;

/// A summary table or artifact could not be loaded.
#[derive(Debug, Error)]
pub enum DataUnavailable {
    #[error("no location configured for dataset {dataset}")]
    NotConfigured { dataset: String },
    #[error("failed to read {dataset} from {}: {source}", path.display())]
    Read {
        dataset: String,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{dataset} at {} is not valid CSV: {source}", path.display())]
    Csv {
        dataset: String,
        path: PathBuf,
        source: csv::Error,
    },
    #[error("{dataset} at {} is missing column(s): {}", path.display(), columns.join(", "))]
    MissingColumns {
        dataset: String,
        path: PathBuf,
        columns: Vec<String>,
    },
    #[error("{dataset} at {} row {row}: invalid {column} value '{value}'", path.display())]
    InvalidValue {
        dataset: String,
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    #[error("{dataset} at {} row {row}: Total_Late ({late}) exceeds Total_Orders ({orders})", path.display())]
    InconsistentCounts {
        dataset: String,
        path: PathBuf,
        row: usize,
        late: u64,
        orders: u64,
    },
    #[error("{dataset} at {} has an unexpected shape: {reason}", path.display())]
    Format {
        dataset: String,
        path: PathBuf,
        reason: String,
    },
}

/// An uploaded order file could not be classified.
#[derive(Debug, Error)]
pub enum MalformedUpload {
    #[error("uploaded file is empty")]
    Empty,
    #[error("no file was attached to the upload")]
    NoFile,
    #[error("could not read upload: {0}")]
    Transfer(String),
    #[error("could not parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("row {row}: '{value}' in column '{column}' is not a whole number of days")]
    InvalidDays {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// A manually entered order was rejected before classification.
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("invalid form submission: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("column '{0}' not found")]
    MissingColumn(String),
    #[error("row {row}: '{value}' in column '{column}' is not numeric")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}
