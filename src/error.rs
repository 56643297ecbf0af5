use thiserror::Error;

#[derive(Error, Debug)]
pub enum BucketError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a decimal amount: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("No statements found")]
    NoStatements,

    #[error("Bucket already exists: {0}")]
    DuplicateBucket(String),
}

pub type Result<T> = std::result::Result<T, BucketError>;
