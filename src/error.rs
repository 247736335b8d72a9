use thiserror::Error;

/// Errors raised while turning a source file into a [`crate::data::model::Dataset`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing required column '{column}'")]
    Schema { column: String },

    #[error("row {row}: column '{column}' holds '{value}', expected a number")]
    Data {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
