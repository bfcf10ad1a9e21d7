use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridzError {
    #[error("Record id already in use: {0}")]
    DuplicateIdentifier(String),

    #[error("Column already exists: {0}")]
    DuplicateField(String),

    #[error("Unknown column: {0}")]
    UnknownField(String),

    #[error("Column order omits: {}", .missing.join(", "))]
    IncompleteOrder { missing: Vec<String> },

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input error: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, GridzError>;
