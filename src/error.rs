use thiserror::Error;

/// Boxed error used to preserve the original cause of a handler failure.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during book, sheet, or format operations
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Book has no sheets, so there is no active sheet")]
    NoActiveSheet,

    #[error("Unsupported format: {name}")]
    UnsupportedFormat { name: String },

    #[error("Resource not found: {name}")]
    NotFound { name: String },

    #[error("Load failed for format '{format}': {source}")]
    Load {
        format: String,
        #[source]
        source: BoxedError,
    },

    #[error("Dump failed for format '{format}': {source}")]
    Dump {
        format: String,
        #[source]
        source: BoxedError,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
