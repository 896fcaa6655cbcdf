//! Error types for the Steward library.
//!
//! Only [`StewardError`] aborts an operation. The other error types are
//! degradations: they are recorded against a single column and the pipeline
//! carries on with the rest of the dataset.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for Steward operations.
#[derive(Debug, Error)]
pub enum StewardError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing delimited data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Input bytes are not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// No header or no columns to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Feedback or a decision names a column the dataset does not have.
    #[error("Unknown column: '{0}'")]
    UnknownColumn(String),

    /// Feedback for a column is structurally invalid.
    #[error("Invalid feedback for column '{column}': {message}")]
    InvalidFeedback { column: String, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be read.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StewardError {
    /// Whether this error stems from the caller's input rather than from
    /// the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StewardError::Parse { .. }
                | StewardError::Encoding(_)
                | StewardError::Csv(_)
                | StewardError::InvalidDelimiter(_)
                | StewardError::EmptyData(_)
                | StewardError::UnknownColumn(_)
                | StewardError::InvalidFeedback { .. }
                | StewardError::Json(_)
        )
    }
}

/// Result type alias for Steward operations.
pub type Result<T> = std::result::Result<T, StewardError>;

/// The entity recognizer could not analyze a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecognizerError {
    #[error("Recognizer unavailable: {0}")]
    Unavailable(String),
}

/// A judge call failed or produced a reply that is not a usable plan.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JudgeError {
    #[error("Judge timed out after {0:?}")]
    Timeout(Duration),

    #[error("Judge transport error: {0}")]
    Transport(String),

    #[error("Malformed judge reply: {0}")]
    Malformed(String),

    #[error("Unknown action '{0}' in judge reply")]
    InvalidAction(String),

    #[error("Invalid status '{status}' for action '{action}'")]
    InvalidStatus { action: String, status: String },

    #[error("Judge plan must accept exactly one action, found {0}")]
    AcceptedCount(usize),

    #[error("Judge accepted '{0}', which was not proposed")]
    Unproposed(String),

    #[error("Judge reply has no plan for column '{0}'")]
    MissingColumn(String),
}

/// An accepted action could not be applied to its column.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplyConflict {
    #[error("cannot compute {statistic} for a non-numeric column")]
    NonNumericStatistic { statistic: String },

    #[error("no populated values to compute {0} from")]
    NoValues(String),

    #[error("fill value '{0}' is not numeric but the column is")]
    LiteralType(String),

    #[error("unsupported value '{value}' for action {action}")]
    UnsupportedValue { action: String, value: String },

    #[error("no generalization fits the column values")]
    NoStrategy,

    #[error("derived column '{0}' already exists")]
    ColumnExists(String),
}
