//! Error types for workbook access, record editing and plotting

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures at the persistence boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("workbook not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to parse workbook {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("permission denied writing {}", path.display())]
    Permission { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}

impl StoreError {
    /// Message shown inline to the user.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::NotFound { .. } => {
                "File not found. Please provide the correct file path.".to_string()
            }
            StoreError::Parse { .. } => {
                "Error parsing the Excel file. Please check the file format.".to_string()
            }
            StoreError::SheetNotFound(name) => {
                format!("Worksheet named '{}' not found in the workbook.", name)
            }
            StoreError::Permission { .. } => {
                "Error saving the file. Please check file permissions.".to_string()
            }
            StoreError::Io(e) => format!("An error occurred while saving: {}", e),
            StoreError::Write(e) => format!("An error occurred while saving: {}", e),
        }
    }
}

/// Non-fatal problems reported inline while editing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    #[error("Column '{0}' not found. Skipping...")]
    UnknownColumn(String),

    #[error("Invalid row index '{input}' for column '{column}'. Skipping update for this column.")]
    InvalidRowIndex { column: String, input: String },

    #[error("Invalid row index {row} for column '{column}' (table has {len} rows). Skipping update for this column.")]
    RowOutOfRange { column: String, row: i64, len: usize },

    #[error("No player found with the name '{0}'. No data deleted.")]
    NoMatchingPlayer(String),

    #[error("Sheet has no '{0}' column.")]
    MissingColumn(String),

    #[error("Value '{value}' does not match the type of column '{column}' and was stored as text.")]
    StoredAsText { column: String, value: String },
}

/// Reasons a chart could not be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error("Column '{0}' not found.")]
    UnknownColumn(String),

    #[error("Selected column is not categorical. Please choose a categorical column for plotting.")]
    NotCategorical(String),

    #[error("Selected columns are not numeric. Please choose numeric columns for plotting.")]
    NotNumeric(Vec<String>),

    #[error("Selected columns contain no values to plot.")]
    NoData,

    #[error("Failed to render chart: {0}")]
    Render(String),
}
