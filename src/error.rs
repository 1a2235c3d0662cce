//! Error types for inventory conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while reading a spreadsheet or writing the CSV
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input file does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input file extension is neither .xlsx nor .xls
    #[error("Input file must be .xlsx or .xls: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Requested worksheet is not present in the workbook
    #[error("Sheet '{requested}' not found. Available sheets: {available:?}")]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Failure while reading or decoding the spreadsheet
    #[error("Read error: {0}")]
    ReadError(String),

    /// Failure while writing the CSV output
    #[error("Write error: {0}")]
    WriteError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConvertError {
    /// True for errors raised before any row is read (bad path, bad extension)
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            ConvertError::InputNotFound(_) | ConvertError::UnsupportedFormat(_)
        )
    }
}
