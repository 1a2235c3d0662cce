//! Input format detection and sheet row dispatch

use crate::error::{ConvertError, Result};
use crate::streaming_reader::StreamingReader;
use crate::types::Row;
use crate::xls_reader::read_xls_rows;
use std::path::Path;

/// Spreadsheet container formats accepted as input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Office Open XML workbook (`.xlsx`)
    Xlsx,
    /// Legacy binary workbook (`.xls`)
    Xls,
}

impl SpreadsheetFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            _ => None,
        }
    }
}

/// Which worksheet to read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    /// The sheet that was active when the workbook was saved (first sheet if unknown)
    #[default]
    Active,
    /// Zero-based position in the workbook
    Index(usize),
    /// Sheet name, exact match
    Name(String),
}

/// Check that the input exists and has a supported extension
pub fn validate_input<P: AsRef<Path>>(path: P) -> Result<SpreadsheetFormat> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConvertError::InputNotFound(path.to_path_buf()));
    }
    SpreadsheetFormat::from_path(path)
        .ok_or_else(|| ConvertError::UnsupportedFormat(path.to_path_buf()))
}

/// Feed every row of the selected sheet to `visit`, in sheet order.
///
/// XLSX rows are streamed; XLS rows come from a fully loaded range. The
/// first error returned by the reader or by `visit` stops the walk.
pub fn for_each_row<P, F>(path: P, sheet: &SheetSelector, mut visit: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(Result<Row>) -> Result<()>,
{
    let path = path.as_ref();
    match validate_input(path)? {
        SpreadsheetFormat::Xlsx => {
            let mut reader = StreamingReader::open(path)?;
            let rows = match sheet {
                SheetSelector::Active => {
                    let active = reader.active_sheet_index();
                    reader.rows_by_index(active)?
                }
                SheetSelector::Index(index) => reader.rows_by_index(*index)?,
                SheetSelector::Name(name) => reader.rows(name)?,
            };
            for row in rows {
                visit(row)?;
            }
        }
        SpreadsheetFormat::Xls => {
            for row in read_xls_rows(path, sheet)? {
                visit(Ok(row))?;
            }
        }
    }
    Ok(())
}
