//! Legacy `.xls` (BIFF) workbooks via calamine
//!
//! The whole used range of one sheet is loaded; rows are returned with their
//! absolute sheet positions so they line up with the XLSX reader's output.

use crate::error::{ConvertError, Result};
use crate::types::{CellValue, Row};
use crate::workbook::SheetSelector;
use calamine::{open_workbook, Data, Range, Reader, Xls};
use std::path::Path;

/// Read every row of the selected sheet of an `.xls` workbook
pub fn read_xls_rows<P: AsRef<Path>>(path: P, sheet: &SheetSelector) -> Result<Vec<Row>> {
    let mut workbook: Xls<_> = open_workbook(path.as_ref())
        .map_err(|e| ConvertError::ReadError(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let index = match sheet {
        // BIFF carries no active tab that calamine exposes
        SheetSelector::Active => 0,
        SheetSelector::Index(index) => *index,
        SheetSelector::Name(name) => sheet_names
            .iter()
            .position(|candidate| candidate == name)
            .ok_or_else(|| ConvertError::SheetNotFound {
                requested: name.clone(),
                available: sheet_names.clone(),
            })?,
    };

    tracing::info!(sheets = ?sheet_names, selected = index, "opened xls workbook");

    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| {
            ConvertError::ReadError(format!(
                "Sheet index {} out of bounds. Available: {} sheets",
                index,
                sheet_names.len()
            ))
        })?
        .map_err(|e| ConvertError::ReadError(format!("Failed to read Excel range: {}", e)))?;

    Ok(range_rows(&range))
}

fn range_rows(range: &Range<Data>) -> Vec<Row> {
    let (first_row, first_col) = match range.start() {
        Some(start) => start,
        None => return Vec::new(),
    };

    range
        .rows()
        .enumerate()
        .map(|(offset, cells)| {
            let mut values = vec![CellValue::Empty; first_col as usize];
            values.extend(cells.iter().map(cell_value));
            Row::new(first_row + offset as u32, values)
        })
        .collect()
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        other => CellValue::String(other.to_string()),
    }
}
