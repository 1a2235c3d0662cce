//! Cell and row types produced by the spreadsheet readers

use std::fmt;

/// A single cell value read from a worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell (missing or without a value)
    Empty,
    /// String value (shared, inline or formula string result)
    String(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Error value such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Convert cell value to string
    pub fn as_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::String(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }

    /// Check if cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell carries no usable value.
    ///
    /// Empty cells, empty strings, numeric zero and `false` all count as
    /// blank. Whitespace-only strings are *not* blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Int(i) => *i == 0,
            CellValue::Float(f) => *f == 0.0,
            CellValue::Bool(b) => !b,
            CellValue::Error(_) => false,
        }
    }

    /// Text of the cell, or an empty string when the cell is blank.
    ///
    /// Floats keep their decimal point (`2.0`) and booleans are capitalized
    /// (`True`), so text columns read the same whichever reader typed them.
    pub fn text(&self) -> String {
        match self {
            _ if self.is_blank() => String::new(),
            CellValue::Float(f) => float_text(*f),
            CellValue::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
            other => other.as_string(),
        }
    }

    /// Try to convert to float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// Shortest round-trip digits, with scientific notation outside 1e-4..1e16
fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return (if f > 0.0 { "inf" } else { "-inf" }).to_string();
    }

    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{:e}", f);
        if let Some((mantissa, exponent)) = sci.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return sci;
    }

    if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// Represents a row of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Row index in the sheet (0-based, so sheet row 1 is index 0)
    pub index: u32,
    /// Cells in this row, positional from column A
    pub cells: Vec<CellValue>,
}

impl Row {
    /// Create a new row
    pub fn new(index: u32, cells: Vec<CellValue>) -> Self {
        Row { index, cells }
    }

    /// 1-based row number as shown by spreadsheet applications
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Get cell at column index
    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }

    /// Get number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if row is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() || self.cells.iter().all(|c| c.is_empty())
    }

    /// Pad the row with empty cells up to `width` columns
    pub fn pad_to(&mut self, width: usize) {
        if self.cells.len() < width {
            self.cells.resize(width, CellValue::Empty);
        }
    }
}
