//! # inventory-convert
//!
//! Converts a customer parts inventory spreadsheet into the multi-category
//! CSV accepted by the COTS Architect parts library import.
//!
//! ## Features
//!
//! - **XLSX and XLS input**: streaming XLSX reader, legacy XLS through calamine
//! - **Keyword classification**: component text mapped to a fixed set of part categories
//! - **Best-effort rows**: short or incomplete rows are skipped, bad quantities default to 1
//! - **Standard CSV output**: fixed 9-column header, RFC 4180 quoting
//!
//! ## Input layout
//!
//! Columns are positional, the first row is a header:
//!
//! | A        | B         | C         | D        | E (optional) |
//! |----------|-----------|-----------|----------|--------------|
//! | category | component | item name | quantity | link         |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inventory_convert::pipeline::{ConvertOptions, Converter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(ConvertOptions::new().quiet(true));
//! let summary = converter.convert("inventory.xlsx", "parts.csv")?;
//!
//! for (category, count) in summary.breakdown() {
//!     println!("{}: {} parts", category, count);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Classification only
//!
//! ```rust
//! use inventory_convert::{classify, Category};
//!
//! assert_eq!(classify("UAS", "Flight Controller"), Category::FlightController);
//! assert_eq!(classify("MISC", "Zip ties"), Category::Accessory);
//! ```

pub mod category;
pub mod csv;
pub mod csv_writer;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod streaming_reader;
pub mod summary;
pub mod types;
pub mod workbook;
pub mod xls_reader;

pub use category::{classify, Category};
pub use csv_writer::CsvWriter;
pub use error::{ConvertError, Result};
pub use pipeline::{convert, ConvertOptions, Converter};
pub use record::{PartRecord, CSV_HEADER};
pub use summary::ConversionSummary;
pub use types::{CellValue, Row};
pub use workbook::{SheetSelector, SpreadsheetFormat};
