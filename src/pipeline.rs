//! Spreadsheet to parts CSV conversion
//!
//! One sequential pass: rows are read, filtered, classified and collected in
//! sheet order, then written out in one go once the input is exhausted.

use crate::csv::Terminator;
use crate::csv_writer::CsvWriter;
use crate::error::Result;
use crate::record::PartRecord;
use crate::summary::ConversionSummary;
use crate::types::Row;
use crate::workbook::{for_each_row, SheetSelector};
use std::path::Path;

/// Characters of the item name shown in per-row trace lines
pub const TRACE_NAME_CHARS: usize = 50;

/// Conversion settings
///
/// # Examples
///
/// ```
/// use inventory_convert::pipeline::ConvertOptions;
/// use inventory_convert::workbook::SheetSelector;
///
/// let options = ConvertOptions::new()
///     .sheet(SheetSelector::Name("Inventory".to_string()))
///     .quiet(true);
/// assert_eq!(options.header_rows, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Worksheet to read
    pub sheet: SheetSelector,
    /// Leading sheet rows skipped unconditionally
    pub header_rows: u32,
    /// Suppress per-row trace lines and the final report
    pub quiet: bool,
    /// Output field delimiter
    pub delimiter: u8,
    /// Output record terminator
    pub terminator: Terminator,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            sheet: SheetSelector::Active,
            header_rows: 1,
            quiet: false,
            delimiter: b',',
            terminator: Terminator::CrLf,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the worksheet (builder pattern)
    pub fn sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    /// Number of header rows to skip (builder pattern)
    pub fn header_rows(mut self, rows: u32) -> Self {
        self.header_rows = rows;
        self
    }

    /// Silence console output (builder pattern)
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Set output delimiter (builder pattern)
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set output record terminator (builder pattern)
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }
}

/// Records collected from a sheet, before anything is written
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    /// Part records in sheet order
    pub records: Vec<PartRecord>,
    /// Data rows looked at (header rows excluded)
    pub rows_seen: usize,
    /// Data rows that produced no record
    pub rows_skipped: usize,
}

/// Runs the conversion with a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Converter { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Turn sheet rows into part records.
    ///
    /// Header rows, empty or short rows and rows without a category or item
    /// name are skipped. Reader errors stop the conversion.
    pub fn convert_rows<I>(&self, rows: I) -> Result<Conversion>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let mut conversion = Conversion::default();
        for row in rows {
            self.accept(row?, &mut conversion);
        }
        Ok(conversion)
    }

    /// Convert `input` and write the CSV to `output`
    pub fn convert<P, Q>(&self, input: P, output: Q) -> Result<ConversionSummary>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();

        if !self.options.quiet {
            println!("Reading inventory from: {}", input.display());
        }

        let mut conversion = Conversion::default();
        for_each_row(input, &self.options.sheet, |row| {
            self.accept(row?, &mut conversion);
            Ok(())
        })?;

        if !self.options.quiet {
            println!();
            println!(
                "Writing {} parts to: {}",
                conversion.records.len(),
                output.display()
            );
        }

        self.write_csv(output, &conversion.records)?;
        tracing::info!(
            records = conversion.records.len(),
            skipped = conversion.rows_skipped,
            path = %output.display(),
            "wrote parts csv"
        );

        let summary = ConversionSummary::new(
            output,
            &conversion.records,
            conversion.rows_seen,
            conversion.rows_skipped,
        );
        if !self.options.quiet {
            println!("{}", summary);
        }
        Ok(summary)
    }

    /// Write the header and all records to a new CSV file
    pub fn write_csv<P: AsRef<Path>>(&self, output: P, records: &[PartRecord]) -> Result<()> {
        let mut writer = CsvWriter::create(output)?
            .delimiter(self.options.delimiter)
            .terminator(self.options.terminator);
        writer.write_header()?;
        writer.write_records(records)?;
        writer.save()
    }

    fn accept(&self, row: Row, conversion: &mut Conversion) {
        if row.index < self.options.header_rows {
            return;
        }
        conversion.rows_seen += 1;

        match PartRecord::from_row(&row) {
            Some(record) => {
                if !self.options.quiet {
                    println!(
                        "Row {}: {} -> {} | {}",
                        row.number(),
                        record.notes,
                        record.category,
                        record.short_name(TRACE_NAME_CHARS)
                    );
                }
                conversion.records.push(record);
            }
            None => {
                tracing::debug!(row = row.number(), cells = row.len(), "skipped row");
                conversion.rows_skipped += 1;
            }
        }
    }
}

/// Convert `input` to `output` with default options
pub fn convert<P, Q>(input: P, output: Q) -> Result<ConversionSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    Converter::default().convert(input, output)
}
