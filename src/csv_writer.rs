//! Buffered CSV writer for the parts import file

use crate::csv::{CsvEncoder, Terminator};
use crate::error::{ConvertError, Result};
use crate::record::{PartRecord, CSV_HEADER};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// CSV writer that streams rows to any `Write` sink
///
/// Rows are encoded into a reused buffer and written straight through. The
/// sink is owned by the writer, so a file created with [`CsvWriter::create`]
/// is closed when the writer is dropped, whether or not `save` was reached.
///
/// # Examples
///
/// ```no_run
/// use inventory_convert::csv_writer::CsvWriter;
///
/// let mut writer = CsvWriter::create("parts.csv")?;
/// writer.write_header()?;
/// writer.write_row(["esc", "Hobbywing 40A"])?;
/// writer.save()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CsvWriter<W: Write> {
    sink: W,

    // State
    row_count: u64,
    buffer: Vec<u8>,

    // Configuration
    delimiter: u8,
    terminator: Terminator,
}

impl CsvWriter<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())
            .map_err(|e| ConvertError::WriteError(format!("Failed to create CSV file: {}", e)))?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap an existing writer
    pub fn from_writer(sink: W) -> Self {
        CsvWriter {
            sink,
            row_count: 0,
            buffer: Vec::with_capacity(4096),
            delimiter: b',',
            terminator: Terminator::default(),
        }
    }

    /// Set custom delimiter (builder pattern)
    pub fn delimiter(mut self, delim: u8) -> Self {
        self.delimiter = delim;
        self
    }

    /// Set record terminator (builder pattern)
    pub fn terminator(mut self, terminator: Terminator) -> Self {
        self.terminator = terminator;
        self
    }

    fn encoder(&self) -> CsvEncoder {
        CsvEncoder::new(self.delimiter, b'"', self.terminator)
    }

    /// Write a row of strings
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buffer.clear();
        self.encoder().encode_record(data, &mut self.buffer);
        self.flush_buffer()
    }

    /// Write the fixed 9-column header
    pub fn write_header(&mut self) -> Result<()> {
        self.write_row(CSV_HEADER)
    }

    /// Write one part record in header order
    pub fn write_record(&mut self, record: &PartRecord) -> Result<()> {
        self.buffer.clear();

        let encoder = self.encoder();
        let mut quantity = itoa::Buffer::new();
        for (i, field) in record.text_fields().iter().enumerate() {
            if i > 0 {
                encoder.push_delimiter(&mut self.buffer);
            }
            let text = match *field {
                Some(text) => text,
                None => quantity.format(record.quantity),
            };
            encoder.encode_field(text, &mut self.buffer);
        }
        encoder.push_terminator(&mut self.buffer);

        self.flush_buffer()
    }

    /// Write multiple records at once
    pub fn write_records<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a PartRecord>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Get the number of rows written, header included
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    fn flush_buffer(&mut self) -> Result<()> {
        self.sink
            .write_all(&self.buffer)
            .map_err(|e| ConvertError::WriteError(format!("Failed to write to file: {}", e)))?;
        self.row_count += 1;
        Ok(())
    }

    /// Flush buffered output and hand back the sink
    pub fn into_inner(mut self) -> Result<W> {
        self.sink
            .flush()
            .map_err(|e| ConvertError::WriteError(format!("Failed to flush file: {}", e)))?;
        Ok(self.sink)
    }

    /// Finalize the file
    ///
    /// Flushes buffered rows and consumes the writer.
    pub fn save(self) -> Result<()> {
        self.into_inner().map(|_| ())
    }
}
