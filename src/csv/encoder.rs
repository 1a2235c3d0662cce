//! CSV encoding with RFC 4180 quoting

/// Record terminator written after each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    /// `\r\n`, what spreadsheet tools and most importers expect
    #[default]
    CrLf,
    /// `\n`
    Lf,
}

impl Terminator {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Terminator::CrLf => b"\r\n",
            Terminator::Lf => b"\n",
        }
    }
}

/// CSV encoder for writing properly formatted CSV data
#[derive(Debug, Clone, Copy)]
pub struct CsvEncoder {
    delimiter: u8,
    quote_char: u8,
    terminator: Terminator,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self::new(b',', b'"', Terminator::CrLf)
    }
}

impl CsvEncoder {
    /// Create a new CSV encoder with custom delimiter, quote character and terminator
    pub fn new(delimiter: u8, quote_char: u8, terminator: Terminator) -> Self {
        Self {
            delimiter,
            quote_char,
            terminator,
        }
    }

    /// Encode a complete record, terminator included
    pub fn encode_record<I, S>(&self, fields: I, buffer: &mut Vec<u8>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                buffer.push(self.delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
        buffer.extend_from_slice(self.terminator.as_bytes());
    }

    /// Encode single field with proper quoting/escaping
    pub fn encode_field(&self, field: &str, buffer: &mut Vec<u8>) {
        if !self.needs_quoting(field) {
            buffer.extend_from_slice(field.as_bytes());
            return;
        }

        buffer.push(self.quote_char);
        for byte in field.bytes() {
            if byte == self.quote_char {
                // " -> ""
                buffer.push(self.quote_char);
            }
            buffer.push(byte);
        }
        buffer.push(self.quote_char);
    }

    /// Append the field separator
    pub fn push_delimiter(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.delimiter);
    }

    /// Append the record terminator
    pub fn push_terminator(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(self.terminator.as_bytes());
    }

    fn needs_quoting(&self, field: &str) -> bool {
        field
            .bytes()
            .any(|b| b == self.delimiter || b == self.quote_char || b == b'\n' || b == b'\r')
    }
}
