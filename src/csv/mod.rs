//! CSV encoding for the import file

mod encoder;

pub use encoder::{CsvEncoder, Terminator};
