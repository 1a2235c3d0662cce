//! End-of-run statistics and the import report

use crate::category::Category;
use crate::record::PartRecord;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Application the CSV is meant to be imported into
pub const DESTINATION_TOOL: &str = "COTS Architect";

/// Outcome of one conversion run
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    /// Where the CSV was written
    pub output_path: PathBuf,
    /// Number of part records written
    pub records: usize,
    /// Data rows looked at (header rows excluded)
    pub rows_seen: usize,
    /// Data rows that produced no record
    pub rows_skipped: usize,
    category_counts: IndexMap<Category, usize>,
}

impl ConversionSummary {
    /// Tally the written records
    pub fn new<P: AsRef<Path>>(
        output_path: P,
        records: &[PartRecord],
        rows_seen: usize,
        rows_skipped: usize,
    ) -> Self {
        let mut category_counts = IndexMap::new();
        for record in records {
            *category_counts.entry(record.category).or_insert(0) += 1;
        }

        ConversionSummary {
            output_path: output_path.as_ref().to_path_buf(),
            records: records.len(),
            rows_seen,
            rows_skipped,
            category_counts,
        }
    }

    /// Number of records in one category
    pub fn count(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// Per-category counts, sorted by label
    pub fn breakdown(&self) -> Vec<(Category, usize)> {
        let mut counts = self.category_counts.clone();
        counts.sort_by(|a, _, b, _| a.as_str().cmp(b.as_str()));
        counts.into_iter().collect()
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[SUCCESS] Conversion complete!")?;
        writeln!(f)?;
        writeln!(f, "Import this file into {}:", DESTINATION_TOOL)?;
        writeln!(f, "1. Go to Parts Library")?;
        writeln!(f, "2. Click 'Import Multi-Category CSV'")?;
        writeln!(f, "3. Select: {}", self.output_path.display())?;
        writeln!(f)?;
        write!(f, "Category breakdown:")?;
        for (category, count) in self.breakdown() {
            write!(f, "\n  {}: {} parts", category, count)?;
        }
        Ok(())
    }
}
