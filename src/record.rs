//! Output record for the multi-category parts CSV

use crate::category::{classify, Category};
use crate::types::{CellValue, Row};

/// Output column names, in file order
pub const CSV_HEADER: [&str; 9] = [
    "category",
    "name",
    "manufacturer",
    "part_number",
    "quantity",
    "weight_g",
    "cost_usd",
    "link",
    "notes",
];

/// Minimum number of positional fields a data row needs
pub const MIN_ROW_FIELDS: usize = 4;

/// Quantity written when the source value is blank or unusable
pub const DEFAULT_QUANTITY: u64 = 1;

const COL_CATEGORY: usize = 0;
const COL_COMPONENT: usize = 1;
const COL_NAME: usize = 2;
const COL_QUANTITY: usize = 3;
const COL_LINK: usize = 4;

/// One part in the import file
///
/// Manufacturer, part number, weight and cost have no source column and are
/// always written empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartRecord {
    pub category: Category,
    pub name: String,
    pub manufacturer: String,
    pub part_number: String,
    pub quantity: u64,
    pub weight_g: String,
    pub cost_usd: String,
    pub link: String,
    /// Raw `category/component` text of the source row
    pub notes: String,
}

impl PartRecord {
    /// Build a record from a positional data row.
    ///
    /// Returns `None` for rows that are empty, shorter than
    /// [`MIN_ROW_FIELDS`], or have a blank category or item name.
    pub fn from_row(row: &Row) -> Option<Self> {
        if row.is_empty() || row.len() < MIN_ROW_FIELDS {
            return None;
        }

        let field = |col: usize| row.get(col).map(CellValue::text).unwrap_or_default();

        let category_raw = field(COL_CATEGORY);
        let component_raw = field(COL_COMPONENT);
        let item_name = field(COL_NAME);
        let link = field(COL_LINK);

        if item_name.is_empty() || category_raw.is_empty() {
            return None;
        }

        let quantity = row
            .get(COL_QUANTITY)
            .map(parse_quantity)
            .unwrap_or(DEFAULT_QUANTITY);

        Some(PartRecord {
            category: classify(&category_raw, &component_raw),
            name: item_name.trim().to_string(),
            manufacturer: String::new(),
            part_number: String::new(),
            quantity,
            weight_g: String::new(),
            cost_usd: String::new(),
            link,
            notes: format!("{}/{}", category_raw, component_raw),
        })
    }

    /// Field values in [`CSV_HEADER`] order, quantity excluded
    ///
    /// The quantity slot is `None` so writers can format the integer
    /// without an intermediate allocation.
    pub fn text_fields(&self) -> [Option<&str>; 9] {
        [
            Some(self.category.as_str()),
            Some(self.name.as_str()),
            Some(self.manufacturer.as_str()),
            Some(self.part_number.as_str()),
            None,
            Some(self.weight_g.as_str()),
            Some(self.cost_usd.as_str()),
            Some(self.link.as_str()),
            Some(self.notes.as_str()),
        ]
    }

    /// Field values in [`CSV_HEADER`] order
    pub fn fields(&self) -> Vec<String> {
        self.text_fields()
            .iter()
            .map(|f| match f {
                Some(s) => s.to_string(),
                None => self.quantity.to_string(),
            })
            .collect()
    }

    /// Item name cut to `max_chars` characters for trace output
    pub fn short_name(&self, max_chars: usize) -> &str {
        match self.name.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.name[..idx],
            None => &self.name,
        }
    }
}

/// Coerce a quantity cell to a count.
///
/// Blank cells, unparsable text, non-finite or negative numbers and values
/// beyond `u64` all give [`DEFAULT_QUANTITY`]. Decimals truncate toward zero.
pub fn parse_quantity(cell: &CellValue) -> u64 {
    if cell.is_blank() {
        return DEFAULT_QUANTITY;
    }
    match cell {
        CellValue::Int(i) => u64::try_from(*i).unwrap_or(DEFAULT_QUANTITY),
        CellValue::String(s) => parse_quantity_str(s),
        other => other
            .as_f64()
            .and_then(truncate_quantity)
            .unwrap_or(DEFAULT_QUANTITY),
    }
}

/// Coerce quantity text such as `"3"` or `"3.0"` to a count
pub fn parse_quantity_str(text: &str) -> u64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .and_then(truncate_quantity)
        .unwrap_or(DEFAULT_QUANTITY)
}

fn truncate_quantity(value: f64) -> Option<u64> {
    if !value.is_finite() {
        return None;
    }
    let whole = value.trunc();
    // u64::MAX rounds up to 2^64 as f64, which is itself out of range
    if whole < 0.0 || whole >= u64::MAX as f64 {
        return None;
    }
    Some(whole as u64)
}
