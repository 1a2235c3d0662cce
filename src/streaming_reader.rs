//! Streaming reader for XLSX workbooks
//!
//! Reads the ZIP container directly and walks the worksheet XML row by row.
//!
//! **Memory Usage:**
//! - Shared Strings Table (SST): loaded fully, cells reference it by index
//! - Worksheet XML: loaded from the ZIP entry when `rows()` is called
//! - Total memory ≈ SST + uncompressed XML of one sheet
//!
//! **Trade-offs:**
//! - Values only: styles, number formats and formulas are ignored
//!   (formula cells yield their cached value)
//! - Sequential read only
//! - Dates come back as the raw serial number

use crate::error::{ConvertError, Result};
use crate::types::{CellValue, Row};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Columns in a worksheet (`A` through `XFD`)
pub const MAX_COLUMNS: usize = 16_384;

/// Streaming reader for XLSX files
///
/// # Example
///
/// ```no_run
/// use inventory_convert::streaming_reader::StreamingReader;
///
/// let mut reader = StreamingReader::open("inventory.xlsx")?;
/// let active = reader.active_sheet_index();
/// for row in reader.rows_by_index(active)? {
///     let row = row?;
///     println!("Row {}: {:?}", row.number(), row.cells);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct StreamingReader {
    archive: ZipArchive<File>,
    sst: Vec<String>,
    sheet_names: Vec<String>,
    sheet_paths: Vec<String>,
    active_sheet: usize,
}

impl StreamingReader {
    /// Open XLSX file for streaming read
    ///
    /// Loads the shared strings table and the sheet list; worksheet data is
    /// only read once rows are requested.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| ConvertError::ReadError(format!("Failed to open file: {}", e)))?;

        let mut archive = ZipArchive::new(file)
            .map_err(|e| ConvertError::ReadError(format!("Failed to read ZIP: {}", e)))?;

        let sst = Self::load_shared_strings(&mut archive)?;
        tracing::debug!(count = sst.len(), "loaded shared strings");

        let workbook_xml = read_entry(&mut archive, "xl/workbook.xml")?;
        let rels_xml = read_entry(&mut archive, "xl/_rels/workbook.xml.rels")?;
        let (sheet_names, sheet_paths) = parse_sheet_info(&workbook_xml, &rels_xml)?;
        let active_sheet = parse_active_tab(&workbook_xml)
            .filter(|idx| *idx < sheet_names.len())
            .unwrap_or(0);

        tracing::info!(
            sheets = ?sheet_names,
            active = active_sheet,
            "opened workbook"
        );

        Ok(StreamingReader {
            archive,
            sst,
            sheet_names,
            sheet_paths,
            active_sheet,
        })
    }

    /// Names of all worksheets, in workbook order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Index of the sheet that was selected when the workbook was last saved
    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet
    }

    /// Read rows by sheet index
    ///
    /// # Arguments
    /// * `sheet_index` - Zero-based sheet index (0 = first sheet)
    pub fn rows_by_index(&mut self, sheet_index: usize) -> Result<RowIterator<'_>> {
        let sheet_name = self
            .sheet_names
            .get(sheet_index)
            .ok_or_else(|| {
                ConvertError::ReadError(format!(
                    "Sheet index {} out of bounds. Available: {} sheets",
                    sheet_index,
                    self.sheet_names.len()
                ))
            })?
            .clone();

        self.rows(&sheet_name)
    }

    /// Stream rows from a worksheet by name
    pub fn rows(&mut self, sheet_name: &str) -> Result<RowIterator<'_>> {
        let sheet_path = self
            .sheet_names
            .iter()
            .position(|name| name == sheet_name)
            .and_then(|idx| self.sheet_paths.get(idx))
            .ok_or_else(|| ConvertError::SheetNotFound {
                requested: sheet_name.to_string(),
                available: self.sheet_names.clone(),
            })?
            .clone();

        let xml = read_entry(&mut self.archive, &sheet_path)?;
        let width = sheet_width(&xml)?;

        Ok(RowIterator {
            xml,
            sst: &self.sst,
            position: 0,
            next_index: 0,
            width,
        })
    }

    /// Load Shared Strings Table
    ///
    /// Every `<si>` yields exactly one entry, so cell indices stay aligned
    /// even for empty or rich-text items.
    fn load_shared_strings(archive: &mut ZipArchive<File>) -> Result<Vec<String>> {
        if !archive.file_names().any(|name| name == "xl/sharedStrings.xml") {
            return Ok(Vec::new()); // No SST = all cells are inline
        }
        let xml = read_entry(archive, "xl/sharedStrings.xml")?;

        let mut sst = Vec::new();
        let mut pos = 0;
        while let Scan::Found(si) = next_element(&xml, pos, "si") {
            sst.push(si.body.map(text_runs).unwrap_or_default());
            pos = si.end;
        }
        Ok(sst)
    }
}

/// Iterator over rows in a worksheet
///
/// Rows missing from the XML (fully empty rows) are not produced; the row
/// `index` always reflects the sheet position. Every row is padded to the
/// widest row of the sheet.
pub struct RowIterator<'a> {
    xml: String,
    sst: &'a [String],
    position: usize,
    next_index: u32,
    width: usize,
}

impl<'a> Iterator for RowIterator<'a> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match next_element(&self.xml, self.position, "row") {
            Scan::Done => None,
            Scan::Truncated => {
                self.position = self.xml.len();
                Some(Err(ConvertError::ReadError(
                    "Unterminated <row> element in worksheet".to_string(),
                )))
            }
            Scan::Found(element) => {
                self.position = element.end;

                let index = attr(element.tag, "r")
                    .and_then(|r| r.parse::<u32>().ok())
                    .map(|n| n.saturating_sub(1))
                    .unwrap_or(self.next_index);
                self.next_index = index.saturating_add(1);

                let cells = match element.body.map(|body| parse_cells(body, self.sst)) {
                    Some(Ok(cells)) => cells,
                    Some(Err(e)) => return Some(Err(e)),
                    None => Vec::new(),
                };

                let mut row = Row::new(index, cells);
                row.pad_to(self.width);
                Some(Ok(row))
            }
        }
    }
}

fn parse_cells(row_xml: &str, sst: &[String]) -> Result<Vec<CellValue>> {
    let mut cells = Vec::new();
    let mut pos = 0;

    while let Scan::Found(cell) = next_element(row_xml, pos, "c") {
        pos = cell.end;

        let col_idx = cell_column(cell.tag, cells.len())?;

        // Fill empty cells between last column and current column
        while cells.len() < col_idx {
            cells.push(CellValue::Empty);
        }

        let value = cell
            .body
            .map(|body| parse_cell_value(attr(cell.tag, "t"), body, sst))
            .unwrap_or(CellValue::Empty);

        if col_idx < cells.len() {
            // Duplicate reference, last one wins
            cells[col_idx] = value;
        } else {
            cells.push(value);
        }
    }

    Ok(cells)
}

/// Widest row of the sheet, counting every `<c>` element, valued or not.
///
/// `<dimension>` is ignored: it may be missing or stale.
fn sheet_width(sheet_xml: &str) -> Result<usize> {
    let mut width = 0;
    let mut pos = 0;
    while let Scan::Found(row) = next_element(sheet_xml, pos, "row") {
        pos = row.end;
        let Some(body) = row.body else { continue };

        let mut row_width = 0;
        let mut cell_pos = 0;
        while let Scan::Found(cell) = next_element(body, cell_pos, "c") {
            cell_pos = cell.end;
            row_width = row_width.max(cell_column(cell.tag, row_width)? + 1);
        }
        width = width.max(row_width);
    }
    Ok(width)
}

/// Zero-based column of a `<c>` tag, `next` when it carries no reference
fn cell_column(tag: &str, next: usize) -> Result<usize> {
    let col = match attr(tag, "r") {
        Some(reference) => parse_column_index(reference).ok_or_else(|| {
            ConvertError::ReadError(format!("Invalid cell reference {:?}", reference))
        })?,
        None => next,
    };
    if col >= MAX_COLUMNS {
        return Err(ConvertError::ReadError(format!(
            "Cell column {} is beyond XFD",
            col + 1
        )));
    }
    Ok(col)
}

fn parse_cell_value(cell_type: Option<&str>, body: &str, sst: &[String]) -> CellValue {
    if cell_type == Some("inlineStr") {
        return match next_element(body, 0, "is") {
            Scan::Found(is) => CellValue::String(is.body.map(text_runs).unwrap_or_default()),
            _ => CellValue::Empty,
        };
    }

    let raw = match next_element(body, 0, "v") {
        Scan::Found(v) => decode_xml_entities(v.body.unwrap_or_default()),
        _ => return CellValue::Empty, // formula without cached value
    };

    match cell_type {
        Some("s") => match raw.trim().parse::<usize>().ok().and_then(|idx| sst.get(idx)) {
            Some(text) => CellValue::String(text.clone()),
            None => {
                tracing::warn!(value = %raw, "shared string index out of range");
                CellValue::Empty
            }
        },
        Some("str") => CellValue::String(raw),
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        Some("e") => CellValue::Error(raw),
        _ => parse_number(raw),
    }
}

fn parse_number(raw: String) -> CellValue {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        CellValue::Int(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
        CellValue::Float(f)
    } else {
        CellValue::String(raw)
    }
}

/// Result of looking for the next element with a given name
enum Scan<'x> {
    Found(Element<'x>),
    Truncated,
    Done,
}

struct Element<'x> {
    /// Offset of the opening `<`
    start: usize,
    /// Opening tag, `<` through `>`
    tag: &'x str,
    /// Inner XML, `None` for self-closing elements
    body: Option<&'x str>,
    /// Offset just past the element
    end: usize,
}

/// Find the next `<name ...>` element at or after `from`.
///
/// Elements whose name only starts with `name` (`<row` vs `<rowBreaks`) are
/// skipped. Elements of the same name must not nest.
fn next_element<'x>(xml: &'x str, from: usize, name: &str) -> Scan<'x> {
    let open = format!("<{}", name);
    let bytes = xml.as_bytes();
    let mut search = from;

    let start = loop {
        let Some(rel) = xml.get(search..).and_then(|rest| rest.find(&open)) else {
            return Scan::Done;
        };
        let start = search + rel;
        let after = start + open.len();
        match bytes.get(after) {
            Some(b' ' | b'>' | b'/' | b'\t' | b'\r' | b'\n') => break start,
            Some(_) => search = after,
            None => return Scan::Truncated,
        }
    };

    let Some(tag_len) = xml[start..].find('>') else {
        return Scan::Truncated;
    };
    let tag_end = start + tag_len + 1;
    let tag = &xml[start..tag_end];

    if tag.ends_with("/>") {
        return Scan::Found(Element {
            start,
            tag,
            body: None,
            end: tag_end,
        });
    }

    let close = format!("</{}>", name);
    match xml[tag_end..].find(&close) {
        Some(body_len) => Scan::Found(Element {
            start,
            tag,
            body: Some(&xml[tag_end..tag_end + body_len]),
            end: tag_end + body_len + close.len(),
        }),
        None => Scan::Truncated,
    }
}

/// Value of attribute `name` inside an opening tag
fn attr<'t>(tag: &'t str, name: &str) -> Option<&'t str> {
    let needle = format!("{}=", name);
    let bytes = tag.as_bytes();
    let mut search = 0;

    while let Some(rel) = tag[search..].find(&needle) {
        let start = search + rel;
        let value_start = start + needle.len();
        search = value_start;

        // Must be a whole attribute name, not a suffix of another one
        if start == 0 || !bytes[start - 1].is_ascii_whitespace() {
            continue;
        }
        let quote = match bytes.get(value_start) {
            Some(&q) if q == b'"' || q == b'\'' => q as char,
            _ => continue,
        };
        let rest = &tag[value_start + 1..];
        return rest.find(quote).map(|end| &rest[..end]);
    }
    None
}

/// Concatenate the `<t>` runs of a string item, skipping phonetic runs
fn text_runs(xml: &str) -> String {
    let mut visible = String::with_capacity(xml.len());
    let mut pos = 0;
    loop {
        match next_element(xml, pos, "rPh") {
            Scan::Found(rph) => {
                visible.push_str(&xml[pos..rph.start]);
                pos = rph.end;
            }
            _ => {
                visible.push_str(&xml[pos..]);
                break;
            }
        }
    }

    let mut text = String::new();
    let mut pos = 0;
    while let Scan::Found(t) = next_element(&visible, pos, "t") {
        if let Some(body) = t.body {
            text.push_str(&decode_xml_entities(body));
        }
        pos = t.end;
    }
    text
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| ConvertError::ReadError(format!("Failed to open {}: {}", name, e)))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ConvertError::ReadError(format!("Failed to read {}: {}", name, e)))?;
    Ok(xml)
}

/// Sheet names and worksheet entry paths from workbook.xml and its rels
fn parse_sheet_info(workbook_xml: &str, rels_xml: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut targets = Vec::new();
    let mut pos = 0;
    while let Scan::Found(rel) = next_element(rels_xml, pos, "Relationship") {
        if let (Some(id), Some(target)) = (attr(rel.tag, "Id"), attr(rel.tag, "Target")) {
            targets.push((id, target));
        }
        pos = rel.end;
    }

    let mut sheet_names = Vec::new();
    let mut sheet_paths = Vec::new();
    let mut pos = 0;
    while let Scan::Found(sheet) = next_element(workbook_xml, pos, "sheet") {
        pos = sheet.end;

        let name = attr(sheet.tag, "name").map(decode_xml_entities);
        let target = attr(sheet.tag, "r:id")
            .and_then(|rid| targets.iter().find(|(id, _)| *id == rid))
            .map(|(_, target)| resolve_target(target));

        match (name, target) {
            (Some(name), Some(path)) => {
                sheet_names.push(name);
                sheet_paths.push(path);
            }
            (name, _) => {
                return Err(ConvertError::ReadError(format!(
                    "Worksheet {:?} has no resolvable relationship in workbook.xml.rels",
                    name
                )));
            }
        }
    }

    if sheet_names.is_empty() {
        return Err(ConvertError::ReadError(
            "Workbook contains no worksheets".to_string(),
        ));
    }

    Ok((sheet_names, sheet_paths))
}

// Targets are relative to xl/ unless absolute within the package
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_active_tab(workbook_xml: &str) -> Option<usize> {
    match next_element(workbook_xml, 0, "workbookView") {
        Scan::Found(view) => attr(view.tag, "activeTab").and_then(|v| v.parse().ok()),
        _ => None,
    }
}

// Parse column index from cell reference (e.g., "A1" -> 0, "B1" -> 1, "AA1" -> 26)
// None when the reference has no column letters or names a column past XFD
fn parse_column_index(cell_ref: &str) -> Option<usize> {
    let mut col_idx = 0usize;
    for ch in cell_ref.chars().take_while(|c| c.is_ascii_alphabetic()) {
        let letter = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        col_idx = col_idx.checked_mul(26)?.checked_add(letter)?;
        if col_idx > MAX_COLUMNS {
            return None;
        }
    }
    col_idx.checked_sub(1) // Convert to 0-based index
}

/// Decode predefined XML entities and numeric character references
fn decode_xml_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
